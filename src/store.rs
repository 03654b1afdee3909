//! JSON-file event store.
//!
//! Events live in a single file using the `{ "events": [...] }` envelope.
//! The file is the only persistent state; the engine itself never touches it.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use datebook_core::event::Event;
use datebook_core::notify::EventSource;
use datebook_core::store::EventStore;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Envelope {
    #[serde(default)]
    events: Vec<Event>,
}

/// Events loaded from a JSON file.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    events: Vec<Event>,
}

impl JsonStore {
    /// Default location: `<data dir>/datebook/events.json`
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir().context("Could not determine data directory")?;
        Ok(data_dir.join("datebook").join("events.json"))
    }

    /// Load the store. A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        let events = read_events(path)?.unwrap_or_default();
        Ok(JsonStore {
            path: path.to_path_buf(),
            events,
        })
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let envelope = Envelope {
            events: self.events.clone(),
        };
        let content = serde_json::to_string_pretty(&envelope)?;

        // Rename over the store: readers see the old file or the new one.
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        tmp.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write {}", tmp.path().display()))?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        Ok(())
    }

    /// Next free id for a newly submitted event.
    ///
    /// Ids are numeric; expanded instances extend them with `-n`, so only
    /// the part before the first `-` is considered.
    pub fn next_id(&self) -> String {
        let max = self
            .events
            .iter()
            .filter_map(|e| e.id.split('-').next()?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        (max + 1).to_string()
    }
}

impl EventStore for JsonStore {
    fn events(&self) -> &[Event] {
        &self.events
    }

    fn insert(&mut self, event: Event) {
        self.events.push(event);
    }

    fn replace(&mut self, event: Event) -> Option<Event> {
        EventStore::replace(&mut self.events, event)
    }

    fn remove(&mut self, id: &str) -> Option<Event> {
        EventStore::remove(&mut self.events, id)
    }
}

/// `None` when the file is missing or blank.
fn read_events(path: &Path) -> Result<Option<Vec<Event>>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(None);
    }

    let envelope: Envelope = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(envelope.events))
}

/// Re-reads the store file on every reminder tick.
///
/// If the file cannot be read, or is missing or blank after a good read,
/// the last good snapshot is served instead. A store emptied on purpose is
/// saved as `{"events": []}` and read normally.
pub struct StoreFileSource {
    path: PathBuf,
    last_good: Mutex<Option<Vec<Event>>>,
}

impl StoreFileSource {
    pub fn new(path: PathBuf) -> Self {
        StoreFileSource {
            path,
            last_good: Mutex::new(None),
        }
    }
}

impl EventSource for StoreFileSource {
    fn snapshot(&self) -> Vec<Event> {
        let mut last_good = self
            .last_good
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        match read_events(&self.path) {
            Ok(Some(events)) => {
                *last_good = Some(events.clone());
                events
            }
            Ok(None) => {
                if last_good.is_some() {
                    debug!(path = %self.path.display(), "store file blank; keeping previous events");
                }
                last_good.clone().unwrap_or_default()
            }
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "keeping previous events");
                last_good.clone().unwrap_or_default()
            }
        }
    }
}
