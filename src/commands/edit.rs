use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use datebook_core::config::EngineConfig;
use datebook_core::event::{Event, parse_date, parse_time};
use datebook_core::overlap::{self, OverlapWarning};
use datebook_core::series::{SeriesMutator, UuidGroupIds};
use datebook_core::store::EventStore;
use owo_colors::OwoColorize;

use crate::render::Render;
use crate::store::JsonStore;

/// Fields to change on an existing occurrence. Omitted fields keep their value.
#[derive(Args, Debug, Default)]
pub struct EditArgs {
    #[arg(short, long)]
    pub title: Option<String>,

    /// Date (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: Option<String>,

    /// Start time (HH:MM)
    #[arg(short, long)]
    pub start: Option<String>,

    /// End time (HH:MM)
    #[arg(short, long)]
    pub end: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    /// Reminder lead time in minutes
    #[arg(long)]
    pub notify: Option<u32>,
}

impl EditArgs {
    fn apply(&self, mut event: Event) -> Result<Event> {
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(date) = &self.date {
            event.date = parse_date(date)?;
        }
        if let Some(start) = &self.start {
            event.start_time = parse_time(start)?;
        }
        if let Some(end) = &self.end {
            event.end_time = parse_time(end)?;
        }
        if let Some(description) = &self.description {
            event.description = description.clone();
        }
        if let Some(location) = &self.location {
            event.location = location.clone();
        }
        if let Some(category) = &self.category {
            event.category = category.clone();
        }
        if let Some(notify) = self.notify {
            event.notification_time = notify;
        }

        if event.start_time >= event.end_time {
            anyhow::bail!(
                "End time {} must be after start time {}",
                event.end_time.format("%H:%M"),
                event.start_time.format("%H:%M")
            );
        }

        Ok(event)
    }
}

/// Edit one occurrence. An occurrence of a series is detached from it.
pub fn run(
    store_path: &Path,
    config: &EngineConfig,
    id: &str,
    changes: EditArgs,
    strict: bool,
) -> Result<()> {
    let mut store = JsonStore::load(store_path)?;

    let current = store
        .get(id)
        .cloned()
        .with_context(|| format!("Event '{}' not found", id))?;
    let was_recurring = current.is_recurring();
    let edited = changes.apply(current)?;

    if let Some(warning) = OverlapWarning::new(overlap::conflicts(&edited, store.events())) {
        println!("{}", warning.render());
        if strict {
            anyhow::bail!("Not saved: the edited event overlaps existing events");
        }
    }

    let mutator = SeriesMutator::with_options(UuidGroupIds, config.expand_options());
    let saved = mutator.apply_edit(edited, &mut store)?;
    store.save()?;

    println!("Updated {}", saved.conflict_label());
    if was_recurring {
        println!("{}", "Detached from its series; other occurrences are unchanged".dimmed());
    }

    Ok(())
}
