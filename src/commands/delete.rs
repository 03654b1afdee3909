use std::path::Path;

use anyhow::{Context, Result};
use datebook_core::series;
use datebook_core::store::EventStore;
use owo_colors::OwoColorize;

use crate::store::JsonStore;

/// Delete one occurrence. Other occurrences of its series are kept.
pub fn run(store_path: &Path, id: &str) -> Result<()> {
    let mut store = JsonStore::load(store_path)?;

    let removed = series::remove_one(id, &mut store)
        .with_context(|| format!("Event '{}' not found", id))?;
    store.save()?;

    println!("Deleted {}", removed.conflict_label());

    if let Some(group_id) = removed.repeat.group_id() {
        let remaining = series::siblings(group_id, store.events()).len();
        if remaining > 0 {
            let note = format!("{} other occurrence(s) of this series kept", remaining);
            println!("{}", note.dimmed());
        }
    }

    Ok(())
}
