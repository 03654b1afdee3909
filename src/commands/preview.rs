use std::path::Path;

use anyhow::Result;
use datebook_core::config::EngineConfig;
use datebook_core::overlap::{self, OverlapWarning};
use datebook_core::recurrence;
use datebook_core::store::EventStore;
use owo_colors::OwoColorize;

use super::{EventArgs, RepeatArgs, build_event};
use crate::render::Render;
use crate::store::JsonStore;

/// Show the occurrences an `add` would create, without saving anything.
pub fn run(
    store_path: &Path,
    config: &EngineConfig,
    event: EventArgs,
    repeat: RepeatArgs,
) -> Result<()> {
    let store = JsonStore::load(store_path)?;
    let base = build_event(store.next_id(), &event, &repeat, config)?;
    let instances = recurrence::expand(&base, &config.expand_options())?;

    if instances.is_empty() {
        println!("{}", "No occurrences".dimmed());
        return Ok(());
    }

    for instance in &instances {
        println!("{} {}", instance.date.format("%a %Y-%m-%d"), instance.render());
    }
    println!("{}", format!("{} occurrence(s)", instances.len()).dimmed());

    if let Some(warning) = OverlapWarning::new(overlap::series_conflicts(&instances, store.events()))
    {
        println!();
        println!("{}", warning.render());
    }

    Ok(())
}
