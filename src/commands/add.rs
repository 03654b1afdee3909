use std::path::Path;

use anyhow::Result;
use datebook_core::config::EngineConfig;
use datebook_core::overlap::{self, OverlapWarning};
use datebook_core::series::{SeriesMutator, UuidGroupIds};
use datebook_core::store::EventStore;

use super::{EventArgs, RepeatArgs, build_event};
use crate::render::Render;
use crate::store::JsonStore;

pub fn run(
    store_path: &Path,
    config: &EngineConfig,
    event: EventArgs,
    repeat: RepeatArgs,
    strict: bool,
) -> Result<()> {
    let mut store = JsonStore::load(store_path)?;
    let base = build_event(store.next_id(), &event, &repeat, config)?;

    let mutator = SeriesMutator::with_options(UuidGroupIds, config.expand_options());
    let instances = mutator.create_series(&base)?;

    if instances.is_empty() {
        anyhow::bail!(
            "No occurrences of '{}' fall on or before the end date",
            base.title
        );
    }

    if let Some(warning) = OverlapWarning::new(overlap::series_conflicts(&instances, store.events()))
    {
        println!("{}", warning.render());
        if strict {
            anyhow::bail!("Not saved: the new event overlaps existing events");
        }
    }

    let count = instances.len();
    let first = instances[0].date;
    let last = instances[count - 1].date;
    for instance in instances {
        store.insert(instance);
    }
    store.save()?;

    if base.is_recurring() {
        println!(
            "Created {} occurrences of '{}' from {} to {}",
            count, base.title, first, last
        );
    } else {
        println!("Created '{}' on {}", base.title, first);
    }

    Ok(())
}
