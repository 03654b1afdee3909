use std::path::Path;

use anyhow::Result;
use datebook_core::event::{Event, parse_date};
use datebook_core::store::EventStore;
use owo_colors::OwoColorize;

use crate::render::Render;
use crate::store::JsonStore;

pub fn run(store_path: &Path, from: Option<&str>, to: Option<&str>) -> Result<()> {
    let store = JsonStore::load(store_path)?;
    let from = from.map(parse_date).transpose()?;
    let to = to.map(parse_date).transpose()?;

    let mut events: Vec<&Event> = store
        .events()
        .iter()
        .filter(|e| from.is_none_or(|from| e.date >= from))
        .filter(|e| to.is_none_or(|to| e.date <= to))
        .collect();
    events.sort_by_key(|e| (e.date, e.start_time));

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    // Group events by day
    let mut current_date = None;
    for event in events {
        if current_date != Some(event.date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", event.date.format("%a %Y-%m-%d").bold());
            current_date = Some(event.date);
        }
        println!("{}", event.render());
    }

    Ok(())
}
