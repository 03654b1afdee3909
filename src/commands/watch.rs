use std::path::PathBuf;

use anyhow::Result;
use datebook_core::config::EngineConfig;
use datebook_core::notify::SystemClock;
use datebook_core::notify::scheduler::ReminderScheduler;
use owo_colors::OwoColorize;
use tracing::info;

use crate::render::Render;
use crate::store::StoreFileSource;

/// Print reminders as they come due until Ctrl-C.
pub async fn run(store_path: PathBuf, config: &EngineConfig) -> Result<()> {
    let source = StoreFileSource::new(store_path.clone());
    let mut scheduler = ReminderScheduler::new(source, SystemClock, config.tick_interval);
    let mut reminders = scheduler.start()?;

    let watching = format!("Watching {} for reminders (Ctrl-C to stop)", store_path.display());
    println!("{}", watching.dimmed());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            reminder = reminders.recv() => match reminder {
                Some(reminder) => println!("{}", reminder.render()),
                None => break,
            },
            _ = &mut ctrl_c => break,
        }
    }

    let fired = scheduler.stop().await?;
    info!(fired = fired.len(), "stopped watching");

    Ok(())
}
