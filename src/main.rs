mod commands;
mod render;
mod store;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use datebook_core::config::EngineConfig;
use tracing_subscriber::EnvFilter;

use commands::edit::EditArgs;
use commands::{EventArgs, RepeatArgs};
use store::JsonStore;

#[derive(Parser)]
#[command(name = "datebook")]
#[command(about = "Recurring events, overlap warnings and reminders from the terminal")]
struct Cli {
    /// Event store file (defaults to <data dir>/datebook/events.json)
    #[arg(long, global = true, env = "DATEBOOK_STORE")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an event, expanding it into occurrences if it repeats
    Add {
        #[command(flatten)]
        event: EventArgs,

        #[command(flatten)]
        repeat: RepeatArgs,

        /// Refuse to save when the event overlaps existing events
        #[arg(long)]
        strict: bool,
    },
    /// Show the occurrences an add would create, without saving
    Preview {
        #[command(flatten)]
        event: EventArgs,

        #[command(flatten)]
        repeat: RepeatArgs,
    },
    /// List stored events by date
    List {
        /// Show events from this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Show events until this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Edit one occurrence (detaches it from its series)
    Edit {
        id: String,

        #[command(flatten)]
        changes: EditArgs,

        /// Refuse to save when the edit overlaps existing events
        #[arg(long)]
        strict: bool,
    },
    /// Delete one occurrence
    Delete { id: String },
    /// Print reminders as they come due
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = EngineConfig::load()?;
    let store_path = match cli.store {
        Some(path) => path,
        None => JsonStore::default_path()?,
    };

    match cli.command {
        Commands::Add {
            event,
            repeat,
            strict,
        } => commands::add::run(&store_path, &config, event, repeat, strict),
        Commands::Preview { event, repeat } => {
            commands::preview::run(&store_path, &config, event, repeat)
        }
        Commands::List { from, to } => {
            commands::list::run(&store_path, from.as_deref(), to.as_deref())
        }
        Commands::Edit {
            id,
            changes,
            strict,
        } => commands::edit::run(&store_path, &config, &id, changes, strict),
        Commands::Delete { id } => commands::delete::run(&store_path, &id),
        Commands::Watch => commands::watch::run(store_path, &config).await,
    }
}

/// Log to stderr, filtered by RUST_LOG (default: info from datebook crates).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("datebook=info,datebook_core=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
