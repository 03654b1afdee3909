pub mod add;
pub mod delete;
pub mod edit;
pub mod list;
pub mod preview;
pub mod watch;

use anyhow::Result;
use clap::Args;
use datebook_core::config::EngineConfig;
use datebook_core::event::{Event, Frequency, Repeat, RepeatRule, parse_date, parse_time};

/// Fields of a new event.
#[derive(Args, Debug)]
pub struct EventArgs {
    #[arg(short, long)]
    pub title: String,

    /// Date (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: String,

    /// Start time (HH:MM)
    #[arg(short, long)]
    pub start: String,

    /// End time (HH:MM)
    #[arg(short, long)]
    pub end: String,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long, default_value = "")]
    pub location: String,

    #[arg(long, default_value = "")]
    pub category: String,

    /// Reminder lead time in minutes (defaults to the configured value)
    #[arg(long)]
    pub notify: Option<u32>,
}

/// Recurrence of a new event.
#[derive(Args, Debug)]
pub struct RepeatArgs {
    /// daily, weekly, monthly or yearly
    #[arg(short, long)]
    pub repeat: Option<String>,

    /// Step between occurrences, in the repeat unit
    #[arg(short, long, default_value_t = 1)]
    pub interval: u32,

    /// Last date an occurrence may fall on (YYYY-MM-DD)
    #[arg(short, long)]
    pub until: Option<String>,
}

/// Build the base event a create command submits to the engine.
pub fn build_event(
    id: String,
    event: &EventArgs,
    repeat: &RepeatArgs,
    config: &EngineConfig,
) -> Result<Event> {
    let mut base = Event::new(
        event.title.clone(),
        parse_date(&event.date)?,
        parse_time(&event.start)?,
        parse_time(&event.end)?,
    )
    .with_id(id)
    .with_repeat(build_repeat(repeat)?)
    .with_notification_time(event.notify.unwrap_or(config.default_notification_minutes));

    base.description = event.description.clone();
    base.location = event.location.clone();
    base.category = event.category.clone();

    if base.start_time >= base.end_time {
        anyhow::bail!(
            "End time {} must be after start time {}",
            event.end,
            event.start
        );
    }

    Ok(base)
}

fn build_repeat(args: &RepeatArgs) -> Result<Repeat> {
    let Some(kind) = args.repeat.as_deref() else {
        if args.until.is_some() {
            anyhow::bail!("--until needs --repeat");
        }
        return Ok(Repeat::None);
    };

    let frequency: Frequency = kind.parse()?;
    let mut rule = RepeatRule::every(args.interval);
    if let Some(until) = args.until.as_deref() {
        rule = rule.until(parse_date(until)?);
    }

    Ok(Repeat::new(frequency, rule))
}
