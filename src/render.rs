//! Terminal rendering for engine types.

use datebook_core::event::Event;
use datebook_core::notify::Reminder;
use datebook_core::overlap::OverlapWarning;
use owo_colors::OwoColorize;

/// Extension trait for coloured terminal output.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Event {
    fn render(&self) -> String {
        let time = format!(
            "{}-{}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        );
        let repeat = match self.repeat.frequency() {
            Some(frequency) => format!(" ↻ {frequency}"),
            None => String::new(),
        };
        let id = format!("[{}]", self.id);

        format!(
            "  {} {}{} {}",
            time,
            self.title,
            repeat.cyan(),
            id.dimmed()
        )
    }
}

impl Render for OverlapWarning<'_> {
    fn render(&self) -> String {
        let mut lines = vec![format!("{}", "Overlap warning".yellow().bold())];
        lines.push("Overlaps with the following events:".to_string());
        for label in self.labels() {
            lines.push(format!("  {}", label));
        }
        lines.join("\n")
    }
}

impl Render for Reminder {
    fn render(&self) -> String {
        format!("{} {}", "⏰".bold(), self.message())
    }
}
