//! Calendar event types.
//!
//! An [`Event`] is one dated occurrence. Recurring series are stored as
//! independent occurrences linked only by the group id on their [`Repeat`]
//! rule; there is no master record.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_NOTIFICATION_MINUTES;
use crate::error::{EngineError, EngineResult};

/// A calendar event occurrence.
///
/// Field names on the wire are camelCase; `date` is `YYYY-MM-DD` and both
/// times are `HH:MM`. This is the schema the persistence layer stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub repeat: Repeat,
    /// Minutes before `start_time` at which the reminder fires.
    #[serde(default)]
    pub notification_time: u32,
}

impl Event {
    /// A non-recurring event with no id yet. The store assigns ids.
    pub fn new(
        title: impl Into<String>,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Event {
            id: String::new(),
            title: title.into(),
            date,
            start_time,
            end_time,
            description: String::new(),
            location: String::new(),
            category: String::new(),
            repeat: Repeat::None,
            notification_time: DEFAULT_NOTIFICATION_MINUTES,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_notification_time(mut self, minutes: u32) -> Self {
        self.notification_time = minutes;
        self
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    pub fn ends_at(&self) -> NaiveDateTime {
        self.date.and_time(self.end_time)
    }

    pub fn is_recurring(&self) -> bool {
        !self.repeat.is_none()
    }

    /// Human-readable label used in overlap warnings, e.g.
    /// `Team sync (2025-10-15 09:00-10:00)`.
    pub fn conflict_label(&self) -> String {
        format!(
            "{} ({} {}-{})",
            self.title,
            self.date.format("%Y-%m-%d"),
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

/// Unit a recurrence rule steps in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(EngineError::InvalidRule(format!(
                "unknown repeat type '{other}' (expected daily, weekly, monthly or yearly)"
            ))),
        }
    }
}

/// Parameters shared by every recurring variant of [`Repeat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatRule {
    /// Step count in the rule's unit. Must be at least 1.
    pub interval: u32,
    /// Last date (inclusive) an instance may fall on.
    pub end_date: Option<NaiveDate>,
    /// Token shared by all instances of one expansion.
    pub group_id: Option<String>,
}

impl RepeatRule {
    pub fn every(interval: u32) -> Self {
        RepeatRule {
            interval,
            end_date: None,
            group_id: None,
        }
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }
}

/// Recurrence rule of an event.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RepeatWire", into = "RepeatWire")]
pub enum Repeat {
    #[default]
    None,
    Daily(RepeatRule),
    Weekly(RepeatRule),
    Monthly(RepeatRule),
    Yearly(RepeatRule),
}

impl Repeat {
    pub fn new(frequency: Frequency, rule: RepeatRule) -> Self {
        match frequency {
            Frequency::Daily => Repeat::Daily(rule),
            Frequency::Weekly => Repeat::Weekly(rule),
            Frequency::Monthly => Repeat::Monthly(rule),
            Frequency::Yearly => Repeat::Yearly(rule),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Repeat::None)
    }

    pub fn frequency(&self) -> Option<Frequency> {
        match self {
            Repeat::None => None,
            Repeat::Daily(_) => Some(Frequency::Daily),
            Repeat::Weekly(_) => Some(Frequency::Weekly),
            Repeat::Monthly(_) => Some(Frequency::Monthly),
            Repeat::Yearly(_) => Some(Frequency::Yearly),
        }
    }

    pub fn rule(&self) -> Option<&RepeatRule> {
        match self {
            Repeat::None => None,
            Repeat::Daily(rule)
            | Repeat::Weekly(rule)
            | Repeat::Monthly(rule)
            | Repeat::Yearly(rule) => Some(rule),
        }
    }

    pub fn rule_mut(&mut self) -> Option<&mut RepeatRule> {
        match self {
            Repeat::None => None,
            Repeat::Daily(rule)
            | Repeat::Weekly(rule)
            | Repeat::Monthly(rule)
            | Repeat::Yearly(rule) => Some(rule),
        }
    }

    pub fn group_id(&self) -> Option<&str> {
        self.rule().and_then(|rule| rule.group_id.as_deref())
    }
}

// =============================================================================
// Wire representation
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RepeatType {
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// `{ "type": ..., "interval": n, "endDate"?: ..., "groupId"?: ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepeatWire {
    #[serde(rename = "type")]
    kind: RepeatType,
    #[serde(default)]
    interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group_id: Option<String>,
}

impl From<RepeatWire> for Repeat {
    fn from(wire: RepeatWire) -> Self {
        let rule = RepeatRule {
            interval: wire.interval,
            end_date: wire.end_date,
            group_id: wire.group_id,
        };
        match wire.kind {
            RepeatType::None => Repeat::None,
            RepeatType::Daily => Repeat::Daily(rule),
            RepeatType::Weekly => Repeat::Weekly(rule),
            RepeatType::Monthly => Repeat::Monthly(rule),
            RepeatType::Yearly => Repeat::Yearly(rule),
        }
    }
}

impl From<Repeat> for RepeatWire {
    fn from(repeat: Repeat) -> Self {
        let kind = match repeat.frequency() {
            None => RepeatType::None,
            Some(Frequency::Daily) => RepeatType::Daily,
            Some(Frequency::Weekly) => RepeatType::Weekly,
            Some(Frequency::Monthly) => RepeatType::Monthly,
            Some(Frequency::Yearly) => RepeatType::Yearly,
        };
        match repeat {
            Repeat::None => RepeatWire {
                kind,
                interval: 0,
                end_date: None,
                group_id: None,
            },
            Repeat::Daily(rule)
            | Repeat::Weekly(rule)
            | Repeat::Monthly(rule)
            | Repeat::Yearly(rule) => RepeatWire {
                kind,
                interval: rule.interval,
                end_date: rule.end_date,
                group_id: rule.group_id,
            },
        }
    }
}

/// Serde adapter for `HH:MM` times.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_time(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| EngineError::InvalidDate(s.to_string()))
}

/// Parse an `HH:MM` time. `HH:MM:SS` is also read, with the seconds
/// dropped, since times are stored at minute precision.
pub fn parse_time(s: &str) -> EngineResult<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
        .and_then(|t| NaiveTime::from_hms_opt(t.hour(), t.minute(), 0))
        .ok_or_else(|| EngineError::InvalidTime(s.to_string()))
}

// =============================================================================
// Tests
// =============================================================================
