//! Reminder firing.
//!
//! [`tick`] is the pure decision step: given the current time, the event set
//! and the ids that already fired, it returns what is due now together with
//! the updated fired set. The caller owns that set and threads it from one
//! tick to the next; [`scheduler::ReminderScheduler`] is the periodic driver
//! that does so.
//!
//! An event is due while `start - notification_time <= now < start`. A lead
//! time of 0 makes that window empty, so such events never fire.

pub mod scheduler;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Duration, Local, NaiveDateTime};

use crate::event::Event;

/// Ids of the occurrences that already fired, with the start of each.
///
/// The start is kept so the set can be pruned by time alone: once an event
/// has started its window is closed, whether or not it is still in the
/// current event set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiredSet(HashMap<String, NaiveDateTime>);

impl FiredSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    /// Record that `event` fired. Returns false if its id was already there.
    pub fn insert(&mut self, event: &Event) -> bool {
        self.0.insert(event.id.clone(), event.starts_at()).is_none()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drop ids whose event started at or before `now`.
    ///
    /// Ids missing from a snapshot are kept until then, so an event that
    /// briefly disappears from the store cannot fire a second time.
    pub fn prune_started(&mut self, now: NaiveDateTime) {
        self.0.retain(|_, starts_at| *starts_at > now);
    }
}

/// Outcome of one tick.
#[derive(Debug, Clone)]
pub struct Tick<'a> {
    /// Events due now, in input order.
    pub due: Vec<&'a Event>,
    /// The fired set after this tick.
    pub fired: FiredSet,
}

/// Start of the reminder window for `event`.
pub fn reminder_at(event: &Event) -> NaiveDateTime {
    event.starts_at() - Duration::minutes(i64::from(event.notification_time))
}

/// Whether `event` is inside its reminder window at `now`, ignoring whether
/// it already fired.
pub fn in_window(event: &Event, now: NaiveDateTime) -> bool {
    now >= reminder_at(event) && now < event.starts_at()
}

/// Decide which reminders are due at `now`.
pub fn tick<'a>(now: NaiveDateTime, events: &'a [Event], fired: &FiredSet) -> Tick<'a> {
    let mut next = fired.clone();
    let mut due = Vec::new();

    for event in events {
        if in_window(event, now) && !next.contains(&event.id) {
            next.insert(event);
            due.push(event);
        }
    }

    Tick { due, fired: next }
}

/// A reminder ready for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub event_id: String,
    pub title: String,
    pub minutes_before: u32,
    pub starts_at: NaiveDateTime,
}

impl Reminder {
    pub fn for_event(event: &Event) -> Self {
        Reminder {
            event_id: event.id.clone(),
            title: event.title.clone(),
            minutes_before: event.notification_time,
            starts_at: event.starts_at(),
        }
    }

    /// e.g. `10 minutes until "Team sync" starts`
    pub fn message(&self) -> String {
        let unit = if self.minutes_before == 1 {
            "minute"
        } else {
            "minutes"
        };
        format!(
            "{} {} until \"{}\" starts",
            self.minutes_before, unit, self.title
        )
    }
}

/// Wall-clock source for the reminder loop.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall time. Events carry no time zone, so they are read as local.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct FixedClock(Arc<Mutex<NaiveDateTime>>);

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        FixedClock(Arc::new(Mutex::new(now)))
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Supplies the current event set at each tick.
pub trait EventSource: Send + Sync + 'static {
    fn snapshot(&self) -> Vec<Event>;
}

impl<F> EventSource for F
where
    F: Fn() -> Vec<Event> + Send + Sync + 'static,
{
    fn snapshot(&self) -> Vec<Event> {
        self()
    }
}
