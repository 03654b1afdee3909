//! Core engine for datebook.
//!
//! - `recurrence`: expands a repeating event into dated instances
//! - `overlap`: finds time conflicts between events
//! - `series`: group-id rules for creating, editing and deleting occurrences
//! - `notify`: decides which reminders are due and drives the reminder loop
//!
//! Nothing here persists or renders; callers own storage and presentation.

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod notify;
pub mod overlap;
pub mod recurrence;
pub mod series;
pub mod store;

pub use error::{EngineError, EngineResult};
pub use event::{Event, Frequency, Repeat, RepeatRule};
