//! Event store seam.
//!
//! The engine never persists anything itself. Whatever owns the events (an
//! HTTP backend, a JSON file, a test vector) implements [`EventStore`] so the
//! series operations can act on it one record at a time.

use crate::event::Event;

/// On a concrete `Vec<Event>` the inherent `Vec::insert`/`Vec::remove` win
/// method resolution; call these as `EventStore::remove(&mut store, id)`.
pub trait EventStore {
    /// All stored events, in storage order.
    fn events(&self) -> &[Event];

    fn insert(&mut self, event: Event);

    /// Replace the record with `event.id`. Returns the previous record, or
    /// `None` (and stores nothing) if no record has that id.
    fn replace(&mut self, event: Event) -> Option<Event>;

    /// Remove the record with `id`, returning it.
    fn remove(&mut self, id: &str) -> Option<Event>;

    fn get(&self, id: &str) -> Option<&Event> {
        self.events().iter().find(|e| e.id == id)
    }
}

impl EventStore for Vec<Event> {
    fn events(&self) -> &[Event] {
        self
    }

    fn insert(&mut self, event: Event) {
        self.push(event);
    }

    fn replace(&mut self, event: Event) -> Option<Event> {
        let slot = self.iter_mut().find(|e| e.id == event.id)?;
        Some(std::mem::replace(slot, event))
    }

    fn remove(&mut self, id: &str) -> Option<Event> {
        let index = self.iter().position(|e| e.id == id)?;
        Some(Vec::remove(self, index))
    }
}
