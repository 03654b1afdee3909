//! Series lifecycle: creating, editing and deleting occurrences.
//!
//! A series is a set of independent records linked only by the group id on
//! their repeat rule. Editing an occurrence detaches it from the group;
//! deleting an occurrence removes that record alone. Nothing here cascades
//! across a group.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::event::{Event, Repeat};
use crate::recurrence::{ExpandOptions, expand};
use crate::store::EventStore;

/// Source of group tokens for new series.
pub trait GroupIdGenerator {
    fn next_group_id(&self) -> String;
}

/// Random v4 UUID group ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGroupIds;

impl GroupIdGenerator for UuidGroupIds {
    fn next_group_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// `{prefix}-1`, `{prefix}-2`, ... Deterministic, for tests and fixtures.
#[derive(Debug)]
pub struct SequentialGroupIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialGroupIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        SequentialGroupIds {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl GroupIdGenerator for SequentialGroupIds {
    fn next_group_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}

/// Applies the series rules on top of the expander.
#[derive(Debug)]
pub struct SeriesMutator<G> {
    ids: G,
    options: ExpandOptions,
}

impl<G: GroupIdGenerator> SeriesMutator<G> {
    pub fn new(ids: G) -> Self {
        Self::with_options(ids, ExpandOptions::default())
    }

    pub fn with_options(ids: G, options: ExpandOptions) -> Self {
        SeriesMutator { ids, options }
    }

    pub fn options(&self) -> &ExpandOptions {
        &self.options
    }

    /// Expand `base` and stamp every instance with one fresh group id.
    ///
    /// A non-recurring base comes back alone and untagged.
    pub fn create_series(&self, base: &Event) -> EngineResult<Vec<Event>> {
        let mut instances = expand(base, &self.options)?;
        if base.repeat.is_none() {
            return Ok(instances);
        }

        let group_id = self.ids.next_group_id();
        for instance in &mut instances {
            if let Some(rule) = instance.repeat.rule_mut() {
                rule.group_id = Some(group_id.clone());
            }
        }

        debug!(
            base_id = %base.id,
            %group_id,
            instances = instances.len(),
            "created series"
        );

        Ok(instances)
    }

    /// Store an edit of a single occurrence.
    ///
    /// The edited record is detached before it replaces the stored record
    /// with the same id; its siblings are left as they are.
    pub fn apply_edit<S: EventStore>(&self, edited: Event, store: &mut S) -> EngineResult<Event> {
        let detached = detach(&edited);
        let previous = store
            .replace(detached.clone())
            .ok_or_else(|| EngineError::EventNotFound(edited.id.clone()))?;

        debug!(
            event_id = %detached.id,
            left_group = previous.repeat.group_id().unwrap_or("-"),
            "edited occurrence"
        );

        Ok(detached)
    }
}

/// Copy of `instance` as a standalone, non-recurring event.
///
/// Applies to every single-occurrence edit, timing-related or not.
pub fn detach(instance: &Event) -> Event {
    Event {
        repeat: Repeat::None,
        ..instance.clone()
    }
}

/// Remove exactly one occurrence. Siblings sharing its group id stay.
pub fn remove_one<S: EventStore>(instance_id: &str, store: &mut S) -> Option<Event> {
    let removed = store.remove(instance_id);
    if let Some(event) = &removed {
        debug!(
            event_id = %event.id,
            group = event.repeat.group_id().unwrap_or("-"),
            "removed occurrence"
        );
    }
    removed
}

/// Occurrences still linked to `group_id`, in input order.
pub fn siblings<'a>(group_id: &str, events: &'a [Event]) -> Vec<&'a Event> {
    events
        .iter()
        .filter(|e| e.repeat.group_id() == Some(group_id))
        .collect()
}
