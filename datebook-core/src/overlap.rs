//! Time-overlap detection between events.
//!
//! Events are compared as half-open `[start, end)` ranges on the same date,
//! so an event ending at 10:00 and one starting at 10:00 do not overlap.
//! Results are advisory; callers decide whether a conflict blocks a save.

use std::collections::HashSet;
use std::fmt;

use crate::event::Event;

/// Whether two events share a date and their time ranges intersect.
/// Ids are not consulted.
pub fn overlaps(a: &Event, b: &Event) -> bool {
    a.date == b.date && a.start_time < b.end_time && b.start_time < a.end_time
}

/// Every event in `existing` that overlaps `candidate`, in `existing` order.
///
/// Events with the candidate's own id are skipped so an edit is never
/// reported as conflicting with its stored previous version.
pub fn conflicts<'a>(candidate: &Event, existing: &'a [Event]) -> Vec<&'a Event> {
    existing
        .iter()
        .filter(|other| other.id != candidate.id && overlaps(candidate, other))
        .collect()
}

/// Conflicts of a whole freshly expanded series against stored events.
///
/// Each stored event appears once, in `existing` order, however many
/// instances it collides with.
pub fn series_conflicts<'a>(instances: &[Event], existing: &'a [Event]) -> Vec<&'a Event> {
    let own_ids: HashSet<&str> = instances.iter().map(|e| e.id.as_str()).collect();

    existing
        .iter()
        .filter(|other| !own_ids.contains(other.id.as_str()))
        .filter(|other| instances.iter().any(|instance| overlaps(instance, other)))
        .collect()
}

/// The conflict list shown to the user before a save.
#[derive(Debug, Clone)]
pub struct OverlapWarning<'a> {
    pub conflicts: Vec<&'a Event>,
}

impl<'a> OverlapWarning<'a> {
    /// `None` when there is nothing to warn about.
    pub fn new(conflicts: Vec<&'a Event>) -> Option<Self> {
        if conflicts.is_empty() {
            None
        } else {
            Some(OverlapWarning { conflicts })
        }
    }

    pub fn labels(&self) -> Vec<String> {
        self.conflicts.iter().map(|e| e.conflict_label()).collect()
    }
}

impl fmt::Display for OverlapWarning<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Overlaps with the following events:")?;
        for label in self.labels() {
            write!(f, "\n{label}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn event(id: &str, day: u32, start: (u32, u32), end: (u32, u32)) -> Event {
        Event::new(
            format!("Event {id}"),
            NaiveDate::from_ymd_opt(2025, 10, day).unwrap(),
            NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        )
        .with_id(id)
    }

    #[test]
    fn test_partial_overlap_conflicts() {
        let a = event("a", 15, (9, 0), (10, 0));
        let b = event("b", 15, (9, 30), (10, 30));
        let existing = vec![a];
        let found = conflicts(&b, &existing);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "a");
    }

    #[test]
    fn test_back_to_back_does_not_conflict() {
        let a = event("a", 15, (9, 0), (10, 0));
        let b = event("b", 15, (10, 0), (11, 0));
        assert!(conflicts(&b, std::slice::from_ref(&a)).is_empty());
        assert!(conflicts(&a, std::slice::from_ref(&b)).is_empty());
    }

    #[test]
    fn test_containment_conflicts() {
        let outer = event("outer", 15, (8, 30), (10, 30));
        let inner = event("inner", 15, (9, 0), (10, 0));
        assert!(overlaps(&outer, &inner));
        assert!(overlaps(&inner, &outer));
    }

    #[test]
    fn test_different_dates_do_not_conflict() {
        let a = event("a", 15, (9, 0), (10, 0));
        let b = event("b", 16, (9, 0), (10, 0));
        assert!(conflicts(&b, &[a]).is_empty());
    }

    #[test]
    fn test_edit_excludes_own_stored_version() {
        let stored = event("1", 15, (9, 0), (10, 0));
        let other = event("2", 15, (11, 0), (12, 0));
        let existing = vec![stored, other];

        // Event 2 moved onto event 1's slot.
        let edited = event("2", 15, (8, 30), (10, 30));
        let found = conflicts(&edited, &existing);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");
    }

    #[test]
    fn test_returns_all_conflicts_in_input_order() {
        let existing = vec![
            event("c", 15, (11, 0), (12, 0)),
            event("a", 15, (9, 0), (10, 0)),
            event("x", 15, (13, 0), (14, 0)),
            event("b", 15, (10, 0), (11, 0)),
        ];
        let candidate = event("new", 15, (9, 30), (11, 30));
        let ids: Vec<_> = conflicts(&candidate, &existing)
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_series_conflicts_deduplicates() {
        let existing = vec![
            event("s", 15, (9, 0), (10, 0)),
            event("t", 17, (9, 0), (10, 0)),
            event("u", 20, (9, 0), (10, 0)),
        ];
        let instances = vec![
            event("1-1", 15, (9, 30), (10, 30)),
            event("1-2", 16, (9, 30), (10, 30)),
            event("1-3", 17, (9, 30), (10, 30)),
        ];
        let ids: Vec<_> = series_conflicts(&instances, &existing)
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["s", "t"]);
    }

    #[test]
    fn test_series_instances_do_not_conflict_with_each_other() {
        let instances = vec![
            event("1-1", 15, (9, 0), (10, 0)),
            event("1-2", 15, (9, 30), (10, 30)),
            event("1-3", 16, (9, 0), (10, 0)),
        ];
        let mut existing = instances.clone();
        existing.push(event("other", 16, (9, 45), (11, 0)));

        let ids: Vec<_> = series_conflicts(&instances, &existing)
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["other"]);
    }

    #[test]
    fn test_warning_text() {
        let mut existing = event("1", 15, (9, 0), (10, 0));
        existing.title = "Planning".to_string();
        let existing = vec![existing];
        let candidate = event("2", 15, (9, 30), (10, 30));

        let warning = OverlapWarning::new(conflicts(&candidate, &existing)).unwrap();
        assert_eq!(
            warning.to_string(),
            "Overlaps with the following events:\nPlanning (2025-10-15 09:00-10:00)"
        );
        assert!(OverlapWarning::new(Vec::new()).is_none());
    }
}
