//! Recurrence expansion.
//!
//! Expands a base event into concrete dated instances. Each candidate date is
//! recomputed from the anchor (`anchor + k * interval` units) rather than
//! stepped from the previous candidate, so month-end clamping never compounds:
//! a rule anchored on the 31st keeps landing on the 31st after a short month.
//!
//! Two anchors are calendar edge cases and skip the dates they cannot hit:
//! - monthly on day 31 only produces months that have a 31st
//! - yearly on Feb 29 only produces leap years
//!
//! Skipped dates do not consume a sequence number.

use chrono::{Datelike, Days, Months, NaiveDate};
use tracing::{debug, warn};

use crate::constants::{DEFAULT_HORIZON_YEARS, DEFAULT_MAX_INSTANCES};
use crate::error::{EngineError, EngineResult};
use crate::event::{Event, Frequency};

/// Bounds applied to a single expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Cutoff, in years past the anchor, for rules without an end date.
    pub horizon_years: u32,
    /// Producing more instances than this is an error, not a truncation.
    pub max_instances: usize,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        ExpandOptions {
            horizon_years: DEFAULT_HORIZON_YEARS,
            max_instances: DEFAULT_MAX_INSTANCES,
        }
    }
}

/// Expand `base` into its instances.
///
/// A non-recurring event comes back unchanged as the only element. Otherwise
/// every instance is a copy of `base` with its `date` replaced and the id
/// `{base.id}-{n}`, `n` counting emitted instances from 1.
///
/// Errors with `InvalidRule` for an interval of 0 and `ExpansionTooLarge`
/// when the rule would produce more than `options.max_instances` instances.
pub fn expand(base: &Event, options: &ExpandOptions) -> EngineResult<Vec<Event>> {
    let (frequency, rule) = match (base.repeat.frequency(), base.repeat.rule()) {
        (Some(frequency), Some(rule)) => (frequency, rule),
        _ => return Ok(vec![base.clone()]),
    };

    if rule.interval == 0 {
        return Err(EngineError::InvalidRule(format!(
            "{frequency} rule on event '{}' has interval 0; interval must be at least 1",
            base.id
        )));
    }

    let anchor = base.date;
    let end = match rule.end_date {
        Some(end_date) => end_date,
        None => horizon_end(anchor, options.horizon_years),
    };
    let skip = SkipRule::for_anchor(frequency, anchor);

    let mut instances = Vec::new();
    let mut skipped = 0usize;

    for step in 0u64.. {
        let Some(pointer) = step_from_anchor(anchor, frequency, rule.interval, step) else {
            break;
        };
        if pointer > end {
            break;
        }
        if skip.skips(pointer) {
            skipped += 1;
            continue;
        }
        if instances.len() == options.max_instances {
            warn!(
                event_id = %base.id,
                %frequency,
                limit = options.max_instances,
                "recurrence expansion exceeded instance limit"
            );
            return Err(EngineError::ExpansionTooLarge {
                limit: options.max_instances,
            });
        }

        let mut instance = base.clone();
        instance.id = format!("{}-{}", base.id, instances.len() + 1);
        instance.date = pointer;
        instances.push(instance);
    }

    debug!(
        event_id = %base.id,
        %frequency,
        interval = rule.interval,
        %anchor,
        %end,
        emitted = instances.len(),
        skipped,
        "expanded recurrence"
    );

    Ok(instances)
}

/// Gregorian leap year test.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Date of step `step` of a rule, computed from the anchor.
/// Returns `None` once the date leaves chrono's representable range.
fn step_from_anchor(
    anchor: NaiveDate,
    frequency: Frequency,
    interval: u32,
    step: u64,
) -> Option<NaiveDate> {
    let units = u64::from(interval).checked_mul(step)?;
    match frequency {
        Frequency::Daily => anchor.checked_add_days(Days::new(units)),
        Frequency::Weekly => anchor.checked_add_days(Days::new(units.checked_mul(7)?)),
        Frequency::Monthly => anchor.checked_add_months(Months::new(u32::try_from(units).ok()?)),
        Frequency::Yearly => {
            let months = units.checked_mul(12)?;
            anchor.checked_add_months(Months::new(u32::try_from(months).ok()?))
        }
    }
}

fn horizon_end(anchor: NaiveDate, years: u32) -> NaiveDate {
    years
        .checked_mul(12)
        .and_then(|months| anchor.checked_add_months(Months::new(months)))
        .unwrap_or(NaiveDate::MAX)
}

/// Which candidate dates an anchor cannot legitimately land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipRule {
    Never,
    /// Monthly rule anchored on the 31st.
    MissingDay31,
    /// Yearly rule anchored on Feb 29.
    MissingLeapDay,
}

impl SkipRule {
    fn for_anchor(frequency: Frequency, anchor: NaiveDate) -> Self {
        match frequency {
            Frequency::Monthly if anchor.day() == 31 => SkipRule::MissingDay31,
            Frequency::Yearly if anchor.month() == 2 && anchor.day() == 29 => {
                SkipRule::MissingLeapDay
            }
            _ => SkipRule::Never,
        }
    }

    fn skips(&self, pointer: NaiveDate) -> bool {
        match self {
            SkipRule::Never => false,
            SkipRule::MissingDay31 => pointer.day() != 31,
            SkipRule::MissingLeapDay => {
                !is_leap_year(pointer.year()) || pointer.month() != 2 || pointer.day() != 29
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Repeat, RepeatRule};
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn base_event(anchor: NaiveDate, repeat: Repeat) -> Event {
        Event::new(
            "Recurring",
            anchor,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        )
        .with_id("1")
        .with_repeat(repeat)
    }

    fn dates(instances: &[Event]) -> Vec<NaiveDate> {
        instances.iter().map(|e| e.date).collect()
    }

    #[test]
    fn test_none_rule_yields_base_unchanged() {
        let base = base_event(date(2025, 10, 15), Repeat::None);
        let instances = expand(&base, &ExpandOptions::default()).unwrap();
        assert_eq!(instances, vec![base]);
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let base = base_event(date(2025, 10, 15), Repeat::Daily(RepeatRule::every(0)));
        let result = expand(&base, &ExpandOptions::default());
        assert!(matches!(result, Err(EngineError::InvalidRule(_))));
    }

    #[test]
    fn test_daily_until_end_date_inclusive() {
        let base = base_event(
            date(2025, 10, 1),
            Repeat::Daily(RepeatRule::every(1).until(date(2025, 10, 5))),
        );
        let instances = expand(&base, &ExpandOptions::default()).unwrap();
        assert_eq!(
            dates(&instances),
            vec![
                date(2025, 10, 1),
                date(2025, 10, 2),
                date(2025, 10, 3),
                date(2025, 10, 4),
                date(2025, 10, 5),
            ]
        );
        let ids: Vec<_> = instances.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1-1", "1-2", "1-3", "1-4", "1-5"]);
    }

    #[test]
    fn test_weekly_stops_at_end_date() {
        let base = base_event(
            date(2025, 10, 27),
            Repeat::Weekly(RepeatRule::every(1).until(date(2025, 10, 30))),
        );
        let instances = expand(&base, &ExpandOptions::default()).unwrap();
        assert_eq!(dates(&instances), vec![date(2025, 10, 27)]);
        assert!(instances.iter().all(|e| e.date < date(2025, 11, 3)));
    }

    #[test]
    fn test_weekly_interval_two() {
        let base = base_event(
            date(2025, 10, 6),
            Repeat::Weekly(RepeatRule::every(2).until(date(2025, 11, 17))),
        );
        let instances = expand(&base, &ExpandOptions::default()).unwrap();
        assert_eq!(
            dates(&instances),
            vec![date(2025, 10, 6), date(2025, 10, 20), date(2025, 11, 3), date(2025, 11, 17)]
        );
    }

    #[test]
    fn test_monthly_on_31st_skips_short_months() {
        let base = base_event(
            date(2025, 1, 31),
            Repeat::Monthly(RepeatRule::every(1).until(date(2025, 4, 30))),
        );
        let instances = expand(&base, &ExpandOptions::default()).unwrap();
        assert_eq!(dates(&instances), vec![date(2025, 1, 31), date(2025, 3, 31)]);
        assert_eq!(instances[1].id, "1-2");
    }

    #[test]
    fn test_monthly_on_31st_does_not_drift_after_february() {
        let base = base_event(
            date(2025, 1, 31),
            Repeat::Monthly(RepeatRule::every(1).until(date(2025, 12, 31))),
        );
        let instances = expand(&base, &ExpandOptions::default()).unwrap();
        assert_eq!(
            dates(&instances),
            vec![
                date(2025, 1, 31),
                date(2025, 3, 31),
                date(2025, 5, 31),
                date(2025, 7, 31),
                date(2025, 8, 31),
                date(2025, 10, 31),
                date(2025, 12, 31),
            ]
        );
    }

    #[test]
    fn test_monthly_on_31st_interval_two_is_anchor_relative() {
        let base = base_event(
            date(2025, 1, 31),
            Repeat::Monthly(RepeatRule::every(2).until(date(2025, 12, 31))),
        );
        let instances = expand(&base, &ExpandOptions::default()).unwrap();
        // Sep and Nov have no 31st.
        assert_eq!(
            dates(&instances),
            vec![date(2025, 1, 31), date(2025, 3, 31), date(2025, 5, 31), date(2025, 7, 31)]
        );
    }

    #[test]
    fn test_monthly_mid_month_never_skips() {
        let base = base_event(
            date(2025, 1, 15),
            Repeat::Monthly(RepeatRule::every(1).until(date(2025, 4, 15))),
        );
        let instances = expand(&base, &ExpandOptions::default()).unwrap();
        assert_eq!(
            dates(&instances),
            vec![date(2025, 1, 15), date(2025, 2, 15), date(2025, 3, 15), date(2025, 4, 15)]
        );
    }

    #[test]
    fn test_yearly_on_leap_day_only_hits_leap_years() {
        let base = base_event(
            date(2024, 2, 29),
            Repeat::Yearly(RepeatRule::every(1).until(date(2030, 3, 1))),
        );
        let instances = expand(&base, &ExpandOptions::default()).unwrap();
        assert_eq!(dates(&instances), vec![date(2024, 2, 29), date(2028, 2, 29)]);
        let ids: Vec<_> = instances.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1-1", "1-2"]);
    }

    #[test]
    fn test_yearly_on_leap_day_through_2032() {
        let base = base_event(
            date(2024, 2, 29),
            Repeat::Yearly(RepeatRule::every(1).until(date(2032, 12, 31))),
        );
        let instances = expand(&base, &ExpandOptions::default()).unwrap();
        assert_eq!(
            dates(&instances),
            vec![date(2024, 2, 29), date(2028, 2, 29), date(2032, 2, 29)]
        );
    }

    #[test]
    fn test_yearly_on_leap_day_across_century() {
        let base = base_event(
            date(2096, 2, 29),
            Repeat::Yearly(RepeatRule::every(4).until(date(2104, 3, 1))),
        );
        let instances = expand(&base, &ExpandOptions::default()).unwrap();
        // 2100 is not a leap year.
        assert_eq!(dates(&instances), vec![date(2096, 2, 29), date(2104, 2, 29)]);
    }

    #[test]
    fn test_no_end_date_uses_horizon() {
        let base = base_event(date(2025, 1, 6), Repeat::Weekly(RepeatRule::every(1)));
        let instances = expand(&base, &ExpandOptions::default()).unwrap();
        assert_eq!(instances.len(), 261);
        assert_eq!(instances.last().unwrap().date, date(2029, 12, 31));
    }

    #[test]
    fn test_end_before_anchor_yields_nothing() {
        let base = base_event(
            date(2025, 10, 15),
            Repeat::Daily(RepeatRule::every(1).until(date(2025, 10, 1))),
        );
        assert!(expand(&base, &ExpandOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn test_expansion_guard_is_an_error() {
        let base = base_event(
            date(2025, 1, 1),
            Repeat::Daily(RepeatRule::every(1).until(date(2060, 1, 1))),
        );
        let options = ExpandOptions {
            max_instances: 100,
            ..ExpandOptions::default()
        };
        let result = expand(&base, &options);
        assert!(matches!(
            result,
            Err(EngineError::ExpansionTooLarge { limit: 100 })
        ));
    }

    #[test]
    fn test_expansion_guard_allows_exact_limit() {
        let base = base_event(
            date(2025, 1, 1),
            Repeat::Daily(RepeatRule::every(1).until(date(2025, 1, 10))),
        );
        let options = ExpandOptions {
            max_instances: 10,
            ..ExpandOptions::default()
        };
        assert_eq!(expand(&base, &options).unwrap().len(), 10);
    }

    #[test]
    fn test_instances_copy_every_other_field() {
        let mut base = base_event(
            date(2025, 10, 6),
            Repeat::Weekly(RepeatRule::every(1).until(date(2025, 10, 20))),
        );
        base.description = "Weekly review".to_string();
        base.location = "Room B".to_string();
        base.notification_time = 60;

        let instances = expand(&base, &ExpandOptions::default()).unwrap();
        assert_eq!(instances.len(), 3);
        for instance in &instances {
            assert_eq!(instance.title, base.title);
            assert_eq!(instance.description, "Weekly review");
            assert_eq!(instance.location, "Room B");
            assert_eq!(instance.notification_time, 60);
            assert_eq!(instance.repeat, base.repeat);
        }
    }

    #[test]
    fn test_is_leap_year() {
        assert!(is_leap_year(2024));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(2100));
        assert!(!is_leap_year(2025));
    }
}
