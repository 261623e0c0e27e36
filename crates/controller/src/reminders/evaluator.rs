// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Decides whether the reminder of an event is due at a given instant
//!
//! The remaining time until the event is rounded up to whole days or hours. An event starting in
//! 47 hours and 59 minutes is therefore 2 days and 48 hours away. Every tick within the same
//! rounded value sees the same result, so irregular tick intervals cannot skip a value. Sending
//! twice is prevented by the per-guest timestamps, not by the evaluator.

use chrono::{DateTime, Duration, Utc};
use db_storage::events::Event;
use types::reminder::{ReminderEntry, ReminderSchedule, ReminderUnit};

/// Day entries further out than this never match
pub const MAX_DAYS_BEFORE: u32 = 14;

/// Hour entries further out than this never match
pub const MAX_HOURS_BEFORE: u32 = 48;

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;
const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// The range of event start times `(after, until]` worth loading at `now`
pub fn candidate_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (now, now + Duration::days(i64::from(MAX_DAYS_BEFORE)))
}

/// Whole days until `starts_at`, rounded up. `None` if the event is not in the future.
pub fn days_until(now: DateTime<Utc>, starts_at: DateTime<Utc>) -> Option<i64> {
    ceil_units(now, starts_at, MILLIS_PER_DAY)
}

/// Whole hours until `starts_at`, rounded up. `None` if the event is not in the future.
pub fn hours_until(now: DateTime<Utc>, starts_at: DateTime<Utc>) -> Option<i64> {
    ceil_units(now, starts_at, MILLIS_PER_HOUR)
}

fn ceil_units(now: DateTime<Utc>, starts_at: DateTime<Utc>, unit_millis: i64) -> Option<i64> {
    let remaining = (starts_at - now).num_milliseconds();

    if remaining <= 0 {
        return None;
    }

    Some((remaining + unit_millis - 1) / unit_millis)
}

/// Returns `true` if `entry` is due at `now` for an event starting at `starts_at`
pub fn entry_matches(entry: &ReminderEntry, now: DateTime<Utc>, starts_at: DateTime<Utc>) -> bool {
    let (remaining, limit) = match entry.unit {
        ReminderUnit::Day => (days_until(now, starts_at), MAX_DAYS_BEFORE),
        ReminderUnit::Hour => (hours_until(now, starts_at), MAX_HOURS_BEFORE),
    };

    if entry.value > limit {
        return false;
    }

    remaining == Some(i64::from(entry.value))
}

/// The first entry of `schedule` which is due at `now`
pub fn due_entry(
    schedule: &ReminderSchedule,
    now: DateTime<Utc>,
    starts_at: DateTime<Utc>,
) -> Option<ReminderEntry> {
    schedule
        .entries()
        .iter()
        .find(|entry| entry_matches(entry, now, starts_at))
        .copied()
}

/// Returns `true` if any entry of `schedule` is due at `now`
pub fn is_due(schedule: &ReminderSchedule, now: DateTime<Utc>, starts_at: DateTime<Utc>) -> bool {
    due_entry(schedule, now, starts_at).is_some()
}

/// The schedule used for `event`
///
/// A persisted schedule which cannot be parsed or is invalid is replaced by the default.
pub fn effective_schedule(event: &Event) -> ReminderSchedule {
    match ReminderSchedule::from_persisted(event.reminder_schedule.as_deref()) {
        Ok(schedule) => schedule,
        Err(e) => {
            log::warn!(
                "Ignoring unusable reminder schedule of event {}, using the default: {}",
                event.id,
                e
            );

            ReminderSchedule::Default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use test_util::fixtures;

    fn starts_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap()
    }

    #[test]
    fn rounding_up() {
        let event = starts_at();

        assert_eq!(days_until(event - Duration::days(2), event), Some(2));
        assert_eq!(days_until(event - Duration::hours(47), event), Some(2));
        assert_eq!(
            days_until(event - Duration::days(2) - Duration::milliseconds(1), event),
            Some(3)
        );
        assert_eq!(hours_until(event - Duration::minutes(1), event), Some(1));
        assert_eq!(hours_until(event - Duration::minutes(61), event), Some(2));
    }

    #[test]
    fn past_events_are_never_due() {
        let event = starts_at();

        assert_eq!(days_until(event, event), None);
        assert_eq!(hours_until(event + Duration::hours(1), event), None);
        assert!(!is_due(
            &ReminderSchedule::Default,
            event + Duration::days(2),
            event
        ));
    }

    #[test]
    fn default_schedule_exactly_two_days_before() {
        let event = starts_at();

        assert!(is_due(
            &ReminderSchedule::Default,
            event - Duration::days(2),
            event
        ));
        assert!(is_due(
            &ReminderSchedule::Default,
            event - Duration::hours(25),
            event
        ));
        assert!(!is_due(
            &ReminderSchedule::Default,
            event - Duration::hours(24),
            event
        ));
        assert!(!is_due(
            &ReminderSchedule::Default,
            event - Duration::days(3),
            event
        ));
    }

    #[test]
    fn custom_schedule_any_entry_matches() {
        let event = starts_at();
        let schedule =
            ReminderSchedule::Custom(vec![ReminderEntry::days(7), ReminderEntry::hours(6)]);

        assert_eq!(
            due_entry(&schedule, event - Duration::days(7), event),
            Some(ReminderEntry::days(7))
        );
        assert_eq!(
            due_entry(&schedule, event - Duration::minutes(330), event),
            Some(ReminderEntry::hours(6))
        );
        assert_eq!(due_entry(&schedule, event - Duration::days(2), event), None);
    }

    #[test]
    fn entries_beyond_lookahead_never_match() {
        let event = starts_at();
        let schedule =
            ReminderSchedule::Custom(vec![ReminderEntry::days(20), ReminderEntry::hours(72)]);

        assert!(!is_due(&schedule, event - Duration::days(20), event));
        assert!(!is_due(&schedule, event - Duration::hours(72), event));
    }

    #[test]
    fn window() {
        let now = starts_at();
        let (after, until) = candidate_window(now);

        assert_eq!(after, now);
        assert_eq!(until, now + Duration::days(14));
    }

    #[test]
    fn unusable_schedule_falls_back_to_default() {
        let event = fixtures::event(starts_at())
            .reminder_schedule(r#"[{"type":"day","value":1},{"type":"day","value":1}]"#)
            .build();

        assert_eq!(effective_schedule(&event), ReminderSchedule::Default);

        let event = fixtures::event(starts_at())
            .reminder_schedule(r#"[{"type":"hour","value":"12"}]"#)
            .build();

        assert_eq!(
            effective_schedule(&event),
            ReminderSchedule::Custom(vec![ReminderEntry::hours(12)])
        );
    }
}
