// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Reminder schedules of events
//!
//! A schedule is a set of "N days/hours before the event" entries authored by the event host.
//! It is persisted as a string on the event, see [`parse`] and [`serialize`] for the format.
//! Events without a custom schedule use [`DEFAULT_REMINDER`].

use std::fmt;
use strum::{AsRefStr, Display, EnumString};

use crate::imports::*;

mod codec;
mod validation;

pub use codec::{parse, serialize, ScheduleParseError};
pub use validation::{validate, ReminderDraft, ScheduleError};

/// The schedule used for events without a custom reminder schedule: 2 days before
pub const DEFAULT_REMINDER: ReminderEntry = ReminderEntry {
    unit: ReminderUnit::Day,
    value: 2,
};

/// Unit of a [`ReminderEntry`] offset
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    AsRefStr,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReminderUnit {
    /// Whole days before the event
    Day,
    /// Whole hours before the event
    Hour,
}

/// A single "`value` `unit`s before the event" trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReminderEntry {
    /// The unit of the offset, serialized as `type`
    #[serde(rename = "type")]
    pub unit: ReminderUnit,
    /// Number of units before the event
    pub value: u32,
}

impl ReminderEntry {
    /// Create an entry firing `value` days before the event
    pub const fn days(value: u32) -> Self {
        Self {
            unit: ReminderUnit::Day,
            value,
        }
    }

    /// Create an entry firing `value` hours before the event
    pub const fn hours(value: u32) -> Self {
        Self {
            unit: ReminderUnit::Hour,
            value,
        }
    }
}

impl fmt::Display for ReminderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match (self.unit, self.value) {
            (ReminderUnit::Day, 1) => "day",
            (ReminderUnit::Day, _) => "days",
            (ReminderUnit::Hour, 1) => "hour",
            (ReminderUnit::Hour, _) => "hours",
        };

        write!(f, "{} {} before", self.value, unit)
    }
}

/// The effective reminder schedule of an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderSchedule {
    /// No custom schedule is set, [`DEFAULT_REMINDER`] applies
    Default,
    /// A non-empty, validated custom schedule
    Custom(Vec<ReminderEntry>),
}

/// Error returned when a persisted schedule cannot be used
#[derive(Debug, thiserror::Error)]
pub enum InvalidSchedule {
    /// The persisted value could not be parsed
    #[error(transparent)]
    Parse(#[from] ScheduleParseError),
    /// The persisted value parsed but contains invalid entries
    #[error(transparent)]
    Invalid(#[from] ScheduleError),
}

impl ReminderSchedule {
    /// Resolve the schedule from the persisted column value
    ///
    /// An absent or empty value resolves to [`ReminderSchedule::Default`].
    pub fn from_persisted(serialized: Option<&str>) -> Result<Self, InvalidSchedule> {
        let entries = parse(serialized)?;

        if entries.is_empty() {
            return Ok(Self::Default);
        }

        let drafts: Vec<ReminderDraft> = entries.into_iter().map(ReminderDraft::from).collect();
        let entries = validate(&drafts, true)?;

        Ok(Self::Custom(entries))
    }

    /// The entries of this schedule
    pub fn entries(&self) -> &[ReminderEntry] {
        match self {
            Self::Default => std::slice::from_ref(&DEFAULT_REMINDER),
            Self::Custom(entries) => entries,
        }
    }

    /// Returns `true` if this is a host authored schedule
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn entry_display() {
        assert_eq!(ReminderEntry::days(1).to_string(), "1 day before");
        assert_eq!(ReminderEntry::days(2).to_string(), "2 days before");
        assert_eq!(ReminderEntry::hours(1).to_string(), "1 hour before");
        assert_eq!(ReminderEntry::hours(6).to_string(), "6 hours before");
    }

    #[test]
    fn absent_schedule_is_default() {
        let schedule = ReminderSchedule::from_persisted(None).unwrap();
        assert_eq!(schedule, ReminderSchedule::Default);
        assert_eq!(schedule.entries(), &[ReminderEntry::days(2)]);

        let schedule = ReminderSchedule::from_persisted(Some("  ")).unwrap();
        assert_eq!(schedule, ReminderSchedule::Default);
        assert!(!schedule.is_custom());
    }

    #[test]
    fn custom_schedule() {
        let schedule = ReminderSchedule::from_persisted(Some(
            r#"[{"type":"day","value":1},{"type":"hour","value":6}]"#,
        ))
        .unwrap();

        assert_eq!(
            schedule,
            ReminderSchedule::Custom(vec![ReminderEntry::days(1), ReminderEntry::hours(6)])
        );
    }

    #[test]
    fn unusable_schedules_are_rejected() {
        assert!(matches!(
            ReminderSchedule::from_persisted(Some("not json")),
            Err(InvalidSchedule::Parse(_))
        ));
        assert!(matches!(
            ReminderSchedule::from_persisted(Some(
                r#"[{"type":"day","value":1},{"type":"day","value":1}]"#
            )),
            Err(InvalidSchedule::Invalid(ScheduleError::Duplicate { .. }))
        ));
        assert!(matches!(
            ReminderSchedule::from_persisted(Some("0")),
            Err(InvalidSchedule::Invalid(ScheduleError::NotPositive { position: 1 }))
        ));
    }
}
