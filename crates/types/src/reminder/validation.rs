// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use std::collections::HashMap;

use super::{ReminderEntry, ReminderUnit};
use crate::imports::*;

/// A reminder entry as authored in a form, before validation
///
/// The value is optional and signed since forms may submit empty or negative input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderDraft {
    /// The unit of the offset, serialized as `type`
    #[serde(rename = "type")]
    pub unit: ReminderUnit,
    /// The entered value, if any
    #[serde(default)]
    pub value: Option<i64>,
}

impl From<ReminderEntry> for ReminderDraft {
    fn from(entry: ReminderEntry) -> Self {
        Self {
            unit: entry.unit,
            value: Some(i64::from(entry.value)),
        }
    }
}

/// Validation error of a reminder schedule
///
/// The messages are meant to be shown to the event host as they are. Positions start at 1.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// A schedule is required but no entry was given
    #[error("Add at least one reminder")]
    Empty,
    /// An entry has no value
    #[error("Reminder {position} needs a value")]
    MissingValue {
        /// Position of the entry
        position: usize,
    },
    /// An entry value is zero or negative
    #[error("Reminder {position} must be a positive number")]
    NotPositive {
        /// Position of the entry
        position: usize,
    },
    /// An entry value cannot be represented
    #[error("Reminder {position} is too far before the event")]
    TooLarge {
        /// Position of the entry
        position: usize,
    },
    /// Two entries have the same unit and value
    #[error("Reminder {position} duplicates reminder {first} ({entry})")]
    Duplicate {
        /// Position of the repeated entry
        position: usize,
        /// Position of the first occurrence
        first: usize,
        /// The repeated entry
        entry: ReminderEntry,
    },
}

/// Validate an authored reminder schedule
///
/// Rejects missing and non-positive values as well as duplicate `(unit, value)` pairs.
/// An empty list is only rejected if `require_non_empty` is set, an empty optional
/// schedule means "use the default schedule".
///
/// Returns the validated entries in their original order.
pub fn validate(
    drafts: &[ReminderDraft],
    require_non_empty: bool,
) -> Result<Vec<ReminderEntry>, ScheduleError> {
    if drafts.is_empty() && require_non_empty {
        return Err(ScheduleError::Empty);
    }

    let mut seen = HashMap::with_capacity(drafts.len());
    let mut entries = Vec::with_capacity(drafts.len());

    for (index, draft) in drafts.iter().enumerate() {
        let position = index + 1;

        let value = draft
            .value
            .ok_or(ScheduleError::MissingValue { position })?;

        if value <= 0 {
            return Err(ScheduleError::NotPositive { position });
        }

        let value = u32::try_from(value).map_err(|_| ScheduleError::TooLarge { position })?;

        let entry = ReminderEntry {
            unit: draft.unit,
            value,
        };

        if let Some(&first) = seen.get(&entry) {
            return Err(ScheduleError::Duplicate {
                position,
                first,
                entry,
            });
        }

        let _ = seen.insert(entry, position);
        entries.push(entry);
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn draft(unit: ReminderUnit, value: Option<i64>) -> ReminderDraft {
        ReminderDraft { unit, value }
    }

    #[test]
    fn accepts_valid_schedule() {
        let entries = validate(
            &[
                draft(ReminderUnit::Day, Some(7)),
                draft(ReminderUnit::Day, Some(1)),
                draft(ReminderUnit::Hour, Some(24)),
            ],
            true,
        )
        .unwrap();

        assert_eq!(
            entries,
            vec![
                ReminderEntry::days(7),
                ReminderEntry::days(1),
                ReminderEntry::hours(24)
            ]
        );
    }

    #[test]
    fn empty_schedule() {
        assert_eq!(validate(&[], true), Err(ScheduleError::Empty));
        assert_eq!(validate(&[], false), Ok(vec![]));
    }

    #[test]
    fn missing_value() {
        let err = validate(
            &[
                draft(ReminderUnit::Day, Some(1)),
                draft(ReminderUnit::Hour, None),
            ],
            true,
        )
        .unwrap_err();

        assert_eq!(err, ScheduleError::MissingValue { position: 2 });
        assert_eq!(err.to_string(), "Reminder 2 needs a value");
    }

    #[test]
    fn non_positive_value() {
        let err = validate(&[draft(ReminderUnit::Day, Some(0))], true).unwrap_err();
        assert_eq!(err.to_string(), "Reminder 1 must be a positive number");

        let err = validate(&[draft(ReminderUnit::Hour, Some(-3))], false).unwrap_err();
        assert_eq!(err, ScheduleError::NotPositive { position: 1 });
    }

    #[test]
    fn too_large_value() {
        let err = validate(&[draft(ReminderUnit::Hour, Some(i64::MAX))], true).unwrap_err();
        assert_eq!(err, ScheduleError::TooLarge { position: 1 });
    }

    #[test]
    fn duplicate_entries() {
        let err = validate(
            &[
                draft(ReminderUnit::Day, Some(2)),
                draft(ReminderUnit::Hour, Some(2)),
                draft(ReminderUnit::Day, Some(2)),
            ],
            true,
        )
        .unwrap_err();

        assert_eq!(
            err,
            ScheduleError::Duplicate {
                position: 3,
                first: 1,
                entry: ReminderEntry::days(2)
            }
        );
        assert_eq!(err.to_string(), "Reminder 3 duplicates reminder 1 (2 days before)");
    }

    #[test]
    fn deserialize_form_input() {
        let drafts: Vec<ReminderDraft> =
            serde_json::from_str(r#"[{"type":"hour"},{"type":"day","value":-1}]"#).unwrap();

        assert_eq!(
            drafts,
            vec![
                draft(ReminderUnit::Hour, None),
                draft(ReminderUnit::Day, Some(-1))
            ]
        );
    }
}
