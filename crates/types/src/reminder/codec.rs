// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use serde_json::Value;

use super::ReminderEntry;
use crate::imports::*;

/// Error returned by [`parse`]
#[derive(Debug, thiserror::Error)]
pub enum ScheduleParseError {
    /// The value is neither a bare number nor valid JSON
    #[error("Reminder schedule is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The JSON value is not an entry, a list of entries or a number
    #[error("Unsupported reminder schedule format")]
    UnsupportedShape,
    /// An entry value is not a non-negative whole number
    #[error("Reminder value `{0}` is not a whole number")]
    InvalidValue(String),
}

#[derive(Deserialize)]
struct PersistedEntry {
    #[serde(rename = "type")]
    unit: super::ReminderUnit,
    value: PersistedValue,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PersistedValue {
    Number(u64),
    Text(String),
}

impl TryFrom<PersistedValue> for u32 {
    type Error = ScheduleParseError;

    fn try_from(value: PersistedValue) -> Result<Self, Self::Error> {
        match value {
            PersistedValue::Number(n) => {
                u32::try_from(n).map_err(|_| ScheduleParseError::InvalidValue(n.to_string()))
            }
            PersistedValue::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| ScheduleParseError::InvalidValue(s)),
        }
    }
}

fn entry_from_value(value: Value) -> Result<ReminderEntry, ScheduleParseError> {
    let entry: PersistedEntry = serde_json::from_value(value)?;

    Ok(ReminderEntry {
        unit: entry.unit,
        value: entry.value.try_into()?,
    })
}

/// Parse a persisted reminder schedule
///
/// Accepted formats:
/// - a list of entries: `[{"type":"day","value":2},{"type":"hour","value":6}]`
/// - a single entry object: `{"type":"day","value":2}`
/// - a bare number of days, optionally JSON quoted: `2` or `"2"`
///
/// An absent, empty or `null` value yields an empty list, which means "use the default schedule".
/// Entries are not validated, see [`validate`](super::validate).
pub fn parse(serialized: Option<&str>) -> Result<Vec<ReminderEntry>, ScheduleParseError> {
    let raw = match serialized.map(str::trim) {
        None | Some("") => return Ok(Vec::new()),
        Some(raw) => raw,
    };

    let value: Value = serde_json::from_str(raw)?;

    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.into_iter().map(entry_from_value).collect(),
        value @ Value::Object(_) => Ok(vec![entry_from_value(value)?]),
        Value::Number(n) => {
            let days = n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| ScheduleParseError::InvalidValue(n.to_string()))?;

            Ok(vec![ReminderEntry::days(days)])
        }
        Value::String(s) => {
            let days: u32 = PersistedValue::Text(s).try_into()?;

            Ok(vec![ReminderEntry::days(days)])
        }
        Value::Bool(_) => Err(ScheduleParseError::UnsupportedShape),
    }
}

/// Serialize a reminder schedule for persistence
///
/// Returns `None` for an empty list so "no custom schedule" is stored as an absent value.
/// Entry order is preserved.
pub fn serialize(entries: &[ReminderEntry]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }

    serde_json::to_string(entries).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_empty() {
        assert_eq!(parse(None).unwrap(), vec![]);
        assert_eq!(parse(Some("")).unwrap(), vec![]);
        assert_eq!(parse(Some(" \n")).unwrap(), vec![]);
        assert_eq!(parse(Some("null")).unwrap(), vec![]);
        assert_eq!(parse(Some("[]")).unwrap(), vec![]);
    }

    #[test]
    fn parse_list() {
        assert_eq!(
            parse(Some(
                r#"[{"type":"hour","value":6},{"type":"day","value":1}]"#
            ))
            .unwrap(),
            vec![ReminderEntry::hours(6), ReminderEntry::days(1)]
        );
    }

    #[test]
    fn parse_string_values() {
        assert_eq!(
            parse(Some(r#"[{"type":"day","value":"3"}]"#)).unwrap(),
            vec![ReminderEntry::days(3)]
        );
    }

    #[test]
    fn parse_legacy_formats() {
        assert_eq!(parse(Some("3")).unwrap(), vec![ReminderEntry::days(3)]);
        assert_eq!(parse(Some(r#""5""#)).unwrap(), vec![ReminderEntry::days(5)]);
        assert_eq!(
            parse(Some(r#"{"type":"hour","value":12}"#)).unwrap(),
            vec![ReminderEntry::hours(12)]
        );
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            parse(Some("[{")),
            Err(ScheduleParseError::Json(_))
        ));
        assert!(matches!(
            parse(Some(r#"[{"type":"week","value":1}]"#)),
            Err(ScheduleParseError::Json(_))
        ));
        assert!(matches!(
            parse(Some("true")),
            Err(ScheduleParseError::UnsupportedShape)
        ));
        assert!(matches!(
            parse(Some("-2")),
            Err(ScheduleParseError::InvalidValue(_))
        ));
        assert!(matches!(
            parse(Some(r#"[{"type":"day","value":"soon"}]"#)),
            Err(ScheduleParseError::InvalidValue(_))
        ));
    }

    #[test]
    fn serialize_empty_is_none() {
        assert_eq!(serialize(&[]), None);
    }

    #[test]
    fn serialize_keeps_order() {
        assert_eq!(
            serialize(&[ReminderEntry::hours(6), ReminderEntry::days(1)]).as_deref(),
            Some(r#"[{"type":"hour","value":6},{"type":"day","value":1}]"#)
        );
    }

    #[test]
    fn serialized_schedules_parse_back() {
        let persisted = r#"[{"type":"day","value":7},{"type":"day","value":1},{"type":"hour","value":2}]"#;

        let entries = parse(Some(persisted)).unwrap();

        assert_eq!(serialize(&entries).as_deref(), Some(persisted));
    }
}
