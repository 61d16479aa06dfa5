//! Input validation for new events.
//!
//! [`validate`] turns raw caller input into a [`NewEvent`] or a
//! [`ValidationError`]. Nothing here touches the store, so a rejected
//! request cannot leave partial state behind.
//!
//! # Accepted time formats
//!
//! | Example | Interpretation |
//! |---------|----------------|
//! | `2025-01-01T10:00:00Z`, `2025-01-01T11:00:00+01:00` | RFC 3339 |
//! | `2025-01-01T10:00:00`, `2025-01-01T10:00:00.250`, `2025-01-01T10:00` | naive, read as UTC |
//! | `2025-01-01 10:00:00` | naive with a space separator, read as UTC |
//! | `2025-01-01` | midnight UTC |

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use herald_types::NewEvent;
use serde::Deserialize;

/// Naive date-time layouts accepted after RFC 3339 fails.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Errors returned for malformed event input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field was absent or blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The time field could not be parsed as a timestamp.
    #[error("invalid time {value:?}: {reason}")]
    InvalidTime {
        /// The rejected input.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },
}

/// Unvalidated event fields as supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EventDraft {
    /// Event title.
    #[serde(default)]
    pub title: Option<String>,
    /// Event description.
    #[serde(default)]
    pub description: Option<String>,
    /// Scheduled time as an ISO-8601 string.
    #[serde(default)]
    pub time: Option<String>,
}

impl EventDraft {
    /// Build a draft with every field present.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
            time: Some(time.into()),
        }
    }
}

/// Validate a draft into a [`NewEvent`].
///
/// Title and description are trimmed and must be non-empty. Fields are
/// checked in the order title, description, time; the first failure wins.
///
/// # Errors
///
/// Returns [`ValidationError::MissingField`] for an absent or blank field,
/// or [`ValidationError::InvalidTime`] if the time does not parse.
pub fn validate(draft: &EventDraft) -> Result<NewEvent, ValidationError> {
    let title = required(draft.title.as_deref(), "title")?;
    let description = required(draft.description.as_deref(), "description")?;
    let time = parse_event_time(required(draft.time.as_deref(), "time")?)?;

    Ok(NewEvent {
        title: title.to_owned(),
        description: description.to_owned(),
        time,
    })
}

/// Parse an ISO-8601 timestamp.
///
/// Offsets are honoured; values without an offset are read as UTC.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidTime`] carrying the RFC 3339 parser
/// diagnostic when no accepted layout matches.
pub fn parse_event_time(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    let value = value.trim();

    let rfc3339_err = match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => return Ok(dt.with_timezone(&Utc)),
        Err(e) => e,
    };

    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    {
        return Ok(naive.and_utc());
    }

    if let Some(midnight) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(ValidationError::InvalidTime {
        value: value.to_owned(),
        reason: rfc3339_err.to_string(),
    })
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ValidationError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingField(field))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, h, m, s).unwrap()
    }

    #[test]
    fn valid_draft_is_trimmed() {
        let draft = EventDraft::new("  Standup ", "Daily sync\n", "2025-01-01T10:00:00Z");
        let event = validate(&draft).unwrap();
        assert_eq!(event.title, "Standup");
        assert_eq!(event.description, "Daily sync");
        assert_eq!(event.time, utc(10, 0, 0));
    }

    #[test]
    fn missing_fields_are_reported_in_order() {
        let mut draft = EventDraft::default();
        assert_eq!(validate(&draft), Err(ValidationError::MissingField("title")));

        draft.title = Some("Standup".to_owned());
        assert_eq!(
            validate(&draft),
            Err(ValidationError::MissingField("description"))
        );

        draft.description = Some("Daily sync".to_owned());
        assert_eq!(validate(&draft), Err(ValidationError::MissingField("time")));
    }

    #[test]
    fn blank_fields_count_as_missing() {
        let draft = EventDraft::new("   ", "Daily sync", "2025-01-01T10:00:00Z");
        assert_eq!(validate(&draft), Err(ValidationError::MissingField("title")));

        let draft = EventDraft::new("Standup", "Daily sync", "");
        assert_eq!(validate(&draft), Err(ValidationError::MissingField("time")));
    }

    #[test]
    fn unparseable_time_is_rejected() {
        let draft = EventDraft::new("Standup", "Daily sync", "tomorrow morning");
        let err = validate(&draft).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTime { ref value, .. } if value == "tomorrow morning"));
    }

    #[test]
    fn impossible_date_is_rejected() {
        assert!(parse_event_time("2025-02-30T10:00:00Z").is_err());
    }

    #[test]
    fn offsets_are_converted_to_utc() {
        assert_eq!(
            parse_event_time("2025-01-01T11:30:00+01:00").unwrap(),
            utc(10, 30, 0)
        );
    }

    #[test]
    fn naive_layouts_are_read_as_utc() {
        assert_eq!(parse_event_time("2025-01-01T10:00:00").unwrap(), utc(10, 0, 0));
        assert_eq!(parse_event_time("2025-01-01T10:05").unwrap(), utc(10, 5, 0));
        assert_eq!(parse_event_time("2025-01-01 09:15:30").unwrap(), utc(9, 15, 30));
        assert_eq!(parse_event_time("2025-01-01").unwrap(), utc(0, 0, 0));
    }

    #[test]
    fn fractional_seconds_are_kept() {
        let parsed = parse_event_time("2025-01-01T10:00:00.250").unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn draft_deserializes_with_missing_fields() {
        let draft: EventDraft = serde_json::from_str(r#"{"title": "Standup"}"#).unwrap();
        assert_eq!(draft.title.as_deref(), Some("Standup"));
        assert!(draft.description.is_none());
        assert!(draft.time.is_none());
    }
}
