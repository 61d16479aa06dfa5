//! Core entity structs shared by the store, the scheduler and the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::EventId;

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A scheduled event.
///
/// Events are created once and never updated in place. They live in the
/// active set until their time elapses, then move to the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// Store-assigned identifier, immutable after creation.
    pub id: EventId,
    /// Short non-empty title.
    pub title: String,
    /// Non-empty free-form description.
    pub description: String,
    /// Absolute instant the event is scheduled for.
    pub time: DateTime<Utc>,
}

impl Event {
    /// Whether the event's time has elapsed at `now` (inclusive).
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.time <= now
    }

    /// Whether the event is strictly in the future relative to `now`.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.time > now
    }
}

/// A validated request to create an event.
///
/// Carries everything except the identifier, which only the store assigns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    /// Trimmed, non-empty title.
    pub title: String,
    /// Trimmed, non-empty description.
    pub description: String,
    /// Scheduled instant.
    pub time: DateTime<Utc>,
}

impl NewEvent {
    /// Attach the store-assigned identifier.
    pub fn into_event(self, id: EventId) -> Event {
        Event {
            id,
            title: self.title,
            description: self.description,
            time: self.time,
        }
    }
}

// ---------------------------------------------------------------------------
// Overlap report
// ---------------------------------------------------------------------------

/// Result of checking a candidate time against the active events.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OverlapReport {
    /// `true` when at least one active event is within the proximity window.
    pub overlap: bool,
    /// Every active event within the window, in ascending time order.
    pub overlapping: Vec<Event>,
}

impl OverlapReport {
    /// Build a report from the matching events.
    pub fn from_matches(overlapping: Vec<Event>) -> Self {
        Self {
            overlap: !overlapping.is_empty(),
            overlapping,
        }
    }
}
