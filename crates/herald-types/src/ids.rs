//! Type-safe identifier wrappers.
//!
//! Event identifiers are derived from the creation timestamp in Unix
//! milliseconds. The store that assigns them bumps the value whenever two
//! events are created within the same millisecond, so ids are unique and
//! strictly increasing within one store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Unique identifier for a scheduled event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct EventId(#[ts(type = "number")] pub i64);

impl EventId {
    /// Build an identifier from the creation instant (Unix milliseconds).
    pub fn from_created_at(created_at: DateTime<Utc>) -> Self {
        Self(created_at.timestamp_millis())
    }

    /// Smallest identifier strictly greater than `self`.
    ///
    /// Saturates at [`i64::MAX`], which is far beyond any real timestamp.
    pub const fn successor(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl core::fmt::Display for EventId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
