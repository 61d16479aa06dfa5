//! Messages pushed to connected subscribers.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::structs::Event;

/// A message delivered to every live subscriber.
///
/// Serialized with an internal `type` tag, so a reminder goes over the
/// wire as `{"type": "reminder", "event": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Notification {
    /// An event is about to start.
    Reminder {
        /// The imminent event.
        event: Event,
    },
}

impl Notification {
    /// Build a reminder for `event`.
    pub fn reminder(event: &Event) -> Self {
        Self::Reminder {
            event: event.clone(),
        }
    }
}
