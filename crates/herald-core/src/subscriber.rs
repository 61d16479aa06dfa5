//! Live subscriber membership and notification fan-out.
//!
//! [`SubscriberRegistry`] tracks the set of connected subscribers. The
//! transport layer registers a subscriber when a connection opens and
//! removes it when the connection closes; the scheduler broadcasts
//! [`Notification`]s to whoever is registered at that moment.
//!
//! # Concurrency
//!
//! Membership is guarded by its own lock, independent of the event store.
//! [`SubscriberRegistry::broadcast`] clones the member list and releases
//! the lock before delivering, so connects and disconnects that race with
//! a broadcast never disturb the iteration.
//!
//! Closed subscribers are skipped during a broadcast but stay registered;
//! only an explicit [`SubscriberRegistry::remove`] takes them out.

use std::collections::HashMap;
use std::sync::Arc;

use herald_types::Notification;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

/// Identity of one subscriber connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriberId(pub Uuid);

impl SubscriberId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Failure to hand a message to one subscriber.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BroadcastError {
    /// The subscriber's transport has shut down.
    #[error("subscriber transport is closed")]
    Closed,

    /// The transport rejected the message.
    #[error("transport error: {0}")]
    Transport(String),
}

/// A connected party that receives notifications.
pub trait Subscriber: Send + Sync {
    /// Stable identity of this subscriber.
    fn id(&self) -> SubscriberId;

    /// Whether the transport can currently accept messages.
    fn is_open(&self) -> bool;

    /// Deliver one serialized message. Must not block.
    fn send(&self, message: &str) -> Result<(), BroadcastError>;
}

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Subscribers that accepted the message.
    pub delivered: usize,
    /// Subscribers skipped because their transport was not open.
    pub skipped: usize,
    /// Subscribers whose transport rejected the message.
    pub failed: usize,
}

/// The set of live subscribers.
#[derive(Default)]
pub struct SubscriberRegistry {
    members: RwLock<HashMap<SubscriberId, Arc<dyn Subscriber>>>,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber.
    pub async fn add(&self, subscriber: Arc<dyn Subscriber>) {
        let id = subscriber.id();
        let count = {
            let mut members = self.members.write().await;
            members.insert(id, subscriber);
            members.len()
        };
        tracing::debug!(subscriber = %id, subscribers = count, "Subscriber registered");
    }

    /// Unregister a subscriber.
    ///
    /// Returns `false` if it was not registered; repeated or racing
    /// disconnects are harmless.
    pub async fn remove(&self, id: SubscriberId) -> bool {
        let (removed, count) = {
            let mut members = self.members.write().await;
            (members.remove(&id).is_some(), members.len())
        };
        if removed {
            tracing::debug!(subscriber = %id, subscribers = count, "Subscriber removed");
        }
        removed
    }

    /// Number of registered subscribers.
    pub async fn len(&self) -> usize {
        self.members.read().await.len()
    }

    /// Whether no subscriber is registered.
    pub async fn is_empty(&self) -> bool {
        self.members.read().await.is_empty()
    }

    /// Deliver `notification` to every registered subscriber that is open.
    ///
    /// A failure for one subscriber is logged and counted; delivery to the
    /// others continues.
    pub async fn broadcast(&self, notification: &Notification) -> BroadcastReport {
        let message = match serde_json::to_string(notification) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize notification");
                return BroadcastReport::default();
            }
        };

        let members: Vec<Arc<dyn Subscriber>> =
            self.members.read().await.values().cloned().collect();

        let mut report = BroadcastReport::default();
        for subscriber in members {
            if !subscriber.is_open() {
                report.skipped = report.skipped.saturating_add(1);
                continue;
            }
            match subscriber.send(&message) {
                Ok(()) => report.delivered = report.delivered.saturating_add(1),
                Err(e) => {
                    tracing::warn!(subscriber = %subscriber.id(), error = %e, "Broadcast delivery failed");
                    report.failed = report.failed.saturating_add(1);
                }
            }
        }
        report
    }
}

// ---------------------------------------------------------------------------
// Channel-backed subscriber
// ---------------------------------------------------------------------------

/// A subscriber that queues messages on an unbounded channel.
///
/// The transport task owns the receiving half and writes each message to
/// the wire. `send` only enqueues, so a slow client never stalls a
/// broadcast. The subscriber reports closed once the receiver is dropped.
///
/// The queue has no upper bound. A client that stays connected but never
/// reads lets its queue grow by one message per broadcast until the
/// socket closes. Reminder traffic is one small message per event, so the
/// growth is bounded in practice by the number of events announced during
/// the connection.
#[derive(Debug)]
pub struct ChannelSubscriber {
    id: SubscriberId,
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelSubscriber {
    /// Create a subscriber and the receiver its transport reads from.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                id: SubscriberId::new(),
                tx,
            },
            rx,
        )
    }
}

impl Subscriber for ChannelSubscriber {
    fn id(&self) -> SubscriberId {
        self.id
    }

    fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    fn send(&self, message: &str) -> Result<(), BroadcastError> {
        if self.tx.send(message.to_owned()).is_err() {
            return Err(BroadcastError::Closed);
        }
        Ok(())
    }
}
