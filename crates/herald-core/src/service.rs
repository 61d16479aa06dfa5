//! Caller-facing operations over the shared event state.
//!
//! [`EventService`] is what the transport layer talks to. It validates
//! input before anything reaches the store and otherwise delegates to
//! [`EventStore`], [`OverlapChecker`] and [`SubscriberRegistry`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use herald_db::EventStore;
use herald_types::{Event, OverlapReport};

use crate::overlap::OverlapChecker;
use crate::subscriber::{Subscriber, SubscriberId, SubscriberRegistry};
use crate::validation::{self, EventDraft, ValidationError};

/// Facade over the event store, overlap checks and subscriber membership.
pub struct EventService {
    store: Arc<EventStore>,
    overlap: OverlapChecker,
    subscribers: Arc<SubscriberRegistry>,
}

impl EventService {
    /// Create a service. The overlap checker must read the same store.
    pub const fn new(
        store: Arc<EventStore>,
        overlap: OverlapChecker,
        subscribers: Arc<SubscriberRegistry>,
    ) -> Self {
        Self {
            store,
            overlap,
            subscribers,
        }
    }

    /// Validate `draft` and add it to the active set.
    ///
    /// On a validation error the store is untouched.
    pub async fn add_event(
        &self,
        draft: &EventDraft,
        now: DateTime<Utc>,
    ) -> Result<Event, ValidationError> {
        let new_event = validation::validate(draft)?;
        Ok(self.store.add(new_event, now).await)
    }

    /// Active events scheduled after `now`, ordered by time.
    pub async fn list_upcoming(&self, now: DateTime<Utc>) -> Vec<Event> {
        self.store.list_upcoming(now).await
    }

    /// Active events near `candidate`.
    pub async fn check_overlap(&self, candidate: DateTime<Utc>) -> OverlapReport {
        self.overlap.check(candidate).await
    }

    /// Register a live subscriber.
    pub async fn subscribe(&self, subscriber: Arc<dyn Subscriber>) {
        self.subscribers.add(subscriber).await;
    }

    /// Unregister a subscriber. Safe to call more than once.
    pub async fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.subscribers.remove(id).await
    }

    /// Number of events in the active set, including ones already due.
    pub async fn active_count(&self) -> usize {
        self.store.len().await
    }

    /// Number of registered subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.len().await
    }
}
