//! The canonical set of active events.
//!
//! [`EventStore`] owns the in-memory event list and its persisted snapshot
//! under [`BlobKey::Active`]. Every mutation runs inside one critical
//! section that covers "read current set, compute new set, persist,
//! publish", so readers never observe a half-applied add or removal.
//!
//! The list is kept sorted ascending by time after every insertion. Events
//! with equal times keep insertion order.
//!
//! A failed snapshot write is logged and otherwise ignored: the in-memory
//! set stays the source of truth until the next successful write.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use herald_types::{Event, EventId, NewEvent};
use tokio::sync::Mutex;

use crate::blob::{self, BlobKey, BlobStore};

/// Mutable state guarded by the store's lock.
#[derive(Debug, Default)]
struct ActiveSet {
    /// Active events, sorted ascending by time.
    events: Vec<Event>,
    /// Highest identifier handed out so far.
    last_id: Option<EventId>,
}

impl ActiveSet {
    /// Pick a fresh identifier derived from `now`.
    ///
    /// Falls back to `last_id + 1` when the clock has not moved past the
    /// previous identifier.
    fn next_id(&mut self, now: DateTime<Utc>) -> EventId {
        let candidate = EventId::from_created_at(now);
        let id = match self.last_id {
            Some(last) if candidate <= last => last.successor(),
            _ => candidate,
        };
        self.last_id = Some(id);
        id
    }
}

/// Operations on the active event set.
pub struct EventStore {
    blobs: Arc<dyn BlobStore>,
    inner: Mutex<ActiveSet>,
}

impl EventStore {
    /// Open the store, loading the last persisted snapshot.
    ///
    /// A missing snapshot starts an empty set. An unreadable or corrupt
    /// snapshot is logged and also starts an empty set.
    pub fn open(blobs: Arc<dyn BlobStore>) -> Self {
        let mut events = match blob::load_events(blobs.as_ref(), BlobKey::Active) {
            Ok(events) => events,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load active events, starting empty");
                Vec::new()
            }
        };
        events.sort_by_key(|e| e.time);
        let last_id = events.iter().map(|e| e.id).max();

        tracing::info!(count = events.len(), "Active events loaded");

        Self {
            blobs,
            inner: Mutex::new(ActiveSet { events, last_id }),
        }
    }

    /// Insert a validated event and persist the new snapshot.
    ///
    /// The identifier is derived from `now`, the creation instant.
    pub async fn add(&self, new_event: NewEvent, now: DateTime<Utc>) -> Event {
        let mut set = self.inner.lock().await;

        let id = set.next_id(now);
        let event = new_event.into_event(id);
        set.events.push(event.clone());
        set.events.sort_by_key(|e| e.time);

        self.persist(&set.events);

        tracing::info!(
            event_id = %event.id,
            title = %event.title,
            time = %event.time,
            active = set.events.len(),
            "Event added"
        );
        event
    }

    /// Every event strictly after `now`, ascending by time.
    pub async fn list_upcoming(&self, now: DateTime<Utc>) -> Vec<Event> {
        let set = self.inner.lock().await;
        set.events
            .iter()
            .filter(|e| e.is_upcoming(now))
            .cloned()
            .collect()
    }

    /// Remove every event matching `predicate` and persist what remains.
    ///
    /// Returns the removed events in ascending time order. Nothing is
    /// written when no event matches.
    pub async fn remove_where<F>(&self, mut predicate: F) -> Vec<Event>
    where
        F: FnMut(&Event) -> bool + Send,
    {
        let mut set = self.inner.lock().await;

        let (removed, kept): (Vec<Event>, Vec<Event>) =
            std::mem::take(&mut set.events).into_iter().partition(|e| predicate(e));
        set.events = kept;

        if !removed.is_empty() {
            self.persist(&set.events);
            tracing::debug!(
                removed = removed.len(),
                active = set.events.len(),
                "Events removed from active set"
            );
        }
        removed
    }

    /// A consistent copy of the whole active set, ascending by time.
    pub async fn snapshot(&self) -> Vec<Event> {
        self.inner.lock().await.events.clone()
    }

    /// Number of active events.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.events.len()
    }

    /// Whether the active set is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.events.is_empty()
    }

    fn persist(&self, events: &[Event]) {
        if let Err(e) = blob::save_events(self.blobs.as_ref(), BlobKey::Active, events) {
            tracing::error!(
                error = %e,
                count = events.len(),
                "Failed to persist active events; in-memory set remains authoritative"
            );
        }
    }
}
