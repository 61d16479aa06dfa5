//! The periodic reminder and archival sweep.
//!
//! Each sweep classifies every active event against `now`:
//!
//! | Phase | Condition | Action |
//! |-------|-----------|--------|
//! | [`EventPhase::Future`] | `time - now > lookahead` | none |
//! | [`EventPhase::Imminent`] | `0 < time - now <= lookahead` | broadcast one reminder |
//! | [`EventPhase::Due`] | `time <= now` | remove from the active set, archive |
//!
//! Both phases are computed from one snapshot taken at the start of the
//! sweep. Reminders go out first, then the due events are removed by id
//! and handed to the archive.
//!
//! Reminders are sent at most once per event. The scheduler remembers
//! which events it has already announced; later sweeps that still find
//! the event inside the window stay silent. The marker is dropped when the
//! event is archived.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use herald_db::{ArchiveSink, EventStore};
use herald_types::{Event, EventId, Notification};
use tokio::sync::Mutex;

use crate::subscriber::SubscriberRegistry;

/// Temporal state of an active event relative to a sweep instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    /// Beyond the lookahead window.
    Future,
    /// Inside the lookahead window and not yet started.
    Imminent,
    /// Scheduled time has elapsed.
    Due,
}

/// Classify `event` at `now` with the given reminder `lookahead`.
pub fn classify(event: &Event, now: DateTime<Utc>, lookahead: Duration) -> EventPhase {
    if event.is_due(now) {
        EventPhase::Due
    } else if event.time.signed_duration_since(now) <= lookahead {
        EventPhase::Imminent
    } else {
        EventPhase::Future
    }
}

/// What one sweep did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Events a reminder was broadcast for during this sweep.
    pub reminded: Vec<EventId>,
    /// Events moved from the active set to the archive.
    pub archived: Vec<EventId>,
}

impl SweepReport {
    /// Whether the sweep changed nothing.
    pub fn is_idle(&self) -> bool {
        self.reminded.is_empty() && self.archived.is_empty()
    }
}

/// Drives reminders and archival for the active event set.
pub struct ReminderScheduler {
    store: Arc<EventStore>,
    archive: Arc<ArchiveSink>,
    subscribers: Arc<SubscriberRegistry>,
    lookahead: Duration,
    /// Events already announced. Held for the whole sweep, which also
    /// keeps two sweeps from interleaving.
    notified: Mutex<HashSet<EventId>>,
}

impl ReminderScheduler {
    /// Create a scheduler.
    pub fn new(
        store: Arc<EventStore>,
        archive: Arc<ArchiveSink>,
        subscribers: Arc<SubscriberRegistry>,
        lookahead: Duration,
    ) -> Self {
        Self {
            store,
            archive,
            subscribers,
            lookahead,
            notified: Mutex::new(HashSet::new()),
        }
    }

    /// Reminder lookahead window.
    pub const fn lookahead(&self) -> Duration {
        self.lookahead
    }

    /// Run one sweep at `now`.
    ///
    /// Never fails: broadcast and archive errors are logged and the sweep
    /// carries on.
    pub async fn sweep(&self, now: DateTime<Utc>) -> SweepReport {
        let mut notified = self.notified.lock().await;
        let snapshot = self.store.snapshot().await;
        let mut report = SweepReport::default();
        let mut due = HashSet::new();

        for event in &snapshot {
            match classify(event, now, self.lookahead) {
                EventPhase::Future => {}
                EventPhase::Imminent => {
                    if notified.insert(event.id) {
                        let delivery = self
                            .subscribers
                            .broadcast(&Notification::reminder(event))
                            .await;
                        tracing::info!(
                            event_id = %event.id,
                            title = %event.title,
                            time = %event.time,
                            delivered = delivery.delivered,
                            skipped = delivery.skipped,
                            failed = delivery.failed,
                            "Reminder sent"
                        );
                        report.reminded.push(event.id);
                    }
                }
                EventPhase::Due => {
                    due.insert(event.id);
                }
            }
        }

        if !due.is_empty() {
            let removed = self.store.remove_where(|e| due.contains(&e.id)).await;
            report.archived = removed.iter().map(|e| e.id).collect();

            if let Err(e) = self.archive.append(&removed).await {
                tracing::error!(
                    error = %e,
                    count = removed.len(),
                    "Failed to archive completed events; they are no longer active"
                );
            }
        }

        // Forget markers for anything no longer active.
        notified.retain(|id| !due.contains(id) && snapshot.iter().any(|e| e.id == *id));

        if report.is_idle() {
            tracing::debug!(active = snapshot.len(), "Sweep complete, nothing to do");
        } else {
            tracing::info!(
                reminded = report.reminded.len(),
                archived = report.archived.len(),
                "Sweep complete"
            );
        }
        report
    }
}
