//! Proximity checks against the active event set.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use herald_db::EventStore;
use herald_types::{Event, OverlapReport};

/// Reports active events scheduled close to a candidate time.
pub struct OverlapChecker {
    store: Arc<EventStore>,
    window: Duration,
}

impl OverlapChecker {
    /// Create a checker over `store` using a symmetric proximity `window`.
    pub const fn new(store: Arc<EventStore>, window: Duration) -> Self {
        Self { store, window }
    }

    /// Every active event within the window of `candidate`.
    ///
    /// Pure read of the current snapshot.
    pub async fn check(&self, candidate: DateTime<Utc>) -> OverlapReport {
        let snapshot = self.store.snapshot().await;
        OverlapReport::from_matches(find_overlapping(&snapshot, candidate, self.window))
    }
}

/// Events whose time differs from `candidate` by at most `window`,
/// in the order they appear in `events`.
pub fn find_overlapping(events: &[Event], candidate: DateTime<Utc>, window: Duration) -> Vec<Event> {
    events
        .iter()
        .filter(|e| e.time.signed_duration_since(candidate).abs() <= window)
        .cloned()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use herald_db::MemoryBlobStore;
    use herald_types::NewEvent;

    use super::*;

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, hour, minute, second).unwrap()
    }

    async fn checker_with(times: &[DateTime<Utc>]) -> OverlapChecker {
        let store = Arc::new(EventStore::open(Arc::new(MemoryBlobStore::new())));
        for (i, time) in times.iter().enumerate() {
            let new_event = NewEvent {
                title: format!("event {i}"),
                description: String::from("desc"),
                time: *time,
            };
            store.add(new_event, at(0, 0, 0)).await;
        }
        OverlapChecker::new(store, Duration::minutes(5))
    }

    #[tokio::test]
    async fn empty_store_reports_no_overlap() {
        let checker = checker_with(&[]).await;
        let report = checker.check(at(10, 0, 0)).await;
        assert!(!report.overlap);
        assert!(report.overlapping.is_empty());
    }

    #[tokio::test]
    async fn window_is_inclusive_on_both_sides() {
        let checker = checker_with(&[at(9, 55, 0), at(10, 5, 0)]).await;
        let report = checker.check(at(10, 0, 0)).await;
        assert!(report.overlap);
        assert_eq!(report.overlapping.len(), 2);
    }

    #[tokio::test]
    async fn events_just_outside_the_window_are_ignored() {
        let checker = checker_with(&[at(9, 54, 59), at(10, 5, 1), at(10, 2, 0)]).await;
        let report = checker.check(at(10, 0, 0)).await;
        assert!(report.overlap);
        assert_eq!(report.overlapping.len(), 1);
        assert_eq!(report.overlapping.first().map(|e| e.time), Some(at(10, 2, 0)));
    }

    #[tokio::test]
    async fn check_does_not_mutate_the_store() {
        let checker = checker_with(&[at(10, 0, 0)]).await;
        let before = checker.store.snapshot().await;
        let _ = checker.check(at(10, 0, 0)).await;
        assert_eq!(checker.store.snapshot().await, before);
    }

    #[test]
    fn past_events_can_overlap() {
        let event = NewEvent {
            title: "done".to_owned(),
            description: "desc".to_owned(),
            time: at(9, 58, 0),
        }
        .into_event(herald_types::EventId(1));
        let matches = find_overlapping(&[event], at(10, 0, 0), Duration::minutes(5));
        assert_eq!(matches.len(), 1);
    }
}
