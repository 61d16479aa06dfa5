//! Periodic sweep loop.
//!
//! [`run_sweeps`] ticks a [`ReminderScheduler`] on a fixed period until a
//! shutdown signal arrives. The first sweep runs immediately so events
//! that fell due while the service was down are archived at start-up.
//! A slow sweep delays the next tick instead of triggering a burst of
//! catch-up sweeps.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::scheduler::ReminderScheduler;

/// Source of the current instant for each sweep.
pub trait Clock: Send + Sync {
    /// The current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Run sweeps every `period` until `shutdown` turns `true` or its sender
/// is dropped. Returns the number of sweeps executed.
pub async fn run_sweeps(
    scheduler: Arc<ReminderScheduler>,
    period: Duration,
    clock: Arc<dyn Clock>,
    mut shutdown: watch::Receiver<bool>,
) -> u64 {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut sweeps: u64 = 0;

    info!(
        period_secs = period.as_secs(),
        lookahead_secs = scheduler.lookahead().num_seconds(),
        "Sweep loop starting"
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                scheduler.sweep(clock.now()).await;
                sweeps = sweeps.saturating_add(1);
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!(sweeps, "Sweep loop stopped");
    sweeps
}
