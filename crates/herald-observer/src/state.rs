//! Shared application state for the Herald API server.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use herald_core::{Clock, EventService, SystemClock};

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. Every
/// handler goes through the [`EventService`]; the clock supplies `now`
/// for listing and adding events.
#[derive(Clone)]
pub struct AppState {
    /// Event operations and subscriber membership.
    pub service: Arc<EventService>,
    /// Source of the request-time instant.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create state that reads the wall clock.
    pub fn new(service: Arc<EventService>) -> Self {
        Self::with_clock(service, Arc::new(SystemClock))
    }

    /// Create state with an explicit clock.
    pub const fn with_clock(service: Arc<EventService>, clock: Arc<dyn Clock>) -> Self {
        Self { service, clock }
    }

    /// The current instant according to the configured clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
