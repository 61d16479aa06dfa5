//! REST endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/events` | Validate and add an event |
//! | `GET` | `/events` | Upcoming events, ordered by time |
//! | `POST` | `/events/overlap` | Active events near a candidate time |
//! | `GET` | `/health` | Liveness plus active and subscriber counts |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use herald_core::EventDraft;
use herald_core::validation::{self, ValidationError};

use crate::error::ObserverError;
use crate::state::AppState;

/// Request body for `POST /events/overlap`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct OverlapRequest {
    /// Candidate time as an ISO-8601 string.
    #[serde(default)]
    pub time: Option<String>,
}

// ---------------------------------------------------------------------------
// POST /events
// ---------------------------------------------------------------------------

/// Validate the body and add the event to the active set.
///
/// Responds `201 Created` with the stored event.
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    body: Result<Json<EventDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Json(draft) = body.map_err(|e| ObserverError::InvalidBody(e.body_text()))?;
    let event = state.service.add_event(&draft, state.now()).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

// ---------------------------------------------------------------------------
// GET /events
// ---------------------------------------------------------------------------

/// List active events scheduled after the current instant.
pub async fn list_events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.service.list_upcoming(state.now()).await)
}

// ---------------------------------------------------------------------------
// POST /events/overlap
// ---------------------------------------------------------------------------

/// Report active events within the overlap window of the requested time.
pub async fn check_overlap(
    State(state): State<Arc<AppState>>,
    body: Result<Json<OverlapRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Json(request) = body.map_err(|e| ObserverError::InvalidBody(e.body_text()))?;
    let raw = request
        .time
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ValidationError::MissingField("time"))?;
    let candidate = validation::parse_event_time(raw)?;

    Ok(Json(state.service.check_overlap(candidate).await))
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Liveness probe.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "active_events": state.service.active_count().await,
        "subscribers": state.service.subscriber_count().await,
    }))
}
