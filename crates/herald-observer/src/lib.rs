//! HTTP and `WebSocket` API for the Herald reminder service.
//!
//! This crate exposes the event operations of [`herald_core::EventService`]
//! over REST and turns each `WebSocket` connection into a live subscriber:
//!
//! - **REST endpoints** for adding events, listing upcoming events and
//!   checking for overlaps, plus a `/health` probe
//! - **`WebSocket` endpoint** (`/ws`) delivering reminder notifications as
//!   JSON text frames
//!
//! Handlers never read the wall clock directly; they ask the clock held
//! in [`AppState`], which tests replace with a fixed instant.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ObserverError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError};
pub use startup::{ObserverHandle, StartupError, spawn_observer};
pub use state::AppState;
