//! Shared type definitions for the Herald event reminder service.
//!
//! This crate is the single source of truth for the types that cross crate
//! boundaries: the persisted event records, the overlap report returned to
//! API callers and the notifications pushed to subscribers. Types flow
//! downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Timestamp-derived event identifiers
//! - [`structs`] -- Event and overlap report structs
//! - [`messages`] -- Notifications broadcast to subscribers

pub mod ids;
pub mod messages;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use ids::EventId;
pub use messages::Notification;
pub use structs::{Event, NewEvent, OverlapReport};
