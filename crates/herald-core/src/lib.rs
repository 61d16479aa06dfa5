//! Event lifecycle engine for the Herald reminder service.
//!
//! This crate owns everything between the transport and the blob store:
//! input validation, overlap checks, subscriber fan-out and the periodic
//! sweep that sends reminders and archives completed events.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `herald-config.yaml` into
//!   strongly-typed structs.
//! - [`validation`] -- [`EventDraft`] checks and timestamp parsing.
//! - [`overlap`] -- Proximity checks against the active set.
//! - [`subscriber`] -- [`SubscriberRegistry`] and the [`Subscriber`] trait.
//! - [`scheduler`] -- [`ReminderScheduler`], one sweep at a time.
//! - [`runner`] -- [`run_sweeps`], the periodic loop around the scheduler.
//! - [`service`] -- [`EventService`], the facade used by the transport.
//!
//! Every time-dependent operation takes `now` as an argument; only
//! [`runner::SystemClock`] reads the wall clock.

pub mod config;
pub mod overlap;
pub mod runner;
pub mod scheduler;
pub mod service;
pub mod subscriber;
pub mod validation;

pub use config::HeraldConfig;
pub use overlap::OverlapChecker;
pub use runner::{Clock, SystemClock, run_sweeps};
pub use scheduler::{EventPhase, ReminderScheduler, SweepReport};
pub use service::EventService;
pub use subscriber::{
    BroadcastError, BroadcastReport, ChannelSubscriber, Subscriber, SubscriberId,
    SubscriberRegistry,
};
pub use validation::{EventDraft, ValidationError};
