//! Persistence layer for the Herald reminder service.
//!
//! State lives in memory and is mirrored to a two-key blob store after
//! every mutation. The active set and the archive are independent JSON
//! arrays; an event id is in exactly one of them at any time.
//!
//! ```text
//! EventStore  --(whole snapshot on add/remove)--> BlobKey::Active
//! ArchiveSink --(read, merge, overwrite)-------> BlobKey::Archive
//! ```
//!
//! # Modules
//!
//! - [`blob`] -- Blob store trait plus file and in-memory backends
//! - [`event_store`] -- The sorted active event set
//! - [`archive`] -- Append-only archive of completed events
//! - [`error`] -- Shared error types

pub mod archive;
pub mod blob;
pub mod error;
pub mod event_store;

// Re-export primary types for convenience.
pub use archive::ArchiveSink;
pub use blob::{BlobKey, BlobStore, FileBlobStore, MemoryBlobStore};
pub use error::DbError;
pub use event_store::EventStore;
