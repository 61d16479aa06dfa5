//! Append-only archive of completed events.
//!
//! The archive blob holds every event that has left the active set. Each
//! [`ArchiveSink::append`] reads the current archive, concatenates the new
//! batch and writes the merged array back. Nothing is ever deleted.
//!
//! A corrupt or unreadable archive does not stop the sweep: the prior
//! contents are treated as empty and the batch is still written.

use std::sync::Arc;

use herald_types::Event;
use tokio::sync::Mutex;

use crate::blob::{self, BlobKey, BlobStore};
use crate::error::DbError;

/// Writer for the [`BlobKey::Archive`] blob.
pub struct ArchiveSink {
    blobs: Arc<dyn BlobStore>,
    /// Serializes read-merge-write cycles.
    write_lock: Mutex<()>,
}

impl ArchiveSink {
    /// Create a sink writing through `blobs`.
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            blobs,
            write_lock: Mutex::new(()),
        }
    }

    /// Append `events` to the archive.
    ///
    /// Returns the number of records in the archive after the write. An
    /// empty batch performs no I/O and returns `Ok(0)`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the merged archive cannot be written. A
    /// failure to read the prior archive is logged and is not an error.
    pub async fn append(&self, events: &[Event]) -> Result<usize, DbError> {
        if events.is_empty() {
            return Ok(0);
        }

        let _guard = self.write_lock.lock().await;

        let mut archived = match blob::load_events(self.blobs.as_ref(), BlobKey::Archive) {
            Ok(existing) => existing,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Archive unreadable, treating prior contents as empty"
                );
                Vec::new()
            }
        };
        archived.extend_from_slice(events);

        blob::save_events(self.blobs.as_ref(), BlobKey::Archive, &archived)?;

        tracing::info!(
            appended = events.len(),
            total = archived.len(),
            "Completed events archived"
        );
        Ok(archived.len())
    }

    /// Read the full archive.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the archive cannot be read or decoded.
    pub fn load(&self) -> Result<Vec<Event>, DbError> {
        blob::load_events(self.blobs.as_ref(), BlobKey::Archive)
    }
}
