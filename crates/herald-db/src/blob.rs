//! Key-value blob storage for event snapshots.
//!
//! Persistence is modelled as a tiny blob store with two keys, one for the
//! active set and one for the archive. Every write is a whole-value
//! overwrite; there is no append or partial update.
//!
//! # Keys
//!
//! | Key | File (default) | Contents |
//! |-----|----------------|----------|
//! | [`BlobKey::Active`] | `events.json` | Active events, sorted by time |
//! | [`BlobKey::Archive`] | `completed-events.json` | Archived events, append order |

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use herald_types::Event;

use crate::error::DbError;

/// Default file name for the active events blob.
pub const DEFAULT_ACTIVE_FILE: &str = "events.json";

/// Default file name for the archived events blob.
pub const DEFAULT_ARCHIVE_FILE: &str = "completed-events.json";

/// The two blobs the service persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlobKey {
    /// Snapshot of the active event set.
    Active,
    /// Accumulated archive of completed events.
    Archive,
}

impl BlobKey {
    /// Stable name of the key, used in log fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archive => "archive",
        }
    }
}

impl core::fmt::Display for BlobKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synchronous key-value blob storage.
///
/// Implementations must treat a missing key as `Ok(None)` rather than an
/// error, and `save` must replace the previous value entirely.
pub trait BlobStore: Send + Sync {
    /// Read the blob stored under `key`, if any.
    fn load(&self, key: BlobKey) -> Result<Option<Vec<u8>>, DbError>;

    /// Overwrite the blob stored under `key`.
    fn save(&self, key: BlobKey, bytes: &[u8]) -> Result<(), DbError>;
}

/// Load and decode a JSON array of events.
///
/// A missing or blank blob decodes to an empty list.
pub fn load_events(store: &dyn BlobStore, key: BlobKey) -> Result<Vec<Event>, DbError> {
    match store.load(key)? {
        Some(bytes) if !bytes.iter().all(u8::is_ascii_whitespace) => {
            Ok(serde_json::from_slice(&bytes)?)
        }
        _ => Ok(Vec::new()),
    }
}

/// Encode `events` as a pretty-printed JSON array and overwrite `key`.
pub fn save_events(store: &dyn BlobStore, key: BlobKey, events: &[Event]) -> Result<(), DbError> {
    let bytes = serde_json::to_vec_pretty(events)?;
    store.save(key, &bytes)
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Blob store that keeps each key in its own JSON file.
///
/// Writes go to a temporary sibling file that is then renamed over the
/// target, so readers only ever see a complete previous or complete new
/// snapshot.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    active_path: PathBuf,
    archive_path: PathBuf,
}

impl FileBlobStore {
    /// Create a store with explicit file paths for each key.
    pub fn new(active_path: impl Into<PathBuf>, archive_path: impl Into<PathBuf>) -> Self {
        Self {
            active_path: active_path.into(),
            archive_path: archive_path.into(),
        }
    }

    /// Create a store using the default file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(DEFAULT_ACTIVE_FILE), dir.join(DEFAULT_ARCHIVE_FILE))
    }

    /// The file backing `key`.
    pub fn path(&self, key: BlobKey) -> &Path {
        match key {
            BlobKey::Active => &self.active_path,
            BlobKey::Archive => &self.archive_path,
        }
    }
}

impl BlobStore for FileBlobStore {
    fn load(&self, key: BlobKey) -> Result<Option<Vec<u8>>, DbError> {
        let path = self.path(key);
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DbError::io(path, e)),
        }
    }

    fn save(&self, key: BlobKey, bytes: &[u8]) -> Result<(), DbError> {
        let path = self.path(key);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DbError::io(parent, e))?;
        }

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, bytes).map_err(|e| DbError::io(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, path) {
            if let Err(cleanup) = std::fs::remove_file(&tmp) {
                tracing::warn!(
                    path = %tmp.display(),
                    error = %cleanup,
                    "Failed to remove temporary blob file"
                );
            }
            return Err(DbError::io(path, e));
        }

        tracing::debug!(key = %key, path = %path.display(), bytes = bytes.len(), "Blob saved");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Blob store held entirely in memory.
///
/// Used by tests and by ephemeral deployments. Writes can be switched off
/// with [`MemoryBlobStore::set_fail_writes`] to exercise persistence
/// failure paths.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<BlobKey, Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the raw bytes under `key`, bypassing serialization.
    pub fn put_raw(&self, key: BlobKey, bytes: impl Into<Vec<u8>>) {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, bytes.into());
    }

    /// Make every subsequent `save` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Release);
    }
}

impl BlobStore for MemoryBlobStore {
    fn load(&self, key: BlobKey) -> Result<Option<Vec<u8>>, DbError> {
        Ok(self
            .blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned())
    }

    fn save(&self, key: BlobKey, bytes: &[u8]) -> Result<(), DbError> {
        if self.fail_writes.load(Ordering::Acquire) {
            return Err(DbError::Unavailable(format!("writes disabled for {key}")));
        }
        self.put_raw(key, bytes);
        Ok(())
    }
}
