//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`]. Callers in the lifecycle
//! engine treat every variant as a persistence failure: it is logged and
//! the in-memory state stays authoritative.

use std::path::PathBuf;

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Reading or writing a blob file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file that was being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The blob store refused the operation.
    #[error("Blob store unavailable: {0}")]
    Unavailable(String),
}

impl DbError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
