//! Error types for the engine binary.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error so `main` can propagate
/// with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: herald_core::config::ConfigError,
    },

    /// The API server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying startup error.
        #[from]
        source: herald_observer::StartupError,
    },

    /// Installing the shutdown signal handler failed.
    #[error("signal error: {message}")]
    Signal {
        /// Description of the signal failure.
        message: String,
    },

    /// The sweep loop task panicked or was cancelled.
    #[error("sweep loop error: {message}")]
    Sweep {
        /// Description of the task failure.
        message: String,
    },
}
