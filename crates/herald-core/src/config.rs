//! Configuration loading and typed config structures for Herald.
//!
//! The configuration lives in `herald-config.yaml` in the working
//! directory. Every field has a default, so a missing file or a partial
//! file is valid. A few deployment settings can be overridden from the
//! environment.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
///
/// Mirrors the structure of `herald-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HeraldConfig {
    /// HTTP and `WebSocket` listener.
    #[serde(default)]
    pub http: HttpConfig,

    /// Blob file locations.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Sweep cadence and time windows.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HeraldConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `HERALD_HOST` overrides `http.host`
    /// - `HERALD_PORT` overrides `http.port`
    /// - `HERALD_DATA_DIR` overrides `storage.data_dir`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `HERALD_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("HERALD_HOST") {
            self.http.host = val;
        }
        if let Ok(val) = std::env::var("HERALD_PORT") {
            match val.parse() {
                Ok(port) => self.http.port = port,
                Err(e) => tracing::warn!(value = %val, error = %e, "Ignoring invalid HERALD_PORT"),
            }
        }
        if let Ok(val) = std::env::var("HERALD_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(val);
        }
    }

    /// Reject values the scheduler cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "scheduler.sweep_interval_secs",
                reason: "must be at least 1".to_owned(),
            });
        }
        self.scheduler.lookahead()?;
        self.scheduler.overlap_window()?;
        Ok(())
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port for the REST API and `/ws`.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Where the active and archive blobs are written.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Directory holding both files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// File name of the active events snapshot.
    #[serde(default = "default_active_file")]
    pub active_file: String,

    /// File name of the archive.
    #[serde(default = "default_archive_file")]
    pub archive_file: String,
}

impl StorageConfig {
    /// Full path of the active events file.
    pub fn active_path(&self) -> PathBuf {
        self.data_dir.join(&self.active_file)
    }

    /// Full path of the archive file.
    pub fn archive_path(&self) -> PathBuf {
        self.data_dir.join(&self.archive_file)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            active_file: default_active_file(),
            archive_file: default_archive_file(),
        }
    }
}

/// Sweep cadence and time windows.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between sweep ticks.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// How far ahead of an event its reminder fires, in seconds.
    #[serde(default = "default_window_secs")]
    pub lookahead_secs: u64,

    /// Proximity window used by overlap checks, in seconds.
    #[serde(default = "default_window_secs")]
    pub overlap_window_secs: u64,
}

impl SchedulerConfig {
    /// Sweep period as a [`std::time::Duration`].
    pub const fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs)
    }

    /// Reminder lookahead as a [`chrono::Duration`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the value does not fit a
    /// [`chrono::Duration`].
    pub fn lookahead(&self) -> Result<chrono::Duration, ConfigError> {
        secs_to_duration(self.lookahead_secs, "scheduler.lookahead_secs")
    }

    /// Overlap proximity window as a [`chrono::Duration`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the value does not fit a
    /// [`chrono::Duration`].
    pub fn overlap_window(&self) -> Result<chrono::Duration, ConfigError> {
        secs_to_duration(self.overlap_window_secs, "scheduler.overlap_window_secs")
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            lookahead_secs: default_window_secs(),
            overlap_window_secs: default_window_secs(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn secs_to_duration(secs: u64, field: &'static str) -> Result<chrono::Duration, ConfigError> {
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .ok_or_else(|| ConfigError::Invalid {
            field,
            reason: format!("{secs} seconds is out of range"),
        })
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    3000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_active_file() -> String {
    herald_db::blob::DEFAULT_ACTIVE_FILE.to_owned()
}

fn default_archive_file() -> String {
    herald_db::blob::DEFAULT_ARCHIVE_FILE.to_owned()
}

const fn default_sweep_interval_secs() -> u64 {
    60
}

const fn default_window_secs() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_owned()
}
