//! Herald service binary.
//!
//! Loads configuration, opens the file-backed event store, starts the
//! HTTP/`WebSocket` API and runs the reminder sweep loop until Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `herald-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Open the blob files under `storage.data_dir`
//! 4. Build the event store, archive, subscriber registry and scheduler
//! 5. Spawn the API server
//! 6. Run the sweep loop until a shutdown signal arrives

mod error;

use std::path::Path;
use std::sync::Arc;

use herald_core::{
    EventService, HeraldConfig, OverlapChecker, ReminderScheduler, SubscriberRegistry,
    SystemClock, run_sweeps,
};
use herald_db::{ArchiveSink, EventStore, FileBlobStore};
use herald_observer::{AppState, ServerConfig, spawn_observer};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Configuration file looked up in the working directory.
const CONFIG_PATH: &str = "herald-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the API port cannot be
/// bound, or the shutdown handler cannot be installed.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = Path::new(CONFIG_PATH);
    let from_file = config_path.exists();
    let config = load_config(config_path, from_file)?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("herald-engine starting");
    info!(
        from_file,
        host = %config.http.host,
        port = config.http.port,
        data_dir = %config.storage.data_dir.display(),
        sweep_interval_secs = config.scheduler.sweep_interval_secs,
        lookahead_secs = config.scheduler.lookahead_secs,
        overlap_window_secs = config.scheduler.overlap_window_secs,
        "Configuration loaded"
    );

    // 3. Open blob storage.
    let blobs = Arc::new(FileBlobStore::new(
        config.storage.active_path(),
        config.storage.archive_path(),
    ));

    // 4. Wire the core components.
    let store = Arc::new(EventStore::open(blobs.clone()));
    let archive = Arc::new(ArchiveSink::new(blobs));
    let subscribers = Arc::new(SubscriberRegistry::new());
    info!(active_events = store.len().await, "Event store opened");

    let overlap_window = config.scheduler.overlap_window().map_err(EngineError::from)?;
    let lookahead = config.scheduler.lookahead().map_err(EngineError::from)?;
    let overlap = OverlapChecker::new(Arc::clone(&store), overlap_window);
    let service = Arc::new(EventService::new(
        Arc::clone(&store),
        overlap,
        Arc::clone(&subscribers),
    ));
    let scheduler = Arc::new(ReminderScheduler::new(
        store,
        archive,
        subscribers,
        lookahead,
    ));

    // 5. Start the API server.
    let server_config = ServerConfig {
        host: config.http.host.clone(),
        port: config.http.port,
    };
    let observer = spawn_observer(&server_config, Arc::new(AppState::new(service)))
        .await
        .map_err(EngineError::from)?;
    info!(addr = %observer.addr, "API server started");

    // 6. Run the sweep loop until Ctrl-C.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweep_task = tokio::spawn(run_sweeps(
        scheduler,
        config.scheduler.sweep_interval(),
        Arc::new(SystemClock),
        shutdown_rx,
    ));

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| EngineError::Signal {
            message: e.to_string(),
        })?;
    info!("Shutdown signal received");

    if shutdown_tx.send(true).is_err() {
        info!("Sweep loop already stopped");
    }
    let sweeps = sweep_task.await.map_err(|e| EngineError::Sweep {
        message: e.to_string(),
    })?;
    observer.task.abort();

    info!(sweeps, "herald-engine stopped");
    Ok(())
}

/// Load configuration from `path`, or defaults plus environment
/// overrides when the file does not exist.
fn load_config(path: &Path, from_file: bool) -> Result<HeraldConfig, EngineError> {
    if from_file {
        return Ok(HeraldConfig::from_file(path)?);
    }
    let mut config = HeraldConfig::default();
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}
