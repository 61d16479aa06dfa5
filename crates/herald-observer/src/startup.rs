//! Server startup helper for embedding in the engine binary.
//!
//! [`spawn_observer`] binds the listener in the caller's task, so a port
//! conflict is reported immediately, then serves on a background task.
//!
//! ```rust,ignore
//! use herald_observer::server::ServerConfig;
//! use herald_observer::startup::spawn_observer;
//!
//! let handle = spawn_observer(&ServerConfig::default(), state).await?;
//! tracing::info!(addr = %handle.addr, "API up");
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{self, ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// A running API server.
#[derive(Debug)]
pub struct ObserverHandle {
    /// Address the listener is bound to.
    pub addr: SocketAddr,
    /// Background serve task. Abort it to stop the server.
    pub task: JoinHandle<()>,
}

/// Bind `config` and serve the API on a background Tokio task.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the address is invalid or the port
/// cannot be bound.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<ObserverHandle, StartupError> {
    let listener = server::bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("no local address: {e}")))?;

    let task = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state).await {
            tracing::error!(error = %e, "API server exited with error");
        }
    });

    tracing::info!(%addr, "API server spawned on background task");

    Ok(ObserverHandle { addr, task })
}
