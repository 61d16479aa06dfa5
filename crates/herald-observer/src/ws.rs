//! `WebSocket` subscriber transport.
//!
//! Each connection to `GET /ws` becomes a [`ChannelSubscriber`] in the
//! registry for as long as the socket stays open. Broadcasts are queued
//! on the subscriber's channel and written to the socket by the
//! connection task. Messages from the client are ignored apart from
//! close and ping frames.
//!
//! The per-connection queue is unbounded. Messages for a client that does
//! not drain its socket pile up in memory until the connection ends and
//! the subscriber is removed.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use herald_core::{ChannelSubscriber, Subscriber};
use tracing::debug;

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` subscription.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_subscribe(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Register the connection, pump notifications to it, and unregister on
/// the way out.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let (subscriber, mut rx) = ChannelSubscriber::new();
    let id = subscriber.id();
    state.service.subscribe(Arc::new(subscriber)).await;
    debug!(subscriber = %id, "WebSocket client connected");

    loop {
        tokio::select! {
            queued = rx.recv() => {
                let Some(text) = queued else { break };
                if socket.send(Message::Text(text.into())).await.is_err() {
                    debug!(subscriber = %id, "WebSocket client disconnected (send failed)");
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(subscriber = %id, "WebSocket client disconnected");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(subscriber = %id, error = %e, "WebSocket error");
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.service.unsubscribe(id).await;
}
