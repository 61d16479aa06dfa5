//! Integration tests for the Herald API endpoints.
//!
//! REST tests drive the `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. The `WebSocket` test binds a real listener on a
//! loopback port and speaks the handshake by hand.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Duration, TimeZone, Utc};
use herald_core::{Clock, EventService, OverlapChecker, SubscriberRegistry};
use herald_db::{EventStore, MemoryBlobStore};
use herald_observer::router::build_router;
use herald_observer::server::ServerConfig;
use herald_observer::startup::spawn_observer;
use herald_observer::state::AppState;
use herald_types::{Event, NewEvent, Notification};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tower::ServiceExt;

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

struct Harness {
    state: Arc<AppState>,
    store: Arc<EventStore>,
    subscribers: Arc<SubscriberRegistry>,
}

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, hour, minute, 0).unwrap()
}

fn harness(now: DateTime<Utc>) -> Harness {
    let store = Arc::new(EventStore::open(Arc::new(MemoryBlobStore::new())));
    let subscribers = Arc::new(SubscriberRegistry::new());
    let overlap = OverlapChecker::new(Arc::clone(&store), Duration::minutes(5));
    let service = Arc::new(EventService::new(
        Arc::clone(&store),
        overlap,
        Arc::clone(&subscribers),
    ));
    let state = Arc::new(AppState::with_clock(service, Arc::new(FixedClock(now))));
    Harness {
        state,
        store,
        subscribers,
    }
}

async fn seed(store: &EventStore, title: &str, time: DateTime<Utc>) -> Event {
    let new_event = NewEvent {
        title: title.to_owned(),
        description: format!("{title} description"),
        time,
    };
    store.add(new_event, at(7, 0)).await
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(state: &Arc<AppState>, request: Request<Body>) -> (StatusCode, Value) {
    let response = build_router(Arc::clone(state)).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// =========================================================================
// POST /events
// =========================================================================

#[tokio::test]
async fn test_create_event_returns_created() {
    let h = harness(at(8, 0));
    let body = serde_json::json!({
        "title": "Standup",
        "description": "Daily sync",
        "time": "2025-01-01T10:00:00Z",
    });

    let (status, json) = send(&h.state, post_json("/events", &body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["title"], "Standup");
    assert_eq!(json["description"], "Daily sync");
    assert_eq!(json["time"], "2025-01-01T10:00:00Z");
    assert!(json["id"].is_i64());
    assert_eq!(h.store.len().await, 1);
}

#[tokio::test]
async fn test_create_event_missing_title_is_bad_request() {
    let h = harness(at(8, 0));
    let body = serde_json::json!({
        "description": "Daily sync",
        "time": "2025-01-01T10:00:00Z",
    });

    let (status, json) = send(&h.state, post_json("/events", &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert_eq!(json["error"], "title is required");
    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn test_create_event_bad_time_is_bad_request() {
    let h = harness(at(8, 0));
    let body = serde_json::json!({
        "title": "Standup",
        "description": "Daily sync",
        "time": "half past ten",
    });

    let (status, json) = send(&h.state, post_json("/events", &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("half past ten"));
    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn test_create_event_malformed_json_is_bad_request() {
    let h = harness(at(8, 0));
    let request = Request::post("/events")
        .header("content-type", "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();

    let (status, json) = send(&h.state, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert!(h.store.is_empty().await);
}

// =========================================================================
// GET /events
// =========================================================================

#[tokio::test]
async fn test_list_events_omits_past_and_sorts() {
    let h = harness(at(9, 30));
    seed(&h.store, "Lunch", at(12, 0)).await;
    seed(&h.store, "Retro", at(9, 0)).await;
    seed(&h.store, "Standup", at(10, 0)).await;

    let (status, json) = send(
        &h.state,
        Request::get("/events").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Standup", "Lunch"]);
}

#[tokio::test]
async fn test_list_events_empty() {
    let h = harness(at(9, 30));

    let (status, json) = send(
        &h.state,
        Request::get("/events").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([]));
}

// =========================================================================
// POST /events/overlap
// =========================================================================

#[tokio::test]
async fn test_overlap_reports_nearby_events() {
    let h = harness(at(8, 0));
    seed(&h.store, "Standup", at(10, 0)).await;
    seed(&h.store, "Lunch", at(12, 0)).await;

    let body = serde_json::json!({ "time": "2025-01-01T10:04:00Z" });
    let (status, json) = send(&h.state, post_json("/events/overlap", &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["overlap"], true);
    assert_eq!(json["overlapping"].as_array().unwrap().len(), 1);
    assert_eq!(json["overlapping"][0]["title"], "Standup");
}

#[tokio::test]
async fn test_overlap_with_nothing_nearby() {
    let h = harness(at(8, 0));
    seed(&h.store, "Standup", at(10, 0)).await;

    let body = serde_json::json!({ "time": "2025-01-01T11:00:00Z" });
    let (status, json) = send(&h.state, post_json("/events/overlap", &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["overlap"], false);
    assert_eq!(json["overlapping"], serde_json::json!([]));
}

#[tokio::test]
async fn test_overlap_requires_a_valid_time() {
    let h = harness(at(8, 0));

    let (status, json) = send(&h.state, post_json("/events/overlap", &serde_json::json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "time is required");

    let body = serde_json::json!({ "time": "soon" });
    let (status, _) = send(&h.state, post_json("/events/overlap", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =========================================================================
// GET /health
// =========================================================================

#[tokio::test]
async fn test_health_reports_counts() {
    let h = harness(at(8, 0));
    seed(&h.store, "Standup", at(10, 0)).await;

    let (status, json) = send(
        &h.state,
        Request::get("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["active_events"], 1);
    assert_eq!(json["subscribers"], 0);
}

// =========================================================================
// GET /ws
// =========================================================================

const UPGRADE_REQUEST: &str = "GET /ws HTTP/1.1\r\n\
    Host: localhost\r\n\
    Connection: Upgrade\r\n\
    Upgrade: websocket\r\n\
    Sec-WebSocket-Version: 13\r\n\
    Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
    \r\n";

async fn read_http_head(stream: &mut TcpStream) -> String {
    let mut head = Vec::new();
    while !head.ends_with(b"\r\n\r\n") {
        head.push(stream.read_u8().await.unwrap());
    }
    String::from_utf8(head).unwrap()
}

/// Read one unfragmented, unmasked server text frame.
async fn read_text_frame(stream: &mut TcpStream) -> String {
    let opcode = stream.read_u8().await.unwrap();
    assert_eq!(opcode, 0x81, "expected a final text frame");
    let len_byte = stream.read_u8().await.unwrap();
    assert_eq!(len_byte & 0x80, 0, "server frames are never masked");
    let len = match len_byte & 0x7F {
        126 => usize::from(stream.read_u16().await.unwrap()),
        127 => usize::try_from(stream.read_u64().await.unwrap()).unwrap(),
        n => usize::from(n),
    };
    let mut payload = vec![0_u8; len];
    stream.read_exact(&mut payload).await.unwrap();
    String::from_utf8(payload).unwrap()
}

async fn wait_for_subscribers(registry: &SubscriberRegistry, expected: usize) {
    for _ in 0..200 {
        if registry.len().await == expected {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("subscriber count never reached {expected}");
}

#[tokio::test]
async fn test_websocket_client_receives_reminders() {
    let h = harness(at(8, 0));
    let config = ServerConfig {
        host: "127.0.0.1".to_owned(),
        port: 0,
    };
    let handle = spawn_observer(&config, Arc::clone(&h.state)).await.unwrap();

    let mut stream = TcpStream::connect(handle.addr).await.unwrap();
    stream.write_all(UPGRADE_REQUEST.as_bytes()).await.unwrap();
    let head = read_http_head(&mut stream).await;
    assert!(head.starts_with("HTTP/1.1 101"), "unexpected response: {head}");

    wait_for_subscribers(&h.subscribers, 1).await;

    let retro = seed(&h.store, "Retro", at(9, 0)).await;
    let report = h.subscribers.broadcast(&Notification::reminder(&retro)).await;
    assert_eq!(report.delivered, 1);

    let json: Value = serde_json::from_str(&read_text_frame(&mut stream).await).unwrap();
    assert_eq!(json["type"], "reminder");
    assert_eq!(json["event"]["title"], "Retro");
    assert_eq!(json["event"]["time"], "2025-01-01T09:00:00Z");

    drop(stream);
    wait_for_subscribers(&h.subscribers, 0).await;

    handle.task.abort();
}

#[tokio::test]
async fn test_spawn_observer_reports_bind_conflict() {
    let h = harness(at(8, 0));
    let first = spawn_observer(
        &ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 0,
        },
        Arc::clone(&h.state),
    )
    .await
    .unwrap();

    let conflict = ServerConfig {
        host: "127.0.0.1".to_owned(),
        port: first.addr.port(),
    };
    assert!(spawn_observer(&conflict, Arc::clone(&h.state)).await.is_err());

    first.task.abort();
}
