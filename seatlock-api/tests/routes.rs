use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use seatlock_api::{app, AppState};
use seatlock_core::ManualClock;
use seatlock_engine::{Backend, EngineConfig, SeatEngine};

fn router(seats: u32, backend: Backend) -> (Router, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let engine = SeatEngine::with_clock(EngineConfig::new(seats, backend), clock.clone())
        .expect("engine");
    let state = AppState::new(Arc::new(engine), Duration::from_secs(10));
    (app(state), clock)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
    // Extractor rejections come back as plain text.
    let payload = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, payload)
}

#[tokio::test]
async fn test_health() {
    let (app, _) = router(1, Backend::Locking);
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_hold_confirm_flow() {
    for backend in [Backend::Locking, Backend::Atomic] {
        let (app, _) = router(2, backend);

        let (status, body) = send(&app, "POST", "/hold", Some(json!({ "seat_id": 1, "user_id": "alice" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "held", "seat_id": 1 }));

        let (status, body) = send(&app, "POST", "/hold", Some(json!({ "seat_id": 1, "user_id": "bob" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Seat taken");

        let (status, _) = send(&app, "POST", "/confirm", Some(json!({ "seat_id": 1, "user_id": "bob" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(&app, "POST", "/confirm", Some(json!({ "seat_id": 1, "user_id": "alice" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "sold", "seat_id": 1 }));

        let (status, body) = send(&app, "POST", "/release", Some(json!({ "seat_id": 1 }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Cannot release");

        let (status, body) = send(&app, "GET", "/seats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                { "seat_id": 1, "status": "SOLD", "user_id": "alice" },
                { "seat_id": 2, "status": "AVAILABLE", "user_id": null },
            ])
        );

        let (_, body) = send(&app, "GET", "/stats", None).await;
        assert_eq!(
            body,
            json!({ "available": 1, "held": 0, "sold": 1, "backend": backend.as_str() })
        );
    }
}

#[tokio::test]
async fn test_hold_expires_with_ttl() {
    let (app, clock) = router(1, Backend::Atomic);

    let (status, _) = send(
        &app,
        "POST",
        "/hold",
        Some(json!({ "seat_id": 1, "user_id": "alice", "ttl_seconds": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    clock.advance(Duration::from_millis(2_001));

    let (status, body) = send(&app, "POST", "/confirm", Some(json!({ "seat_id": 1, "user_id": "alice" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Cannot confirm");

    let (status, _) = send(&app, "POST", "/hold", Some(json!({ "seat_id": 1, "user_id": "bob" }))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_release_held_seat() {
    let (app, _) = router(1, Backend::Locking);
    send(&app, "POST", "/hold", Some(json!({ "seat_id": 1, "user_id": "alice" }))).await;

    let (status, body) = send(&app, "POST", "/release", Some(json!({ "seat_id": 1 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "available", "seat_id": 1 }));

    let (_, body) = send(&app, "GET", "/stats", None).await;
    assert_eq!(body["available"], 1);
}

#[tokio::test]
async fn test_unknown_seat_is_not_found() {
    let (app, _) = router(3, Backend::Atomic);
    for seat_id in [0, 4] {
        let (status, _) = send(&app, "POST", "/hold", Some(json!({ "seat_id": seat_id, "user_id": "alice" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "POST", "/release", Some(json!({ "seat_id": seat_id }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_bad_requests_rejected() {
    let (app, _) = router(1, Backend::Locking);

    let (status, _) = send(&app, "POST", "/hold", Some(json!({ "seat_id": 1, "user_id": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/hold",
        Some(json!({ "seat_id": 1, "user_id": "alice", "ttl_seconds": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Past the representable deadline range.
    let (status, body) = send(
        &app,
        "POST",
        "/hold",
        Some(json!({ "seat_id": 1, "user_id": "alice", "ttl_seconds": 400_000_000_u64 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("ttl_seconds must be at most"));

    // Missing user_id never reaches the handler.
    let (status, _) = send(&app, "POST", "/hold", Some(json!({ "seat_id": 1 }))).await;
    assert!(status.is_client_error());

    let (_, body) = send(&app, "GET", "/stats", None).await;
    assert_eq!(body["available"], 1);
}

#[tokio::test]
async fn test_longest_ttl_still_accepted() {
    let (app, _) = router(1, Backend::Atomic);
    // Just under 2^38 ms.
    let (status, _) = send(
        &app,
        "POST",
        "/hold",
        Some(json!({ "seat_id": 1, "user_id": "alice", "ttl_seconds": 274_877_906_u64 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
