//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;
use wheel_core::clock::Clock;
use wheel_core::rng::DeterministicRng;
use wheel_core::store::KeyValueStore;
use wheel_draw::domain::session::{Session, SpinSettings};
use wheel_store::MemoryStore;
use wheel_test_support::{FixedClock, MockRng};

use wheel_api::routes;
use wheel_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock + Send + Sync> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Build state over an empty `MemoryStore` with a deterministic clock and
/// RNG.
pub fn test_state() -> AppState {
    test_state_with(Arc::new(MemoryStore::new()), MockRng)
}

/// Build state over `store`, loading nothing, with a custom RNG for tests
/// that script draws.
pub fn test_state_with(
    store: Arc<dyn KeyValueStore>,
    rng: impl DeterministicRng + Send + 'static,
) -> AppState {
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(rng));
    AppState::new(
        Session::new(),
        store,
        fixed_clock(),
        rng,
        SpinSettings {
            duration_ms: 6_000,
            turns: 10,
        },
    )
}

/// Build the full app router. Uses the same route structure as `main.rs`.
pub fn build_test_app(state: AppState) -> Router {
    routes::build_router(state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a request with a JSON body and return the response.
pub async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a request without a body and return the response.
pub async fn send_empty(app: Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send_empty(app, "GET", uri).await
}

/// Add an item through the API.
pub async fn add_item(state: &AppState, name: &str, weight: i64) {
    let (status, _) = send_json(
        build_test_app(state.clone()),
        "POST",
        "/api/v1/wheel/items",
        &serde_json::json!({ "name": name, "weight": weight }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}
