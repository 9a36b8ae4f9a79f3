//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use stringart_core::clock::Clock;
use stringart_core::progress::ProgressStore;
use stringart_core::source::ThreadSource;
use stringart_playback::application::engine::{EngineConfig, EnginePorts};
use stringart_playback::domain::layout::BoardLayout;
use stringart_store::MemoryProgressStore;
use stringart_test_support::{FixedClock, StaticThreadSource};
use tower::ServiceExt;

use stringart_api::state::AppState;

/// Root of the thread-data API as seen by the tests.
pub const THREAD_API_BASE_URL: &str = "http://threads.test";

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Application state over a 180-pin board serving `pins` for every link.
pub fn test_state(pins: Vec<u32>) -> AppState {
    test_state_with(
        Arc::new(StaticThreadSource::new(pins)),
        Arc::new(MemoryProgressStore::new()),
    )
}

/// Application state over a 180-pin board with the given collaborators.
pub fn test_state_with(source: Arc<dyn ThreadSource>, store: Arc<dyn ProgressStore>) -> AppState {
    let ports = EnginePorts {
        source,
        store,
        narrators: None,
        clock: fixed_clock(),
    };
    let config = EngineConfig::new(BoardLayout::quartered(180).unwrap());
    AppState::new(ports, config, THREAD_API_BASE_URL)
}

/// Build the full app router. Uses the same route structure as `main.rs`.
pub fn build_test_app(state: AppState) -> Router {
    stringart_api::build_router(state)
}

/// Send a request and return the status and decoded JSON body, `Null` when
/// the body is empty.
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, Some(body)).await
}

/// Send a POST request without a body and return the response.
pub async fn post(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, None).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, None).await
}

/// Send a DELETE request and return the response.
pub async fn delete(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "DELETE", uri, None).await
}
