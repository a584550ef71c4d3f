//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use idadmin_api::state::AppState;
use idadmin_store::InMemoryStore;
use idadmin_test_support::FixedClock;
use tower::ServiceExt;

/// A router plus handles on the state behind it.
pub struct TestApp {
    /// The full router, as served by `main.rs` minus transport layers.
    pub router: Router,
    /// The store behind every request.
    pub store: InMemoryStore,
    /// Shared state, for inspecting subscribers.
    pub state: AppState,
}

/// Build the full app over an empty store and a fixed clock.
pub fn build_test_app() -> TestApp {
    let store = InMemoryStore::new();
    let state = AppState::new(store.clone(), Arc::new(FixedClock::default()));
    TestApp {
        router: idadmin_api::app(state.clone()),
        store,
        state,
    }
}

/// Send a request with an optional JSON body and return the response.
///
/// Empty bodies (e.g. `204`) come back as `Value::Null`.
pub async fn send(
    app: &TestApp,
    method: Method,
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

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a POST request with a JSON body.
pub async fn post_json(
    app: &TestApp,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, Method::POST, uri, Some(body)).await
}

/// Send a PUT request with a JSON body.
pub async fn put_json(
    app: &TestApp,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, Method::PUT, uri, Some(body)).await
}

/// Send a GET request.
pub async fn get_json(app: &TestApp, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, Method::GET, uri, None).await
}

/// Send a DELETE request, with a JSON body when the route needs one.
pub async fn delete(
    app: &TestApp,
    uri: &str,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    send(app, Method::DELETE, uri, body).await
}

/// Subjects of a `400` rejection body, in order.
pub fn subjects(json: &serde_json::Value) -> Vec<String> {
    json["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["subject"].as_str().unwrap().to_owned())
        .collect()
}
