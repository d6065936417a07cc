// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use activity_tracker::config::Config;
use activity_tracker::db::ActivityStore;
use activity_tracker::models::{ActivityType, NewActivity};
use activity_tracker::routes::create_router;
use activity_tracker::AppState;
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use std::sync::Arc;

/// Create an initialized in-memory store.
#[allow(dead_code)]
pub async fn test_store() -> ActivityStore {
    let store = ActivityStore::in_memory()
        .await
        .expect("Failed to create in-memory store");
    store.initialize().await.expect("Failed to initialize store");
    store
}

/// Create a test app backed by a fresh in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::default(),
        store: test_store().await,
    });

    (create_router(state.clone()), state)
}

/// Insert an activity directly through the store.
#[allow(dead_code)]
pub async fn seed(
    store: &ActivityStore,
    name: &str,
    activity_type: ActivityType,
    duration: f64,
    distance: f64,
) -> i64 {
    store
        .insert(&NewActivity::new(name, activity_type, duration, distance, None))
        .await
        .expect("Failed to seed activity")
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[allow(dead_code)]
pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
