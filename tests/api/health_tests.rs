//! Health Check API Tests

use std::sync::Arc;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use sociostack::infrastructure::images::DisabledImageHost;
use sociostack::infrastructure::pubsub::SubscriptionStatus;
use sociostack::startup::AppState;

use crate::common::{test_settings, TestApp};

#[tokio::test]
async fn test_health_check_returns_ok() {
    let app = TestApp::new();

    let response = app.get("/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert!(response.body.get("version").is_some());
}

#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::new();

    let response = app.get("/health/live", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "alive");
}

#[tokio::test]
async fn test_readiness_with_memory_store() {
    let app = TestApp::new();

    let response = app.get("/health/ready", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["checks"]["database"]["message"], "In-memory store");
    assert_eq!(response.body["checks"]["relay"]["distributed"], false);
    assert_eq!(response.body["checks"]["relay"]["active_connections"], 0);
}

#[tokio::test]
async fn test_readiness_degraded_while_relay_subscription_is_down() {
    let mut state = AppState::in_memory(test_settings(), Arc::new(DisabledImageHost));
    state.relay_subscription = Some(SubscriptionStatus::default());
    let app = TestApp::with_state(state);

    let response = app.get("/health/ready", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "degraded");
    assert_eq!(response.body["checks"]["relay"]["status"], "degraded");
    assert_eq!(response.body["checks"]["relay"]["subscribed"], false);
}

#[tokio::test]
async fn test_metrics_exposes_request_counter() {
    let app = TestApp::new();
    app.get("/health", None).await;

    let response = app.get("/metrics", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let text = response.body.as_str().unwrap();
    assert!(text.contains("sociostack_http_requests_total"));
}
