//! Common test utilities and helpers for mop-api tests
//!
//! Builds the router around the scripted workspace service so each test can
//! assert both the HTTP response and the remote calls it caused.

#![allow(dead_code)]

use axum::{body::Body, http::Request, Router};
use mop_api::{create_app, AppState};
use mop_orchestrator::test_utils::MockWorkspaceService;
use mop_orchestrator::OrchestratorSettings;
use std::sync::Arc;

/// Create a test app backed by the given mock with default settings
pub fn create_test_app(mock: Arc<MockWorkspaceService>) -> Router {
    create_test_app_with_settings(mock, OrchestratorSettings::default())
}

pub fn create_test_app_with_settings(
    mock: Arc<MockWorkspaceService>,
    settings: OrchestratorSettings,
) -> Router {
    create_app(AppState::new(mock, settings, "automop_users"))
}

/// Helper to extract JSON body from axum response
pub async fn extract_json_body<T>(response: axum::response::Response) -> T
where
    T: serde::de::DeserializeOwned,
{
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");

    serde_json::from_slice(&body).expect("Failed to deserialize JSON")
}

pub fn get(uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user", user);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, user: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header("x-user", user);
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}
