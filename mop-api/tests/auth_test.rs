//! Integration tests for the identity middleware
//!
//! Tests that the middleware resolves the user from the proxy headers in
//! order of precedence and never rejects a request on its own.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    routing::get,
    Extension, Json, Router,
};
use mop_api::auth::identity_middleware;
use mop_orchestrator::RequestContext;
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

// Echoes the resolved identity
async fn whoami(Extension(ctx): Extension<RequestContext>) -> Json<Value> {
    Json(json!({ "user": ctx.user }))
}

fn create_test_app() -> Router {
    Router::new()
        .route("/whoami", get(whoami))
        .layer(middleware::from_fn(identity_middleware))
}

async fn resolve(headers: &[(&str, &str)]) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri("/whoami");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let response = create_test_app()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_x_user_header_is_used() {
    let (status, body) = resolve(&[("x-user", "alice@example.org")]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"], "alice@example.org");
}

#[tokio::test]
async fn test_forwarded_email_header_is_used() {
    let (_, body) = resolve(&[("x-forwarded-email", "bob@example.org")]).await;

    assert_eq!(body["user"], "bob@example.org");
}

#[tokio::test]
async fn test_mop_user_header_takes_precedence() {
    let (_, body) = resolve(&[
        ("x-user", "dev@example.org"),
        ("x-forwarded-email", "proxy@example.org"),
        ("x-mop-user", "carol@example.org"),
    ])
    .await;

    assert_eq!(body["user"], "carol@example.org");
}

#[tokio::test]
async fn test_forwarded_email_beats_dev_fallback() {
    let (_, body) = resolve(&[
        ("x-user", "dev@example.org"),
        ("x-forwarded-email", "proxy@example.org"),
    ])
    .await;

    assert_eq!(body["user"], "proxy@example.org");
}

#[tokio::test]
async fn test_header_value_is_trimmed() {
    let (_, body) = resolve(&[("x-user", "  alice@example.org ")]).await;

    assert_eq!(body["user"], "alice@example.org");
}

#[tokio::test]
async fn test_blank_header_means_anonymous() {
    let (status, body) = resolve(&[("x-user", "   ")]).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["user"].is_null());
}

#[tokio::test]
async fn test_missing_headers_are_not_rejected() {
    let (status, body) = resolve(&[]).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["user"].is_null());
}
