use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is running"))
)]
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "mop-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses((status = 200, description = "Readiness, including reachability of the remote workspace service"))
)]
pub async fn readiness_check(State(state): State<AppState>) -> Json<Value> {
    // Check the remote workspace service
    let remote_ok = state.orchestrator.service().health().await.is_ok();

    Json(json!({
        "status": if remote_ok { "ready" } else { "not_ready" },
        "service": "mop-api",
        "version": env!("CARGO_PKG_VERSION"),
        "remote": if remote_ok { "reachable" } else { "unreachable" }
    }))
}
