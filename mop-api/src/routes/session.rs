use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use utoipa::ToSchema;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/session", get(get_session))
        .route("/api/v1/group-access", post(request_group_access))
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionInfo {
    /// Account behind the service's credentials.
    pub user: String,
    pub required_group: String,
    pub has_group_access: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/session",
    tag = "session",
    responses(
        (status = 200, description = "Identity behind the configured credentials and its group membership", body = SessionInfo),
        (status = 401, description = "Credentials could not be verified")
    )
)]
pub async fn get_session(State(state): State<AppState>) -> ApiResult<Json<SessionInfo>> {
    let service = state.orchestrator.service();

    let user = service
        .current_user()
        .await
        .map_err(|e| ApiError::from_service("Failed to verify credentials", e))?;

    let group_email = state.required_group_email();
    let groups = service
        .list_groups()
        .await
        .map_err(|e| ApiError::from_service("Failed to list groups", e))?;
    let has_group_access = groups.iter().any(|g| g.group_email == group_email);

    if !has_group_access {
        warn!(user = %user, group = %group_email, "User is not a member of the required group");
    }

    Ok(Json(SessionInfo {
        user,
        required_group: state.required_group.clone(),
        has_group_access,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/group-access",
    tag = "session",
    responses(
        (status = 200, description = "Access to the required group was requested"),
        (status = 502, description = "The remote service refused the request")
    )
)]
pub async fn request_group_access(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state
        .orchestrator
        .service()
        .request_group_access(&state.required_group)
        .await
        .map_err(|e| ApiError::from_service("Failed to request group access", e))?;

    info!(group = %state.required_group, "Requested group access");

    Ok(Json(json!({
        "message": format!("Access to {} requested", state.required_group)
    })))
}
