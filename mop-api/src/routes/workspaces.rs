use crate::{error::ApiResult, state::AppState};
use axum::{extract::State, routing::get, Extension, Json, Router};
use mop_orchestrator::{RequestContext, WorkspaceCostEntry};

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/workspaces", get(list_workspaces))
}

/// Eligible workspaces with their storage cost estimate, cheapest first.
#[utoipa::path(
    get,
    path = "/api/v1/workspaces",
    tag = "workspaces",
    responses(
        (status = 200, description = "Workspaces sorted by estimated storage cost, unavailable estimates last", body = [WorkspaceCostEntry]),
        (status = 401, description = "The remote service rejected the configured credentials"),
        (status = 502, description = "The workspace listing failed")
    )
)]
pub async fn list_workspaces(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> ApiResult<Json<Vec<WorkspaceCostEntry>>> {
    let costs = state.orchestrator.workspace_costs(&ctx).await?;

    Ok(Json(costs))
}
