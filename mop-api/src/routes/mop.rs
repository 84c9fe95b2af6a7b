use crate::{error::ApiResult, state::AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Extension, Json, Router,
};
use mop_orchestrator::{MopRequest, MopSummary, RequestContext};

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/mop", post(submit_mop))
}

/// Submit one mop job per selected workspace.
///
/// Per-workspace failures are reported in the body with a 200; only a
/// rejected request (missing confirmation, empty selection, unknown user)
/// returns an error status.
#[utoipa::path(
    post,
    path = "/api/v1/mop",
    tag = "mop",
    request_body = MopRequest,
    responses(
        (status = 200, description = "Per-workspace submission report", body = MopSummary),
        (status = 400, description = "Malformed body, or request rejected before any job was submitted")
    )
)]
pub async fn submit_mop(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<MopRequest>, JsonRejection>,
) -> ApiResult<Json<MopSummary>> {
    let Json(req) = payload?;
    let summary = state.orchestrator.submit_mop(&ctx, req).await?;

    Ok(Json(summary))
}
