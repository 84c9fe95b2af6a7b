use crate::routes::session::SessionInfo;
use mop_orchestrator::{
    MopReport, MopRequest, MopSummary, SubmissionOutcome, WorkspaceCostEntry, WorkspaceRef,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::health::readiness_check,
        crate::routes::workspaces::list_workspaces,
        crate::routes::mop::submit_mop,
        crate::routes::session::get_session,
        crate::routes::session::request_group_access,
    ),
    components(
        schemas(
            WorkspaceRef,
            WorkspaceCostEntry,
            MopRequest,
            MopSummary,
            MopReport,
            SubmissionOutcome,
            SessionInfo
        )
    ),
    tags(
        (name = "mop-api", description = "Workspace cost listing and mop job submission")
    )
)]
pub struct ApiDoc;
