use crate::client::{MethodConfig, ServiceError, SubmissionOptions, WorkspaceService};
use crate::dispatch::dispatch;
use crate::error::{Result, ValidationError};
use crate::orchestrator::WorkspaceOrchestrator;
use crate::settings::OrchestratorSettings;
use crate::workspace::{RequestContext, WorkspaceRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};
use utoipa::ToSchema;

pub const ALL_SUBMITTED_STATUS: &str = "All mop jobs submitted successfully.";
pub const SOME_FAILED_STATUS: &str = "There have been errors submitting the mop jobs:";

const ALL_SUBMITTED_HINT: &str = "You can now close this tab and stop the service.";
const SOME_FAILED_HINT: &str =
    "If the cause is not obvious, please share the error messages shown below with the maintainers.";

/// Write request: an explicit opt-in plus the workspaces to mop.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct MopRequest {
    #[serde(default)]
    pub confirm_delete: bool,
    #[serde(default)]
    pub workspaces: Vec<WorkspaceRef>,
}

impl MopRequest {
    /// Check the preconditions, returning the acting user.
    ///
    /// Order matters: confirmation, then selection, then identity.
    pub fn validate<'a>(&self, ctx: &'a RequestContext) -> std::result::Result<&'a str, ValidationError> {
        if !self.confirm_delete {
            return Err(ValidationError::NotConfirmed);
        }
        if self.workspaces.is_empty() {
            return Err(ValidationError::NoWorkspacesSelected);
        }
        match ctx.user.as_deref().map(str::trim) {
            Some(user) if !user.is_empty() => Ok(user),
            _ => Err(ValidationError::MissingIdentity),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Success { submission_id: String },
    Failure { message: String },
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MopReport {
    pub namespace: String,
    pub name: String,
    pub outcome: SubmissionOutcome,
    /// Job history page of the submission, present on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_url: Option<String>,
}

impl MopReport {
    pub fn new(workspace: WorkspaceRef, outcome: SubmissionOutcome, job_history_url: &str) -> Self {
        let submission_url = match &outcome {
            SubmissionOutcome::Success { submission_id } => Some(format!(
                "{}/{}/{}/job_history/{}",
                job_history_url.trim_end_matches('/'),
                workspace.namespace,
                workspace.name,
                submission_id
            )),
            SubmissionOutcome::Failure { .. } => None,
        };

        Self {
            namespace: workspace.namespace,
            name: workspace.name,
            outcome,
            submission_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MopSummary {
    /// True iff every workspace reached `success`.
    pub all_ok: bool,
    pub status: String,
    pub finished_message: String,
    pub results: Vec<MopReport>,
}

impl MopSummary {
    pub fn from_reports(results: Vec<MopReport>) -> Self {
        let all_ok = results.iter().all(|r| r.outcome.is_success());
        let (status, finished_message) = if all_ok {
            (ALL_SUBMITTED_STATUS, ALL_SUBMITTED_HINT)
        } else {
            (SOME_FAILED_STATUS, SOME_FAILED_HINT)
        };

        Self {
            all_ok,
            status: status.to_string(),
            finished_message: finished_message.to_string(),
            results,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MopStep {
    CreateConfig,
    CreateSubmission,
    DeleteConfig,
}

impl fmt::Display for MopStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MopStep::CreateConfig => write!(f, "create method config"),
            MopStep::CreateSubmission => write!(f, "create submission"),
            MopStep::DeleteConfig => write!(f, "delete method config"),
        }
    }
}

fn step_failed(step: MopStep, workspace: &WorkspaceRef, err: ServiceError) -> SubmissionOutcome {
    warn!(
        namespace = %workspace.namespace,
        name = %workspace.name,
        "Mop of {} failed at {}: {}",
        workspace,
        step,
        err
    );
    SubmissionOutcome::Failure {
        message: err.message(),
    }
}

/// Create config, submit, delete config. Stops at the first failing step.
///
/// A failed delete still marks the workspace as failed even though the job
/// was already submitted.
async fn run_mop_sequence(
    service: &dyn WorkspaceService,
    settings: &OrchestratorSettings,
    workspace: &WorkspaceRef,
    user: &str,
) -> SubmissionOutcome {
    let method = &settings.method;
    let config = MethodConfig::mop(method, workspace, user, settings.dry_run);

    if let Err(e) = service.create_workspace_config(workspace, &config).await {
        return step_failed(MopStep::CreateConfig, workspace, e);
    }

    let submission = match service
        .create_submission(
            workspace,
            &method.namespace,
            &method.name,
            SubmissionOptions::mop(),
        )
        .await
    {
        Ok(submission) => submission,
        Err(e) => return step_failed(MopStep::CreateSubmission, workspace, e),
    };

    if let Err(e) = service
        .delete_workspace_config(workspace, &method.namespace, &method.name)
        .await
    {
        return step_failed(MopStep::DeleteConfig, workspace, e);
    }

    info!(
        namespace = %workspace.namespace,
        name = %workspace.name,
        submission_id = %submission.submission_id,
        "Mop job submitted"
    );

    SubmissionOutcome::Success {
        submission_id: submission.submission_id,
    }
}

impl WorkspaceOrchestrator {
    /// Submit one mop job per selected workspace.
    ///
    /// Rejects the whole request before any remote call if a precondition is
    /// missing. After that, failures are per-workspace data in the summary,
    /// reported in the order the workspaces were selected.
    pub async fn submit_mop(&self, ctx: &RequestContext, request: MopRequest) -> Result<MopSummary> {
        let user = request.validate(ctx)?.to_string();

        info!(
            user = %user,
            count = request.workspaces.len(),
            dry_run = self.settings.dry_run,
            "Submitting mop jobs"
        );

        let service = self.service.clone();
        let settings = self.settings.clone();
        let outcomes = dispatch(
            request.workspaces.clone(),
            self.settings.max_concurrency,
            move |workspace| {
                let service = service.clone();
                let settings = settings.clone();
                let user = user.clone();
                async move { run_mop_sequence(service.as_ref(), &settings, &workspace, &user).await }
            },
        )
        .await;

        let reports = request
            .workspaces
            .into_iter()
            .zip(outcomes)
            .map(|(workspace, outcome)| {
                let outcome = outcome.unwrap_or_else(|e| {
                    warn!("Mop task for {} did not complete: {}", workspace, e);
                    SubmissionOutcome::Failure {
                        message: format!("mop task failed: {e}"),
                    }
                });
                MopReport::new(workspace, outcome, &self.settings.job_history_url)
            })
            .collect();

        let summary = MopSummary::from_reports(reports);
        if summary.all_ok {
            info!("All mop jobs submitted");
        } else {
            warn!(
                failed = summary.results.iter().filter(|r| !r.outcome.is_success()).count(),
                "Some mop jobs failed to submit"
            );
        }

        Ok(summary)
    }
}
