use crate::client::MethodIdentity;
use crate::dispatch::DEFAULT_MAX_CONCURRENCY;
use crate::workspace::AccessPolicy;

/// Knobs the cost pipeline and the mop orchestrator share.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub max_concurrency: usize,
    pub access_policy: AccessPolicy,
    pub dry_run: bool,
    pub method: MethodIdentity,
    /// Prefix for links to a submission's job history page.
    pub job_history_url: String,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            access_policy: AccessPolicy::default(),
            dry_run: false,
            method: MethodIdentity::default(),
            job_history_url: "https://app.terra.bio/#workspaces".to_string(),
        }
    }
}
