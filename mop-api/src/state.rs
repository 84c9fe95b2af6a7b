use mop_orchestrator::{OrchestratorSettings, WorkspaceOrchestrator, WorkspaceService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: WorkspaceOrchestrator,
    /// Short name of the group whose members may use the tool.
    pub required_group: String,
}

impl AppState {
    pub fn new(
        service: Arc<dyn WorkspaceService>,
        settings: OrchestratorSettings,
        required_group: impl Into<String>,
    ) -> Self {
        Self {
            orchestrator: WorkspaceOrchestrator::new(service, settings),
            required_group: required_group.into(),
        }
    }

    pub fn required_group_email(&self) -> String {
        format!("{}@firecloud.org", self.required_group)
    }
}
