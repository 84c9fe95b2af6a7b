use crate::client::WorkspaceService;
use crate::settings::OrchestratorSettings;
use std::sync::Arc;

/// Entry point for the cost listing and mop submission flows.
///
/// Cheap to clone; holds no per-request state. The caller's identity arrives
/// with each call as a [`crate::RequestContext`].
#[derive(Clone)]
pub struct WorkspaceOrchestrator {
    pub(crate) service: Arc<dyn WorkspaceService>,
    pub(crate) settings: Arc<OrchestratorSettings>,
}

impl WorkspaceOrchestrator {
    pub fn new(service: Arc<dyn WorkspaceService>, settings: OrchestratorSettings) -> Self {
        Self {
            service,
            settings: Arc::new(settings),
        }
    }

    /// The remote client this orchestrator dispatches to.
    pub fn service(&self) -> &Arc<dyn WorkspaceService> {
        &self.service
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }
}
