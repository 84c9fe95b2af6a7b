//! Scripted in-memory [`WorkspaceService`] for tests.
//!
//! Every workspace-level call is recorded, can be delayed per workspace, and
//! can be made to fail or panic per workspace and step. Unscripted cost
//! lookups fail with a 404 so a forgotten fixture shows up as `N/A`.

use crate::client::{
    Group, MethodConfig, ServiceError, ServiceResult, StorageCostEstimate, Submission,
    SubmissionOptions, WorkspaceService,
};
use crate::workspace::{AccessLevel, WorkspaceListing, WorkspaceRef};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockCall {
    ListWorkspaces,
    GetStorageCost,
    CreateConfig,
    CreateSubmission,
    DeleteConfig,
    Health,
    CurrentUser,
    ListGroups,
    RequestGroupAccess,
}

pub struct MockWorkspaceService {
    listing: ServiceResult<Vec<WorkspaceListing>>,
    costs: HashMap<WorkspaceRef, ServiceResult<String>>,
    latencies: HashMap<WorkspaceRef, Duration>,
    failures: HashMap<(MockCall, WorkspaceRef), ServiceError>,
    panics: HashSet<(MockCall, WorkspaceRef)>,
    user: ServiceResult<String>,
    groups: ServiceResult<Vec<Group>>,
    healthy: bool,
    group_access_error: Option<ServiceError>,
    calls: Mutex<Vec<(MockCall, Option<WorkspaceRef>)>>,
    configs: Mutex<Vec<MethodConfig>>,
    submissions: Mutex<Vec<(WorkspaceRef, String, String, SubmissionOptions)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for MockWorkspaceService {
    fn default() -> Self {
        Self {
            listing: Ok(Vec::new()),
            costs: HashMap::new(),
            latencies: HashMap::new(),
            failures: HashMap::new(),
            panics: HashSet::new(),
            user: Ok("tester@example.org".to_string()),
            groups: Ok(Vec::new()),
            healthy: true,
            group_access_error: None,
            calls: Mutex::new(Vec::new()),
            configs: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

/// Shorthand for a listing row.
pub fn listing(namespace: &str, name: &str, access_level: AccessLevel) -> WorkspaceListing {
    WorkspaceListing {
        access_level,
        workspace: WorkspaceRef::new(namespace, name),
    }
}

impl MockWorkspaceService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(mut self, rows: Vec<WorkspaceListing>) -> Self {
        self.listing = Ok(rows);
        self
    }

    pub fn with_listing_error(mut self, err: ServiceError) -> Self {
        self.listing = Err(err);
        self
    }

    pub fn with_cost(mut self, workspace: &WorkspaceRef, estimate: &str) -> Self {
        self.costs
            .insert(workspace.clone(), Ok(estimate.to_string()));
        self
    }

    pub fn with_cost_error(mut self, workspace: &WorkspaceRef, err: ServiceError) -> Self {
        self.costs.insert(workspace.clone(), Err(err));
        self
    }

    /// Delay every call made for `workspace`.
    pub fn with_latency(mut self, workspace: &WorkspaceRef, latency: Duration) -> Self {
        self.latencies.insert(workspace.clone(), latency);
        self
    }

    pub fn with_failure(mut self, call: MockCall, workspace: &WorkspaceRef, err: ServiceError) -> Self {
        self.failures.insert((call, workspace.clone()), err);
        self
    }

    pub fn with_panic(mut self, call: MockCall, workspace: &WorkspaceRef) -> Self {
        self.panics.insert((call, workspace.clone()));
        self
    }

    pub fn with_user(mut self, user: ServiceResult<String>) -> Self {
        self.user = user;
        self
    }

    pub fn with_groups(mut self, groups: ServiceResult<Vec<Group>>) -> Self {
        self.groups = groups;
        self
    }

    pub fn with_health(mut self, healthy: bool) -> Self {
        self.healthy = healthy;
        self
    }

    pub fn with_group_access_error(mut self, err: ServiceError) -> Self {
        self.group_access_error = Some(err);
        self
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, call: MockCall) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == call)
            .count()
    }

    pub fn calls_for(&self, call: MockCall, workspace: &WorkspaceRef) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, w)| *c == call && w.as_ref() == Some(workspace))
            .count()
    }

    /// Steps issued for one workspace, in the order they were made.
    pub fn steps_for(&self, workspace: &WorkspaceRef) -> Vec<MockCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, w)| w.as_ref() == Some(workspace))
            .map(|(c, _)| *c)
            .collect()
    }

    pub fn configs(&self) -> Vec<MethodConfig> {
        self.configs.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<(WorkspaceRef, String, String, SubmissionOptions)> {
        self.submissions.lock().unwrap().clone()
    }

    /// Highest number of workspace-level calls observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: MockCall, workspace: Option<&WorkspaceRef>) {
        self.calls.lock().unwrap().push((call, workspace.cloned()));
    }

    async fn enter(&self, call: MockCall, workspace: &WorkspaceRef) -> ServiceResult<()> {
        self.record(call, Some(workspace));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(latency) = self.latencies.get(workspace) {
            tokio::time::sleep(*latency).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panics.contains(&(call, workspace.clone())) {
            panic!("scripted panic in {call:?} for {workspace}");
        }

        match self.failures.get(&(call, workspace.clone())) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WorkspaceService for MockWorkspaceService {
    async fn list_workspaces(&self) -> ServiceResult<Vec<WorkspaceListing>> {
        self.record(MockCall::ListWorkspaces, None);
        self.listing.clone()
    }

    async fn get_storage_cost(&self, workspace: &WorkspaceRef) -> ServiceResult<StorageCostEstimate> {
        self.enter(MockCall::GetStorageCost, workspace).await?;
        match self.costs.get(workspace) {
            Some(Ok(estimate)) => Ok(StorageCostEstimate {
                estimate: estimate.clone(),
            }),
            Some(Err(err)) => Err(err.clone()),
            None => Err(ServiceError::rejected(
                404,
                format!("{workspace} does not exist"),
            )),
        }
    }

    async fn create_workspace_config(
        &self,
        workspace: &WorkspaceRef,
        config: &MethodConfig,
    ) -> ServiceResult<()> {
        self.enter(MockCall::CreateConfig, workspace).await?;
        self.configs.lock().unwrap().push(config.clone());
        Ok(())
    }

    async fn create_submission(
        &self,
        workspace: &WorkspaceRef,
        method_namespace: &str,
        method_name: &str,
        options: SubmissionOptions,
    ) -> ServiceResult<Submission> {
        self.enter(MockCall::CreateSubmission, workspace).await?;
        self.submissions.lock().unwrap().push((
            workspace.clone(),
            method_namespace.to_string(),
            method_name.to_string(),
            options,
        ));
        Ok(Submission {
            submission_id: format!("sub-{}", workspace.name),
        })
    }

    async fn delete_workspace_config(
        &self,
        workspace: &WorkspaceRef,
        _method_namespace: &str,
        _method_name: &str,
    ) -> ServiceResult<()> {
        self.enter(MockCall::DeleteConfig, workspace).await
    }

    async fn health(&self) -> ServiceResult<()> {
        self.record(MockCall::Health, None);
        if self.healthy {
            Ok(())
        } else {
            Err(ServiceError::rejected(503, "service unavailable"))
        }
    }

    async fn current_user(&self) -> ServiceResult<String> {
        self.record(MockCall::CurrentUser, None);
        self.user.clone()
    }

    async fn list_groups(&self) -> ServiceResult<Vec<Group>> {
        self.record(MockCall::ListGroups, None);
        self.groups.clone()
    }

    async fn request_group_access(&self, _group: &str) -> ServiceResult<()> {
        self.record(MockCall::RequestGroupAccess, None);
        match &self.group_access_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
