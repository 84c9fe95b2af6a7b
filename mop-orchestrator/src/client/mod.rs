//! Contract with the remote workspace service.
//!
//! The orchestrator only talks to the service through [`WorkspaceService`], so the
//! HTTP implementation in [`http`] can be swapped for the scripted client in
//! `test_utils` without touching the core.

pub mod http;

use crate::workspace::{WorkspaceListing, WorkspaceRef};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub use http::{HttpClientConfig, HttpWorkspaceService};

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// A non-ok outcome of a single remote call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("unauthorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ServiceError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        ServiceError::Rejected {
            status,
            message: message.into(),
        }
    }

    /// The text shown to the operator for this failure.
    pub fn message(&self) -> String {
        match self {
            ServiceError::Unauthorized { message, .. } | ServiceError::Rejected { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ServiceError::Unauthorized { .. })
    }
}

/// Identity of the workflow method that performs the mop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodIdentity {
    pub namespace: String,
    pub name: String,
    pub version: u32,
    pub source_repo: String,
}

impl Default for MethodIdentity {
    fn default() -> Self {
        Self {
            namespace: "DSPMethods_mgatzen".to_string(),
            name: "Automop".to_string(),
            version: 16,
            source_repo: "agora".to_string(),
        }
    }
}

impl MethodIdentity {
    pub fn uri(&self) -> String {
        format!(
            "{}://{}/{}/{}",
            self.source_repo, self.namespace, self.name, self.version
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodRepoMethod {
    pub method_name: String,
    pub method_version: u32,
    pub method_namespace: String,
    pub method_uri: String,
    pub source_repo: String,
}

/// Body of a workspace method configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodConfig {
    pub method_repo_method: MethodRepoMethod,
    pub name: String,
    pub namespace: String,
    pub inputs: BTreeMap<String, String>,
    pub outputs: BTreeMap<String, String>,
    pub method_config_version: u32,
    pub deleted: bool,
}

impl MethodConfig {
    /// Configuration that mops `workspace` on behalf of `user`.
    ///
    /// String inputs are WDL expressions, hence the embedded quotes.
    pub fn mop(method: &MethodIdentity, workspace: &WorkspaceRef, user: &str, dry_run: bool) -> Self {
        let mut inputs = BTreeMap::new();
        inputs.insert("Mop.user".to_string(), format!("\"{user}\""));
        inputs.insert(
            "Mop.workspace_namespace".to_string(),
            format!("\"{}\"", workspace.namespace),
        );
        inputs.insert(
            "Mop.workspace_name".to_string(),
            format!("\"{}\"", workspace.name),
        );
        inputs.insert("Mop.dry_run".to_string(), dry_run.to_string());

        Self {
            method_repo_method: MethodRepoMethod {
                method_name: method.name.clone(),
                method_version: method.version,
                method_namespace: method.namespace.clone(),
                method_uri: method.uri(),
                source_repo: method.source_repo.clone(),
            },
            name: method.name.clone(),
            namespace: method.namespace.clone(),
            inputs,
            outputs: BTreeMap::new(),
            method_config_version: method.version,
            deleted: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionOptions {
    pub use_call_cache: bool,
    pub delete_intermediate_output_files: bool,
}

impl SubmissionOptions {
    /// Mop jobs always recompute and never keep intermediates.
    pub fn mop() -> Self {
        Self {
            use_call_cache: false,
            delete_intermediate_output_files: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub submission_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageCostEstimate {
    pub estimate: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub group_name: String,
    pub group_email: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[async_trait]
pub trait WorkspaceService: Send + Sync {
    /// Every workspace visible to the caller, with its access level.
    async fn list_workspaces(&self) -> ServiceResult<Vec<WorkspaceListing>>;

    async fn get_storage_cost(&self, workspace: &WorkspaceRef) -> ServiceResult<StorageCostEstimate>;

    async fn create_workspace_config(
        &self,
        workspace: &WorkspaceRef,
        config: &MethodConfig,
    ) -> ServiceResult<()>;

    async fn create_submission(
        &self,
        workspace: &WorkspaceRef,
        method_namespace: &str,
        method_name: &str,
        options: SubmissionOptions,
    ) -> ServiceResult<Submission>;

    async fn delete_workspace_config(
        &self,
        workspace: &WorkspaceRef,
        method_namespace: &str,
        method_name: &str,
    ) -> ServiceResult<()>;

    async fn health(&self) -> ServiceResult<()>;

    /// Email of the account behind the configured credentials.
    async fn current_user(&self) -> ServiceResult<String>;

    async fn list_groups(&self) -> ServiceResult<Vec<Group>>;

    async fn request_group_access(&self, group: &str) -> ServiceResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mop_config_matches_remote_shape() {
        let config = MethodConfig::mop(
            &MethodIdentity::default(),
            &WorkspaceRef::new("billing-ns", "my-ws"),
            "alice@example.org",
            false,
        );

        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(json["methodRepoMethod"]["methodName"], "Automop");
        assert_eq!(json["methodRepoMethod"]["methodVersion"], 16);
        assert_eq!(
            json["methodRepoMethod"]["methodUri"],
            "agora://DSPMethods_mgatzen/Automop/16"
        );
        assert_eq!(json["methodRepoMethod"]["sourceRepo"], "agora");
        assert_eq!(json["namespace"], "DSPMethods_mgatzen");
        assert_eq!(json["inputs"]["Mop.user"], "\"alice@example.org\"");
        assert_eq!(json["inputs"]["Mop.workspace_namespace"], "\"billing-ns\"");
        assert_eq!(json["inputs"]["Mop.workspace_name"], "\"my-ws\"");
        assert_eq!(json["inputs"]["Mop.dry_run"], "false");
        assert_eq!(json["outputs"], serde_json::json!({}));
        assert_eq!(json["methodConfigVersion"], 16);
        assert_eq!(json["deleted"], false);
    }

    #[test]
    fn test_dry_run_flag_is_forwarded() {
        let config = MethodConfig::mop(
            &MethodIdentity::default(),
            &WorkspaceRef::new("ns", "ws"),
            "bob@example.org",
            true,
        );
        assert_eq!(config.inputs["Mop.dry_run"], "true");
    }

    #[test]
    fn test_service_error_message() {
        assert_eq!(
            ServiceError::rejected(409, "config already exists").message(),
            "config already exists"
        );
        assert_eq!(
            ServiceError::Transport("timed out".to_string()).message(),
            "request failed: timed out"
        );
    }
}
