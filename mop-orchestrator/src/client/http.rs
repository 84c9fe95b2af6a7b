use super::{
    Group, MethodConfig, ServiceError, ServiceResult, StorageCostEstimate, Submission,
    SubmissionOptions, WorkspaceService,
};
use crate::error::{OrchestratorError, Result};
use crate::workspace::{WorkspaceListing, WorkspaceRef};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Connection settings for the remote workspace API.
///
/// # Fields
///
/// * `api_root` - Base URL every endpoint path is appended to
/// * `access_token` - Bearer token sent with each call, if any
/// * `timeout` - Upper bound for a single call, including reading the body
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub api_root: String,
    pub access_token: Option<String>,
    pub timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            api_root: "https://api.firecloud.org/api".to_string(),
            access_token: None,
            timeout: Duration::from_secs(60),
        }
    }
}

/// [`WorkspaceService`] backed by the remote REST API.
///
/// Every call is a single attempt. Non-success statuses become a typed
/// [`ServiceError`]; 401 and 403 are reported as [`ServiceError::Unauthorized`].
pub struct HttpWorkspaceService {
    client: Client,
    root: Url,
    access_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserInfo {
    user_email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Me {
    user_info: UserInfo,
}

impl HttpWorkspaceService {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let root = Url::parse(&config.api_root)?;
        if root.cannot_be_a_base() {
            return Err(OrchestratorError::InvalidInput(format!(
                "API root cannot be used as a base URL: {}",
                config.api_root
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("automop/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            root,
            access_token: config.access_token,
        })
    }

    /// Build `{root}/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.root.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn workspace_endpoint(&self, workspace: &WorkspaceRef, rest: &[&str]) -> Url {
        let mut segments = vec!["workspaces", workspace.namespace.as_str(), workspace.name.as_str()];
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "remote call");
        let builder = self.client.request(method, url);
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> ServiceResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(ServiceError::Unauthorized {
                status: status.as_u16(),
                message,
            })
        } else {
            Err(ServiceError::rejected(status.as_u16(), message))
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ServiceResult<T> {
        self.send(builder)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

/// Prefer the remote's JSON `message`, then the raw body, then the status text.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        })
}

#[async_trait]
impl WorkspaceService for HttpWorkspaceService {
    async fn list_workspaces(&self) -> ServiceResult<Vec<WorkspaceListing>> {
        let url = self.endpoint(&["workspaces"]);
        self.send_json(self.request(Method::GET, url)).await
    }

    async fn get_storage_cost(&self, workspace: &WorkspaceRef) -> ServiceResult<StorageCostEstimate> {
        let url = self.workspace_endpoint(workspace, &["storageCostEstimate"]);
        self.send_json(self.request(Method::GET, url)).await
    }

    async fn create_workspace_config(
        &self,
        workspace: &WorkspaceRef,
        config: &MethodConfig,
    ) -> ServiceResult<()> {
        let url = self.workspace_endpoint(workspace, &["methodconfigs"]);
        self.send(self.request(Method::POST, url).json(config))
            .await
            .map(drop)
    }

    async fn create_submission(
        &self,
        workspace: &WorkspaceRef,
        method_namespace: &str,
        method_name: &str,
        options: SubmissionOptions,
    ) -> ServiceResult<Submission> {
        let url = self.workspace_endpoint(workspace, &["submissions"]);
        let body = json!({
            "methodConfigurationNamespace": method_namespace,
            "methodConfigurationName": method_name,
            "useCallCache": options.use_call_cache,
            "deleteIntermediateOutputFiles": options.delete_intermediate_output_files,
        });
        self.send_json(self.request(Method::POST, url).json(&body))
            .await
    }

    async fn delete_workspace_config(
        &self,
        workspace: &WorkspaceRef,
        method_namespace: &str,
        method_name: &str,
    ) -> ServiceResult<()> {
        let url =
            self.workspace_endpoint(workspace, &["method_configs", method_namespace, method_name]);
        self.send(self.request(Method::DELETE, url))
            .await
            .map(drop)
    }

    async fn health(&self) -> ServiceResult<()> {
        let url = self.endpoint(&["health"]);
        self.send(self.request(Method::GET, url)).await.map(drop)
    }

    async fn current_user(&self) -> ServiceResult<String> {
        let mut url = self.endpoint(&["me"]);
        url.query_pairs_mut().append_pair("userDetailsOnly", "true");
        let me: Me = self.send_json(self.request(Method::GET, url)).await?;
        Ok(me.user_info.user_email)
    }

    async fn list_groups(&self) -> ServiceResult<Vec<Group>> {
        let url = self.endpoint(&["groups"]);
        self.send_json(self.request(Method::GET, url)).await
    }

    async fn request_group_access(&self, group: &str) -> ServiceResult<()> {
        let url = self.endpoint(&["groups", group, "requestAccess"]);
        self.send(self.request(Method::POST, url)).await.map(drop)
    }
}
