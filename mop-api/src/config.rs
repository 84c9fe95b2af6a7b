use mop_orchestrator::client::{HttpClientConfig, MethodIdentity};
use mop_orchestrator::{AccessPolicy, OrchestratorSettings, DEFAULT_MAX_CONCURRENCY};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MOP_ACCESS_POLICY: {0}")]
    AccessPolicy(String),

    #[error("{var} must be a positive integer, got '{value}'")]
    NotPositive { var: &'static str, value: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_api_root")]
    pub api_root: String,

    #[serde(default = "default_access_token")]
    pub access_token: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    #[serde(default = "default_access_policy")]
    pub access_policy: AccessPolicy,

    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    #[serde(default = "default_job_history_url")]
    pub job_history_url: String,

    #[serde(default = "default_required_group")]
    pub required_group: String,
}

fn default_bind_addr() -> String {
    std::env::var("MOP_API_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string())
}

fn default_api_root() -> String {
    std::env::var("MOP_API_ROOT").unwrap_or_else(|_| "https://api.firecloud.org/api".to_string())
}

fn default_access_token() -> Option<String> {
    std::env::var("MOP_ACCESS_TOKEN")
        .ok()
        .filter(|token| !token.trim().is_empty())
}

fn default_request_timeout() -> u64 {
    std::env::var("MOP_REQUEST_TIMEOUT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(60)
}

fn default_max_concurrency() -> usize {
    std::env::var("MOP_MAX_CONCURRENCY")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MAX_CONCURRENCY)
}

fn default_access_policy() -> AccessPolicy {
    std::env::var("MOP_ACCESS_POLICY")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

fn default_dry_run() -> bool {
    std::env::var("MOP_DRY_RUN")
        .map(|s| parse_flag(&s))
        .unwrap_or(false)
}

fn default_job_history_url() -> String {
    std::env::var("MOP_JOB_HISTORY_URL")
        .unwrap_or_else(|_| "https://app.terra.bio/#workspaces".to_string())
}

fn default_required_group() -> String {
    std::env::var("MOP_REQUIRED_GROUP").unwrap_or_else(|_| "automop_users".to_string())
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            api_root: default_api_root(),
            access_token: default_access_token(),
            request_timeout_secs: default_request_timeout(),
            max_concurrency: default_max_concurrency(),
            access_policy: default_access_policy(),
            dry_run: default_dry_run(),
            job_history_url: default_job_history_url(),
            required_group: default_required_group(),
        }
    }
}

impl Config {
    /// Load from the environment, rejecting values that would otherwise be
    /// silently replaced by a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(raw) = std::env::var("MOP_ACCESS_POLICY") {
            raw.parse::<AccessPolicy>()
                .map_err(ConfigError::AccessPolicy)?;
        }
        for var in ["MOP_MAX_CONCURRENCY", "MOP_REQUEST_TIMEOUT"] {
            if let Ok(raw) = std::env::var(var) {
                if !matches!(raw.trim().parse::<u64>(), Ok(n) if n > 0) {
                    return Err(ConfigError::NotPositive { var, value: raw });
                }
            }
        }

        Ok(Self::default())
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            max_concurrency: self.max_concurrency,
            access_policy: self.access_policy,
            dry_run: self.dry_run,
            method: MethodIdentity::default(),
            job_history_url: self.job_history_url.clone(),
        }
    }

    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            api_root: self.api_root.clone(),
            access_token: self.access_token.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}
