//! Workspace cost listing and mop job orchestration
//!
//! This crate holds the core of the mop tool: a bounded fan-out over the
//! remote workspace service, the cost aggregation that feeds the workspace
//! table, and the per-workspace mop submission sequence. It is consumed by the
//! mop-api HTTP service but has no web dependencies of its own.

pub mod client;
pub mod cost;
pub mod dispatch;
pub mod error;
pub mod mop;
pub mod orchestrator;
pub mod settings;
pub mod workspace;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use client::{HttpClientConfig, HttpWorkspaceService, ServiceError, WorkspaceService};
pub use cost::{CostResult, WorkspaceCostEntry};
pub use dispatch::{dispatch, TaskFailure, DEFAULT_MAX_CONCURRENCY};
pub use error::{OrchestratorError, Result, ValidationError};
pub use mop::{MopReport, MopRequest, MopSummary, SubmissionOutcome};
pub use orchestrator::WorkspaceOrchestrator;
pub use settings::OrchestratorSettings;
pub use workspace::{AccessLevel, AccessPolicy, RequestContext, WorkspaceListing, WorkspaceRef};
