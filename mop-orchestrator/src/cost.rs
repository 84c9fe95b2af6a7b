use crate::client::WorkspaceService;
use crate::dispatch::dispatch;
use crate::error::{OrchestratorError, Result};
use crate::orchestrator::WorkspaceOrchestrator;
use crate::workspace::{AccessPolicy, RequestContext, WorkspaceListing, WorkspaceRef};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

/// Sentinel shown in place of an estimate the service could not provide.
pub const UNAVAILABLE_COST: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CostResult {
    /// Raw estimate as reported, e.g. `"$12.50"`.
    Available(String),
    Unavailable,
}

impl CostResult {
    /// Numeric value used for ordering, `None` if unavailable or unparsable.
    pub fn amount(&self) -> Option<f64> {
        match self {
            CostResult::Available(raw) => parse_cost(raw),
            CostResult::Unavailable => None,
        }
    }
}

impl Serialize for CostResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            CostResult::Available(raw) => serializer.serialize_str(raw),
            CostResult::Unavailable => serializer.serialize_str(UNAVAILABLE_COST),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WorkspaceCostEntry {
    pub namespace: String,
    pub name: String,
    #[schema(value_type = String)]
    pub cost: CostResult,
}

/// Parse a currency-prefixed estimate such as `"$1,234.50"`.
///
/// The first character is dropped whatever it is, grouping commas are
/// ignored. Anything else that fails to parse, or parses to a non-finite
/// number, yields `None`.
pub fn parse_cost(raw: &str) -> Option<f64> {
    let mut chars = raw.trim().chars();
    chars.next()?;
    let digits: String = chars.as_str().chars().filter(|c| *c != ',').collect();
    digits
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Cheapest first. Entries without a usable amount go last, in input order.
pub fn sort_by_cost(entries: Vec<WorkspaceCostEntry>) -> Vec<WorkspaceCostEntry> {
    let mut keyed: Vec<(Option<f64>, WorkspaceCostEntry)> = entries
        .into_iter()
        .map(|entry| (entry.cost.amount(), entry))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    keyed.into_iter().map(|(_, entry)| entry).collect()
}

pub fn eligible_workspaces(
    listing: Vec<WorkspaceListing>,
    policy: AccessPolicy,
) -> Vec<WorkspaceRef> {
    listing
        .into_iter()
        .filter(|row| policy.admits(row.access_level))
        .map(|row| row.workspace)
        .collect()
}

async fn fetch_cost(service: &dyn WorkspaceService, workspace: &WorkspaceRef) -> CostResult {
    match service.get_storage_cost(workspace).await {
        Ok(estimate) => CostResult::Available(estimate.estimate),
        Err(e) => {
            warn!(
                namespace = %workspace.namespace,
                name = %workspace.name,
                "Failed to get workspace cost for {}: {}",
                workspace,
                e.message()
            );
            CostResult::Unavailable
        }
    }
}

impl WorkspaceOrchestrator {
    /// Estimated storage cost of every eligible workspace, cheapest first.
    ///
    /// Fails only if the listing itself fails; a failed estimate becomes
    /// [`CostResult::Unavailable`] for that workspace.
    pub async fn workspace_costs(&self, ctx: &RequestContext) -> Result<Vec<WorkspaceCostEntry>> {
        let listing = self
            .service
            .list_workspaces()
            .await
            .map_err(OrchestratorError::Listing)?;

        let total = listing.len();
        let eligible = eligible_workspaces(listing, self.settings.access_policy);
        info!(
            user = ctx.user.as_deref().unwrap_or("-"),
            total,
            eligible = eligible.len(),
            "Fetching workspace costs"
        );

        let service = self.service.clone();
        let costs = dispatch(eligible.clone(), self.settings.max_concurrency, move |ws| {
            let service = service.clone();
            async move { fetch_cost(service.as_ref(), &ws).await }
        })
        .await;

        let entries = eligible
            .into_iter()
            .zip(costs)
            .map(|(workspace, cost)| {
                let cost = cost.unwrap_or_else(|e| {
                    warn!("Cost lookup for {} did not complete: {}", workspace, e);
                    CostResult::Unavailable
                });
                WorkspaceCostEntry {
                    namespace: workspace.namespace,
                    name: workspace.name,
                    cost,
                }
            })
            .collect();

        let sorted = sort_by_cost(entries);
        debug!(count = sorted.len(), "Workspace costs sorted");
        Ok(sorted)
    }
}
