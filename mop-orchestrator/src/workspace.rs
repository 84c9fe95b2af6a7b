use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// A namespaced workspace in the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct WorkspaceRef {
    pub namespace: String,
    pub name: String,
}

impl WorkspaceRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for WorkspaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessLevel {
    #[serde(rename = "NO ACCESS")]
    NoAccess,
    #[serde(rename = "READER")]
    Reader,
    #[serde(rename = "WRITER")]
    Writer,
    #[serde(rename = "OWNER")]
    Owner,
    #[serde(rename = "PROJECT_OWNER")]
    ProjectOwner,
    #[serde(other)]
    Unknown,
}

/// Which access levels make a workspace eligible for cost lookup.
///
/// Deployments have differed here, so the choice is explicit configuration:
/// `owner` keeps only `OWNER` workspaces, `owner-writer` also admits `WRITER`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessPolicy {
    #[default]
    Owner,
    OwnerWriter,
}

impl AccessPolicy {
    pub fn admits(&self, level: AccessLevel) -> bool {
        match self {
            AccessPolicy::Owner => level == AccessLevel::Owner,
            AccessPolicy::OwnerWriter => {
                matches!(level, AccessLevel::Owner | AccessLevel::Writer)
            }
        }
    }
}

impl FromStr for AccessPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(AccessPolicy::Owner),
            "owner-writer" | "owner_writer" | "owner+writer" => Ok(AccessPolicy::OwnerWriter),
            other => Err(format!(
                "unknown access policy '{other}', expected 'owner' or 'owner-writer'"
            )),
        }
    }
}

/// One row of the remote workspace listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceListing {
    pub access_level: AccessLevel,
    pub workspace: WorkspaceRef,
}

/// Per-request caller context. Built fresh for every request, never shared.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user: Option<String>,
}

impl RequestContext {
    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_policy_admits() {
        assert!(AccessPolicy::Owner.admits(AccessLevel::Owner));
        assert!(!AccessPolicy::Owner.admits(AccessLevel::Writer));
        assert!(AccessPolicy::OwnerWriter.admits(AccessLevel::Writer));
        assert!(!AccessPolicy::OwnerWriter.admits(AccessLevel::Reader));
        assert!(!AccessPolicy::OwnerWriter.admits(AccessLevel::ProjectOwner));
    }

    #[test]
    fn test_access_policy_from_str() {
        assert_eq!("owner".parse::<AccessPolicy>(), Ok(AccessPolicy::Owner));
        assert_eq!(
            "Owner-Writer".parse::<AccessPolicy>(),
            Ok(AccessPolicy::OwnerWriter)
        );
        assert!("reader".parse::<AccessPolicy>().is_err());
    }

    #[test]
    fn test_listing_deserializes_remote_shape() {
        let body = r#"[
            {"accessLevel": "OWNER", "workspace": {"namespace": "ns", "name": "a", "bucketName": "b"}},
            {"accessLevel": "NO ACCESS", "workspace": {"namespace": "ns", "name": "b"}},
            {"accessLevel": "SOMETHING_NEW", "workspace": {"namespace": "ns", "name": "c"}}
        ]"#;

        let rows: Vec<WorkspaceListing> = serde_json::from_str(body).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].access_level, AccessLevel::Owner);
        assert_eq!(rows[0].workspace, WorkspaceRef::new("ns", "a"));
        assert_eq!(rows[1].access_level, AccessLevel::NoAccess);
        assert_eq!(rows[2].access_level, AccessLevel::Unknown);
    }
}
