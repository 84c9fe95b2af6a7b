use crate::client::ServiceError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to list workspaces: {0}")]
    Listing(ServiceError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Rejections raised before any remote call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("The confirmation checkbox was not checked. Please make sure that you want to permanently delete files using this mop tool.")]
    NotConfirmed,

    #[error("No workspaces were selected to be mopped. Please select at least one workspace.")]
    NoWorkspacesSelected,

    #[error("The user identity was not found for this request. Sign in before submitting mop jobs.")]
    MissingIdentity,
}

impl OrchestratorError {
    /// True when the remote service rejected our credentials.
    pub fn is_authentication(&self) -> bool {
        matches!(self, OrchestratorError::Listing(err) if err.is_unauthorized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_unauthorized_counts_as_authentication() {
        let err = OrchestratorError::Listing(ServiceError::Unauthorized {
            status: 401,
            message: "expired token".to_string(),
        });
        assert!(err.is_authentication());

        let err = OrchestratorError::Listing(ServiceError::Transport("timed out".to_string()));
        assert!(!err.is_authentication());

        let err = OrchestratorError::from(ValidationError::MissingIdentity);
        assert!(!err.is_authentication());
    }

    #[test]
    fn test_validation_error_is_transparent() {
        let err = OrchestratorError::from(ValidationError::NoWorkspacesSelected);
        assert_eq!(
            err.to_string(),
            ValidationError::NoWorkspacesSelected.to_string()
        );
    }
}
