use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mop_orchestrator::{OrchestratorError, ServiceError};
use serde_json::json;

pub type ApiResult<T> = Result<T, ApiError>;

pub const CREDENTIALS_HINT: &str = "Something went wrong verifying your Google credentials. \
Make sure you have valid Application Default Credentials, usually set up by running \
`gcloud auth application-default login`, and that the service was started with a current access token.";

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    BadGateway(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl ApiError {
    /// Map a failed remote call made directly by a handler.
    pub fn from_service(context: &str, err: ServiceError) -> Self {
        if err.is_unauthorized() {
            tracing::error!("{}: {}", context, err);
            ApiError::Unauthorized(CREDENTIALS_HINT.to_string())
        } else {
            ApiError::BadGateway(format!("{}: {}", context, err.message()))
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        if err.is_authentication() {
            tracing::error!("{}", err);
            return ApiError::Unauthorized(CREDENTIALS_HINT.to_string());
        }

        match err {
            OrchestratorError::Validation(e) => ApiError::BadRequest(e.to_string()),
            OrchestratorError::InvalidInput(msg) => ApiError::BadRequest(msg),
            OrchestratorError::Listing(e) => {
                ApiError::BadGateway(format!("Failed to list workspaces: {}", e.message()))
            }
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mop_orchestrator::ValidationError;

    #[test]
    fn test_orchestrator_error_mapping() {
        assert!(matches!(
            ApiError::from(OrchestratorError::from(ValidationError::NotConfirmed)),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(OrchestratorError::Listing(ServiceError::Unauthorized {
                status: 403,
                message: "forbidden".to_string()
            })),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(OrchestratorError::Listing(ServiceError::rejected(
                500, "boom"
            ))),
            ApiError::BadGateway(msg) if msg == "Failed to list workspaces: boom"
        ));
    }

    #[test]
    fn test_service_error_mapping() {
        assert!(matches!(
            ApiError::from_service(
                "Failed to request group access",
                ServiceError::Transport("connection refused".to_string())
            ),
            ApiError::BadGateway(msg)
                if msg == "Failed to request group access: request failed: connection refused"
        ));
    }
}
