/// Error handling for the API server
///
/// Every handler returns `Result<T, ApiError>`. Domain errors from the shared
/// crate convert into [`ApiError`] through the `From` impls below, so status
/// codes are decided in this module and nowhere else.
///
/// # Response body
///
/// ```json
/// {
///   "error": "validation_error",
///   "message": "The given data was invalid.",
///   "errors": { "title": ["The title field is required."] }
/// }
/// ```
///
/// `errors` is present only for 422 responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use tasklist_shared::{
    auth::{authorization::AuthzError, middleware::AuthError, password::PasswordError},
    services::{AccountError, TaskError},
    store::StoreError,
    validation::FieldErrors,
};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400), e.g. unparseable JSON
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(FieldErrors),

    /// Internal server error (500); the detail is logged, never returned
    InternalError(String),
}

/// Error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "validation_error", "unauthorized")
    pub error: &'static str,

    /// Human-readable error message
    pub message: String,

    /// Messages per field, for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} fields", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message, errors) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "The given data was invalid.".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                error,
                message,
                errors,
            }),
        )
            .into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::InternalError(format!("Store failure: {}", err))
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

impl From<AuthzError> for ApiError {
    fn from(_: AuthzError) -> Self {
        ApiError::Forbidden("This action is unauthorized.".to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Store(err) => err.into(),
            _ => ApiError::Unauthorized("Unauthenticated.".to_string()),
        }
    }
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::Validation(errors) => ApiError::ValidationError(errors),
            TaskError::NotFound(_) => ApiError::NotFound("Task not found".to_string()),
            TaskError::Forbidden(err) => err.into(),
            TaskError::Store(err) => err.into(),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Validation(errors) => ApiError::ValidationError(errors),
            AccountError::InvalidCredentials => {
                ApiError::Unauthorized("invalid credentials".to_string())
            }
            AccountError::Password(err) => err.into(),
            AccountError::Store(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Task not found".to_string());
        assert_eq!(err.to_string(), "Not found: Task not found");
    }

    #[tokio::test]
    async fn test_validation_error_body() {
        let err: ApiError =
            TaskError::Validation(FieldErrors::single("title", "The title field is required.")).into();
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["errors"]["title"][0], "The title field is required.");
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let err: ApiError = StoreError::Unavailable("connection refused to 10.0.0.5".to_string()).into();
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "An internal error occurred");
        assert!(!body.to_string().contains("10.0.0.5"));
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_task_error_statuses() {
        let forbidden = AuthzError::NotOwner {
            task_id: Uuid::new_v4(),
            action: tasklist_shared::auth::authorization::TaskAction::Delete,
        };

        let (status, _) = body_json(TaskError::Forbidden(forbidden).into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = body_json(TaskError::NotFound(Uuid::new_v4()).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_invalid_credentials_message() {
        let (status, body) = body_json(AccountError::InvalidCredentials.into()).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "invalid credentials");
    }
}
