//! Translation of failures into HTTP responses.
//!
//! This is the only place status codes are decided from errors.

use crate::error::Error;
use crate::schema::ValidationErrors;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// An error returned from a request handler.
#[derive(Debug)]
pub enum ApiError {
    /// The request failed validation: 400 with the flattened errors.
    Validation(ValidationErrors),
    /// A failure carrying its own status and client-facing message.
    Http {
        /// Status to answer with.
        status: StatusCode,
        /// Message sent to the client.
        message: String,
    },
    /// Anything else: 500 with a generic message.
    Internal(Error),
}

impl ApiError {
    /// A failure with an explicit status and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http { status, message: message.into() }
    }

    /// The todo addressed by the request does not exist.
    #[must_use]
    pub fn todo_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Todo not found")
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(ValidationErrors::form(rejection.body_text()))
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(errors) => Self::Validation(errors),
            Error::StoreRead { operation, .. } => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error in {operation}: todo store unavailable"),
            ),
            other => Self::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": errors }))).into_response()
            }
            Self::Http { status, message } => {
                (status, Json(json!({ "message": message }))).into_response()
            }
            Self::Internal(err) => {
                tracing::error!(error = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreReadError;
    use axum::body::to_bytes;
    use serde_json::Value;
    use std::path::PathBuf;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_validation_is_bad_request() {
        let (status, body) = render(ValidationErrors::field("title", "Required").into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"error": {"formErrors": [], "fieldErrors": {"title": ["Required"]}}})
        );
    }

    #[tokio::test]
    async fn test_store_validation_is_bad_request() {
        let err: ApiError = Error::Validation(ValidationErrors::form("bad")).into();
        let (status, _) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_explicit_status_is_kept() {
        let (status, body) = render(ApiError::todo_not_found()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "Todo not found"}));
    }

    #[tokio::test]
    async fn test_store_read_failure_hides_path() {
        let err: ApiError = Error::StoreRead {
            operation: "update",
            source: StoreReadError::Missing(PathBuf::from("/secret/db.json")),
        }
        .into();
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": "Error in update: todo store unavailable"}));
    }

    #[tokio::test]
    async fn test_anything_else_is_generic() {
        let err: ApiError = Error::Config("boom".to_string()).into();
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": "Internal server error"}));
    }
}
