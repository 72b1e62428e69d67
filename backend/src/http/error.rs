//! HTTP error handling and response types.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::ValidationErrors;

use crate::db::repository::RepositoryError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (per-field errors for validation failures)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Body fields failed validation
    Validation(ValidationErrors),
    /// Body could not be read as the expected JSON
    InvalidBody(JsonRejection),
    /// Repository error
    Repository(RepositoryError),
}

fn validation_details(errors: &ValidationErrors) -> Value {
    serde_json::to_value(errors).unwrap_or_else(|_| Value::String(errors.to_string()))
}

fn repository_error(err: RepositoryError) -> (StatusCode, ApiError) {
    match &err {
        RepositoryError::NotFound { message, .. } => {
            (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message.clone()))
        }
        RepositoryError::InvalidIdentifier { message, .. } => (
            StatusCode::BAD_REQUEST,
            ApiError::new("INVALID_IDENTIFIER", message.clone()),
        ),
        RepositoryError::ValidationError { message, context } => {
            let mut error = ApiError::new("VALIDATION_ERROR", message.clone());
            if let Some(details) = context.details.as_deref() {
                let details = serde_json::from_str(details)
                    .unwrap_or_else(|_| Value::String(details.to_string()));
                error = error.with_details(details);
            }
            (StatusCode::UNPROCESSABLE_ENTITY, error)
        }
        RepositoryError::ConnectionError { .. } | RepositoryError::TimeoutError { .. } => {
            tracing::error!("Store unavailable: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiError::new("UNAVAILABLE", err.message().to_string()),
            )
        }
        _ => {
            tracing::error!("Repository error: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("REPOSITORY_ERROR", err.message().to_string()),
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("VALIDATION_ERROR", "Request validation failed")
                    .with_details(validation_details(&errors)),
            ),
            AppError::InvalidBody(rejection) => (
                rejection.status(),
                ApiError::new("INVALID_BODY", rejection.body_text()),
            ),
            AppError::Repository(e) => repository_error(e),
        };

        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_repository_errors_map_by_variant() {
        assert_eq!(
            status_of(RepositoryError::not_found("Property not found").into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(RepositoryError::invalid_identifier("Invalid id").into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(RepositoryError::validation("bad").into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(RepositoryError::connection("down").into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(RepositoryError::timeout("slow").into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(RepositoryError::query("syntax").into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_message_is_not_string_matched() {
        // An internal error that happens to mention "not found" stays a 500
        assert_eq!(
            status_of(RepositoryError::internal("column not found").into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
