//! Error handling utilities for API responses.
//!
//! Provides the standard JSON envelope and the conversion from service-layer
//! errors to HTTP responses.
//!
//! # Response Format
//! All responses share one envelope containing:
//! - `success`: whether the request succeeded
//! - `data`: payload on success
//! - `message`: human-readable message
//! - `error`: machine-readable `error_type` plus optional field details
//!
//! # Error Handling Flow
//! 1. Service layer returns a classified `ServiceError`
//! 2. `service_error_to_http` converts it to a status code and envelope
//! 3. Infrastructure detail is logged here and never sent to the client

use crate::errors::{INVALID_CREDENTIALS_MESSAGE, ServiceError};
use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};

/// Error half of every handler's `Result`.
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

/// Standard API response wrapper for all endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Indicates if the request was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable message
    pub message: String,
    /// Error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    /// Response timestamp
    pub timestamp: String,
}

/// Error details for failed requests
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Machine-readable error type identifier
    pub error_type: String,
    /// Field-specific validation errors when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Field-specific validation error details
#[derive(Debug, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the field with validation error
    pub field: String,
    /// Description of the validation failure
    pub message: String,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create an error response
    pub fn error(
        message: impl Into<String>,
        error_type: impl Into<String>,
        details: Option<Vec<FieldError>>,
    ) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: message.into(),
            error: Some(ErrorDetails {
                error_type: error_type.into(),
                details,
            }),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Builds an error response with the given status.
pub fn error_response(
    status: StatusCode,
    error_type: &str,
    message: impl Into<String>,
    details: Option<Vec<FieldError>>,
) -> ApiError {
    (
        status,
        Json(ApiResponse::<()>::error(message, error_type, details)),
    )
}

/// Non-specific 401 used for every rejected session.
pub fn unauthorized() -> ApiError {
    error_response(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized", None)
}

/// Converts ServiceError to appropriate HTTP response with standard format
pub fn service_error_to_http(error: ServiceError) -> ApiError {
    let (status, error_type, message) = match error {
        ServiceError::Validation { message } => {
            (StatusCode::BAD_REQUEST, "validation_error", message)
        }
        err @ ServiceError::ConfirmationMismatch => {
            (StatusCode::BAD_REQUEST, "confirmation_mismatch", err.to_string())
        }
        err @ ServiceError::PasswordTooLong => {
            (StatusCode::BAD_REQUEST, "password_too_long", err.to_string())
        }
        ServiceError::AlreadyExists { field, .. } => (
            StatusCode::CONFLICT,
            "already_exists",
            format!("{} already exists", field),
        ),
        ServiceError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            INVALID_CREDENTIALS_MESSAGE.to_string(),
        ),
        ServiceError::Unauthorized { reason } => {
            tracing::warn!("Unauthorized: {}", reason);
            return unauthorized();
        }
        ServiceError::NotFound { entity, identifier } => (
            StatusCode::NOT_FOUND,
            "not_found",
            format!("{} '{}' not found", entity, identifier),
        ),
        ServiceError::StoreUnavailable { source } => {
            tracing::error!("Store error: {}", source);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            )
        }
        ServiceError::InternalError { message } => {
            tracing::error!("Internal error: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            )
        }
    };

    error_response(status, error_type, message, None)
}

/// Formats validator::ValidationErrors into field-specific error details
pub fn validation_errors_to_field_errors(errors: &validator::ValidationErrors) -> Vec<FieldError> {
    let mut field_errors: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .unwrap_or(&"Invalid value".into())
                    .to_string(),
            })
        })
        .collect();
    field_errors.sort_by(|a, b| a.field.cmp(&b.field));
    field_errors
}

/// Helper to create validation error response
pub fn validation_error_response(errors: &validator::ValidationErrors) -> ApiError {
    error_response(
        StatusCode::BAD_REQUEST,
        "validation_error",
        "Validation failed",
        Some(validation_errors_to_field_errors(errors)),
    )
}
