//! Global application error types.
//!
//! Every lower-layer failure (storage, hashing, token handling) is classified
//! into exactly one [`ServiceError`] variant before it reaches the HTTP layer.

use crate::repositories::{StoreError, UniqueField};
use crate::utils::jwt::TokenError;
use crate::utils::password::HashError;
use thiserror::Error;

/// Message shared by every credential failure so callers cannot tell an
/// unknown username from a wrong password.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "invalid username or password";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("password and confirm password fields do not match")]
    ConfirmationMismatch,

    #[error("password must be at most 72 bytes")]
    PasswordTooLong,

    #[error("{field} already exists: {identifier}")]
    AlreadyExists {
        field: UniqueField,
        identifier: String,
    },

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: TokenError },

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("Store unavailable: {source}")]
    StoreUnavailable { source: StoreError },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn already_exists(field: UniqueField, identifier: impl Into<String>) -> Self {
        Self::AlreadyExists {
            field,
            identifier: identifier.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(source: StoreError) -> Self {
        Self::StoreUnavailable { source }
    }
}

impl From<TokenError> for ServiceError {
    fn from(reason: TokenError) -> Self {
        match reason {
            TokenError::Signing(message) => Self::internal_error(message),
            reason => Self::Unauthorized { reason },
        }
    }
}

impl From<HashError> for ServiceError {
    fn from(err: HashError) -> Self {
        match err {
            HashError::TooLong { .. } => Self::PasswordTooLong,
            other => Self::internal_error(other.to_string()),
        }
    }
}
