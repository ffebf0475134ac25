//! Data structures for authentication-related entities.
//!
//! Request/response payloads for registration and login, plus the typed
//! identity the session gate attaches to authenticated requests.

use crate::database::models::Role;
use crate::utils::jwt::Claims;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration request payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        email(message = "Must be a valid email"),
        length(max = 255, message = "Email too long")
    )]
    pub email: String,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Username must be between 1-255 characters"
    ))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    pub confirm: String,
}

/// Login request payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Successful login: the session token and the principal it belongs to
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub player_id: String,
    pub expires_in: u64, // Token lifetime in seconds
}

/// Identity of the caller, attached to the request by the session gate.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestIdentity {
    pub principal_id: String,
    pub username: String,
    pub role: Role,
}

impl From<Claims> for RequestIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            principal_id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }
}
