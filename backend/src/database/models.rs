//! Rust structs that represent database table mappings.
//!
//! These models define the structure of data as it is stored in and retrieved
//! from the database. API-facing projections live next to them so the password
//! hash never has to leave this module in serialized form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// A registered account capable of authenticating.
#[derive(Clone, FromRow)]
pub struct Principal {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_online: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Principal {
    /// Builds a fresh principal with a new v7 id, the default role and both
    /// timestamps set to now.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7().to_string(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role: Role::default(),
            is_online: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("is_online", &self.is_online)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Closed set of roles a principal can hold.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular player account.
    #[default]
    Player,
    Admin,
    Guest,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Player => "player",
            Role::Admin => "admin",
            Role::Guest => "guest",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Public projection of a [`Principal`], safe to return to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrincipalView {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_online: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Principal> for PrincipalView {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id.clone(),
            username: principal.username.clone(),
            email: principal.email.clone(),
            role: principal.role,
            is_online: principal.is_online,
            created_at: principal.created_at,
            updated_at: principal.updated_at,
        }
    }
}
