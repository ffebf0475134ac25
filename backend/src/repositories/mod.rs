//! Persistence contracts and their implementations.
//!
//! Services only talk to storage through [`CredentialStore`]. Lookups return
//! `Ok(None)` when nothing matches; `Err` is reserved for genuine faults.

use crate::database::models::Principal;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub mod principal_repository;

#[cfg(test)]
pub mod testing;

/// Field covered by a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Username => write!(f, "username"),
            UniqueField::Email => write!(f, "email"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique index rejected the write.
    #[error("{field} is already taken")]
    Duplicate { field: UniqueField },

    #[error("store operation '{operation}' timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("store backend error: {0}")]
    Backend(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable storage for principals.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn create(&self, principal: &Principal) -> Result<(), StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Principal>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Principal>, StoreError>;

    /// Marks the principal online and bumps `updated_at`.
    async fn set_online(&self, id: &str) -> Result<(), StoreError>;
}
