//! Database repository for principal records.
//!
//! SQLite-backed [`CredentialStore`]. Username and email uniqueness is enforced
//! by the unique indexes created in the `principals` migration.

use crate::database::models::Principal;
use crate::repositories::{CredentialStore, StoreError, UniqueField};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

const SELECT_PRINCIPAL: &str = r#"
    SELECT id, username, email, password_hash, role, is_online, created_at, updated_at
    FROM principals
"#;

/// Repository for principal database operations.
#[derive(Clone)]
pub struct PrincipalRepository {
    /// Shared SQLite connection pool
    pool: SqlitePool,
}

impl PrincipalRepository {
    /// Creates a new PrincipalRepository instance.
    ///
    /// # Arguments
    /// * `pool` - SQLite connection pool, cloned cheaply per repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<Principal>, StoreError> {
        let query = format!("{} WHERE {} = ?", SELECT_PRINCIPAL, column);
        let principal = sqlx::query_as::<_, Principal>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify_error)?;

        Ok(principal)
    }
}

/// Maps a unique-index violation to the field it guards and pool exhaustion
/// to `Unavailable`.
fn classify_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            let field = if db_err.message().contains("email") {
                UniqueField::Email
            } else {
                UniqueField::Username
            };
            StoreError::Duplicate { field }
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Unavailable(err.to_string())
        }
        _ => StoreError::Backend(err),
    }
}

#[async_trait]
impl CredentialStore for PrincipalRepository {
    async fn create(&self, principal: &Principal) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO principals (id, username, email, password_hash, role, is_online, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&principal.id)
        .bind(&principal.username)
        .bind(&principal.email)
        .bind(&principal.password_hash)
        .bind(principal.role)
        .bind(principal.is_online)
        .bind(principal.created_at)
        .bind(principal.updated_at)
        .execute(&self.pool)
        .await
        .map_err(classify_error)?;

        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Principal>, StoreError> {
        self.find_one("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError> {
        self.find_one("email", email).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Principal>, StoreError> {
        self.find_one("id", id).await
    }

    async fn set_online(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE principals SET is_online = 1, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify_error)?;

        if result.rows_affected() == 0 {
            tracing::warn!("set_online matched no principal for id {}", id);
        }

        Ok(())
    }
}
