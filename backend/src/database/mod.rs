//! Module for database connection setup and common utilities.
//!
//! This module is responsible for initializing the database connection pool,
//! applying the embedded migrations and providing a central point for
//! database-related configuration.

use crate::config::Config;
use anyhow::{Context, Result};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::time::Duration;

pub mod models;

#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Initializes the database connection pool and runs pending migrations.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect(&config.database_url)
            .await
            .with_context(|| format!("failed to connect to {}", config.database_url))?;

        let db = Database { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Applies the migrations embedded from `backend/migrations`.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("failed to run database migrations")?;
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connection pool closed");
    }
}
