//! Main entry point for the Uriel backend.
//!
//! This file initializes logging and configuration, opens the database, wires
//! the authentication service and registers all API routes and middleware.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod repositories;
mod utils;

use crate::api::common::ApiResponse;
use crate::auth::service::AuthService;
use crate::repositories::principal_repository::PrincipalRepository;
use crate::utils::jwt::TokenService;
use crate::utils::password::PasswordHasher;
use anyhow::{Context, Result};
use axum::{Extension, Router, response::Json, routing::get};
use config::Config;
use database::Database;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let db = Database::new(&config).await?;

    let store = Arc::new(PrincipalRepository::new(db.pool().clone()));
    let tokens = Arc::new(TokenService::new(
        config.jwt_secret.as_bytes(),
        config.token_lifetime(),
    ));
    let auth_service = Arc::new(AuthService::new(
        store,
        tokens.clone(),
        PasswordHasher::new(config.bcrypt_cost),
        config.store_timeout(),
    ));

    let app = Router::new()
        .route("/", get(root_handler))
        .nest("/api/v1/auth", auth::routes::auth_router(tokens.clone()))
        .nest("/api/v1/players", api::player::routes::player_router(tokens))
        .layer(Extension(auth_service));

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;

    info!("Starting Uriel server on port {}", config.server_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": "Uriel Backend",
            "version": env!("CARGO_PKG_VERSION")
        }),
        "Welcome to Uriel API",
    ))
}
