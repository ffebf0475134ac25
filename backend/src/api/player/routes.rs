//! Defines the HTTP routes for player data.
//!
//! All routes are protected by the session gate.

use super::handlers::get_player_locations;
use crate::auth::middleware::require_session;
use crate::utils::jwt::TokenService;
use axum::{Router, middleware, routing::get};
use std::sync::Arc;

pub fn player_router(tokens: Arc<TokenService>) -> Router {
    Router::new()
        .route("/locations", get(get_player_locations))
        .route_layer(middleware::from_fn_with_state(tokens, require_session))
}
