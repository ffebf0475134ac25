//! Defines the HTTP routes specifically for authentication.
//!
//! Registration and login are public; `/me` sits behind the session gate.
//! The router expects an `Extension<Arc<AuthService>>` layer from the caller.

use crate::auth::handlers::*;
use crate::auth::middleware::require_session;
use crate::utils::jwt::TokenService;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

/// Creates the authentication router with all auth-related routes
pub fn auth_router(tokens: Arc<TokenService>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route(
            "/me",
            get(me).layer(middleware::from_fn_with_state(tokens, require_session)),
        )
}
