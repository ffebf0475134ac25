//! Middleware for protecting authenticated routes.
//!
//! The gate only consults the token service. A valid bearer token results in a
//! [`RequestIdentity`] in the request extensions; anything else ends the
//! request with 401 before the protected handler runs.

use crate::api::common::{ApiError, unauthorized};
use crate::auth::models::RequestIdentity;
use crate::utils::jwt::TokenService;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

const BEARER_PREFIX: &str = "Bearer ";

/// Session authentication middleware, installed with
/// `middleware::from_fn_with_state(tokens, require_session)`.
pub async fn require_session(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Extract Authorization header
    let Some(auth_header) = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
    else {
        tracing::debug!("Rejected request to {}: missing authorization header", request.uri());
        return Err(unauthorized());
    };

    let Some(token) = auth_header.strip_prefix(BEARER_PREFIX) else {
        tracing::debug!("Rejected request to {}: not a bearer token", request.uri());
        return Err(unauthorized());
    };

    match tokens.verify(token) {
        Ok(claims) => {
            request
                .extensions_mut()
                .insert(RequestIdentity::from(claims));
            Ok(next.run(request).await)
        }
        Err(reason) => {
            tracing::warn!("Rejected request to {}: {}", request.uri(), reason);
            Err(unauthorized())
        }
    }
}
