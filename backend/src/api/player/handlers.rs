//! Handler functions for player endpoints.
//!
//! Every handler here runs behind the session gate and reads the caller's
//! identity from the request extensions instead of re-parsing the token.

use crate::api::common::ApiResponse;
use crate::auth::models::RequestIdentity;
use crate::database::models::Role;
use axum::extract::{Extension, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    pub player_id: String,
    pub username: String,
    pub role: Role,
    pub locations: Vec<String>,
}

/// Lists player locations for the authenticated caller.
#[axum::debug_handler]
pub async fn get_player_locations(
    Extension(identity): Extension<RequestIdentity>,
) -> Json<ApiResponse<LocationsResponse>> {
    tracing::info!("Listing player locations for {}", identity.principal_id);

    let message = format!("Welcome, {}", identity.username);
    Json(ApiResponse::success(
        LocationsResponse {
            player_id: identity.principal_id,
            username: identity.username,
            role: identity.role,
            locations: Vec::new(),
        },
        message,
    ))
}
