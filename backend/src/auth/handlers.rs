//! Handler functions for authentication-related API endpoints.
//!
//! These functions parse request payloads, hand them to `auth::service` and
//! translate the outcome into HTTP responses.

use crate::api::common::{
    ApiError, ApiResponse, error_response, service_error_to_http, validation_error_response,
};
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::database::models::PrincipalView;
use axum::{
    extract::{Extension, Json, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header::AUTHORIZATION},
};
use std::sync::Arc;
use validator::Validate;

fn malformed_body(rejection: JsonRejection) -> ApiError {
    error_response(
        StatusCode::BAD_REQUEST,
        "validation_error",
        rejection.body_text(),
        None,
    )
}

/// Handle player registration request
#[axum::debug_handler]
pub async fn register(
    Extension(auth): Extension<Arc<AuthService>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<PrincipalView>>), ApiError> {
    let Json(payload) = payload.map_err(malformed_body)?;

    let principal = auth
        .register(payload)
        .await
        .map_err(service_error_to_http)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            PrincipalView::from(&principal),
            "Player registered successfully",
        )),
    ))
}

/// Handle player login request
#[axum::debug_handler]
pub async fn login(
    Extension(auth): Extension<Arc<AuthService>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(HeaderMap, Json<ApiResponse<LoginResponse>>), ApiError> {
    let Json(payload) = payload.map_err(malformed_body)?;

    if let Err(validation_errors) = payload.validate() {
        return Err(validation_error_response(&validation_errors));
    }

    let outcome = auth
        .login(&payload.username, &payload.password)
        .await
        .map_err(service_error_to_http)?;

    let mut headers = HeaderMap::new();
    let bearer = HeaderValue::from_str(&format!("Bearer {}", outcome.token)).map_err(|e| {
        tracing::error!("Issued token is not a valid header value: {}", e);
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal server error",
            None,
        )
    })?;
    headers.insert(AUTHORIZATION, bearer);

    let response = LoginResponse {
        token: outcome.token,
        player_id: outcome.principal_id,
        expires_in: auth.tokens().lifetime().as_secs(),
    };

    Ok((
        headers,
        Json(ApiResponse::success(response, "Player login successful")),
    ))
}

/// Return the authenticated player's own record
#[axum::debug_handler]
pub async fn me(
    Extension(auth): Extension<Arc<AuthService>>,
    Extension(identity): Extension<RequestIdentity>,
) -> Result<Json<ApiResponse<PrincipalView>>, ApiError> {
    let principal = auth
        .current_principal(&identity)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(ApiResponse::success(
        PrincipalView::from(&principal),
        "Player retrieved successfully",
    )))
}
