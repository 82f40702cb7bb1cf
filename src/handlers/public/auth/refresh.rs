// handlers/public/auth/refresh.rs - POST /auth/refresh handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::app::AppState;
use crate::auth::TokenPair;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// POST /auth/refresh - Exchange a refresh token for a new token pair
///
/// Expected Input:
/// ```json
/// { "refreshToken": "eyJhbGciOiJIUzI1NiI..." }
/// ```
///
/// The presented refresh token is revoked; replaying it fails with 401.
pub async fn refresh_post(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<TokenPair> {
    let Json(request) = payload?;
    if request.refresh_token.trim().is_empty() {
        return Err(ApiError::bad_request("refreshToken is required"));
    }

    let pair = state.tokens.refresh(request.refresh_token.trim(), state.revocation_timeout).await?;
    info!("Rotated refresh token");
    Ok(ApiResponse::success(pair))
}
