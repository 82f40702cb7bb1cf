// handlers/protected/auth/logout.rs - POST /api/auth/logout handler

use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, BearerToken};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// POST /api/auth/logout - Revoke the current access token
///
/// An optional `refreshToken` in the body is revoked as well. The body may be
/// omitted entirely.
pub async fn logout_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(BearerToken(access_token)): Extension<BearerToken>,
    payload: Result<Json<LogoutRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => LogoutRequest::default(),
        Err(rejection) => return Err(rejection.into()),
    };

    state.tokens.revoke(&access_token, state.revocation_timeout).await?;
    if let Some(refresh_token) = request.refresh_token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        state.tokens.revoke(refresh_token, state.revocation_timeout).await?;
    }

    info!(user = %user.user_id, "Logged out");
    Ok(ApiResponse::success(json!({ "loggedOut": true })))
}
