// handlers/protected/auth/whoami.rs - GET /api/auth/whoami handler

use axum::Extension;

use crate::middleware::{ApiResponse, AuthUser};

/// Returns the identity carried by the presented access token.
pub async fn whoami_get(Extension(user): Extension<AuthUser>) -> ApiResponse<AuthUser> {
    ApiResponse::success(user)
}
