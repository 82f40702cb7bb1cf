// handlers/protected/search.rs - POST /api/{entity}/search handler

use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};

use crate::app::{AppState, Searchable};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::projection::EntityProjection;
use crate::services::RequestContext;
use crate::types::Page;

/// Body is the entity's criteria object; answers one page of projections.
///
/// ```json
/// { "searchTerm": "john", "roles": ["EDITOR"], "page": 0, "pageSize": 20, "fields": ["fullName"] }
/// ```
pub async fn search_post<E: Searchable>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<E::Criteria>, JsonRejection>,
) -> ApiResult<Page<EntityProjection>> {
    let Json(criteria) = payload?;
    let ctx = RequestContext { subject: user, timeout: state.query_timeout };

    let page = state.search.search(E::store(&state.stores).as_ref(), &criteria, &ctx).await?;
    Ok(ApiResponse::success(page))
}
