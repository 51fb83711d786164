//! User profile routes

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::auth::{AdminUser, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::models::{Role, UpdateUser};
use crate::routes::parse_id;
use crate::state::AppState;

#[derive(Deserialize, Default)]
pub struct UserListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub role: Option<Role>,
}

/// Return the caller's own profile
pub async fn get_profile(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .users
        .find_by_id(caller.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Apply a self-service profile patch
pub async fn update_profile(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(patch): Json<UpdateUser>,
) -> ApiResult<impl IntoResponse> {
    if patch.is_empty() {
        return Err(ApiError::InvalidArgument("No fields to update".to_string()));
    }

    let user = state
        .users
        .update_profile(caller.id, &patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// List users, admin only
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<UserListQuery>,
) -> ApiResult<impl IntoResponse> {
    let skip = query.skip.unwrap_or(0).max(0);
    let limit = query.limit.unwrap_or(50).clamp(1, 200);

    let users = state.users.list(skip, limit, query.role).await?;
    Ok(Json(users))
}

/// Fetch a single user by id, admin only
pub async fn get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "user")?;

    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
