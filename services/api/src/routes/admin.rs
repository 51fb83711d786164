//! Admin routes

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{AdminUpdateUser, Role};
use crate::routes::parse_id;
use crate::state::AppState;

#[derive(Deserialize, Default)]
pub struct AdminUserQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub role: Option<Role>,
}

/// Dashboard statistics
pub async fn dashboard(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<impl IntoResponse> {
    let stats = state.admin.dashboard().await?;
    Ok(Json(stats))
}

/// List users for the admin panel
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<AdminUserQuery>,
) -> ApiResult<impl IntoResponse> {
    let skip = query.skip.unwrap_or(0).max(0);
    let limit = query.limit.unwrap_or(100).clamp(1, 1000);

    let users = state.users.list(skip, limit, query.role).await?;
    Ok(Json(users))
}

/// Admins cannot patch themselves; demoting or deactivating your own
/// account mid-session leaves the panel in a broken state.
fn reject_self_edit(target: Uuid, admin_id: Uuid) -> Result<(), ApiError> {
    if target == admin_id {
        return Err(ApiError::Forbidden(
            "Admin cannot update their own user details".to_string(),
        ));
    }
    Ok(())
}

/// Apply an admin patch to another user's account
pub async fn update_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    Json(patch): Json<AdminUpdateUser>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "user")?;

    reject_self_edit(id, admin.0.id)?;

    if patch.is_empty() {
        return Err(ApiError::InvalidArgument("No fields to update".to_string()));
    }

    let user = state
        .users
        .admin_update(id, &patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!("Admin {} updated user {}", admin.0.email, user.id);
    Ok(Json(user))
}

/// List every registration, newest first
pub async fn list_registrations(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<impl IntoResponse> {
    let registrations = state.registrations.list().await?;
    Ok(Json(registrations))
}

/// Export a workshop's registrations as a CSV payload wrapped in JSON,
/// carrying the suggested filename and the workshop title
pub async fn export_registrations(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(workshop_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let workshop_id = parse_id(&workshop_id, "workshop")?;

    let export = state.admin.export_registrations(workshop_id).await?;
    info!(
        "Exported registrations for workshop: {}",
        export.workshop_title
    );

    Ok(Json(export))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_edit_is_forbidden() {
        let admin_id = Uuid::new_v4();

        let err = reject_self_edit(admin_id, admin_id).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        assert!(reject_self_edit(Uuid::new_v4(), admin_id).is_ok());
    }
}
