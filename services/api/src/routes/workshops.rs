//! Workshop routes

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use crate::auth::AdminUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{NewWorkshop, UpdateWorkshop, WorkshopQuery};
use crate::routes::parse_id;
use crate::state::AppState;

/// List workshops with optional status, grade, featured and search filters
pub async fn list_workshops(
    State(state): State<AppState>,
    Query(query): Query<WorkshopQuery>,
) -> ApiResult<impl IntoResponse> {
    let workshops = state.workshops.search(&query).await?;
    Ok(Json(workshops))
}

/// Create a workshop, admin only
pub async fn create_workshop(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<NewWorkshop>,
) -> ApiResult<impl IntoResponse> {
    if payload.max_participants <= 0 {
        return Err(ApiError::InvalidArgument(
            "max_participants must be positive".to_string(),
        ));
    }

    let workshop = state.workshops.create(&payload).await?;
    info!("Created workshop: {} ({})", workshop.title, workshop.id);

    Ok((StatusCode::CREATED, Json(workshop)))
}

/// Fetch a workshop by id
pub async fn get_workshop(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "workshop")?;

    let workshop = state
        .workshops
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Workshop not found".to_string()))?;

    Ok(Json(workshop))
}

/// Apply a workshop patch, admin only
pub async fn update_workshop(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(patch): Json<UpdateWorkshop>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "workshop")?;

    if patch.is_empty() {
        return Err(ApiError::InvalidArgument("No fields to update".to_string()));
    }

    if matches!(patch.max_participants, Some(n) if n <= 0) {
        return Err(ApiError::InvalidArgument(
            "max_participants must be positive".to_string(),
        ));
    }

    let workshop = state
        .workshops
        .update(id, &patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("Workshop not found".to_string()))?;

    Ok(Json(workshop))
}

/// Delete a workshop, admin only
///
/// Deletion is refused while registrations still reference the workshop.
pub async fn delete_workshop(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "workshop")?;

    let registration_count = state.registrations.count_by_workshop(id).await?;
    if registration_count > 0 {
        return Err(ApiError::InvalidState(format!(
            "Cannot delete workshop with active registrations ({} found)",
            registration_count
        )));
    }

    if !state.workshops.delete(id).await? {
        return Err(ApiError::NotFound("Workshop not found".to_string()));
    }

    info!("Deleted workshop {}", id);
    Ok(StatusCode::NO_CONTENT)
}
