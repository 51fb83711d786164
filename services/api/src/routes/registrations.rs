//! Registration routes
//!
//! Creation and cancellation go through the workflow service so that the
//! workshop counter stays consistent with the registration rows.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::{AdminUser, AuthUser, OptionalAuthUser};
use crate::error::{ApiError, ApiResult};
use crate::models::{NewRegistration, UpdateRegistration};
use crate::routes::parse_id;
use crate::state::AppState;

/// Register for a workshop, as an account holder or as a guest
pub async fn create_registration(
    State(state): State<AppState>,
    OptionalAuthUser(caller): OptionalAuthUser,
    Json(payload): Json<NewRegistration>,
) -> ApiResult<impl IntoResponse> {
    let registration = state.workflow.create(payload, caller.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

/// List the caller's own registrations, newest first
pub async fn my_registrations(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let registrations = state.registrations.find_by_user(caller.id).await?;
    Ok(Json(registrations))
}

/// Fetch a registration, visible to its owner or an admin
pub async fn get_registration(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "registration")?;

    let registration = state
        .registrations
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Registration not found".to_string()))?;

    let owns = registration.user_id == Some(caller.id);
    if !caller.is_admin() && !owns {
        return Err(ApiError::Forbidden(
            "Not authorized to view this registration".to_string(),
        ));
    }

    Ok(Json(registration))
}

/// Patch a registration's payment/approval fields, admin only
pub async fn update_registration(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(patch): Json<UpdateRegistration>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "registration")?;
    let registration = state.workflow.update(id, patch).await?;
    Ok(Json(registration))
}

/// Cancel a registration, releasing its seat
pub async fn cancel_registration(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "registration")?;
    state.workflow.cancel(id, &caller).await?;
    Ok(StatusCode::NO_CONTENT)
}
