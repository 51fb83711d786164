//! Testimonial routes

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::auth::{AdminUser, OptionalAuthUser};
use crate::error::{ApiError, ApiResult};
use crate::models::{NewTestimonial, UpdateTestimonial};
use crate::routes::parse_id;
use crate::state::AppState;

#[derive(Deserialize, Default)]
pub struct TestimonialQuery {
    #[serde(default)]
    pub include_hidden: bool,
}

/// List testimonials; hidden entries are only shown to admins on request
pub async fn list_testimonials(
    State(state): State<AppState>,
    OptionalAuthUser(caller): OptionalAuthUser,
    Query(query): Query<TestimonialQuery>,
) -> ApiResult<impl IntoResponse> {
    let is_admin = caller.map(|user| user.is_admin()).unwrap_or(false);

    let testimonials = if query.include_hidden && is_admin {
        state.testimonials.list_all().await?
    } else {
        state.testimonials.list_visible().await?
    };

    Ok(Json(testimonials))
}

/// Create a testimonial, admin only
pub async fn create_testimonial(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<NewTestimonial>,
) -> ApiResult<impl IntoResponse> {
    let testimonial = state.testimonials.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(testimonial)))
}

/// Apply a testimonial patch, admin only
pub async fn update_testimonial(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(patch): Json<UpdateTestimonial>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "testimonial")?;

    if patch.is_empty() {
        return Err(ApiError::InvalidArgument("No fields to update".to_string()));
    }

    let testimonial = state
        .testimonials
        .update(id, &patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("Testimonial not found".to_string()))?;

    Ok(Json(testimonial))
}

/// Delete a testimonial, admin only
pub async fn delete_testimonial(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "testimonial")?;

    if !state.testimonials.delete(id).await? {
        return Err(ApiError::NotFound("Testimonial not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
