//! API service routes

use axum::{
    Json, Router,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod registrations;
pub mod testimonials;
pub mod users;
pub mod workshops;

/// Parse a path id, reporting a malformed value as not-found rather than
/// as a parse failure
pub(crate) fn parse_id(id: &str, entity: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::NotFound(format!("Invalid {} ID", entity)))
}

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Authentication
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/auth/change-password", post(auth::change_password))
        // Users
        .route("/users/me", get(users::get_profile).put(users::update_profile))
        .route("/users", get(users::list_users))
        .route("/users/:id", get(users::get_user))
        // Workshops
        .route("/workshops", get(workshops::list_workshops).post(workshops::create_workshop))
        .route(
            "/workshops/:id",
            get(workshops::get_workshop)
                .put(workshops::update_workshop)
                .delete(workshops::delete_workshop),
        )
        // Registrations
        .route("/registrations", post(registrations::create_registration))
        .route("/registrations/me", get(registrations::my_registrations))
        .route(
            "/registrations/:id",
            get(registrations::get_registration)
                .put(registrations::update_registration)
                .delete(registrations::cancel_registration),
        )
        // Testimonials
        .route(
            "/testimonials",
            get(testimonials::list_testimonials).post(testimonials::create_testimonial),
        )
        .route(
            "/testimonials/:id",
            put(testimonials::update_testimonial).delete(testimonials::delete_testimonial),
        )
        // Admin
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/:id", put(admin::update_user))
        .route("/admin/registrations", get(admin::list_registrations))
        .route(
            "/admin/export/registrations/:workshop_id",
            post(admin::export_registrations),
        );

    // The browser frontend is served from a different origin
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Welcome message for the API root
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to Science Workshop Registration Portal API"
    }))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "workshop-portal-api"
    }))
}
