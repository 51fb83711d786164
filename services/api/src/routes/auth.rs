//! Authentication routes

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult, conflict_on_unique};
use crate::models::{LoginCredentials, NewUser};
use crate::password::{hash_password, verify_password};
use crate::repositories::otp::PasswordResetOtp;
use crate::state::AppState;
use crate::validation::{validate_email, validate_password};

/// How long a password-reset OTP stays valid
const OTP_TTL_MINUTES: i64 = 30;

/// Response for a successful login
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Request to start a password reset
#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Request to complete a password reset
#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

/// Request to change the current password
#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Generate a 6-digit numeric one-time password
pub fn generate_otp() -> String {
    let mut rng = rand::thread_rng();
    (0..6).map(|_| char::from(b'0' + rng.gen_range(0u8..10))).collect()
}

/// Outcome of matching a submitted OTP against the stored one
#[derive(Debug, PartialEq, Eq)]
enum OtpCheck {
    Missing,
    Expired,
    Mismatch,
    Valid,
}

fn check_otp(
    stored: Option<&PasswordResetOtp>,
    submitted: &str,
    now: chrono::DateTime<Utc>,
) -> OtpCheck {
    let Some(stored) = stored else {
        return OtpCheck::Missing;
    };

    if stored.expires_at < now {
        return OtpCheck::Expired;
    }

    if stored.otp != submitted {
        return OtpCheck::Mismatch;
    }

    OtpCheck::Valid
}

/// Register a new user account
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> ApiResult<impl IntoResponse> {
    validate_email(&payload.email).map_err(ApiError::InvalidArgument)?;
    validate_password(&payload.password).map_err(ApiError::InvalidArgument)?;

    if state.users.find_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = state
        .users
        .create(&payload, &password_hash)
        .await
        .map_err(|e| conflict_on_unique(e, "Email already registered"))?;

    info!("Registered new user: {}", user.email);

    Ok((StatusCode::CREATED, Json(user)))
}

/// Exchange credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginCredentials>,
) -> ApiResult<impl IntoResponse> {
    let invalid =
        || ApiError::Unauthenticated("Incorrect email or password".to_string());

    let user = state
        .users
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(invalid());
    }

    let access_token = state.jwt_service.generate_access_token(&user)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    }))
}

/// Return the authenticated user's record
pub async fn me(State(state): State<AppState>, caller: AuthUser) -> ApiResult<impl IntoResponse> {
    let user = state
        .users
        .find_by_id(caller.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Start a password reset by emailing an OTP
///
/// The reply is identical whether or not the email is registered.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    let neutral_reply = Json(json!({
        "message": "If your email is registered, you will receive a password reset OTP"
    }));

    let Some(user) = state.users.find_by_email(&payload.email).await? else {
        return Ok(neutral_reply);
    };

    let otp = generate_otp();
    let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);
    state.otps.upsert(&user.email, &otp, expires_at).await?;

    let mailer = state.mailer.clone();
    let email = user.email.clone();
    let name = user.full_name.clone();
    tokio::spawn(async move {
        if let Err(e) = mailer.send_password_reset_otp(&email, &name, &otp).await {
            warn!("Failed to send password reset email: {:#}", e);
        }
    });

    Ok(neutral_reply)
}

/// Complete a password reset with a previously issued OTP
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    let stored = state.otps.find_by_email(&payload.email).await?;

    match check_otp(stored.as_ref(), &payload.otp, Utc::now()) {
        OtpCheck::Missing => {
            return Err(ApiError::InvalidArgument(
                "Invalid or expired OTP. Please request a new one.".to_string(),
            ));
        }
        OtpCheck::Expired => {
            state.otps.delete(&payload.email).await?;
            return Err(ApiError::InvalidArgument(
                "OTP has expired. Please request a new one.".to_string(),
            ));
        }
        OtpCheck::Mismatch => {
            return Err(ApiError::InvalidArgument("Invalid OTP".to_string()));
        }
        OtpCheck::Valid => {}
    }

    validate_password(&payload.new_password).map_err(ApiError::InvalidArgument)?;

    let user = state
        .users
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let password_hash = hash_password(&payload.new_password)?;
    state.users.set_password_hash(user.id, &password_hash).await?;

    // An OTP authorizes exactly one reset
    state.otps.delete(&payload.email).await?;

    Ok(Json(json!({
        "message": "Password has been reset successfully"
    })))
}

/// Change the authenticated user's password
pub async fn change_password(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .users
        .find_by_id(caller.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !verify_password(&payload.old_password, &user.password_hash)? {
        return Err(ApiError::InvalidArgument(
            "Incorrect old password".to_string(),
        ));
    }

    validate_password(&payload.new_password).map_err(ApiError::InvalidArgument)?;

    let password_hash = hash_password(&payload.new_password)?;
    state.users.set_password_hash(user.id, &password_hash).await?;

    Ok(Json(json!({
        "message": "Password updated successfully"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..100 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }

    fn stored_otp(expires_at: chrono::DateTime<Utc>) -> PasswordResetOtp {
        PasswordResetOtp {
            email: "student@example.com".to_string(),
            otp: "123456".to_string(),
            expires_at,
        }
    }

    #[test]
    fn missing_otp_is_rejected() {
        assert_eq!(check_otp(None, "123456", Utc::now()), OtpCheck::Missing);
    }

    #[test]
    fn expired_otp_is_rejected_even_when_matching() {
        let now = Utc::now();
        let stored = stored_otp(now - Duration::minutes(1));
        assert_eq!(check_otp(Some(&stored), "123456", now), OtpCheck::Expired);
    }

    #[test]
    fn wrong_otp_is_rejected() {
        let now = Utc::now();
        let stored = stored_otp(now + Duration::minutes(30));
        assert_eq!(check_otp(Some(&stored), "654321", now), OtpCheck::Mismatch);
    }

    #[test]
    fn matching_unexpired_otp_is_accepted() {
        let now = Utc::now();
        let stored = stored_otp(now + Duration::minutes(30));
        assert_eq!(check_otp(Some(&stored), "123456", now), OtpCheck::Valid);
    }
}
