//! Password-reset OTP repository
//!
//! One-time passwords are persisted with an explicit expiry instead of
//! living in process memory, so they survive restarts and work when more
//! than one instance is running.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

/// Stored one-time password for a password reset
#[derive(Debug, Clone)]
pub struct PasswordResetOtp {
    pub email: String,
    pub otp: String,
    pub expires_at: DateTime<Utc>,
}

/// Password-reset OTP repository
#[derive(Clone)]
pub struct OtpRepository {
    pool: PgPool,
}

impl OtpRepository {
    /// Create a new OTP repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store an OTP for an email, replacing any previous one
    pub async fn upsert(&self, email: &str, otp: &str, expires_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO password_reset_otps (email, otp, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (email)
            DO UPDATE SET otp = EXCLUDED.otp,
                          expires_at = EXCLUDED.expires_at,
                          created_at = now()
            "#,
        )
        .bind(email)
        .bind(otp)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch the stored OTP for an email, if any
    pub async fn find_by_email(&self, email: &str) -> Result<Option<PasswordResetOtp>> {
        let row = sqlx::query(
            r#"
            SELECT email, otp, expires_at
            FROM password_reset_otps
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| PasswordResetOtp {
            email: row.get("email"),
            otp: row.get("otp"),
            expires_at: row.get("expires_at"),
        }))
    }

    /// Remove the stored OTP for an email
    pub async fn delete(&self, email: &str) -> Result<()> {
        sqlx::query("DELETE FROM password_reset_otps WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
