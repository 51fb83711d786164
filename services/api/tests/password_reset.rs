//! Integration tests for password-reset OTP storage
//!
//! These tests need a running PostgreSQL instance reachable through
//! `DATABASE_URL` and are ignored by default:
//!
//! ```sh
//! cargo test -p api -- --ignored
//! ```

use chrono::{Duration, Utc};
use serial_test::serial;
use sqlx::PgPool;
use uuid::Uuid;

use api::repositories::otp::OtpRepository;
use common::database::{DatabaseConfig, init_pool, run_migrations};

async fn setup_pool() -> Result<PgPool, Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    run_migrations(&pool, &sqlx::migrate!()).await?;
    Ok(pool)
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance"]
async fn otp_is_single_use() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup_pool().await?;
    let otps = OtpRepository::new(pool.clone());
    let email = format!("reset-{}@example.com", Uuid::new_v4());

    otps.upsert(&email, "123456", Utc::now() + Duration::minutes(30))
        .await?;

    let stored = otps.find_by_email(&email).await?.expect("OTP missing");
    assert_eq!(stored.otp, "123456");

    // A consumed OTP is deleted and cannot authorize a second reset
    otps.delete(&email).await?;
    assert!(otps.find_by_email(&email).await?.is_none());

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance"]
async fn a_new_request_replaces_the_previous_otp() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup_pool().await?;
    let otps = OtpRepository::new(pool.clone());
    let email = format!("reset-{}@example.com", Uuid::new_v4());

    otps.upsert(&email, "111111", Utc::now() + Duration::minutes(30))
        .await?;
    otps.upsert(&email, "222222", Utc::now() + Duration::minutes(30))
        .await?;

    let stored = otps.find_by_email(&email).await?.expect("OTP missing");
    assert_eq!(stored.otp, "222222");

    otps.delete(&email).await?;
    Ok(())
}
