//! Integration tests for the registration workflow
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

use api::error::ApiError;
use api::mailer::Mailer;
use api::models::{NewRegistration, NewWorkshop, WorkshopStatus};
use api::repositories::registration::RegistrationRepository;
use api::repositories::workshop::WorkshopRepository;
use api::workflow::RegistrationWorkflow;
use common::database::{DatabaseConfig, init_pool, run_migrations};

async fn setup_pool() -> Result<PgPool, Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    run_migrations(&pool, &sqlx::migrate!()).await?;
    Ok(pool)
}

fn workflow(pool: &PgPool) -> RegistrationWorkflow {
    RegistrationWorkflow::new(
        pool.clone(),
        WorkshopRepository::new(pool.clone()),
        RegistrationRepository::new(pool.clone()),
        Mailer::disabled(),
    )
}

async fn create_workshop(
    pool: &PgPool,
    max_participants: i32,
) -> Result<Uuid, Box<dyn std::error::Error>> {
    let now = Utc::now();
    let workshop = WorkshopRepository::new(pool.clone())
        .create(&NewWorkshop {
            title: format!("Integration Test Workshop {}", Uuid::new_v4()),
            description: "Workflow integration test fixture".to_string(),
            short_description: "Test fixture".to_string(),
            image_url: "https://example.com/test.png".to_string(),
            start_date: now + Duration::days(10),
            end_date: now + Duration::days(11),
            registration_deadline: now + Duration::days(5),
            location: "Pune".to_string(),
            max_participants,
            fee: 500.0,
            eligible_grades: vec![8, 9, 10],
            featured: false,
            status: WorkshopStatus::Upcoming,
        })
        .await?;

    Ok(workshop.id)
}

fn guest_registration(workshop_id: Uuid, email: &str) -> NewRegistration {
    NewRegistration {
        workshop_id: workshop_id.to_string(),
        email: email.to_string(),
        full_name: "Test Student".to_string(),
        grade: 9,
        school: "Test School".to_string(),
        phone: "9876543210".to_string(),
        parent_name: "Test Parent".to_string(),
        parent_phone: "9876543211".to_string(),
    }
}

async fn registered_count(pool: &PgPool, workshop_id: Uuid) -> i32 {
    let workshop = WorkshopRepository::new(pool.clone())
        .find_by_id(workshop_id)
        .await
        .expect("workshop lookup failed")
        .expect("workshop missing");
    workshop.registered_count
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance"]
async fn creating_a_registration_increments_the_counter(
) -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup_pool().await?;
    let workshop_id = create_workshop(&pool, 10).await?;
    let workflow = workflow(&pool);

    let registration = workflow
        .create(guest_registration(workshop_id, "counter@example.com"), None)
        .await?;

    assert_eq!(registration.workshop_id, workshop_id);
    // The workshop fee is captured on the registration at creation time
    assert_eq!(registration.amount_paid, 500.0);
    assert_eq!(registered_count(&pool, workshop_id).await, 1);

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance"]
async fn duplicate_guest_registration_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup_pool().await?;
    let workshop_id = create_workshop(&pool, 10).await?;
    let workflow = workflow(&pool);

    workflow
        .create(guest_registration(workshop_id, "duplicate@example.com"), None)
        .await?;

    let err = workflow
        .create(guest_registration(workshop_id, "duplicate@example.com"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Conflict(_)));
    assert_eq!(registered_count(&pool, workshop_id).await, 1);

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance"]
async fn two_concurrent_requests_cannot_share_the_last_seat(
) -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup_pool().await?;
    let workshop_id = create_workshop(&pool, 1).await?;

    let first = {
        let workflow = workflow(&pool);
        tokio::spawn(async move {
            workflow
                .create(guest_registration(workshop_id, "first@example.com"), None)
                .await
        })
    };
    let second = {
        let workflow = workflow(&pool);
        tokio::spawn(async move {
            workflow
                .create(guest_registration(workshop_id, "second@example.com"), None)
                .await
        })
    };

    let outcomes = [first.await?, second.await?];
    let successes = outcomes.iter().filter(|outcome| outcome.is_ok()).count();

    assert_eq!(successes, 1, "exactly one request may claim the last seat");
    assert_eq!(registered_count(&pool, workshop_id).await, 1);

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance"]
async fn cancellation_releases_the_seat() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup_pool().await?;
    let workshop_id = create_workshop(&pool, 1).await?;
    let workflow = workflow(&pool);

    let registration = workflow
        .create(guest_registration(workshop_id, "cancel@example.com"), None)
        .await?;
    assert_eq!(registered_count(&pool, workshop_id).await, 1);

    let admin = api::auth::AuthUser {
        id: Uuid::new_v4(),
        email: "admin@example.com".to_string(),
        role: api::models::Role::Admin,
    };
    workflow.cancel(registration.id, &admin).await?;

    assert_eq!(registered_count(&pool, workshop_id).await, 0);

    // The released seat can be claimed again
    workflow
        .create(guest_registration(workshop_id, "next@example.com"), None)
        .await?;
    assert_eq!(registered_count(&pool, workshop_id).await, 1);

    Ok(())
}
