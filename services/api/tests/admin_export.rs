//! Integration tests for the admin CSV export
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

use api::admin::AdminService;
use api::error::ApiError;
use api::mailer::Mailer;
use api::models::{NewRegistration, NewWorkshop, WorkshopStatus};
use api::repositories::UserRepository;
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

fn admin_service(pool: &PgPool) -> AdminService {
    AdminService::new(
        UserRepository::new(pool.clone()),
        WorkshopRepository::new(pool.clone()),
        RegistrationRepository::new(pool.clone()),
    )
}

async fn create_workshop(pool: &PgPool) -> Result<Uuid, Box<dyn std::error::Error>> {
    let now = Utc::now();
    let workshop = WorkshopRepository::new(pool.clone())
        .create(&NewWorkshop {
            title: format!("Export Test Workshop {}", Uuid::new_v4()),
            description: "Export integration test fixture".to_string(),
            short_description: "Test fixture".to_string(),
            image_url: "https://example.com/test.png".to_string(),
            start_date: now + Duration::days(10),
            end_date: now + Duration::days(11),
            registration_deadline: now + Duration::days(5),
            location: "Pune".to_string(),
            max_participants: 10,
            fee: 500.0,
            eligible_grades: vec![8, 9, 10],
            featured: false,
            status: WorkshopStatus::Upcoming,
        })
        .await?;

    Ok(workshop.id)
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance"]
async fn export_without_registrations_is_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup_pool().await?;
    let workshop_id = create_workshop(&pool).await?;

    let err = admin_service(&pool)
        .export_registrations(workshop_id)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::NotFound(_)));

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL instance"]
async fn export_carries_filename_content_and_title() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup_pool().await?;
    let workshop_id = create_workshop(&pool).await?;

    let workflow = RegistrationWorkflow::new(
        pool.clone(),
        WorkshopRepository::new(pool.clone()),
        RegistrationRepository::new(pool.clone()),
        Mailer::disabled(),
    );
    workflow
        .create(
            NewRegistration {
                workshop_id: workshop_id.to_string(),
                email: "export@example.com".to_string(),
                full_name: "Export Student".to_string(),
                grade: 9,
                school: "Test School".to_string(),
                phone: "9876543210".to_string(),
                parent_name: "Test Parent".to_string(),
                parent_phone: "9876543211".to_string(),
            },
            None,
        )
        .await?;

    let export = admin_service(&pool).export_registrations(workshop_id).await?;

    assert_eq!(
        export.filename,
        format!("workshop_{}_registrations.csv", workshop_id)
    );
    assert!(export.workshop_title.starts_with("Export Test Workshop"));
    assert!(export.content.lines().count() >= 2);
    assert!(export.content.contains("\"Export Student\""));

    Ok(())
}
