//! Application state shared across handlers

use sqlx::PgPool;

use crate::admin::AdminService;
use crate::jwt::JwtService;
use crate::mailer::Mailer;
use crate::repositories::UserRepository;
use crate::repositories::otp::OtpRepository;
use crate::repositories::registration::RegistrationRepository;
use crate::repositories::testimonial::TestimonialRepository;
use crate::repositories::workshop::WorkshopRepository;
use crate::workflow::RegistrationWorkflow;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: JwtService,
    pub mailer: Mailer,
    pub users: UserRepository,
    pub workshops: WorkshopRepository,
    pub registrations: RegistrationRepository,
    pub otps: OtpRepository,
    pub testimonials: TestimonialRepository,
    pub workflow: RegistrationWorkflow,
    pub admin: AdminService,
}

impl AppState {
    /// Wire up repositories and services over a connection pool
    pub fn new(pool: PgPool, jwt_service: JwtService, mailer: Mailer) -> Self {
        let users = UserRepository::new(pool.clone());
        let workshops = WorkshopRepository::new(pool.clone());
        let registrations = RegistrationRepository::new(pool.clone());
        let otps = OtpRepository::new(pool.clone());
        let testimonials = TestimonialRepository::new(pool.clone());

        let workflow = RegistrationWorkflow::new(
            pool.clone(),
            workshops.clone(),
            registrations.clone(),
            mailer.clone(),
        );
        let admin = AdminService::new(users.clone(), workshops.clone(), registrations.clone());

        AppState {
            db_pool: pool,
            jwt_service,
            mailer,
            users,
            workshops,
            registrations,
            otps,
            testimonials,
            workflow,
            admin,
        }
    }
}
