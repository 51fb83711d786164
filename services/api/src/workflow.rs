//! Registration lifecycle workflow
//!
//! Coordinates the workshop and registration stores for creation, admin
//! status transitions and cancellation. The workshop's `registered_count`
//! is touched only here: +1 on creation, -1 on cancellation, both inside a
//! transaction with the registration write. The increment is conditional on
//! remaining capacity, so two concurrent requests for the last seat cannot
//! both succeed.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult, conflict_on_unique};
use crate::mailer::Mailer;
use crate::models::{
    NewRegistration, Registration, RegistrationStatus, UpdateRegistration, Workshop,
};
use crate::repositories::registration::RegistrationRepository;
use crate::repositories::workshop::WorkshopRepository;

/// Check that a workshop can accept a new registration right now.
///
/// First failure wins: deadline, then status, then capacity. The capacity
/// check here is advisory; the authoritative check is the conditional
/// increment performed inside the creation transaction.
pub fn check_open_for_registration(workshop: &Workshop, now: DateTime<Utc>) -> ApiResult<()> {
    if workshop.registration_deadline < now {
        return Err(ApiError::InvalidState(
            "Registration deadline has passed".to_string(),
        ));
    }

    if !workshop.status.accepts_registrations() {
        return Err(ApiError::InvalidState(
            "Workshop is not open for registration".to_string(),
        ));
    }

    if workshop.registered_count >= workshop.max_participants {
        return Err(ApiError::InvalidState(
            "Workshop is already full".to_string(),
        ));
    }

    Ok(())
}

/// Registration workflow service
#[derive(Clone)]
pub struct RegistrationWorkflow {
    pool: PgPool,
    workshops: WorkshopRepository,
    registrations: RegistrationRepository,
    mailer: Mailer,
}

impl RegistrationWorkflow {
    /// Create a new registration workflow
    pub fn new(
        pool: PgPool,
        workshops: WorkshopRepository,
        registrations: RegistrationRepository,
        mailer: Mailer,
    ) -> Self {
        Self {
            pool,
            workshops,
            registrations,
            mailer,
        }
    }

    /// Create a registration for an authenticated user or a guest
    pub async fn create(
        &self,
        input: NewRegistration,
        caller: Option<&AuthUser>,
    ) -> ApiResult<Registration> {
        let workshop_id = Uuid::parse_str(&input.workshop_id)
            .map_err(|_| ApiError::NotFound("Invalid workshop ID".to_string()))?;

        let workshop = self
            .workshops
            .find_by_id(workshop_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Workshop not found".to_string()))?;

        check_open_for_registration(&workshop, Utc::now())?;

        let user_id = caller.map(|user| user.id);
        let duplicate_message = if user_id.is_some() {
            "You have already registered for this workshop"
        } else {
            "This email is already registered for this workshop"
        };

        if self
            .registrations
            .duplicate_exists(workshop_id, user_id, &input.email)
            .await?
        {
            return Err(ApiError::Conflict(duplicate_message.to_string()));
        }

        let mut tx = self.pool.begin().await?;

        // Claim the seat first; a full workshop rolls everything back
        if !self
            .workshops
            .try_increment_registered(&mut tx, workshop_id)
            .await?
        {
            return Err(ApiError::InvalidState(
                "Workshop is already full".to_string(),
            ));
        }

        // The unique indexes catch duplicate races the pre-check missed
        let registration = self
            .registrations
            .insert(&mut tx, &input, workshop_id, user_id, workshop.fee)
            .await
            .map_err(|e| conflict_on_unique(e, duplicate_message))?;

        tx.commit().await?;

        self.dispatch_received_email(&registration, &workshop.title);

        Ok(registration)
    }

    /// Apply an admin patch to a registration's payment/approval fields
    pub async fn update(
        &self,
        id: Uuid,
        patch: UpdateRegistration,
    ) -> ApiResult<Registration> {
        if patch.is_empty() {
            return Err(ApiError::InvalidArgument("No fields to update".to_string()));
        }

        let updated = self
            .registrations
            .update(id, &patch)
            .await?
            .ok_or_else(|| ApiError::NotFound("Registration not found".to_string()))?;

        if patch.registration_status == Some(RegistrationStatus::Approved) {
            self.dispatch_approved_email(&updated);
        }

        Ok(updated)
    }

    /// Cancel a registration on behalf of its owner or an admin
    pub async fn cancel(&self, id: Uuid, caller: &AuthUser) -> ApiResult<()> {
        let registration = self
            .registrations
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Registration not found".to_string()))?;

        let owns = registration.user_id == Some(caller.id);
        if !caller.is_admin() && !owns {
            return Err(ApiError::Forbidden(
                "Not authorized to cancel this registration".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        if !self.registrations.delete(&mut tx, id).await? {
            return Err(ApiError::NotFound("Registration not found".to_string()));
        }

        self.workshops
            .decrement_registered(&mut tx, registration.workshop_id)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Fire-and-forget "registration received" notification
    fn dispatch_received_email(&self, registration: &Registration, workshop_title: &str) {
        let mailer = self.mailer.clone();
        let to = registration.email.clone();
        let name = registration.full_name.clone();
        let title = workshop_title.to_string();

        tokio::spawn(async move {
            if let Err(e) = mailer.send_registration_received(&to, &name, &title).await {
                warn!("Failed to send registration confirmation email: {:#}", e);
            }
        });
    }

    /// Fire-and-forget "registration approved" notification; looks up the
    /// workshop off the request path
    fn dispatch_approved_email(&self, registration: &Registration) {
        let mailer = self.mailer.clone();
        let workshops = self.workshops.clone();
        let workshop_id = registration.workshop_id;
        let to = registration.email.clone();
        let name = registration.full_name.clone();

        tokio::spawn(async move {
            let workshop = match workshops.find_by_id(workshop_id).await {
                Ok(Some(workshop)) => workshop,
                Ok(None) => return,
                Err(e) => {
                    warn!("Failed to load workshop for approval email: {:#}", e);
                    return;
                }
            };

            let date = workshop.start_date.format("%Y-%m-%d %H:%M").to_string();
            if let Err(e) = mailer
                .send_registration_approved(&to, &name, &workshop.title, &date)
                .await
            {
                warn!("Failed to send registration approval email: {:#}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkshopStatus;
    use chrono::Duration;

    fn open_workshop(now: DateTime<Utc>) -> Workshop {
        Workshop {
            id: Uuid::new_v4(),
            title: "Robotics 101".to_string(),
            description: "Build and program a line-following robot".to_string(),
            short_description: "Intro robotics".to_string(),
            image_url: "https://example.com/robotics.png".to_string(),
            start_date: now + Duration::days(10),
            end_date: now + Duration::days(11),
            registration_deadline: now + Duration::days(5),
            location: "Pune".to_string(),
            max_participants: 30,
            fee: 500.0,
            eligible_grades: vec![8, 9, 10],
            featured: false,
            status: WorkshopStatus::Upcoming,
            registered_count: 0,
            created_at: now,
        }
    }

    #[test]
    fn open_workshop_accepts_registration() {
        let now = Utc::now();
        assert!(check_open_for_registration(&open_workshop(now), now).is_ok());
    }

    #[test]
    fn past_deadline_is_rejected() {
        let now = Utc::now();
        let mut workshop = open_workshop(now);
        workshop.registration_deadline = now - Duration::hours(1);

        let err = check_open_for_registration(&workshop, now).unwrap_err();
        assert!(matches!(err, ApiError::InvalidState(msg) if msg.contains("deadline")));
    }

    #[test]
    fn closed_statuses_are_rejected() {
        let now = Utc::now();
        for status in [WorkshopStatus::Completed, WorkshopStatus::Cancelled] {
            let mut workshop = open_workshop(now);
            workshop.status = status;

            let err = check_open_for_registration(&workshop, now).unwrap_err();
            assert!(matches!(err, ApiError::InvalidState(msg) if msg.contains("not open")));
        }
    }

    #[test]
    fn full_workshop_is_rejected() {
        let now = Utc::now();
        let mut workshop = open_workshop(now);
        workshop.max_participants = 1;
        workshop.registered_count = 1;

        let err = check_open_for_registration(&workshop, now).unwrap_err();
        assert!(matches!(err, ApiError::InvalidState(msg) if msg.contains("full")));
    }

    #[test]
    fn deadline_failure_wins_over_capacity() {
        let now = Utc::now();
        let mut workshop = open_workshop(now);
        workshop.registration_deadline = now - Duration::hours(1);
        workshop.registered_count = workshop.max_participants;

        let err = check_open_for_registration(&workshop, now).unwrap_err();
        assert!(matches!(err, ApiError::InvalidState(msg) if msg.contains("deadline")));
    }
}
