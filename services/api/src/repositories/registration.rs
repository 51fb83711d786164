//! Registration repository for database operations

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use crate::models::{
    NewRegistration, PaymentStatus, Registration, RegistrationStatus, UpdateRegistration,
};

fn map_registration(row: &PgRow) -> Result<Registration> {
    let payment_status: String = row.get("payment_status");
    let registration_status: String = row.get("registration_status");

    Ok(Registration {
        id: row.get("id"),
        workshop_id: row.get("workshop_id"),
        user_id: row.get("user_id"),
        email: row.get("email"),
        full_name: row.get("full_name"),
        grade: row.get("grade"),
        school: row.get("school"),
        phone: row.get("phone"),
        parent_name: row.get("parent_name"),
        parent_phone: row.get("parent_phone"),
        payment_status: payment_status.parse::<PaymentStatus>()?,
        registration_status: registration_status.parse::<RegistrationStatus>()?,
        payment_id: row.get("payment_id"),
        amount_paid: row.get("amount_paid"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
    })
}

const REGISTRATION_COLUMNS: &str = "id, workshop_id, user_id, email, full_name, grade, \
     school, phone, parent_name, parent_phone, payment_status, registration_status, \
     payment_id, amount_paid, notes, created_at";

/// Registration repository for database operations
#[derive(Clone)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    /// Create a new registration repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a registration on the caller's transaction
    ///
    /// `amount_paid` is the workshop fee captured at creation time. The
    /// partial unique indexes reject duplicates for both account and guest
    /// registrations.
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        input: &NewRegistration,
        workshop_id: Uuid,
        user_id: Option<Uuid>,
        amount_paid: f64,
    ) -> Result<Registration> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO registrations (workshop_id, user_id, email, full_name, grade,
                school, phone, parent_name, parent_phone, amount_paid)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {REGISTRATION_COLUMNS}
            "#,
        ))
        .bind(workshop_id)
        .bind(user_id)
        .bind(&input.email)
        .bind(&input.full_name)
        .bind(input.grade)
        .bind(&input.school)
        .bind(&input.phone)
        .bind(&input.parent_name)
        .bind(&input.parent_phone)
        .bind(amount_paid)
        .fetch_one(&mut *conn)
        .await?;

        map_registration(&row)
    }

    /// Find a registration by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Registration>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {REGISTRATION_COLUMNS}
            FROM registrations
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_registration).transpose()
    }

    /// Find all registrations held by a user
    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Registration>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {REGISTRATION_COLUMNS}
            FROM registrations
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_registration).collect()
    }

    /// Find all registrations for a workshop
    pub async fn find_by_workshop(&self, workshop_id: Uuid) -> Result<Vec<Registration>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {REGISTRATION_COLUMNS}
            FROM registrations
            WHERE workshop_id = $1
            ORDER BY created_at ASC
            "#,
        ))
        .bind(workshop_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_registration).collect()
    }

    /// List every registration, newest first
    pub async fn list(&self) -> Result<Vec<Registration>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {REGISTRATION_COLUMNS}
            FROM registrations
            ORDER BY created_at DESC
            "#,
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_registration).collect()
    }

    /// Whether a duplicate registration exists for this workshop: by user id
    /// for account holders, by email for guests
    pub async fn duplicate_exists(
        &self,
        workshop_id: Uuid,
        user_id: Option<Uuid>,
        email: &str,
    ) -> Result<bool> {
        let count: i64 = match user_id {
            Some(user_id) => {
                sqlx::query_scalar(
                    "SELECT COUNT(*) FROM registrations WHERE workshop_id = $1 AND user_id = $2",
                )
                .bind(workshop_id)
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar(
                    "SELECT COUNT(*) FROM registrations \
                     WHERE workshop_id = $1 AND email = $2 AND user_id IS NULL",
                )
                .bind(workshop_id)
                .bind(email)
                .fetch_one(&self.pool)
                .await?
            }
        };

        Ok(count > 0)
    }

    /// Apply an admin patch to payment/approval fields
    pub async fn update(
        &self,
        id: Uuid,
        patch: &UpdateRegistration,
    ) -> Result<Option<Registration>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE registrations
            SET payment_status = COALESCE($2, payment_status),
                registration_status = COALESCE($3, registration_status),
                payment_id = COALESCE($4, payment_id),
                notes = COALESCE($5, notes)
            WHERE id = $1
            RETURNING {REGISTRATION_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(patch.payment_status.map(|s| s.as_str()))
        .bind(patch.registration_status.map(|s| s.as_str()))
        .bind(&patch.payment_id)
        .bind(&patch.notes)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_registration).transpose()
    }

    /// Delete a registration on the caller's transaction
    pub async fn delete(&self, conn: &mut PgConnection, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all registrations
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM registrations")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Count registrations referencing a workshop
    pub async fn count_by_workshop(&self, workshop_id: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE workshop_id = $1")
                .bind(workshop_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Count registrations awaiting approval
    pub async fn count_pending(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM registrations WHERE registration_status = 'pending'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Per-UTC-day registration counts since the given instant
    pub async fn daily_counts_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<(NaiveDate, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT (created_at AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS count
            FROM registrations
            WHERE created_at >= $1
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("day"), row.get("count")))
            .collect())
    }
}
