//! Workshop repository for database operations

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use crate::models::{NewWorkshop, UpdateWorkshop, Workshop, WorkshopQuery, WorkshopStatus};

fn map_workshop(row: &PgRow) -> Result<Workshop> {
    let status: String = row.get("status");

    Ok(Workshop {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        short_description: row.get("short_description"),
        image_url: row.get("image_url"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        registration_deadline: row.get("registration_deadline"),
        location: row.get("location"),
        max_participants: row.get("max_participants"),
        fee: row.get("fee"),
        eligible_grades: row.get("eligible_grades"),
        featured: row.get("featured"),
        status: status.parse::<WorkshopStatus>()?,
        registered_count: row.get("registered_count"),
        created_at: row.get("created_at"),
    })
}

const WORKSHOP_COLUMNS: &str = "id, title, description, short_description, image_url, \
     start_date, end_date, registration_deadline, location, max_participants, fee, \
     eligible_grades, featured, status, registered_count, created_at";

/// Workshop repository for database operations
#[derive(Clone)]
pub struct WorkshopRepository {
    pool: PgPool,
}

impl WorkshopRepository {
    /// Create a new workshop repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Search workshops with filters and pagination, ordered by start date
    pub async fn search(&self, query: &WorkshopQuery) -> Result<Vec<Workshop>> {
        let skip = query.skip.unwrap_or(0).max(0);
        let limit = query.limit.unwrap_or(20).clamp(1, 100);

        let rows = sqlx::query(&format!(
            r#"
            SELECT {WORKSHOP_COLUMNS}
            FROM workshops
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::integer IS NULL OR $2 = ANY(eligible_grades))
              AND ($3::boolean IS NULL OR featured = $3)
              AND ($4::text IS NULL
                   OR title ILIKE '%' || $4 || '%'
                   OR description ILIKE '%' || $4 || '%')
            ORDER BY start_date ASC
            LIMIT $5 OFFSET $6
            "#,
        ))
        .bind(query.status.map(|s| s.as_str()))
        .bind(query.grade)
        .bind(query.featured)
        .bind(query.search.as_deref())
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_workshop).collect()
    }

    /// Find a workshop by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Workshop>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {WORKSHOP_COLUMNS}
            FROM workshops
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_workshop).transpose()
    }

    /// Create a new workshop
    pub async fn create(&self, new_workshop: &NewWorkshop) -> Result<Workshop> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO workshops (title, description, short_description, image_url,
                start_date, end_date, registration_deadline, location,
                max_participants, fee, eligible_grades, featured, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {WORKSHOP_COLUMNS}
            "#,
        ))
        .bind(&new_workshop.title)
        .bind(&new_workshop.description)
        .bind(&new_workshop.short_description)
        .bind(&new_workshop.image_url)
        .bind(new_workshop.start_date)
        .bind(new_workshop.end_date)
        .bind(new_workshop.registration_deadline)
        .bind(&new_workshop.location)
        .bind(new_workshop.max_participants)
        .bind(new_workshop.fee)
        .bind(&new_workshop.eligible_grades)
        .bind(new_workshop.featured)
        .bind(new_workshop.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        map_workshop(&row)
    }

    /// Apply a workshop patch
    pub async fn update(&self, id: Uuid, patch: &UpdateWorkshop) -> Result<Option<Workshop>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE workshops
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                short_description = COALESCE($4, short_description),
                image_url = COALESCE($5, image_url),
                start_date = COALESCE($6, start_date),
                end_date = COALESCE($7, end_date),
                registration_deadline = COALESCE($8, registration_deadline),
                location = COALESCE($9, location),
                max_participants = COALESCE($10, max_participants),
                fee = COALESCE($11, fee),
                eligible_grades = COALESCE($12, eligible_grades),
                featured = COALESCE($13, featured),
                status = COALESCE($14, status)
            WHERE id = $1
            RETURNING {WORKSHOP_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(&patch.short_description)
        .bind(&patch.image_url)
        .bind(patch.start_date)
        .bind(patch.end_date)
        .bind(patch.registration_deadline)
        .bind(&patch.location)
        .bind(patch.max_participants)
        .bind(patch.fee)
        .bind(&patch.eligible_grades)
        .bind(patch.featured)
        .bind(patch.status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_workshop).transpose()
    }

    /// Delete a workshop by ID
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM workshops WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Claim one seat: increment the registered count only while capacity
    /// remains. Returns false when the workshop is full (or missing).
    ///
    /// Runs on the caller's transaction so the claim rolls back together
    /// with the registration insert.
    pub async fn try_increment_registered(&self, conn: &mut PgConnection, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE workshops
            SET registered_count = registered_count + 1
            WHERE id = $1 AND registered_count < max_participants
            "#,
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Release one seat, clamping the count at zero
    pub async fn decrement_registered(&self, conn: &mut PgConnection, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE workshops
            SET registered_count = GREATEST(registered_count - 1, 0)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Count all workshops
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workshops")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Count workshops whose start date is in the future
    pub async fn count_upcoming(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workshops WHERE start_date > now()")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
