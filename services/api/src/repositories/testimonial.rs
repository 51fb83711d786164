//! Testimonial repository for database operations

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::testimonial::TestimonialRole;
use crate::models::{NewTestimonial, Testimonial, UpdateTestimonial};

fn map_testimonial(row: &PgRow) -> Result<Testimonial> {
    let role: String = row.get("role");

    Ok(Testimonial {
        id: row.get("id"),
        name: row.get("name"),
        content: row.get("content"),
        role: role.parse::<TestimonialRole>()?,
        is_visible: row.get("is_visible"),
        created_at: row.get("created_at"),
    })
}

/// Testimonial repository for database operations
#[derive(Clone)]
pub struct TestimonialRepository {
    pool: PgPool,
}

impl TestimonialRepository {
    /// Create a new testimonial repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List testimonials shown on the public site
    pub async fn list_visible(&self) -> Result<Vec<Testimonial>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, content, role, is_visible, created_at
            FROM testimonials
            WHERE is_visible
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_testimonial).collect()
    }

    /// List all testimonials for admin management
    pub async fn list_all(&self) -> Result<Vec<Testimonial>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, content, role, is_visible, created_at
            FROM testimonials
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_testimonial).collect()
    }

    /// Create a new testimonial
    pub async fn create(&self, new_testimonial: &NewTestimonial) -> Result<Testimonial> {
        let row = sqlx::query(
            r#"
            INSERT INTO testimonials (name, content, role, is_visible)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, content, role, is_visible, created_at
            "#,
        )
        .bind(&new_testimonial.name)
        .bind(&new_testimonial.content)
        .bind(new_testimonial.role.as_str())
        .bind(new_testimonial.is_visible)
        .fetch_one(&self.pool)
        .await?;

        map_testimonial(&row)
    }

    /// Apply a testimonial patch
    pub async fn update(&self, id: Uuid, patch: &UpdateTestimonial) -> Result<Option<Testimonial>> {
        let row = sqlx::query(
            r#"
            UPDATE testimonials
            SET name = COALESCE($2, name),
                content = COALESCE($3, content),
                role = COALESCE($4, role),
                is_visible = COALESCE($5, is_visible)
            WHERE id = $1
            RETURNING id, name, content, role, is_visible, created_at
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.content)
        .bind(patch.role.map(|r| r.as_str()))
        .bind(patch.is_visible)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_testimonial).transpose()
    }

    /// Delete a testimonial by ID
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM testimonials WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
