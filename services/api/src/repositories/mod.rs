//! Repositories for database operations

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{AdminUpdateUser, NewUser, Role, UpdateUser, User};

pub mod otp;
pub mod registration;
pub mod testimonial;
pub mod workshop;

fn map_user(row: &PgRow) -> Result<User> {
    let role: String = row.get("role");

    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        full_name: row.get("full_name"),
        role: role.parse::<Role>()?,
        is_active: row.get("is_active"),
        grade: row.get("grade"),
        school: row.get("school"),
        phone: row.get("phone"),
        parent_name: row.get("parent_name"),
        parent_phone: row.get("parent_phone"),
        created_at: row.get("created_at"),
    })
}

const USER_COLUMNS: &str = "id, email, password_hash, full_name, role, is_active, \
     grade, school, phone, parent_name, parent_phone, created_at";

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user with an already-hashed password
    pub async fn create(&self, new_user: &NewUser, password_hash: &str) -> Result<User> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (email, password_hash, full_name, grade, school, phone, parent_name, parent_phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(&new_user.email)
        .bind(password_hash)
        .bind(&new_user.full_name)
        .bind(new_user.grade)
        .bind(&new_user.school)
        .bind(&new_user.phone)
        .bind(&new_user.parent_name)
        .bind(&new_user.parent_phone)
        .fetch_one(&self.pool)
        .await?;

        map_user(&row)
    }

    /// Find a user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE email = $1
            "#,
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_user).transpose()
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_user).transpose()
    }

    /// List users with optional role filter
    pub async fn list(&self, skip: i64, limit: i64, role: Option<Role>) -> Result<Vec<User>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE ($1::text IS NULL OR role = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        ))
        .bind(role.map(|r| r.as_str()))
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_user).collect()
    }

    /// Apply a self-service profile patch
    pub async fn update_profile(&self, id: Uuid, patch: &UpdateUser) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET full_name = COALESCE($2, full_name),
                grade = COALESCE($3, grade),
                school = COALESCE($4, school),
                phone = COALESCE($5, phone),
                parent_name = COALESCE($6, parent_name),
                parent_phone = COALESCE($7, parent_phone)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&patch.full_name)
        .bind(patch.grade)
        .bind(&patch.school)
        .bind(&patch.phone)
        .bind(&patch.parent_name)
        .bind(&patch.parent_phone)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_user).transpose()
    }

    /// Apply an admin patch, which may also change role and active flag
    pub async fn admin_update(&self, id: Uuid, patch: &AdminUpdateUser) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET full_name = COALESCE($2, full_name),
                grade = COALESCE($3, grade),
                school = COALESCE($4, school),
                phone = COALESCE($5, phone),
                parent_name = COALESCE($6, parent_name),
                parent_phone = COALESCE($7, parent_phone),
                role = COALESCE($8, role),
                is_active = COALESCE($9, is_active)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&patch.full_name)
        .bind(patch.grade)
        .bind(&patch.school)
        .bind(&patch.phone)
        .bind(&patch.parent_name)
        .bind(&patch.parent_phone)
        .bind(patch.role.map(|r| r.as_str()))
        .bind(patch.is_active)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_user).transpose()
    }

    /// Replace a user's password hash
    pub async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all users
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
