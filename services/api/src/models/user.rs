//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Role held by a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Organizer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Organizer => "organizer",
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "organizer" => Ok(Role::Organizer),
            other => Err(anyhow::anyhow!("unknown role: {}", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User entity
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub grade: Option<i32>,
    pub school: Option<String>,
    pub phone: Option<String>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// New user registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub grade: Option<i32>,
    pub school: Option<String>,
    pub phone: Option<String>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
}

/// Self-service profile update payload
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateUser {
    pub full_name: Option<String>,
    pub grade: Option<i32>,
    pub school: Option<String>,
    pub phone: Option<String>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.grade.is_none()
            && self.school.is_none()
            && self.phone.is_none()
            && self.parent_name.is_none()
            && self.parent_phone.is_none()
    }
}

/// Admin-side user update payload, additionally covers role and active flag
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdminUpdateUser {
    pub full_name: Option<String>,
    pub grade: Option<i32>,
    pub school: Option<String>,
    pub phone: Option<String>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl AdminUpdateUser {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.grade.is_none()
            && self.school.is_none()
            && self.phone.is_none()
            && self.parent_name.is_none()
            && self.parent_phone.is_none()
            && self.role.is_none()
            && self.is_active.is_none()
    }
}

/// User login credentials
#[derive(Debug, Clone, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_string_round_trip() {
        for role in [Role::User, Role::Admin, Role::Organizer] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(UpdateUser::default().is_empty());
        let patch = UpdateUser {
            school: Some("Example High School".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
