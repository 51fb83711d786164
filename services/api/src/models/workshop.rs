//! Workshop model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle status of a workshop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkshopStatus {
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl WorkshopStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkshopStatus::Upcoming => "upcoming",
            WorkshopStatus::Ongoing => "ongoing",
            WorkshopStatus::Completed => "completed",
            WorkshopStatus::Cancelled => "cancelled",
        }
    }

    /// Whether new registrations are accepted in this status
    pub fn accepts_registrations(&self) -> bool {
        matches!(self, WorkshopStatus::Upcoming | WorkshopStatus::Ongoing)
    }
}

impl FromStr for WorkshopStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(WorkshopStatus::Upcoming),
            "ongoing" => Ok(WorkshopStatus::Ongoing),
            "completed" => Ok(WorkshopStatus::Completed),
            "cancelled" => Ok(WorkshopStatus::Cancelled),
            other => Err(anyhow::anyhow!("unknown workshop status: {}", other)),
        }
    }
}

impl fmt::Display for WorkshopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workshop entity
#[derive(Debug, Clone, Serialize)]
pub struct Workshop {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub image_url: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub location: String,
    pub max_participants: i32,
    pub fee: f64,
    pub eligible_grades: Vec<i32>,
    pub featured: bool,
    pub status: WorkshopStatus,
    pub registered_count: i32,
    pub created_at: DateTime<Utc>,
}

/// New workshop creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewWorkshop {
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub image_url: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub location: String,
    pub max_participants: i32,
    pub fee: f64,
    pub eligible_grades: Vec<i32>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_status")]
    pub status: WorkshopStatus,
}

fn default_status() -> WorkshopStatus {
    WorkshopStatus::Upcoming
}

/// Workshop update payload
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateWorkshop {
    pub title: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub image_url: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub max_participants: Option<i32>,
    pub fee: Option<f64>,
    pub eligible_grades: Option<Vec<i32>>,
    pub featured: Option<bool>,
    pub status: Option<WorkshopStatus>,
}

impl UpdateWorkshop {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.short_description.is_none()
            && self.image_url.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.registration_deadline.is_none()
            && self.location.is_none()
            && self.max_participants.is_none()
            && self.fee.is_none()
            && self.eligible_grades.is_none()
            && self.featured.is_none()
            && self.status.is_none()
    }
}

/// Query parameters for the public workshop listing
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WorkshopQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<WorkshopStatus>,
    pub grade: Option<i32>,
    pub featured: Option<bool>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_string_round_trip() {
        for status in [
            WorkshopStatus::Upcoming,
            WorkshopStatus::Ongoing,
            WorkshopStatus::Completed,
            WorkshopStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<WorkshopStatus>().unwrap(), status);
        }
    }

    #[test]
    fn only_open_statuses_accept_registrations() {
        assert!(WorkshopStatus::Upcoming.accepts_registrations());
        assert!(WorkshopStatus::Ongoing.accepts_registrations());
        assert!(!WorkshopStatus::Completed.accepts_registrations());
        assert!(!WorkshopStatus::Cancelled.accepts_registrations());
    }
}
