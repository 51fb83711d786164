//! Registration model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Payment state of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(anyhow::anyhow!("unknown payment status: {}", other)),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Approval state of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Approved => "approved",
            RegistrationStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for RegistrationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RegistrationStatus::Pending),
            "approved" => Ok(RegistrationStatus::Approved),
            "rejected" => Ok(RegistrationStatus::Rejected),
            other => Err(anyhow::anyhow!("unknown registration status: {}", other)),
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration entity
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub id: Uuid,
    pub workshop_id: Uuid,
    pub user_id: Option<Uuid>,
    pub email: String,
    pub full_name: String,
    pub grade: i32,
    pub school: String,
    pub phone: String,
    pub parent_name: String,
    pub parent_phone: String,
    pub payment_status: PaymentStatus,
    pub registration_status: RegistrationStatus,
    pub payment_id: Option<String>,
    pub amount_paid: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// New registration payload
///
/// The workshop id arrives as an opaque string so a malformed value can be
/// reported as not-found rather than as a parse failure.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRegistration {
    pub workshop_id: String,
    pub email: String,
    pub full_name: String,
    pub grade: i32,
    pub school: String,
    pub phone: String,
    pub parent_name: String,
    pub parent_phone: String,
}

/// Admin-side registration update payload
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateRegistration {
    pub payment_status: Option<PaymentStatus>,
    pub registration_status: Option<RegistrationStatus>,
    pub payment_id: Option<String>,
    pub notes: Option<String>,
}

impl UpdateRegistration {
    pub fn is_empty(&self) -> bool {
        self.payment_status.is_none()
            && self.registration_status.is_none()
            && self.payment_id.is_none()
            && self.notes.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_string_round_trips() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Completed,
            PaymentStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<PaymentStatus>().unwrap(), status);
        }
        for status in [
            RegistrationStatus::Pending,
            RegistrationStatus::Approved,
            RegistrationStatus::Rejected,
        ] {
            assert_eq!(
                status.as_str().parse::<RegistrationStatus>().unwrap(),
                status
            );
        }
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(UpdateRegistration::default().is_empty());
        let patch = UpdateRegistration {
            registration_status: Some(RegistrationStatus::Approved),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
