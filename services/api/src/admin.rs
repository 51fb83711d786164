//! Admin aggregation service
//!
//! Read-only rollups for the dashboard and the per-workshop CSV export,
//! composed from the user, workshop and registration repositories.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::Registration;
use crate::repositories::UserRepository;
use crate::repositories::registration::RegistrationRepository;
use crate::repositories::workshop::WorkshopRepository;

/// Registration count for one UTC day
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailyRegistrations {
    pub date: String,
    pub count: i64,
}

/// Dashboard statistics
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_workshops: i64,
    pub total_users: i64,
    pub total_registrations: i64,
    pub upcoming_workshops: i64,
    pub pending_registrations: i64,
    pub daily_registrations: Vec<DailyRegistrations>,
}

/// CSV export payload for a workshop's registrations
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationsExport {
    pub filename: String,
    pub content: String,
    pub workshop_title: String,
}

/// Build the 7-bucket daily histogram ending on `today`, oldest first.
/// Days without registrations get a zero bucket.
fn daily_histogram(today: NaiveDate, counts: &[(NaiveDate, i64)]) -> Vec<DailyRegistrations> {
    (0..7)
        .map(|i| {
            let date = today - Duration::days(6 - i);
            let count = counts
                .iter()
                .find(|(day, _)| *day == date)
                .map(|(_, count)| *count)
                .unwrap_or(0);

            DailyRegistrations {
                date: date.format("%Y-%m-%d").to_string(),
                count,
            }
        })
        .collect()
}

fn csv_quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Render registrations as CSV, one row per registration plus a header row
fn registrations_to_csv(registrations: &[Registration]) -> String {
    let mut lines = vec![
        "Full Name,Email,Grade,School,Phone,Parent Name,Parent Phone,Status,Payment Status,Registration Date"
            .to_string(),
    ];

    for reg in registrations {
        lines.push(format!(
            "{},{},{},{},{},{},{},{},{},{}",
            csv_quote(&reg.full_name),
            csv_quote(&reg.email),
            reg.grade,
            csv_quote(&reg.school),
            csv_quote(&reg.phone),
            csv_quote(&reg.parent_name),
            csv_quote(&reg.parent_phone),
            reg.registration_status,
            reg.payment_status,
            reg.created_at.format("%Y-%m-%d"),
        ));
    }

    lines.join("\n")
}

/// Admin aggregation service
#[derive(Clone)]
pub struct AdminService {
    users: UserRepository,
    workshops: WorkshopRepository,
    registrations: RegistrationRepository,
}

impl AdminService {
    /// Create a new admin aggregation service
    pub fn new(
        users: UserRepository,
        workshops: WorkshopRepository,
        registrations: RegistrationRepository,
    ) -> Self {
        Self {
            users,
            workshops,
            registrations,
        }
    }

    /// Collect dashboard statistics
    pub async fn dashboard(&self) -> ApiResult<DashboardStats> {
        let now = Utc::now();
        let today = now.date_naive();

        // Start of the oldest histogram bucket, midnight-aligned UTC
        let since: DateTime<Utc> = (today - Duration::days(6))
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always a valid time")
            .and_utc();

        let daily_counts = self.registrations.daily_counts_since(since).await?;

        Ok(DashboardStats {
            total_workshops: self.workshops.count().await?,
            total_users: self.users.count().await?,
            total_registrations: self.registrations.count().await?,
            upcoming_workshops: self.workshops.count_upcoming().await?,
            pending_registrations: self.registrations.count_pending().await?,
            daily_registrations: daily_histogram(today, &daily_counts),
        })
    }

    /// Export a workshop's registrations as CSV
    pub async fn export_registrations(&self, workshop_id: Uuid) -> ApiResult<RegistrationsExport> {
        let workshop = self
            .workshops
            .find_by_id(workshop_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Workshop not found".to_string()))?;

        let registrations = self.registrations.find_by_workshop(workshop_id).await?;

        if registrations.is_empty() {
            return Err(ApiError::NotFound(
                "No registrations found for this workshop".to_string(),
            ));
        }

        Ok(RegistrationsExport {
            filename: format!("workshop_{}_registrations.csv", workshop_id),
            content: registrations_to_csv(&registrations),
            workshop_title: workshop.title,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaymentStatus, RegistrationStatus};
    use chrono::TimeZone;

    fn sample_registration(full_name: &str, school: &str) -> Registration {
        Registration {
            id: Uuid::new_v4(),
            workshop_id: Uuid::new_v4(),
            user_id: None,
            email: "student@example.com".to_string(),
            full_name: full_name.to_string(),
            grade: 9,
            school: school.to_string(),
            phone: "9876543210".to_string(),
            parent_name: "Parent Name".to_string(),
            parent_phone: "9876543211".to_string(),
            payment_status: PaymentStatus::Pending,
            registration_status: RegistrationStatus::Approved,
            payment_id: None,
            amount_paid: 500.0,
            notes: None,
            created_at: Utc.with_ymd_and_hms(2025, 6, 15, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn histogram_has_seven_zero_filled_buckets_oldest_first() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
        let counts = vec![
            (NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(), 3),
            (NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(), 1),
        ];

        let histogram = daily_histogram(today, &counts);

        assert_eq!(histogram.len(), 7);
        assert_eq!(histogram[0].date, "2025-06-14");
        assert_eq!(histogram[0].count, 3);
        assert_eq!(histogram[6].date, "2025-06-20");
        assert_eq!(histogram[6].count, 1);
        assert!(histogram[1..6].iter().all(|bucket| bucket.count == 0));
    }

    #[test]
    fn csv_has_header_and_one_row_per_registration() {
        let registrations = vec![
            sample_registration("Asha Kulkarni", "Modern High School"),
            sample_registration("Ravi Patil", "City School"),
        ];

        let csv = registrations_to_csv(&registrations);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Full Name,Email,Grade"));
        assert!(lines[1].contains("\"Asha Kulkarni\""));
        assert!(lines[1].contains("approved,pending,2025-06-15"));
    }

    #[test]
    fn export_serializes_filename_content_and_title() {
        let export = RegistrationsExport {
            filename: "workshop_abc_registrations.csv".to_string(),
            content: "Full Name,Email".to_string(),
            workshop_title: "Robotics 101".to_string(),
        };

        let value = serde_json::to_value(&export).unwrap();
        assert_eq!(value["filename"], "workshop_abc_registrations.csv");
        assert_eq!(value["content"], "Full Name,Email");
        assert_eq!(value["workshop_title"], "Robotics 101");
    }

    #[test]
    fn csv_escapes_embedded_quotes() {
        let registrations = vec![sample_registration("A \"Quoted\" Name", "St. Mary's")];

        let csv = registrations_to_csv(&registrations);
        assert!(csv.contains("\"A \"\"Quoted\"\" Name\""));
    }
}
