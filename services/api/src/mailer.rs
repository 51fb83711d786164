//! Outbound email notifications
//!
//! All sends are best-effort: callers dispatch them off the request path and
//! log failures without failing the triggering operation. When SMTP is not
//! configured the mailer degrades to a no-op so local development does not
//! require a mail server.

use anyhow::Result;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{debug, warn};

/// SMTP configuration
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
}

impl MailerConfig {
    /// Read SMTP settings from the environment; `None` when `SMTP_SERVER`
    /// is unset.
    ///
    /// # Environment Variables
    /// - `SMTP_SERVER`, `SMTP_PORT` (default 587)
    /// - `SMTP_USERNAME`, `SMTP_PASSWORD`
    /// - `EMAIL_FROM`
    pub fn from_env() -> Option<Self> {
        let smtp_server = std::env::var("SMTP_SERVER").ok()?;

        let smtp_port = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);

        Some(MailerConfig {
            smtp_server,
            smtp_port,
            smtp_username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_address: std::env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "noreply@example.com".to_string()),
        })
    }
}

/// Email notification sender
#[derive(Clone)]
pub struct Mailer {
    config: Option<MailerConfig>,
}

impl Mailer {
    /// Build a mailer from the environment, falling back to a disabled
    /// mailer when SMTP is not configured.
    pub fn from_env() -> Self {
        match MailerConfig::from_env() {
            Some(config) => Mailer {
                config: Some(config),
            },
            None => {
                warn!("SMTP_SERVER not set, outbound email is disabled");
                Mailer { config: None }
            }
        }
    }

    /// A mailer that drops every message, for tests and local development
    pub fn disabled() -> Self {
        Mailer { config: None }
    }

    async fn send(&self, to: &str, subject: &str, html_body: String) -> Result<()> {
        let Some(config) = &self.config else {
            debug!("Mailer disabled, dropping email to {}: {}", to, subject);
            return Ok(());
        };

        let email = Message::builder()
            .from(
                config
                    .from_address
                    .parse()
                    .map_err(|e| anyhow::anyhow!("Invalid from address: {}", e))?,
            )
            .to(to
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid to address: {}", e))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)
            .map_err(|e| anyhow::anyhow!("Failed to build email: {}", e))?;

        let mailer = SmtpTransport::relay(&config.smtp_server)
            .map_err(|e| anyhow::anyhow!("SMTP relay error: {}", e))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        // The SMTP transport is blocking, keep it off the async workers
        tokio::task::spawn_blocking(move || {
            mailer
                .send(&email)
                .map_err(|e| anyhow::anyhow!("Failed to send email: {}", e))
        })
        .await
        .map_err(|e| anyhow::anyhow!("Email task failed: {}", e))??;

        Ok(())
    }

    /// Confirmation that a registration was received and is pending review
    pub async fn send_registration_received(
        &self,
        to: &str,
        user_name: &str,
        workshop_name: &str,
    ) -> Result<()> {
        let subject = format!("Registration Received: {}", workshop_name);
        let body = format!(
            r#"<html>
<body>
    <h2>Registration Confirmation</h2>
    <p>Dear {user_name},</p>
    <p>Thank you for registering for the workshop <strong>{workshop_name}</strong>.</p>
    <p>Your registration is being processed. You will receive another email once it's approved.</p>
    <p>Best regards,<br>Jnana Prabodhini Vijnana Dals Team</p>
</body>
</html>"#
        );

        self.send(to, &subject, body).await
    }

    /// Notification that a registration was approved
    pub async fn send_registration_approved(
        &self,
        to: &str,
        user_name: &str,
        workshop_name: &str,
        workshop_date: &str,
    ) -> Result<()> {
        let subject = format!("Registration Approved: {}", workshop_name);
        let body = format!(
            r#"<html>
<body>
    <h2>Registration Approved</h2>
    <p>Dear {user_name},</p>
    <p>Your registration for the workshop <strong>{workshop_name}</strong> has been approved!</p>
    <p>Workshop Date: {workshop_date}</p>
    <p>Please login to your dashboard to view more details.</p>
    <p>We look forward to seeing you at the workshop!</p>
    <p>Best regards,<br>Jnana Prabodhini Vijnana Dals Team</p>
</body>
</html>"#
        );

        self.send(to, &subject, body).await
    }

    /// One-time password for a password reset request
    pub async fn send_password_reset_otp(
        &self,
        to: &str,
        user_name: &str,
        otp: &str,
    ) -> Result<()> {
        let body = format!(
            r#"<html>
<body>
    <h2>Password Reset OTP</h2>
    <p>Dear {user_name},</p>
    <p>We received a request to reset your password. Please use the following OTP to reset your password:</p>
    <p style="font-size: 24px; font-weight: bold; text-align: center; padding: 10px; background-color: #f0f0f0; border-radius: 5px;">{otp}</p>
    <p>This OTP is valid for 30 minutes.</p>
    <p>If you didn't request this, please ignore this email or contact us if you have concerns.</p>
    <p>Best regards,<br>Jnana Prabodhini Vijnana Dals Team</p>
</body>
</html>"#
        );

        self.send(to, "Password Reset OTP", body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_mailer_drops_messages() {
        let mailer = Mailer::disabled();
        mailer
            .send_registration_received("student@example.com", "Student", "Robotics 101")
            .await
            .expect("disabled mailer should silently succeed");
    }
}
