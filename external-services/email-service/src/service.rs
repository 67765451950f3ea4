// SMTP email delivery for CareLink notifications
use mail_builder::MessageBuilder;
use mail_send::SmtpClientBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::EmailResult;

/// Email service configuration, loaded from the environment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub use_tls: bool,
    pub from_email: String,
    pub from_name: String,
    pub email_enabled: bool,
}

impl EmailConfig {
    /// Load email configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            smtp_host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            username: std::env::var("SMTP_USERNAME").ok(),
            password: std::env::var("SMTP_PASSWORD").ok(),
            use_tls: std::env::var("SMTP_TLS_ENABLED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
            from_email: std::env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "noreply@carelink.local".to_string()),
            from_name: std::env::var("EMAIL_FROM_NAME")
                .unwrap_or_else(|_| "CareLink".to_string()),
            email_enabled: std::env::var("EMAIL_ENABLED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(true),
        }
    }
}

/// Outbound email sender.
#[derive(Debug, Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send an HTML email and wait for the SMTP exchange to finish.
    pub async fn send(&self, to: &str, subject: &str, html_body: &str) -> EmailResult<()> {
        if !self.config.email_enabled {
            debug!(to, subject, "email disabled, skipping send");
            return Ok(());
        }

        let message = MessageBuilder::new()
            .from((
                self.config.from_name.as_str(),
                self.config.from_email.as_str(),
            ))
            .to(to)
            .subject(subject)
            .html_body(html_body);

        let mut builder =
            SmtpClientBuilder::new(self.config.smtp_host.as_str(), self.config.smtp_port)
                .implicit_tls(self.config.use_tls);
        if let (Some(user), Some(pass)) = (&self.config.username, &self.config.password) {
            builder = builder.credentials((user.as_str(), pass.as_str()));
        }

        builder.connect().await?.send(message).await?;
        info!(to, subject, "email sent");
        Ok(())
    }

    /// Fire-and-forget delivery: spawn the send after the caller's primary
    /// write has committed. Failures are logged and never propagated.
    pub fn dispatch(&self, to: String, subject: String, html_body: String) {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.send(&to, &subject, &html_body).await {
                error!(to = %to, error = %e, "background email delivery failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_service_skips_sending() {
        let config = EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            username: None,
            password: None,
            use_tls: false,
            from_email: "noreply@carelink.local".to_string(),
            from_name: "CareLink".to_string(),
            email_enabled: false,
        };
        let service = EmailService::new(config);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let result = runtime.block_on(service.send("user@example.com", "Hello", "<p>hi</p>"));
        assert!(result.is_ok());
    }
}
