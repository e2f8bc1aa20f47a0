use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::{
    transport::smtp::authentication::Credentials,
    transport::smtp::client::{Tls, TlsParameters},
    Message, SmtpTransport, Transport,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::report_service::{EmailReport, ReportSender};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    /// Copied on every report, e.g. the daycare's own inbox
    #[serde(default)]
    pub bcc_emails: Vec<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            username: String::new(),
            password: String::new(),
            from_email: String::new(),
            bcc_emails: Vec::new(),
        }
    }
}

impl EmailConfig {
    /// The default config has no credentials and sends nothing
    pub fn is_enabled(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty() && !self.from_email.is_empty()
    }
}

/// Sends reports through an SMTP relay with STARTTLS required.
pub struct SmtpReportSender {
    config: EmailConfig,
    transport: SmtpTransport,
}

impl SmtpReportSender {
    pub fn new(config: EmailConfig) -> Result<Self> {
        info!(
            "📧 Initializing email service for SMTP server: {}:{}",
            config.smtp_server, config.smtp_port
        );

        let tls_params = TlsParameters::new(config.smtp_server.clone())
            .context("Failed to create TLS parameters")?;

        let transport = SmtpTransport::relay(&config.smtp_server)
            .context("Failed to create SMTP relay")?
            .port(config.smtp_port)
            .tls(Tls::Required(tls_params))
            .credentials(Credentials::new(config.username.clone(), config.password.clone()))
            .build();

        info!("📧 Email service initialized successfully");
        Ok(Self { config, transport })
    }
}

fn build_message(config: &EmailConfig, report: &EmailReport) -> Result<Message> {
    let from = format!("Sleep Log App <{}>", config.from_email);
    let mut email_builder = Message::builder()
        .from(from.parse::<Mailbox>().context("Failed to parse from email")?)
        .to(report.to.parse::<Mailbox>().context("Failed to parse parent email")?);

    for email in &config.bcc_emails {
        email_builder = email_builder.bcc(email.parse::<Mailbox>().context("Failed to parse BCC email")?);
    }

    email_builder
        .subject(report.subject.clone())
        .body(report.body.clone())
        .context("Failed to build email")
}

#[async_trait]
impl ReportSender for SmtpReportSender {
    async fn send(&self, report: EmailReport) -> Result<()> {
        let email = build_message(&self.config, &report)?;
        let transport = self.transport.clone();

        // lettre's SmtpTransport blocks on network IO
        tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .context("Email send task panicked")?
            .context("Failed to send email")?;

        info!(
            "📧 Report email sent to {} (+{} bcc)",
            report.to,
            self.config.bcc_emails.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmailConfig {
        EmailConfig {
            smtp_server: "smtp.example.com".to_string(),
            smtp_port: 587,
            username: "daycare".to_string(),
            password: "secret".to_string(),
            from_email: "daycare@example.com".to_string(),
            bcc_emails: vec!["office@example.com".to_string()],
        }
    }

    fn report(to: &str) -> EmailReport {
        EmailReport {
            to: to.to_string(),
            subject: "🛏️ Sleep Log for Luna - Sat Mar 01 2025".to_string(),
            body: "13:00:00 - START - Position: Back".to_string(),
        }
    }

    #[test]
    fn test_default_config_is_disabled() {
        assert!(!EmailConfig::default().is_enabled());
        assert!(config().is_enabled());
    }

    #[test]
    fn test_build_message_headers() {
        let message = build_message(&config(), &report("parent@example.com")).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();

        assert!(formatted.contains("To: parent@example.com"));
        assert!(formatted.contains("daycare@example.com"));
        // bcc recipients are in the envelope but never in the headers
        assert!(!formatted.contains("office@example.com"));
        let recipients: Vec<String> = message.envelope().to().iter().map(|a| a.to_string()).collect();
        assert!(recipients.contains(&"office@example.com".to_string()));
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        assert!(build_message(&config(), &report("not an email")).is_err());
    }
}
