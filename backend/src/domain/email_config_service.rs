use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use super::email_service::EmailConfig;

/// Loads SMTP settings from a TOML file such as:
///
/// ```toml
/// smtp_server = "smtp.gmail.com"
/// smtp_port = 587
/// username = "daycare@gmail.com"
/// password = "app-password"
/// from_email = "daycare@gmail.com"
/// bcc_emails = ["office@daycare.example"]
/// ```
pub struct EmailConfigService;

impl EmailConfigService {
    pub fn load_config(config_path: &Path) -> Result<EmailConfig> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read email config file: {:?}", config_path))?;

        let config: EmailConfig =
            toml::from_str(&config_content).with_context(|| "Failed to parse email config TOML")?;

        if config.smtp_server.is_empty() {
            return Err(anyhow::anyhow!("SMTP server is required"));
        }
        if config.username.is_empty() {
            return Err(anyhow::anyhow!("Email username is required"));
        }
        if config.password.is_empty() {
            return Err(anyhow::anyhow!("Email password is required"));
        }
        if config.from_email.is_empty() {
            return Err(anyhow::anyhow!("From email is required"));
        }

        Ok(config)
    }

    /// Falls back to the default (disabled) config when the file is missing
    /// or invalid.
    pub fn load_config_or_default(config_path: &Path) -> EmailConfig {
        match Self::load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load email config from {:?}: {:#}", config_path, e);
                info!("Using default email config (reports are logged, not sent)");
                EmailConfig::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("email.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_valid_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
smtp_server = "smtp.example.com"
smtp_port = 465
username = "daycare"
password = "secret"
from_email = "daycare@example.com"
"#,
        );

        let config = EmailConfigService::load_config(&path).unwrap();
        assert_eq!(config.smtp_port, 465);
        assert!(config.bcc_emails.is_empty());
        assert!(config.is_enabled());
    }

    #[test]
    fn test_missing_password_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
smtp_server = "smtp.example.com"
smtp_port = 587
username = "daycare"
password = ""
from_email = "daycare@example.com"
"#,
        );

        let err = EmailConfigService::load_config(&path).unwrap_err();
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn test_missing_file_falls_back_to_disabled() {
        let dir = TempDir::new().unwrap();
        let config = EmailConfigService::load_config_or_default(&dir.path().join("absent.toml"));
        assert_eq!(config, EmailConfig::default());
        assert!(!config.is_enabled());
    }
}
