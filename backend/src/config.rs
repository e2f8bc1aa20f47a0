//! Runtime settings read from the environment.
//!
//! | Variable                 | Default                            |
//! |--------------------------|------------------------------------|
//! | `BABYLOG_DATA_DIR`       | `~/Documents/Babylog`              |
//! | `BABYLOG_BIND_ADDR`      | `127.0.0.1:3000`                   |
//! | `BABYLOG_EMAIL_CONFIG`   | `<data dir>/email.toml`            |
//! | `BABYLOG_ALLOWED_ORIGIN` | `http://localhost:8080`            |

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::storage::csv::CsvConnection;

pub const DATA_DIR_VAR: &str = "BABYLOG_DATA_DIR";
pub const BIND_ADDR_VAR: &str = "BABYLOG_BIND_ADDR";
pub const EMAIL_CONFIG_VAR: &str = "BABYLOG_EMAIL_CONFIG";
pub const ALLOWED_ORIGIN_VAR: &str = "BABYLOG_ALLOWED_ORIGIN";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:8080";
const EMAIL_CONFIG_FILE: &str = "email.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub email_config_path: PathBuf,
    pub allowed_origin: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let data_dir = match var(DATA_DIR_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => CsvConnection::default_data_directory()?,
        };

        let bind_addr = var(BIND_ADDR_VAR)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .with_context(|| format!("Invalid {}", BIND_ADDR_VAR))?;

        let email_config_path = var(EMAIL_CONFIG_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(EMAIL_CONFIG_FILE));

        let allowed_origin = var(ALLOWED_ORIGIN_VAR).unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string());

        Ok(Self {
            data_dir,
            bind_addr,
            email_config_path,
            allowed_origin,
        })
    }
}
