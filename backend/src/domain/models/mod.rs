pub mod baby;
pub mod care_log;
pub mod sleep_check;

use chrono::{DateTime, Utc};

/// Anything logged at a point in time.
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

impl Timestamped for sleep_check::SleepCheck {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Lookup failures shared by every service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NotFoundError {
    #[error("Baby not found: {0}")]
    Baby(String),
    #[error("Sleep check not found: {0}")]
    SleepCheck(String),
    #[error("Log not found: {0}")]
    CareLog(String),
}
