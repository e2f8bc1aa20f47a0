//! Domain model for a baby.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baby {
    pub id: String,
    pub name: String,
    /// Profiles saved before birth dates were tracked have none
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    pub parent_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Baby {
    pub fn generate_id() -> String {
        format!("baby-{}", Uuid::new_v4().simple())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BabyValidationError {
    #[error("Baby name cannot be empty")]
    EmptyName,
    #[error("Baby name cannot exceed 100 characters")]
    NameTooLong,
    #[error("Invalid date of birth: {0}")]
    InvalidDob(String),
    #[error("Date of birth cannot be in the future")]
    DobInFuture,
    #[error("Invalid parent email: {0}")]
    InvalidParentEmail(String),
}
