//! Domain models for the non-sleep care logs: diapers, feedings and bottles.
//!
//! All three share the [`CareLog`] trait so a single generic repository and
//! service can store, list and delete them.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::Timestamped;

const MAX_NOTE_LENGTH: usize = 500;
const MAX_FOOD_LENGTH: usize = 100;
/// Largest single bottle we accept, in ounces
const MAX_BOTTLE_OUNCES: f64 = 16.0;

pub trait CareLog:
    Timestamped + Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Name of the collection the log lives in, also used as its table name
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn baby_id(&self) -> &str;
    fn validate(&self) -> Result<(), CareLogValidationError>;

    fn generate_id() -> String {
        format!("{}::{}", Self::COLLECTION, Uuid::new_v4())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiaperKind {
    Wet,
    Dirty,
    Mixed,
    Dry,
}

impl fmt::Display for DiaperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiaperKind::Wet => "Wet",
            DiaperKind::Dirty => "Dirty",
            DiaperKind::Mixed => "Mixed",
            DiaperKind::Dry => "Dry",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaperLog {
    pub id: String,
    pub baby_id: String,
    pub kind: DiaperKind,
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingLog {
    pub id: String,
    pub baby_id: String,
    pub food: String,
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleLog {
    pub id: String,
    pub baby_id: String,
    pub amount: f64,
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

fn validate_note(note: &Option<String>) -> Result<(), CareLogValidationError> {
    match note {
        Some(n) if n.len() > MAX_NOTE_LENGTH => Err(CareLogValidationError::NoteTooLong),
        _ => Ok(()),
    }
}

impl Timestamped for DiaperLog {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl CareLog for DiaperLog {
    const COLLECTION: &'static str = "diapers";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn baby_id(&self) -> &str {
        &self.baby_id
    }

    fn validate(&self) -> Result<(), CareLogValidationError> {
        validate_note(&self.note)
    }
}

impl Timestamped for FeedingLog {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl CareLog for FeedingLog {
    const COLLECTION: &'static str = "feedings";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn baby_id(&self) -> &str {
        &self.baby_id
    }

    fn validate(&self) -> Result<(), CareLogValidationError> {
        if self.food.trim().is_empty() {
            return Err(CareLogValidationError::EmptyFood);
        }
        if self.food.len() > MAX_FOOD_LENGTH {
            return Err(CareLogValidationError::FoodTooLong);
        }
        validate_note(&self.note)
    }
}

impl Timestamped for BottleLog {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl CareLog for BottleLog {
    const COLLECTION: &'static str = "bottles";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn baby_id(&self) -> &str {
        &self.baby_id
    }

    fn validate(&self) -> Result<(), CareLogValidationError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(CareLogValidationError::NonPositiveAmount);
        }
        if self.amount > MAX_BOTTLE_OUNCES {
            return Err(CareLogValidationError::AmountTooLarge);
        }
        validate_note(&self.note)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CareLogValidationError {
    #[error("Food cannot be empty")]
    EmptyFood,
    #[error("Food description is too long")]
    FoodTooLong,
    #[error("Bottle amount must be positive")]
    NonPositiveAmount,
    #[error("Bottle amount cannot exceed 16 oz")]
    AmountTooLarge,
    #[error("Note is too long")]
    NoteTooLong,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bottle(amount: f64) -> BottleLog {
        BottleLog {
            id: String::new(),
            baby_id: "baby-1".to_string(),
            amount,
            note: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_bottle_amount_validation() {
        assert!(bottle(4.5).validate().is_ok());
        assert_eq!(bottle(0.0).validate(), Err(CareLogValidationError::NonPositiveAmount));
        assert_eq!(bottle(f64::NAN).validate(), Err(CareLogValidationError::NonPositiveAmount));
        assert_eq!(bottle(20.0).validate(), Err(CareLogValidationError::AmountTooLarge));
    }

    #[test]
    fn test_feeding_requires_food() {
        let feeding = FeedingLog {
            id: String::new(),
            baby_id: "baby-1".to_string(),
            food: "  ".to_string(),
            note: None,
            timestamp: Utc::now(),
        };
        assert_eq!(feeding.validate(), Err(CareLogValidationError::EmptyFood));
    }

    #[test]
    fn test_generated_ids_carry_collection_prefix() {
        assert!(DiaperLog::generate_id().starts_with("diapers::"));
        assert!(BottleLog::generate_id().starts_with("bottles::"));
    }
}
