use anyhow::Result;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::commands::babies::{CreateBabyCommand, UpdateBabyCommand};
use crate::domain::models::baby::{Baby, BabyValidationError};
use crate::domain::models::NotFoundError;
use crate::storage::BabyStorage;

const MAX_NAME_LENGTH: usize = 100;

/// Service for registering and looking up babies
#[derive(Clone)]
pub struct BabyService {
    baby_repository: Arc<dyn BabyStorage>,
}

impl BabyService {
    pub fn new(baby_repository: Arc<dyn BabyStorage>) -> Self {
        Self { baby_repository }
    }

    /// Register a new baby
    pub async fn create_baby(&self, command: CreateBabyCommand) -> Result<Baby> {
        info!("Creating baby: name={}", command.name);

        let name = Self::validate_name(&command.name)?;
        let dob = command.dob.map(Self::validate_dob).transpose()?;
        let parent_email = Self::validate_parent_email(command.parent_email)?;

        let baby = Baby {
            id: Baby::generate_id(),
            name,
            dob,
            parent_email,
            created_at: Utc::now(),
        };
        self.baby_repository.store_baby(&baby).await?;

        info!("Created baby: {} with ID: {}", baby.name, baby.id);
        Ok(baby)
    }

    /// Edit a baby's profile, e.g. to add the parent email reports go to
    pub async fn update_baby(&self, command: UpdateBabyCommand) -> Result<Baby> {
        info!("Updating baby: {}", command.baby_id);

        let mut baby = self
            .baby_repository
            .get_baby(&command.baby_id)
            .await?
            .ok_or_else(|| NotFoundError::Baby(command.baby_id.clone()))?;

        if let Some(name) = command.name {
            baby.name = Self::validate_name(&name)?;
        }
        if let Some(dob) = command.dob {
            baby.dob = Some(Self::validate_dob(dob)?);
        }
        if let Some(email) = command.parent_email {
            baby.parent_email = Self::validate_parent_email(Some(email))?;
        }
        self.baby_repository.store_baby(&baby).await?;

        info!("Updated baby: {} with ID: {}", baby.name, baby.id);
        Ok(baby)
    }

    pub async fn get_baby(&self, baby_id: &str) -> Result<Option<Baby>> {
        let baby = self.baby_repository.get_baby(baby_id).await?;
        if baby.is_none() {
            warn!("Baby not found: {}", baby_id);
        }
        Ok(baby)
    }

    /// All babies, ordered by name
    pub async fn list_babies(&self) -> Result<Vec<Baby>> {
        let babies = self.baby_repository.list_babies().await?;
        info!("Found {} babies", babies.len());
        Ok(babies)
    }

    fn validate_name(name: &str) -> Result<String, BabyValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BabyValidationError::EmptyName);
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(BabyValidationError::NameTooLong);
        }
        Ok(name.to_string())
    }

    fn validate_dob(dob: NaiveDate) -> Result<NaiveDate, BabyValidationError> {
        if dob > Utc::now().date_naive() {
            return Err(BabyValidationError::DobInFuture);
        }
        Ok(dob)
    }

    fn validate_parent_email(email: Option<String>) -> Result<Option<String>, BabyValidationError> {
        let Some(email) = email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()) else {
            return Ok(None);
        };
        email
            .parse::<lettre::Address>()
            .map_err(|_| BabyValidationError::InvalidParentEmail(email.clone()))?;
        Ok(Some(email))
    }
}
