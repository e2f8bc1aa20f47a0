use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::domain::commands::care_logs::CreateCareLogCommand;
use crate::domain::models::care_log::CareLog;
use crate::domain::models::NotFoundError;
use crate::storage::{BabyStorage, CareLogStorage};

/// Create, list and delete one kind of care log. The app holds one instance
/// each for diapers, feedings and bottles.
pub struct CareLogService<T: CareLog> {
    repository: Arc<dyn CareLogStorage<T>>,
    baby_repository: Arc<dyn BabyStorage>,
}

impl<T: CareLog> Clone for CareLogService<T> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            baby_repository: Arc::clone(&self.baby_repository),
        }
    }
}

impl<T: CareLog> CareLogService<T> {
    pub fn new(repository: Arc<dyn CareLogStorage<T>>, baby_repository: Arc<dyn BabyStorage>) -> Self {
        Self {
            repository,
            baby_repository,
        }
    }

    async fn ensure_baby(&self, baby_id: &str) -> Result<()> {
        match self.baby_repository.get_baby(baby_id).await? {
            Some(_) => Ok(()),
            None => Err(NotFoundError::Baby(baby_id.to_string()).into()),
        }
    }

    pub async fn create_log(&self, command: CreateCareLogCommand<T>) -> Result<T> {
        info!("Creating {} log for baby {}", T::COLLECTION, command.baby_id);
        self.ensure_baby(&command.baby_id).await?;

        let mut log = command.log;
        log.validate()?;
        let id = self.repository.append_log(log.clone()).await?;
        log.set_id(id);
        Ok(log)
    }

    /// Newest first
    pub async fn list_logs(&self, baby_id: &str) -> Result<Vec<T>> {
        self.ensure_baby(baby_id).await?;
        self.repository.list_logs(baby_id).await
    }

    pub async fn delete_log(&self, baby_id: &str, log_id: &str) -> Result<()> {
        info!("Deleting {} log {} for baby {}", T::COLLECTION, log_id, baby_id);
        if !self.repository.delete_log(baby_id, log_id).await? {
            return Err(NotFoundError::CareLog(log_id.to_string()).into());
        }
        Ok(())
    }
}
