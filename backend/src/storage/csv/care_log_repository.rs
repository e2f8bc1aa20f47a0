use anyhow::Result;
use async_trait::async_trait;
use std::marker::PhantomData;
use tracing::info;

use super::connection::CsvConnection;
use crate::domain::models::care_log::CareLog;
use crate::storage::CareLogStorage;

/// CSV-backed repository for one care log collection. The table name is the
/// collection name, e.g. `diapers.csv`.
pub struct CareLogRepository<T> {
    connection: CsvConnection,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for CareLogRepository<T> {
    fn clone(&self) -> Self {
        Self {
            connection: self.connection.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: CareLog> CareLogRepository<T> {
    pub fn new(connection: CsvConnection) -> Self {
        Self {
            connection,
            _marker: PhantomData,
        }
    }

    fn read_logs(&self, baby_id: &str) -> Result<Vec<T>> {
        let path = self.connection.table_path(baby_id, T::COLLECTION);
        self.connection.read_rows(&path)
    }

    fn write_logs(&self, baby_id: &str, logs: &[T]) -> Result<()> {
        let path = self.connection.table_path(baby_id, T::COLLECTION);
        self.connection.write_rows(&path, logs)
    }
}

#[async_trait]
impl<T: CareLog> CareLogStorage<T> for CareLogRepository<T> {
    async fn append_log(&self, mut log: T) -> Result<String> {
        let _guard = self.connection.lock().await;

        let id = T::generate_id();
        log.set_id(id.clone());

        let mut logs = self.read_logs(log.baby_id())?;
        logs.push(log.clone());
        self.write_logs(log.baby_id(), &logs)?;

        info!("Stored {} log {} for baby {}", T::COLLECTION, id, log.baby_id());
        Ok(id)
    }

    async fn list_logs(&self, baby_id: &str) -> Result<Vec<T>> {
        let mut logs = self.read_logs(baby_id)?;
        logs.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        Ok(logs)
    }

    async fn delete_log(&self, baby_id: &str, log_id: &str) -> Result<bool> {
        let _guard = self.connection.lock().await;

        let mut logs = self.read_logs(baby_id)?;
        let before = logs.len();
        logs.retain(|l| l.id() != log_id);
        if logs.len() == before {
            return Ok(false);
        }

        self.write_logs(baby_id, &logs)?;
        info!("Deleted {} log {} for baby {}", T::COLLECTION, log_id, baby_id);
        Ok(true)
    }
}
