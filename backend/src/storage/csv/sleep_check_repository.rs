use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use super::connection::CsvConnection;
use crate::domain::models::sleep_check::{SleepCheck, SleepCheckPatch, SleepCheckRecord};
use crate::storage::SleepCheckStorage;

const TABLE: &str = "sleep_checks";

/// CSV-backed sleep check log. Rows are kept in append order; ordering by
/// timestamp is the grouper's job, not the store's.
#[derive(Clone)]
pub struct SleepCheckRepository {
    connection: CsvConnection,
}

impl SleepCheckRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_checks(&self, baby_id: &str) -> Result<Vec<SleepCheckRecord>> {
        let path = self.connection.table_path(baby_id, TABLE);
        self.connection.read_rows(&path)
    }

    fn write_checks(&self, baby_id: &str, records: &[SleepCheckRecord]) -> Result<()> {
        let path = self.connection.table_path(baby_id, TABLE);
        self.connection.write_rows(&path, records)
    }
}

#[async_trait]
impl SleepCheckStorage for SleepCheckRepository {
    async fn append_check(&self, mut record: SleepCheckRecord) -> Result<String> {
        let _guard = self.connection.lock().await;

        record.id = SleepCheck::generate_id();
        let mut records = self.read_checks(&record.baby_id)?;
        records.push(record.clone());
        self.write_checks(&record.baby_id, &records)?;

        info!(
            "Stored sleep check {} ({}) for baby {}",
            record.id,
            record.kind.as_deref().unwrap_or("?"),
            record.baby_id
        );
        Ok(record.id)
    }

    async fn get_check(&self, baby_id: &str, check_id: &str) -> Result<Option<SleepCheckRecord>> {
        let records = self.read_checks(baby_id)?;
        Ok(records.into_iter().find(|r| r.id == check_id))
    }

    async fn list_checks(&self, baby_id: &str) -> Result<Vec<SleepCheckRecord>> {
        self.read_checks(baby_id)
    }

    async fn update_check(
        &self,
        baby_id: &str,
        check_id: &str,
        patch: &SleepCheckPatch,
    ) -> Result<Option<SleepCheckRecord>> {
        let _guard = self.connection.lock().await;

        let mut records = self.read_checks(baby_id)?;
        let Some(record) = records.iter_mut().find(|r| r.id == check_id) else {
            warn!("Sleep check {} not found for baby {}", check_id, baby_id);
            return Ok(None);
        };
        patch.apply_to(record)?;
        let updated = record.clone();

        self.write_checks(baby_id, &records)?;
        info!("Updated sleep check {} for baby {}", check_id, baby_id);
        Ok(Some(updated))
    }

    async fn delete_check(&self, baby_id: &str, check_id: &str) -> Result<bool> {
        let _guard = self.connection.lock().await;

        let mut records = self.read_checks(baby_id)?;
        let before = records.len();
        records.retain(|r| r.id != check_id);
        if records.len() == before {
            return Ok(false);
        }

        self.write_checks(baby_id, &records)?;
        info!("Deleted sleep check {} for baby {}", check_id, baby_id);
        Ok(true)
    }
}
