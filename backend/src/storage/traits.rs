//! # Storage Traits
//!
//! Storage abstractions the domain layer works against. Any backend (the CSV
//! files in [`super::csv`], an in-memory fake in tests, a hosted document
//! store) can sit behind them.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::baby::Baby;
use crate::domain::models::care_log::CareLog;
use crate::domain::models::sleep_check::{SleepCheckPatch, SleepCheckRecord};

/// Append-mostly event log of sleep checks, one stream per baby.
#[async_trait]
pub trait SleepCheckStorage: Send + Sync {
    /// Append a new event. The store assigns and returns its id.
    async fn append_check(&self, record: SleepCheckRecord) -> Result<String>;

    /// Retrieve a single event by id
    async fn get_check(&self, baby_id: &str, check_id: &str) -> Result<Option<SleepCheckRecord>>;

    /// Every stored row for a baby, malformed ones included, in storage order
    async fn list_checks(&self, baby_id: &str) -> Result<Vec<SleepCheckRecord>>;

    /// Apply a partial update. Last writer wins.
    /// Returns the updated row, or None if no row has that id
    async fn update_check(
        &self,
        baby_id: &str,
        check_id: &str,
        patch: &SleepCheckPatch,
    ) -> Result<Option<SleepCheckRecord>>;

    /// Returns true if the event was found and deleted
    async fn delete_check(&self, baby_id: &str, check_id: &str) -> Result<bool>;
}

#[async_trait]
pub trait BabyStorage: Send + Sync {
    async fn store_baby(&self, baby: &Baby) -> Result<()>;

    async fn get_baby(&self, baby_id: &str) -> Result<Option<Baby>>;

    /// All babies ordered by name
    async fn list_babies(&self) -> Result<Vec<Baby>>;
}

/// Storage for one kind of care log (diapers, feedings or bottles).
#[async_trait]
pub trait CareLogStorage<T: CareLog>: Send + Sync {
    /// Store a new log. The store assigns and returns its id.
    async fn append_log(&self, log: T) -> Result<String>;

    /// All logs for a baby, newest first
    async fn list_logs(&self, baby_id: &str) -> Result<Vec<T>>;

    /// Returns true if the log was found and deleted
    async fn delete_log(&self, baby_id: &str, log_id: &str) -> Result<bool>;
}
