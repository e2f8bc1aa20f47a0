//! Sleep check bookkeeping outside the live monitor: entering checks after
//! the fact, editing and deleting them, and reading a baby's history back
//! as events or as grouped sessions.

use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::domain::commands::sleep_checks::{RecordSleepCheckCommand, UpdateSleepCheckCommand};
use crate::domain::models::sleep_check::{SleepCheck, SleepCheckRecord};
use crate::domain::models::NotFoundError;
use crate::domain::sleep_sessions::{group_records, SessionGrouping};
use crate::storage::feed::SleepCheckSnapshot;
use crate::storage::{BabyStorage, SleepCheckFeed, SleepCheckStorage};

#[derive(Clone)]
pub struct SleepCheckService {
    feed: Arc<SleepCheckFeed>,
    baby_repository: Arc<dyn BabyStorage>,
}

impl SleepCheckService {
    pub fn new(feed: Arc<SleepCheckFeed>, baby_repository: Arc<dyn BabyStorage>) -> Self {
        Self { feed, baby_repository }
    }

    async fn ensure_baby(&self, baby_id: &str) -> Result<()> {
        match self.baby_repository.get_baby(baby_id).await? {
            Some(_) => Ok(()),
            None => Err(NotFoundError::Baby(baby_id.to_string()).into()),
        }
    }

    /// Record a single check. Unlike the monitor this does not consult the
    /// timer, so any kind may be entered at any time.
    pub async fn record_check(&self, command: RecordSleepCheckCommand) -> Result<SleepCheck> {
        info!("Recording sleep {} for baby {}", command.kind, command.baby_id);
        self.ensure_baby(&command.baby_id).await?;

        let timestamp = command.timestamp.unwrap_or_else(Utc::now);
        let record = SleepCheckRecord::new_event(
            &command.baby_id,
            &command.caretaker_id,
            command.kind,
            &command.position,
            command.note,
            command.mood,
            timestamp,
        )?;

        let id = self
            .feed
            .append_check(record.clone())
            .await
            .context("Failed to store sleep check")?;
        let stored = SleepCheckRecord { id, ..record };
        Ok(SleepCheck::try_from(stored)?)
    }

    /// Well-formed checks for a baby, newest first. Malformed rows are skipped.
    pub async fn list_checks(&self, baby_id: &str) -> Result<Vec<SleepCheck>> {
        self.ensure_baby(baby_id).await?;

        let mut checks: Vec<SleepCheck> = self
            .feed
            .list_checks(baby_id)
            .await?
            .into_iter()
            .filter_map(|record| {
                let id = record.id.clone();
                SleepCheck::try_from(record)
                    .map_err(|e| warn!("Skipping malformed sleep check {}: {}", id, e))
                    .ok()
            })
            .collect();
        checks.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
        Ok(checks)
    }

    /// Edit a stored check. Last writer wins.
    pub async fn update_check(&self, command: UpdateSleepCheckCommand) -> Result<SleepCheck> {
        info!("Updating sleep check {} for baby {}", command.check_id, command.baby_id);

        let updated = self
            .feed
            .update_check(&command.baby_id, &command.check_id, &command.patch)
            .await?
            .ok_or_else(|| NotFoundError::SleepCheck(command.check_id.clone()))?;
        Ok(SleepCheck::try_from(updated)?)
    }

    pub async fn delete_check(&self, baby_id: &str, check_id: &str) -> Result<()> {
        info!("Deleting sleep check {} for baby {}", check_id, baby_id);

        if !self.feed.delete_check(baby_id, check_id).await? {
            return Err(NotFoundError::SleepCheck(check_id.to_string()).into());
        }
        Ok(())
    }

    /// The baby's history grouped into sessions, oldest first.
    pub async fn list_sessions(&self, baby_id: &str) -> Result<SessionGrouping> {
        self.ensure_baby(baby_id).await?;

        let grouping = group_records(self.feed.list_checks(baby_id).await?);
        if grouping.malformed > 0 {
            warn!(
                "Ignored {} malformed sleep checks for baby {}",
                grouping.malformed, baby_id
            );
        }
        info!(
            "Grouped sleep checks for baby {} into {} sessions ({} orphans)",
            baby_id,
            grouping.sessions.len(),
            grouping.orphans.len()
        );
        Ok(grouping)
    }

    /// Live feed of the baby's stored rows, re-sent after every change.
    pub async fn subscribe(&self, baby_id: &str) -> Result<watch::Receiver<SleepCheckSnapshot>> {
        self.ensure_baby(baby_id).await?;
        self.feed.subscribe(baby_id).await
    }
}
