//! Live snapshot feed over a [`SleepCheckStorage`].
//!
//! Subscribers get the full list of a baby's stored rows immediately and again
//! after every append, update or delete that goes through the feed.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use crate::domain::models::sleep_check::{SleepCheckPatch, SleepCheckRecord};
use crate::storage::SleepCheckStorage;

pub type SleepCheckSnapshot = Vec<SleepCheckRecord>;

pub struct SleepCheckFeed {
    inner: Arc<dyn SleepCheckStorage>,
    /// One channel per subscribed baby. Held across the snapshot read so
    /// snapshots are published in mutation order.
    channels: Mutex<HashMap<String, watch::Sender<SleepCheckSnapshot>>>,
}

impl SleepCheckFeed {
    pub fn new(inner: Arc<dyn SleepCheckStorage>) -> Self {
        Self {
            inner,
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribe to a baby's stream. The receiver starts with the current rows.
    pub async fn subscribe(&self, baby_id: &str) -> Result<watch::Receiver<SleepCheckSnapshot>> {
        let mut channels = self.channels.lock().await;
        let snapshot = self.inner.list_checks(baby_id).await?;

        let sender = channels
            .entry(baby_id.to_string())
            .or_insert_with(|| watch::channel(Vec::new()).0);
        sender.send_replace(snapshot);
        debug!("New sleep check subscriber for baby {}", baby_id);
        Ok(sender.subscribe())
    }

    async fn publish(&self, baby_id: &str) {
        let mut channels = self.channels.lock().await;
        let has_subscribers = match channels.get(baby_id) {
            Some(sender) => sender.receiver_count() > 0,
            None => return,
        };
        if !has_subscribers {
            channels.remove(baby_id);
            return;
        }

        match self.inner.list_checks(baby_id).await {
            Ok(snapshot) => {
                if let Some(sender) = channels.get(baby_id) {
                    sender.send_replace(snapshot);
                }
            }
            Err(e) => warn!("Failed to publish sleep checks for baby {}: {}", baby_id, e),
        }
    }
}

#[async_trait]
impl SleepCheckStorage for SleepCheckFeed {
    async fn append_check(&self, record: SleepCheckRecord) -> Result<String> {
        let baby_id = record.baby_id.clone();
        let id = self.inner.append_check(record).await?;
        self.publish(&baby_id).await;
        Ok(id)
    }

    async fn get_check(&self, baby_id: &str, check_id: &str) -> Result<Option<SleepCheckRecord>> {
        self.inner.get_check(baby_id, check_id).await
    }

    async fn list_checks(&self, baby_id: &str) -> Result<Vec<SleepCheckRecord>> {
        self.inner.list_checks(baby_id).await
    }

    async fn update_check(
        &self,
        baby_id: &str,
        check_id: &str,
        patch: &SleepCheckPatch,
    ) -> Result<Option<SleepCheckRecord>> {
        let updated = self.inner.update_check(baby_id, check_id, patch).await?;
        if updated.is_some() {
            self.publish(baby_id).await;
        }
        Ok(updated)
    }

    async fn delete_check(&self, baby_id: &str, check_id: &str) -> Result<bool> {
        let deleted = self.inner.delete_check(baby_id, check_id).await?;
        if deleted {
            self.publish(baby_id).await;
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::sleep_check::CheckKind;
    use crate::storage::csv::{CsvConnection, SleepCheckRepository};
    use chrono::Utc;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SleepCheckFeed) {
        let temp_dir = TempDir::new().unwrap();
        let repo = SleepCheckRepository::new(CsvConnection::new(temp_dir.path()).unwrap());
        (temp_dir, SleepCheckFeed::new(Arc::new(repo)))
    }

    fn start_event(baby_id: &str) -> SleepCheckRecord {
        SleepCheckRecord::new_event(baby_id, "staff-1", CheckKind::Start, "Back", None, None, Utc::now())
            .unwrap()
    }

    #[tokio::test]
    async fn test_subscriber_receives_full_snapshot_on_every_change() {
        let (_dir, feed) = setup();
        feed.append_check(start_event("baby-1")).await.unwrap();

        let mut receiver = feed.subscribe("baby-1").await.unwrap();
        assert_eq!(receiver.borrow_and_update().len(), 1);

        let id = feed.append_check(start_event("baby-1")).await.unwrap();
        receiver.changed().await.unwrap();
        assert_eq!(receiver.borrow_and_update().len(), 2);

        feed.delete_check("baby-1", &id).await.unwrap();
        receiver.changed().await.unwrap();
        let snapshot = receiver.borrow_and_update().clone();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.iter().all(|r| r.id != id));
    }

    #[tokio::test]
    async fn test_other_babies_do_not_notify() {
        let (_dir, feed) = setup();
        let mut receiver = feed.subscribe("baby-1").await.unwrap();
        receiver.borrow_and_update();

        feed.append_check(start_event("baby-2")).await.unwrap();
        assert!(!receiver.has_changed().unwrap());
    }
}
