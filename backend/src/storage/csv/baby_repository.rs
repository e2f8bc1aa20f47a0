use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::connection::CsvConnection;
use crate::domain::models::baby::Baby;
use crate::storage::BabyStorage;

const PROFILE_FILE: &str = "baby.yaml";

/// Baby profiles stored as `<data dir>/<baby id>/baby.yaml`, discovered by
/// scanning the data directory.
#[derive(Clone)]
pub struct BabyRepository {
    connection: CsvConnection,
}

impl BabyRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn profile_path(&self, baby_id: &str) -> PathBuf {
        self.connection.baby_directory(baby_id).join(PROFILE_FILE)
    }

    fn load_profile(&self, path: &PathBuf) -> Result<Baby> {
        let yaml_content = fs::read_to_string(path)?;
        let baby: Baby = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(baby)
    }

    fn discover_babies(&self) -> Result<Vec<Baby>> {
        let base_dir = self.connection.base_directory();
        if !base_dir.exists() {
            debug!("Base directory doesn't exist, returning empty baby list");
            return Ok(Vec::new());
        }

        let mut babies = Vec::new();
        for entry in fs::read_dir(base_dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }

            let profile = path.join(PROFILE_FILE);
            if !profile.exists() {
                continue;
            }

            match self.load_profile(&profile) {
                Ok(baby) => babies.push(baby),
                Err(e) => warn!("Skipping unreadable baby profile {}: {}", profile.display(), e),
            }
        }

        babies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(babies)
    }
}

#[async_trait]
impl BabyStorage for BabyRepository {
    async fn store_baby(&self, baby: &Baby) -> Result<()> {
        let _guard = self.connection.lock().await;

        let baby_dir = self.connection.baby_directory(&baby.id);
        if !baby_dir.exists() {
            fs::create_dir_all(&baby_dir)?;
            info!("Created baby directory: {}", baby_dir.display());
        }

        let yaml_path = self.profile_path(&baby.id);
        let yaml_content = serde_yaml::to_string(baby)?;

        let temp_path = yaml_path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &yaml_path)?;

        info!("Saved baby {} ({})", baby.name, baby.id);
        Ok(())
    }

    async fn get_baby(&self, baby_id: &str) -> Result<Option<Baby>> {
        let path = self.profile_path(baby_id);
        if !path.exists() {
            return Ok(None);
        }
        let baby = self.load_profile(&path)?;
        // a sanitized id can collide with another directory name
        Ok(Some(baby).filter(|b| b.id == baby_id))
    }

    async fn list_babies(&self) -> Result<Vec<Baby>> {
        self.discover_babies()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn baby(id: &str, name: &str) -> Baby {
        Baby {
            id: id.to_string(),
            name: name.to_string(),
            dob: None,
            parent_email: Some("parent@example.com".to_string()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_store_and_discover_babies() {
        let temp_dir = TempDir::new().unwrap();
        let repo = BabyRepository::new(CsvConnection::new(temp_dir.path()).unwrap());

        repo.store_baby(&baby("baby-2", "Noah")).await.unwrap();
        repo.store_baby(&baby("baby-1", "Ava")).await.unwrap();
        // stray directories without a profile are ignored
        fs::create_dir_all(temp_dir.path().join("scratch")).unwrap();

        let babies = repo.list_babies().await.unwrap();
        let names: Vec<&str> = babies.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Ava", "Noah"]);

        let ava = repo.get_baby("baby-1").await.unwrap().unwrap();
        assert_eq!(ava.parent_email.as_deref(), Some("parent@example.com"));
        assert!(repo.get_baby("baby-404").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_baby_requires_exact_id() {
        let temp_dir = TempDir::new().unwrap();
        let repo = BabyRepository::new(CsvConnection::new(temp_dir.path()).unwrap());
        repo.store_baby(&baby("baby_1", "Ava")).await.unwrap();

        // "baby/1" sanitizes to the same directory but is a different id
        assert!(repo.get_baby("baby/1").await.unwrap().is_none());
        assert!(repo.get_baby("baby_1").await.unwrap().is_some());
    }
}
