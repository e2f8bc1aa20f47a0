use anyhow::{Context, Result};
use csv::{ReaderBuilder, Writer};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// CsvConnection manages the data directory layout: one directory per baby
/// holding a `baby.yaml` profile and one CSV table per log collection.
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
    /// Serializes read-modify-write cycles on the tables
    write_lock: Arc<Mutex<()>>,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .with_context(|| format!("Failed to create data directory {}", base_path.display()))?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Default location: ~/Documents/Babylog, falling back to the home directory
    pub fn default_data_directory() -> Result<PathBuf> {
        let parent = dirs::document_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
        Ok(parent.join("Babylog"))
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Directory for a baby's data. Ids are sanitized so they can never
    /// escape the base directory.
    pub fn baby_directory(&self, baby_id: &str) -> PathBuf {
        self.base_directory.join(safe_directory_name(baby_id))
    }

    pub fn table_path(&self, baby_id: &str, table: &str) -> PathBuf {
        self.baby_directory(baby_id).join(format!("{}.csv", table))
    }

    /// Hold this across a read-modify-write of any table
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    /// Read every row of a table. A missing file is an empty table.
    ///
    /// Rows with too few fields are padded with empty fields and extra
    /// trailing fields are ignored, so one hand-edited line does not hide
    /// the rest of the table.
    pub fn read_rows<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            debug!("Table {} does not exist yet", path.display());
            return Ok(Vec::new());
        }

        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let mut csv_reader = ReaderBuilder::new()
            .flexible(true)
            .from_reader(BufReader::new(file));
        let headers = csv_reader
            .headers()
            .with_context(|| format!("Failed to read header of {}", path.display()))?
            .clone();

        let mut rows = Vec::new();
        for (index, result) in csv_reader.records().enumerate() {
            let mut record = result.with_context(|| format!("Failed to read row in {}", path.display()))?;
            if record.len() != headers.len() {
                warn!(
                    "Row {} of {} has {} fields, expected {}",
                    index + 1,
                    path.display(),
                    record.len(),
                    headers.len()
                );
            }
            while record.len() < headers.len() {
                record.push_field("");
            }
            let row: T = record
                .deserialize(Some(&headers))
                .with_context(|| format!("Failed to parse row {} in {}", index + 1, path.display()))?;
            rows.push(row);
        }
        Ok(rows)
    }

    /// Replace a table's contents atomically via a temp file and rename
    pub fn write_rows<T: Serialize>(&self, path: &Path, rows: &[T]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            let mut csv_writer = Writer::from_writer(BufWriter::new(file));
            for row in rows {
                csv_writer.serialize(row)?;
            }
            csv_writer.flush()?;
        }

        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }
}

/// Map an id onto a safe directory name: anything other than ASCII
/// alphanumerics, `-` and `_` becomes `_`.
pub fn safe_directory_name(id: &str) -> String {
    let name: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() {
        "_".to_string()
    } else {
        name
    }
}
