//! Persistence for transformed records.
//!
//! Stores only need two operations: list the identity tuples they already
//! hold, and append a complete batch. Dates arrive as `YYYY-MM-DD` strings and
//! missing values as JSON null, so records are written as-is.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use feedwatch_common::{FeedError, IdentityKey, Record, Result, SeenKeys};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Identity tuples of every stored record that carries all of `key`'s fields.
    async fn existing_keys(&self, key: &IdentityKey) -> Result<SeenKeys>;

    /// Append `records`; returns how many were written.
    async fn insert(&self, records: &[Record]) -> Result<usize>;
}

fn keys_of<'a>(records: impl Iterator<Item = &'a Record>, key: &IdentityKey) -> SeenKeys {
    records.filter_map(|r| key.tuple(r).ok()).collect()
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory store for tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn existing_keys(&self, key: &IdentityKey) -> Result<SeenKeys> {
        Ok(keys_of(self.records.lock().unwrap().iter(), key))
    }

    async fn insert(&self, records: &[Record]) -> Result<usize> {
        self.records.lock().unwrap().extend_from_slice(records);
        Ok(records.len())
    }
}

// ---------------------------------------------------------------------------
// JsonlStore
// ---------------------------------------------------------------------------

/// One JSON object per line, appended to a file held open for the run.
pub struct JsonlStore {
    path: PathBuf,
    file: tokio::sync::Mutex<File>,
}

fn storage_error(path: &Path, action: &str, err: impl std::fmt::Display) -> FeedError {
    FeedError::Storage(format!("{action} {}: {err}", path.display()))
}

impl JsonlStore {
    /// Open `path` for appending, creating it if needed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| storage_error(&path, "Failed to open", e))?;
        debug!(path = %path.display(), "store: opened");
        Ok(Self {
            path,
            file: tokio::sync::Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<Record>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| storage_error(&self.path, "Failed to read", e))?;
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str::<Record>(line).map_err(|e| {
                    storage_error(&self.path, &format!("Bad record on line {} of", n + 1), e)
                })
            })
            .collect()
    }
}

#[async_trait]
impl RecordStore for JsonlStore {
    async fn existing_keys(&self, key: &IdentityKey) -> Result<SeenKeys> {
        let records = self.read_all().await?;
        Ok(keys_of(records.iter(), key))
    }

    async fn insert(&self, records: &[Record]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut buf = Vec::new();
        for record in records {
            serde_json::to_writer(&mut buf, record)
                .map_err(|e| storage_error(&self.path, "Failed to encode record for", e))?;
            buf.push(b'\n');
        }

        let mut file = self.file.lock().await;
        file.write_all(&buf)
            .await
            .map_err(|e| storage_error(&self.path, "Failed to write", e))?;
        file.flush()
            .await
            .map_err(|e| storage_error(&self.path, "Failed to flush", e))?;

        info!(path = %self.path.display(), inserted = records.len(), "store: appended");
        Ok(records.len())
    }
}
