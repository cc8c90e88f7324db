// # File Record Store
//
// Snapshot-backed implementation of RecordStore.
//
// ## Purpose
//
// Keeps the record mapping in memory and rewrites the whole snapshot after
// every registration, so a restart sees every registration that completed.
//
// ## Crash Recovery
//
// - Atomic writes: the snapshot is written to a `.tmp` sibling, then renamed
// - Missing or unparseable snapshot: start with an empty store
//
// ## File Format
//
// A flat JSON object keyed by composite key:
//
// ```json
// {
//   "svc1:A": { "value": "10.0.0.5", "ttl": "10" }
// }
// ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, error, info, trace, warn};

use crate::error::{Error, Result};
use crate::store::{Record, RecordKey, RecordStore};

/// Snapshot-backed record store
///
/// # Example
///
/// ```rust,no_run
/// use authns_core::store::{FileRecordStore, Record, RecordStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileRecordStore::open("/var/lib/authns/records.json").await;
///
///     // Written to disk before `put` returns
///     store.put("svc1", "A", Record::new("10.0.0.5", "10")).await?;
///
///     let reopened = FileRecordStore::open("/var/lib/authns/records.json").await;
///     assert!(reopened.get("svc1", "A").await?.is_some());
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileRecordStore {
    path: PathBuf,
    records: RwLock<HashMap<String, Record>>,
}

impl FileRecordStore {
    /// Open a store, loading the snapshot at `path` if present
    ///
    /// The snapshot's parent directory is created lazily on first save.
    pub async fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let records = Self::load(&path).await;

        Self {
            path,
            records: RwLock::new(records),
        }
    }

    /// Load the snapshot at `path`
    ///
    /// Returns an empty mapping when the file is missing, unreadable or
    /// corrupted. Never fails.
    pub async fn load(path: &Path) -> HashMap<String, Record> {
        match Self::read_snapshot(path).await {
            Ok(Some(records)) => {
                info!(
                    "Loaded {} record(s) from {}",
                    records.len(),
                    path.display()
                );
                records
            }
            Ok(None) => {
                info!(
                    "No snapshot at {}, starting with an empty store",
                    path.display()
                );
                HashMap::new()
            }
            Err(e) => {
                warn!("{}. Starting with an empty store.", e);
                HashMap::new()
            }
        }
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_snapshot(path: &Path) -> Result<Option<HashMap<String, Record>>> {
        if !path.exists() {
            debug!("Snapshot does not exist: {}", path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::store(format!(
                "Failed to read snapshot {}: {}",
                path.display(),
                e
            ))
        })?;

        let records = serde_json::from_str(&content).map_err(|e| {
            Error::store(format!(
                "Failed to parse snapshot {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(Some(records))
    }

    /// Write `records` to the snapshot atomically
    ///
    /// Callers hold the records lock so no mutation lands mid-write.
    async fn write_snapshot(&self, records: &HashMap<String, Record>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::store(format!(
                    "Failed to create snapshot directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let json = serde_json::to_string(records)
            .map_err(|e| Error::store(format!("Failed to serialize snapshot: {}", e)))?;

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::store(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::store(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            // Data must be on disk before the rename makes it visible
            file.sync_all().await.map_err(|e| {
                Error::store(format!(
                    "Failed to sync temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        trace!(
            "Saved {} record(s) to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn get(&self, name: &str, record_type: &str) -> Result<Option<Record>> {
        let guard = self.records.read().await;
        Ok(guard.get(&RecordKey::new(name, record_type).to_string()).cloned())
    }

    async fn put(&self, name: &str, record_type: &str, record: Record) -> Result<()> {
        // Held across the write: mutate-then-persist is one critical section
        let mut guard = self.records.write().await;
        guard.insert(RecordKey::new(name, record_type).to_string(), record);

        if let Err(e) = self.write_snapshot(&guard).await {
            error!("Snapshot not saved, in-memory store remains authoritative: {}", e);
        }

        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let guard = self.records.read().await;
        Ok(guard.keys().cloned().collect())
    }

    async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    async fn save(&self) -> Result<()> {
        let guard = self.records.read().await;
        self.write_snapshot(&guard).await
    }
}
