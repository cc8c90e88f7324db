// # Memory Record Store
//
// In-memory implementation of RecordStore.
//
// ## Crash Behavior
//
// - All records are lost on restart/crash
// - Registrants must register again after a restart
//
// ## When to Use
//
// - Testing environments
// - Ephemeral deployments where registrants re-register on their own

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::store::{Record, RecordKey, RecordStore};

/// In-memory record store implementation
///
/// This implementation stores all records in a HashMap protected by a RwLock.
/// It provides no persistence across restarts.
///
/// # Example
///
/// ```rust,no_run
/// use authns_core::store::{MemoryRecordStore, Record, RecordStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryRecordStore::new();
///
///     store.put("foo", "A", Record::new("1.2.3.4", "5")).await?;
///
///     let record = store.get("foo", "A").await?;
///     assert_eq!(record.map(|r| r.value), Some("1.2.3.4".to_string()));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    inner: Arc<RwLock<HashMap<String, Record>>>,
}

impl MemoryRecordStore {
    /// Create a new empty memory record store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, name: &str, record_type: &str) -> Result<Option<Record>> {
        let guard = self.inner.read().await;
        Ok(guard.get(&RecordKey::new(name, record_type).to_string()).cloned())
    }

    async fn put(&self, name: &str, record_type: &str, record: Record) -> Result<()> {
        let mut guard = self.inner.write().await;
        guard.insert(RecordKey::new(name, record_type).to_string(), record);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let guard = self.inner.read().await;
        Ok(guard.keys().cloned().collect())
    }

    async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    async fn save(&self) -> Result<()> {
        // Nothing to persist
        Ok(())
    }
}
