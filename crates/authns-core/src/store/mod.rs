// # Record Store
//
// Defines the record model and the interface for the record mapping.
//
// ## Purpose
//
// The store maps a composite key `"<NAME>:<TYPE>"` to a [`Record`]. Keys are
// case-sensitive and exact-match only. A later registration for the same key
// overwrites the earlier one.
//
// ## Implementations
//
// - [`FileRecordStore`]: loaded from and rewritten to a JSON snapshot
// - [`MemoryRecordStore`]: no persistence, for tests and ephemeral runs
//
// TTL is stored verbatim and never used to expire anything.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::StoreConfig;
use crate::error::Result;

pub mod file;
pub mod memory;

pub use file::FileRecordStore;
pub use memory::MemoryRecordStore;

/// A stored record, as it appears in the snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Resolved value (an address or hostname)
    pub value: String,
    /// Time-to-live exactly as the registrant sent it
    pub ttl: Ttl,
}

impl Record {
    /// Create a new record
    pub fn new(value: impl Into<String>, ttl: impl Into<Ttl>) -> Self {
        Self {
            value: value.into(),
            ttl: ttl.into(),
        }
    }
}

/// A TTL, never interpreted
///
/// Registrations always produce text. Snapshots written by other tools may
/// carry a JSON number, which is kept as a number so a load/save cycle
/// rewrites it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ttl {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ttl::Text(text) => f.write_str(text),
            Ttl::Number(number) => write!(f, "{}", number),
        }
    }
}

impl From<&str> for Ttl {
    fn from(text: &str) -> Self {
        Ttl::Text(text.to_string())
    }
}

impl From<String> for Ttl {
    fn from(text: String) -> Self {
        Ttl::Text(text)
    }
}

/// Composite key identifying one record slot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    /// Record name
    pub name: String,
    /// Record type (e.g. "A")
    pub record_type: String,
}

impl RecordKey {
    /// Create a new key
    pub fn new(name: impl Into<String>, record_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.record_type)
    }
}

/// Record store trait
///
/// Implementations must serialize mutations, and a persisting backend must
/// treat "insert then persist" as one critical section so a snapshot write
/// never interleaves with another mutation.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Get the record stored for `(name, record_type)`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))`: Record found
    /// - `Ok(None)`: No record for this key
    async fn get(&self, name: &str, record_type: &str) -> Result<Option<Record>>;

    /// Insert or overwrite the record for `(name, record_type)`
    ///
    /// Persisting backends write their snapshot before returning. A failed
    /// write is logged and does not fail the call: the in-memory mapping stays
    /// authoritative for the running process.
    async fn put(&self, name: &str, record_type: &str, record: Record) -> Result<()>;

    /// List all composite keys currently stored
    async fn keys(&self) -> Result<Vec<String>>;

    /// Number of stored records
    async fn len(&self) -> usize;

    /// Check if the store is empty
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Persist the full mapping now
    ///
    /// Unlike `put`, this reports write failures to the caller.
    async fn save(&self) -> Result<()>;
}

/// Open the store described by `config`
///
/// Never fails: a missing or unreadable snapshot yields an empty store.
pub async fn open_store(config: &StoreConfig) -> Box<dyn RecordStore> {
    match config {
        StoreConfig::File { path } => Box::new(FileRecordStore::open(path).await),
        StoreConfig::Memory => Box::new(MemoryRecordStore::new()),
    }
}
