//! Configuration types for the name registry
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Well-known UDP port of the registry
pub const DEFAULT_PORT: u16 = 53533;

/// Default snapshot location
pub const DEFAULT_SNAPSHOT_PATH: &str = "/tmp/dns_records.json";

/// Largest legal UDP payload over IPv4
pub const MAX_UDP_PAYLOAD: usize = 65507;

/// Smallest receive buffer that still fits a registration with short fields
const MIN_DATAGRAM_SIZE: usize = 64;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the UDP endpoint binds to
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Record store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Largest datagram accepted; anything longer is dropped, never truncated
    #[serde(default = "default_max_datagram_size")]
    pub max_datagram_size: usize,

    /// Capacity of the server event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl ServerConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            listen: default_listen(),
            store: StoreConfig::default(),
            max_datagram_size: default_max_datagram_size(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Set the listen address
    pub fn with_listen(mut self, listen: SocketAddr) -> Self {
        self.listen = listen;
        self
    }

    /// Set the store configuration
    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    /// Set the receive buffer bound
    pub fn with_max_datagram_size(mut self, size: usize) -> Self {
        self.max_datagram_size = size;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if !(MIN_DATAGRAM_SIZE..=MAX_UDP_PAYLOAD).contains(&self.max_datagram_size) {
            return Err(crate::Error::config(format!(
                "max_datagram_size must be between {} and {}, got {}",
                MIN_DATAGRAM_SIZE, MAX_UDP_PAYLOAD, self.max_datagram_size
            )));
        }

        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("event_channel_capacity must be > 0"));
        }

        self.store.validate()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Record store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Snapshot-backed store
    File {
        /// Path to the snapshot file
        path: String,
    },

    /// In-memory store (not persistent)
    Memory,
}

impl StoreConfig {
    /// Validate the store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StoreConfig::File { path } if path.is_empty() => {
                Err(crate::Error::config("Snapshot path cannot be empty"))
            }
            _ => Ok(()),
        }
    }

    /// Get the store type name
    pub fn type_name(&self) -> &str {
        match self {
            StoreConfig::File { .. } => "file",
            StoreConfig::Memory => "memory",
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::File {
            path: DEFAULT_SNAPSHOT_PATH.to_string(),
        }
    }
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT))
}

fn default_max_datagram_size() -> usize {
    1024
}

fn default_event_channel_capacity() -> usize {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_wire_contract() {
        let config = ServerConfig::default();
        assert_eq!(config.listen.port(), DEFAULT_PORT);
        assert_eq!(config.max_datagram_size, 1024);
        assert_eq!(
            config.store,
            StoreConfig::File {
                path: DEFAULT_SNAPSHOT_PATH.to_string()
            }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_sizes() {
        let config = ServerConfig::default().with_max_datagram_size(16);
        assert!(config.validate().is_err());

        let config = ServerConfig::default().with_max_datagram_size(70_000);
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.event_channel_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_snapshot_path() {
        let config = ServerConfig::default().with_store(StoreConfig::File {
            path: String::new(),
        });
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_store_config_deserializes_tagged() {
        let config: ServerConfig =
            serde_json::from_str(r#"{"store": {"type": "memory"}}"#).unwrap();
        assert_eq!(config.store, StoreConfig::Memory);
        assert_eq!(config.store.type_name(), "memory");
        assert_eq!(config.listen, default_listen());
    }
}
