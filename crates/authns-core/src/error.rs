//! Error types for the name registry
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the name registry
#[derive(Error, Debug)]
pub enum Error {
    /// Record store errors (snapshot read/write, lock failures)
    #[error("Record store error: {0}")]
    Store(String),

    /// Malformed protocol messages
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Socket and filesystem errors
    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    /// Datagram payload was not valid UTF-8
    #[error("Decode error: {0}")]
    Decode(#[from] std::str::Utf8Error),

    /// Startup failures (bind, runtime)
    #[error("Startup error: {0}")]
    Startup(String),
}

impl Error {
    /// Create a record store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a startup error
    pub fn startup(msg: impl Into<String>) -> Self {
        Self::Startup(msg.into())
    }
}
