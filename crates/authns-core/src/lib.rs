// # authns-core
//
// Core library for the authoritative name registry.
//
// ## Architecture Overview
//
// The registry answers `(name, type) → (value, ttl)` lookups over UDP using a
// line-oriented `KEY=VALUE` text protocol:
// - **RecordStore**: Trait for the record mapping, with file and memory backends
// - **protocol**: Field parsing, message classification and response framing
// - **ProtocolEngine**: Turns one decoded payload into one response
// - **AuthServer**: Binds the UDP endpoint and runs the receive loop
//
// ## Data Flow
//
// ```text
// datagram → parse_fields → Message::classify → ProtocolEngine → RecordStore
//                                                      │
//                                 datagram ← Response::encode
// ```
//
// ## Design Principles
//
// 1. **One bad datagram never stops the server**: every per-datagram failure
//    ends in a protocol token or a log line
// 2. **Store owns durability**: the snapshot is rewritten after every registration
// 3. **Library-First**: the daemon is a thin wrapper over [`AuthServer`]

pub mod config;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod server;
pub mod store;

// Re-export core types for convenience
pub use config::{ServerConfig, StoreConfig};
pub use engine::ProtocolEngine;
pub use error::{Error, Result};
pub use protocol::{FieldMap, Message, Response};
pub use server::{AuthServer, ServerEvent};
pub use store::{FileRecordStore, MemoryRecordStore, Record, RecordKey, RecordStore, Ttl};
