//! Protocol engine
//!
//! The ProtocolEngine is responsible for:
//! - Classifying a decoded payload as registration or query
//! - Reading from and writing to the RecordStore
//! - Producing exactly one [`Response`] per payload
//!
//! ## Error Boundary
//!
//! ```text
//! payload ──► Message::parse ──► register / resolve ──► Response
//!                                        │
//!                          store error ──┴──► FAIL / NOT_FOUND
//! ```
//!
//! Nothing escapes [`ProtocolEngine::handle`]: malformed input and store
//! failures both end as the failure token of the classified message kind.

use std::net::SocketAddr;
use tracing::{debug, error, info, warn};

use crate::protocol::{Message, MessageKind, Response};
use crate::server::events::{EventSink, ServerEvent};
use crate::store::{Record, RecordKey, RecordStore};

/// Turns payloads into responses against a record store
pub struct ProtocolEngine {
    /// Record store
    store: Box<dyn RecordStore>,

    /// Event sink for external monitoring
    events: EventSink,
}

impl ProtocolEngine {
    /// Create a new engine
    ///
    /// # Parameters
    ///
    /// - `store`: Record store implementation
    /// - `events`: Where to emit registration/resolution events
    pub fn new(store: Box<dyn RecordStore>, events: EventSink) -> Self {
        Self { store, events }
    }

    /// The underlying record store
    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Handle one decoded payload from `peer`
    pub async fn handle(&self, payload: &str, peer: SocketAddr) -> Response {
        let message = Message::parse(payload);
        debug!("Classified datagram from {} as {}", peer, message.kind());

        match message {
            Message::Registration { key, record } => self.register(key, record, peer).await,
            Message::Query { key } => self.resolve(key, peer).await,
            Message::Malformed {
                kind: MessageKind::Registration,
                reason,
            } => {
                warn!("Invalid registration from {}: {}", peer, reason);
                self.events.emit(ServerEvent::Rejected { peer, reason });
                Response::Fail
            }
            Message::Malformed {
                kind: MessageKind::Query,
                reason,
            } => {
                warn!("Invalid query from {}: {}", peer, reason);
                self.events.emit(ServerEvent::NotFound { peer, key: None });
                Response::NotFound
            }
        }
    }

    async fn register(&self, key: RecordKey, record: Record, peer: SocketAddr) -> Response {
        let value = record.value.clone();

        match self.store.put(&key.name, &key.record_type, record).await {
            Ok(()) => {
                info!("Registered {} → {} from {}", key, value, peer);
                self.events.emit(ServerEvent::Registered { peer, key });
                Response::Ok
            }
            Err(e) => {
                error!("Error handling registration of {} from {}: {}", key, peer, e);
                self.events.emit(ServerEvent::Rejected {
                    peer,
                    reason: e.to_string(),
                });
                Response::Fail
            }
        }
    }

    async fn resolve(&self, key: RecordKey, peer: SocketAddr) -> Response {
        match self.store.get(&key.name, &key.record_type).await {
            Ok(Some(record)) => {
                info!("Query from {}: {} → {}", peer, key, record.value);
                self.events.emit(ServerEvent::Resolved {
                    peer,
                    key: key.clone(),
                });
                Response::Record { key, record }
            }
            Ok(None) => {
                warn!("Query from {}: {} → not found", peer, key);
                self.events.emit(ServerEvent::NotFound {
                    peer,
                    key: Some(key),
                });
                Response::NotFound
            }
            Err(e) => {
                error!("Error handling query for {} from {}: {}", key, peer, e);
                self.events.emit(ServerEvent::NotFound {
                    peer,
                    key: Some(key),
                });
                Response::NotFound
            }
        }
    }
}
