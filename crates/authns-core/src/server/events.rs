//! Server events
//!
//! Events are for monitoring and tests. Emission never blocks the receive
//! loop: when the channel is full the event is dropped with a warning.

use std::net::SocketAddr;
use tokio::sync::mpsc;
use tracing::warn;

use crate::store::RecordKey;

/// Events emitted while serving
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Socket bound, loop about to start
    Started {
        local_addr: SocketAddr,
        records_count: usize,
    },

    /// Registration stored
    Registered { peer: SocketAddr, key: RecordKey },

    /// Query answered with a record
    Resolved { peer: SocketAddr, key: RecordKey },

    /// Query unresolved; `key` is `None` when the query was malformed
    NotFound {
        peer: SocketAddr,
        key: Option<RecordKey>,
    },

    /// Registration rejected
    Rejected { peer: SocketAddr, reason: String },

    /// Datagram dropped without a reply
    Dropped {
        peer: Option<SocketAddr>,
        reason: String,
    },

    /// Loop exited
    Stopped { reason: String },
}

/// Sending half of the event channel
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Option<mpsc::Sender<ServerEvent>>,
}

impl EventSink {
    /// Create a sink and its receiver
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that discards everything
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Emit an event without waiting
    pub fn emit(&self, event: ServerEvent) {
        let Some(tx) = &self.tx else {
            return;
        };

        if let Err(mpsc::error::TrySendError::Full(_)) = tx.try_send(event) {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}
