//! UDP transport loop
//!
//! [`AuthServer`] is the explicit server context: it owns the socket and the
//! [`ProtocolEngine`] (and through it the record store). It has one steady
//! state, listening:
//!
//! 1. Block until a datagram arrives
//! 2. Decode it as UTF-8 text
//! 3. Dispatch to the engine
//! 4. Send the encoded response back to the sender
//!
//! Each datagram is fully handled before the next is received. Failures in
//! steps 2-4 are logged and the datagram is dropped; the loop keeps going.
//! Only a failed bind stops the server, and that happens before the loop.

pub mod events;

use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, trace, warn};

use crate::config::ServerConfig;
use crate::engine::ProtocolEngine;
use crate::error::{Error, Result};
use crate::store::{RecordStore, open_store};

pub use events::{EventSink, ServerEvent};

/// Authoritative name registry server
///
/// # Example
///
/// ```rust,no_run
/// use authns_core::{AuthServer, ServerConfig};
///
/// #[tokio::main]
/// async fn main() -> authns_core::Result<()> {
///     let config = ServerConfig::default();
///     let (server, _events) = AuthServer::from_config(&config).await?;
///     server.run().await
/// }
/// ```
pub struct AuthServer {
    /// Bound UDP endpoint
    socket: UdpSocket,

    /// Payload → response
    engine: ProtocolEngine,

    /// Transport-level events (start, stop, dropped datagrams)
    events: EventSink,

    /// Largest datagram served
    max_datagram_size: usize,
}

impl AuthServer {
    /// Open the configured store and bind
    pub async fn from_config(
        config: &ServerConfig,
    ) -> Result<(Self, mpsc::Receiver<ServerEvent>)> {
        config.validate()?;
        let store = open_store(&config.store).await;
        Self::bind(config, store).await
    }

    /// Bind the UDP endpoint in front of `store`
    ///
    /// # Returns
    ///
    /// A tuple of (server, event_receiver) where event_receiver yields server events
    ///
    /// # Errors
    ///
    /// [`Error::Startup`] when the address cannot be bound (e.g. port in use).
    pub async fn bind(
        config: &ServerConfig,
        store: Box<dyn RecordStore>,
    ) -> Result<(Self, mpsc::Receiver<ServerEvent>)> {
        config.validate()?;

        let socket = UdpSocket::bind(config.listen)
            .await
            .map_err(|e| Error::startup(format!("UDP bind {}: {}", config.listen, e)))?;

        let (events, rx) = EventSink::channel(config.event_channel_capacity);
        let engine = ProtocolEngine::new(store, events.clone());

        let server = Self {
            socket,
            engine,
            events,
            max_datagram_size: config.max_datagram_size,
        };

        info!("UDP socket bound on {}", server.local_addr()?);
        Ok((server, rx))
    }

    /// Address the socket is actually bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// The protocol engine behind this server
    pub fn engine(&self) -> &ProtocolEngine {
        &self.engine
    }

    /// Serve forever
    pub async fn run(&self) -> Result<()> {
        self.run_with_shutdown(None).await
    }

    /// Serve until `shutdown_rx` fires (or forever when `None`)
    ///
    /// The oneshot sender being dropped counts as a shutdown signal.
    pub async fn run_with_shutdown(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        let local_addr = self.local_addr()?;
        self.events.emit(ServerEvent::Started {
            local_addr,
            records_count: self.engine.store().len().await,
        });
        info!("Authoritative server listening on UDP {}", local_addr);

        let shutdown = async {
            match shutdown_rx {
                Some(rx) => {
                    let _ = rx.await;
                }
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(shutdown);

        // One spare byte: a datagram that fills it was longer than allowed
        let mut buf = vec![0u8; self.max_datagram_size + 1];

        loop {
            let received = tokio::select! {
                result = self.socket.recv_from(&mut buf) => result,
                _ = &mut shutdown => break,
            };

            let (len, peer) = match received {
                Ok(received) => received,
                Err(e) => {
                    error!("Error receiving datagram: {}", e);
                    self.events.emit(ServerEvent::Dropped {
                        peer: None,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if let Err(e) = self.serve_datagram(&buf[..len], peer).await {
                warn!("Dropped datagram from {}: {}", peer, e);
                self.events.emit(ServerEvent::Dropped {
                    peer: Some(peer),
                    reason: e.to_string(),
                });
            }
        }

        info!("Shutdown signal received");
        self.events.emit(ServerEvent::Stopped {
            reason: "Shutdown signal".to_string(),
        });

        // Nothing is pending for the file store, but a custom one may buffer
        if let Err(e) = self.engine.store().save().await {
            error!("Failed to save records on shutdown: {}", e);
        }

        Ok(())
    }

    /// Handle one datagram end to end
    ///
    /// Errors here mean no reply is sent; the caller logs and moves on.
    async fn serve_datagram(&self, datagram: &[u8], peer: SocketAddr) -> Result<()> {
        trace!("Received {} byte(s) from {}", datagram.len(), peer);

        if datagram.len() > self.max_datagram_size {
            return Err(Error::protocol(format!(
                "datagram exceeds {} bytes",
                self.max_datagram_size
            )));
        }

        let payload = std::str::from_utf8(datagram)?;
        let response = self.engine.handle(payload, peer).await;

        self.socket
            .send_to(response.encode().as_bytes(), peer)
            .await?;
        trace!("Replied {} to {}", response.label(), peer);

        Ok(())
    }
}
