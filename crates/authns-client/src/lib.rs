// # authns-client
//
// Client for the authoritative name registry.
//
// ## Purpose
//
// Services that register themselves (`register`) or look up a peer before
// calling it (`resolve`) use this crate instead of hand-framing datagrams.
//
// ## Failure Reporting
//
// The registry never retries and UDP may lose either direction, so every
// call waits a bounded time for its reply. Callers that proxy to the
// resolved address should report [`ClientError::is_resolution_failure`]
// errors separately from failures of the downstream call.

use authns_core::config::MAX_UDP_PAYLOAD;
use authns_core::protocol::response::{TOKEN_FAIL, TOKEN_NOT_FOUND, TOKEN_OK};
use authns_core::protocol::{FIELD_NAME, FIELD_TTL, FIELD_TYPE, FIELD_VALUE, parse_fields};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

/// Default time to wait for a reply
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// One spare byte: a reply that fills the buffer was cut short
const REPLY_BUFFER_SIZE: usize = MAX_UDP_PAYLOAD + 1;

/// Errors returned by [`NameClient`]
#[derive(Error, Debug)]
pub enum ClientError {
    /// The registry has no record for the queried key
    #[error("Record not found: {name}:{record_type}")]
    NotFound { name: String, record_type: String },

    /// The registry refused the registration
    #[error("Registration rejected for {name}:{record_type}")]
    Rejected { name: String, record_type: String },

    /// No reply within the timeout
    #[error("No reply from {server} within {timeout:?}")]
    Timeout {
        server: SocketAddr,
        timeout: Duration,
    },

    /// The reply did not follow the protocol
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Socket errors
    #[error("Network error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// True when a lookup could not produce an address
    ///
    /// Covers not-found, timeouts and unreadable replies.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            ClientError::NotFound { .. }
                | ClientError::Timeout { .. }
                | ClientError::InvalidResponse(_)
        )
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// A record as returned by a successful query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRecord {
    pub record_type: String,
    pub name: String,
    pub value: String,
    pub ttl: String,
}

/// UDP client for one registry server
///
/// # Example
///
/// ```rust,no_run
/// use authns_client::NameClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = NameClient::new("127.0.0.1:53533".parse()?);
///
///     client.register("A", "fibonacci.com", "10.0.0.5", "10").await?;
///     let record = client.resolve("A", "fibonacci.com").await?;
///     assert_eq!(record.value, "10.0.0.5");
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct NameClient {
    server: SocketAddr,
    timeout: Duration,
}

impl NameClient {
    /// Create a client for `server` with the default timeout
    pub fn new(server: SocketAddr) -> Self {
        Self {
            server,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set how long to wait for each reply
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Server this client talks to
    pub fn server(&self) -> SocketAddr {
        self.server
    }

    /// Register `name` → `value`
    ///
    /// # Errors
    ///
    /// - [`ClientError::Rejected`]: the registry answered `FAIL`
    /// - [`ClientError::Timeout`]: no answer in time
    pub async fn register(
        &self,
        record_type: &str,
        name: &str,
        value: &str,
        ttl: &str,
    ) -> Result<()> {
        let request = format!(
            "{}={}\n{}={}\n{}={}\n{}={}\n",
            FIELD_TYPE, record_type, FIELD_NAME, name, FIELD_VALUE, value, FIELD_TTL, ttl
        );

        let reply = self.exchange(&request).await?;
        match reply.as_str() {
            TOKEN_OK => {
                info!("Registered {}:{} → {}", name, record_type, value);
                Ok(())
            }
            TOKEN_FAIL => {
                warn!("Registration of {}:{} rejected", name, record_type);
                Err(ClientError::Rejected {
                    name: name.to_string(),
                    record_type: record_type.to_string(),
                })
            }
            other => Err(ClientError::InvalidResponse(format!(
                "unexpected registration reply '{}'",
                other
            ))),
        }
    }

    /// Resolve `(record_type, name)`
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotFound`]: the registry answered `NOT_FOUND`
    /// - [`ClientError::Timeout`]: no answer in time
    /// - [`ClientError::InvalidResponse`]: the answer lacked `VALUE` or `TTL`
    pub async fn resolve(&self, record_type: &str, name: &str) -> Result<ResolvedRecord> {
        let request = format!("{}={}\n{}={}\n", FIELD_TYPE, record_type, FIELD_NAME, name);

        let reply = self.exchange(&request).await?;
        if reply == TOKEN_NOT_FOUND {
            warn!("Resolution failed for {}:{}", name, record_type);
            return Err(ClientError::NotFound {
                name: name.to_string(),
                record_type: record_type.to_string(),
            });
        }

        let fields = parse_fields(&reply);
        let (Some(value), Some(ttl)) = (fields.get(FIELD_VALUE), fields.get(FIELD_TTL)) else {
            return Err(ClientError::InvalidResponse(format!(
                "query reply missing {} or {}",
                FIELD_VALUE, FIELD_TTL
            )));
        };

        let record = ResolvedRecord {
            record_type: fields.get(FIELD_TYPE).unwrap_or(record_type).to_string(),
            name: fields.get(FIELD_NAME).unwrap_or(name).to_string(),
            value: value.to_string(),
            ttl: ttl.to_string(),
        };
        info!("Resolved {}:{} → {}", name, record_type, record.value);
        Ok(record)
    }

    /// Send one request and wait for one reply from the server
    async fn exchange(&self, request: &str) -> Result<String> {
        let bind_addr: SocketAddr = if self.server.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(self.server).await?;

        debug!("Sending {} byte(s) to {}", request.len(), self.server);
        socket.send(request.as_bytes()).await?;

        let mut buf = vec![0u8; REPLY_BUFFER_SIZE];
        let len = tokio::time::timeout(self.timeout, socket.recv(&mut buf))
            .await
            .map_err(|_| ClientError::Timeout {
                server: self.server,
                timeout: self.timeout,
            })??;

        if len == buf.len() {
            return Err(ClientError::InvalidResponse(format!(
                "reply exceeds {} bytes",
                MAX_UDP_PAYLOAD
            )));
        }

        String::from_utf8(buf[..len].to_vec())
            .map_err(|e| ClientError::InvalidResponse(format!("reply is not UTF-8: {}", e)))
    }
}
