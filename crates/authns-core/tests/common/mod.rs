//! Shared harness for wire-level contract tests
//!
//! Spawns a real server on an ephemeral loopback port and talks to it over
//! UDP, the same way collaborators do.

#![allow(dead_code)]

use authns_core::store::{FileRecordStore, MemoryRecordStore, RecordStore};
use authns_core::{AuthServer, ServerConfig, ServerEvent, StoreConfig};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// How long a test waits for any single reply
pub const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// A running server plus the handles needed to stop it
pub struct TestServer {
    pub addr: SocketAddr,
    pub events: mpsc::Receiver<ServerEvent>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<authns_core::Result<()>>>,
}

impl TestServer {
    /// Start a server over an in-memory store
    pub async fn memory() -> Self {
        Self::start(Box::new(MemoryRecordStore::new())).await
    }

    /// Start a server over a snapshot file
    pub async fn file(path: &Path) -> Self {
        Self::start(Box::new(FileRecordStore::open(path).await)).await
    }

    /// Start a server over `store`
    pub async fn start(store: Box<dyn RecordStore>) -> Self {
        let config = ServerConfig::default()
            .with_listen(SocketAddr::from(([127, 0, 0, 1], 0)))
            .with_store(StoreConfig::Memory);

        let (server, events) = AuthServer::bind(&config, store)
            .await
            .expect("bind on loopback succeeds");
        let addr = server.local_addr().expect("bound socket has an address");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle =
            tokio::spawn(async move { server.run_with_shutdown(Some(shutdown_rx)).await });

        Self {
            addr,
            events,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Stop the server and wait for the loop to exit
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle
                .await
                .expect("server task does not panic")
                .expect("server exits cleanly");
        }
    }

    /// Whether the serving task is still alive
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

/// Send `payload` from a fresh socket and wait for the reply
pub async fn exchange(addr: SocketAddr, payload: &[u8]) -> String {
    let socket = UdpSocket::bind("127.0.0.1:0").await.expect("client bind");
    socket.send_to(payload, addr).await.expect("send succeeds");

    let mut buf = vec![0u8; 2048];
    let (len, from) = tokio::time::timeout(REPLY_TIMEOUT, socket.recv_from(&mut buf))
        .await
        .expect("reply within timeout")
        .expect("recv succeeds");
    assert_eq!(from, addr, "reply comes from the server address");

    String::from_utf8(buf[..len].to_vec()).expect("reply is UTF-8")
}

/// Send `payload` and assert that no reply arrives within `wait`
pub async fn expect_silence(addr: SocketAddr, payload: &[u8], wait: Duration) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.expect("client bind");
    socket.send_to(payload, addr).await.expect("send succeeds");

    let mut buf = vec![0u8; 2048];
    let result = tokio::time::timeout(wait, socket.recv_from(&mut buf)).await;
    assert!(result.is_err(), "expected no reply, got one");
}

/// Registration payload in the canonical line order
pub fn registration(record_type: &str, name: &str, value: &str, ttl: &str) -> String {
    format!("TYPE={record_type}\nNAME={name}\nVALUE={value}\nTTL={ttl}\n")
}

/// Query payload in the canonical line order
pub fn query(record_type: &str, name: &str) -> String {
    format!("TYPE={record_type}\nNAME={name}\n")
}
