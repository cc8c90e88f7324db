//! Contract Test: Loop Resilience
//!
//! A single bad datagram must never terminate the service.
//!
//! Constraints verified:
//! - Non-UTF-8 payloads are dropped without a reply
//! - Oversized datagrams are dropped, not truncated and served
//! - The server keeps answering afterwards

mod common;

use authns_core::ServerEvent;
use common::*;
use std::time::Duration;

const SILENCE: Duration = Duration::from_millis(300);

#[tokio::test]
async fn invalid_utf8_is_dropped_and_loop_continues() {
    let mut server = TestServer::memory().await;

    expect_silence(server.addr, &[0xff, 0xfe, b'\n', 0x80], SILENCE).await;
    assert!(server.is_running());

    assert_eq!(
        exchange(server.addr, registration("A", "foo", "1.2.3.4", "5").as_bytes()).await,
        "OK"
    );

    assert!(matches!(server.events.recv().await, Some(ServerEvent::Started { .. })));
    assert!(matches!(
        server.events.recv().await,
        Some(ServerEvent::Dropped { peer: Some(_), .. })
    ));

    server.stop().await;
}

#[tokio::test]
async fn oversized_datagram_is_dropped() {
    let server = TestServer::memory().await;

    // Valid registration, padded past the 1024-byte default limit
    let mut payload = registration("A", "foo", "1.2.3.4", "5");
    payload.push_str(&format!("PAD={}\n", "x".repeat(1100)));
    expect_silence(server.addr, payload.as_bytes(), SILENCE).await;

    // Nothing was stored from the oversized datagram
    assert_eq!(exchange(server.addr, query("A", "foo").as_bytes()).await, "NOT_FOUND");

    server.stop().await;
}

#[tokio::test]
async fn datagram_at_limit_is_served() {
    let server = TestServer::memory().await;

    let base = registration("A", "foo", "1.2.3.4", "5");
    let pad = 1024 - base.len() - "PAD=\n".len();
    let payload = format!("{base}PAD={}\n", "x".repeat(pad));
    assert_eq!(payload.len(), 1024);

    assert_eq!(exchange(server.addr, payload.as_bytes()).await, "OK");

    server.stop().await;
}

#[tokio::test]
async fn burst_of_garbage_then_valid_traffic() {
    let server = TestServer::memory().await;

    for garbage in [&b"\x00\x01\x02"[..], b"=", b"==\n==", b"TYPE", b"\xc3\x28"] {
        let socket = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        socket.send_to(garbage, server.addr).await.unwrap();
    }

    assert_eq!(
        exchange(server.addr, registration("A", "foo", "1.2.3.4", "5").as_bytes()).await,
        "OK"
    );
    assert_eq!(
        exchange(server.addr, query("A", "foo").as_bytes()).await,
        "TYPE=A\nNAME=foo\nVALUE=1.2.3.4\nTTL=5\n"
    );

    server.stop().await;
}
