//! Contract Test: Persistence Across Restarts
//!
//! Constraints verified:
//! - Every completed registration is in the snapshot before `OK` is sent
//! - A restarted server resolves what the previous process registered
//! - The snapshot is a flat `"<NAME>:<TYPE>" → {value, ttl}` JSON object
//! - A corrupted snapshot starts an empty store instead of failing startup

mod common;

use common::*;
use tempfile::tempdir;

#[tokio::test]
async fn registration_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dns_records.json");

    // First process
    {
        let server = TestServer::file(&path).await;
        let reply = exchange(
            server.addr,
            registration("A", "svc1", "10.0.0.5", "10").as_bytes(),
        )
        .await;
        assert_eq!(reply, "OK");
        server.stop().await;
    }

    // Second process, same snapshot
    {
        let server = TestServer::file(&path).await;
        let reply = exchange(server.addr, query("A", "svc1").as_bytes()).await;
        assert_eq!(reply, "TYPE=A\nNAME=svc1\nVALUE=10.0.0.5\nTTL=10\n");
        server.stop().await;
    }
}

#[tokio::test]
async fn snapshot_written_before_reply() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state").join("dns_records.json");

    let server = TestServer::file(&path).await;
    exchange(
        server.addr,
        registration("A", "svc1", "10.0.0.5", "10").as_bytes(),
    )
    .await;

    // No shutdown yet: the file must already reflect the registration
    let content = std::fs::read_to_string(&path).unwrap();
    let snapshot: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(
        snapshot,
        serde_json::json!({ "svc1:A": { "value": "10.0.0.5", "ttl": "10" } })
    );

    server.stop().await;
}

#[tokio::test]
async fn overwrite_is_persisted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dns_records.json");

    {
        let server = TestServer::file(&path).await;
        exchange(server.addr, registration("A", "foo", "1.1.1.1", "5").as_bytes()).await;
        exchange(server.addr, registration("A", "foo", "2.2.2.2", "5").as_bytes()).await;
        server.stop().await;
    }

    let server = TestServer::file(&path).await;
    let reply = exchange(server.addr, query("A", "foo").as_bytes()).await;
    assert_eq!(reply, "TYPE=A\nNAME=foo\nVALUE=2.2.2.2\nTTL=5\n");
    server.stop().await;
}

#[tokio::test]
async fn corrupted_snapshot_starts_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dns_records.json");
    std::fs::write(&path, b"{ not json").unwrap();

    let server = TestServer::file(&path).await;
    assert_eq!(exchange(server.addr, query("A", "foo").as_bytes()).await, "NOT_FOUND");

    assert_eq!(
        exchange(server.addr, registration("A", "foo", "1.2.3.4", "5").as_bytes()).await,
        "OK"
    );
    server.stop().await;

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&content).is_ok());
}

#[tokio::test]
async fn unwritable_snapshot_still_serves_from_memory() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"").unwrap();
    let path = blocker.join("dns_records.json");

    let server = TestServer::file(&path).await;
    assert_eq!(
        exchange(server.addr, registration("A", "foo", "1.2.3.4", "5").as_bytes()).await,
        "OK"
    );
    assert_eq!(
        exchange(server.addr, query("A", "foo").as_bytes()).await,
        "TYPE=A\nNAME=foo\nVALUE=1.2.3.4\nTTL=5\n"
    );

    // Shutdown save fails too, and is only logged
    server.stop().await;
}

#[tokio::test]
async fn numeric_ttl_in_snapshot_survives_rewrite() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dns_records.json");
    std::fs::write(&path, r#"{"legacy:A": {"value": "10.0.0.9", "ttl": 60}}"#).unwrap();

    let server = TestServer::file(&path).await;
    assert_eq!(
        exchange(server.addr, query("A", "legacy").as_bytes()).await,
        "TYPE=A\nNAME=legacy\nVALUE=10.0.0.9\nTTL=60\n"
    );

    // Any registration rewrites the whole snapshot
    exchange(server.addr, registration("A", "svc1", "10.0.0.5", "10").as_bytes()).await;
    server.stop().await;

    let content = std::fs::read_to_string(&path).unwrap();
    let snapshot: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(
        snapshot,
        serde_json::json!({
            "legacy:A": { "value": "10.0.0.9", "ttl": 60 },
            "svc1:A": { "value": "10.0.0.5", "ttl": "10" }
        })
    );
}
