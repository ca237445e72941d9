// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the SQLite audit store.

use chrono::{Duration, TimeZone, Utc};
use trustgate_config::model::{StorageConfig, StoreBackend};
use trustgate_core::types::{
    AuditOutcome, Billing, HeuristicSignal, RetentionPolicy, RoutingTrace,
};
use trustgate_core::{
    AuditRecord, AuditStore, AuditWrite, InteractionId, LogDetail, TrustLedgerEntry,
};
use trustgate_storage::{Database, SqliteAuditStore};

fn record(id: &str, expires_in_days: i64) -> AuditRecord {
    let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
    AuditRecord {
        interaction_id: InteractionId(id.to_string()),
        fingerprint_hash: "f".repeat(64),
        timestamp: now,
        payload_hash: "a".repeat(64),
        payload_complexity: HeuristicSignal::new(0.2, "simple"),
        transform_metadata: None,
        routing_trace: RoutingTrace {
            routing_tier: Some("verified".into()),
            provider_used: "cloud-standard".into(),
            fallback_used: false,
            latency_ms: 42,
            attempts: Vec::new(),
        },
        quality_signal: HeuristicSignal::new(0.5, "fair"),
        billing: Billing {
            cost: 0.00044,
            credits: 0.44,
            discount_pct: 10.0,
        },
        trust_delta: 0.1,
        retention_policy: RetentionPolicy {
            log_detail: LogDetail::Detailed,
            retain_days: 30,
            expires_at: now + Duration::days(expires_in_days),
        },
        outcome: AuditOutcome::Served,
    }
}

async fn file_store() -> (SqliteAuditStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        backend: StoreBackend::Sqlite,
        database_path: dir.path().join("nested").join("audit.db").display().to_string(),
        wal_mode: true,
    };
    let store = SqliteAuditStore::open(&config).await.unwrap();
    (store, dir)
}

#[tokio::test]
async fn write_then_read_round_trips() {
    let (store, _dir) = file_store().await;
    let rec = record("int-1", 30);

    assert_eq!(store.write_audit(&rec).await.unwrap(), AuditWrite::Inserted);
    let loaded = store.get_audit(&rec.interaction_id).await.unwrap().unwrap();
    assert_eq!(loaded, rec);
}

#[tokio::test]
async fn duplicate_write_keeps_first_record() {
    let (store, _dir) = file_store().await;
    let first = record("int-dup", 30);
    let mut second = record("int-dup", 30);
    second.billing.cost = 99.0;

    assert_eq!(store.write_audit(&first).await.unwrap(), AuditWrite::Inserted);
    assert_eq!(store.write_audit(&second).await.unwrap(), AuditWrite::Duplicate);
    assert_eq!(store.audit_count(&first.interaction_id).await.unwrap(), 1);

    let loaded = store.get_audit(&first.interaction_id).await.unwrap().unwrap();
    assert_eq!(loaded.billing.cost, 0.00044);
}

#[tokio::test]
async fn missing_record_is_none() {
    let store = SqliteAuditStore::from_database(Database::open_in_memory().await.unwrap());
    let id = InteractionId("nope".into());
    assert!(store.get_audit(&id).await.unwrap().is_none());
    assert_eq!(store.audit_count(&id).await.unwrap(), 0);
}

#[tokio::test]
async fn ledger_is_append_only_and_per_user() {
    let store = SqliteAuditStore::from_database(Database::open_in_memory().await.unwrap());
    let at = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
    for (user, delta) in [("alice", 0.1), ("bob", 0.0), ("alice", 0.2)] {
        store
            .write_ledger(&TrustLedgerEntry {
                user_id: user.into(),
                interaction_id: InteractionId::new(),
                delta,
                reason: "served:good".into(),
                timestamp: at,
            })
            .await
            .unwrap();
    }

    let alice = store.ledger_for_user("alice").await.unwrap();
    assert_eq!(alice.len(), 2);
    assert_eq!(alice[0].delta, 0.1);
    assert_eq!(alice[1].delta, 0.2);
    assert_eq!(alice[0].timestamp, at);
    assert!(store.ledger_for_user("carol").await.unwrap().is_empty());
}

#[tokio::test]
async fn purge_removes_only_expired_records() {
    let store = SqliteAuditStore::from_database(Database::open_in_memory().await.unwrap());
    // Fixed 2026 timestamps: "-1 day" is long expired, "+36500 days" is not.
    store.write_audit(&record("old", -1)).await.unwrap();
    store.write_audit(&record("fresh", 36_500)).await.unwrap();

    assert_eq!(store.purge_expired().await.unwrap(), 1);
    assert_eq!(store.audit_count(&InteractionId("old".into())).await.unwrap(), 0);
    assert_eq!(store.audit_count(&InteractionId("fresh".into())).await.unwrap(), 1);
}

#[tokio::test]
async fn reopening_reruns_migrations_safely() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.db").display().to_string();
    {
        let db = Database::open(&path, true).await.unwrap();
        let store = SqliteAuditStore::from_database(db);
        store.write_audit(&record("persisted", 30)).await.unwrap();
        store.database().checkpoint().await.unwrap();
    }
    let store = SqliteAuditStore::from_database(Database::open(&path, true).await.unwrap());
    assert_eq!(store.audit_count(&InteractionId("persisted".into())).await.unwrap(), 1);
}
