// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit logger behavior when the store misbehaves.

use std::sync::Arc;
use std::time::Duration;

use trustgate_audit::{AuditEvent, AuditLogger, AuditResult, LedgerStatus};
use trustgate_config::model::{AuditConfig, PolicyConfig};
use trustgate_core::{AuditStore, AuditWrite, GatewayError, InteractionId, UserContext};
use trustgate_test_utils::{FailingStore, FailureMode};
use trustgate_transform::DerivedSalt;

fn logger(store: Arc<FailingStore>) -> AuditLogger {
    AuditLogger::new(
        store,
        Arc::new(DerivedSalt::new("store-failures")),
        &AuditConfig::default(),
        &PolicyConfig::default(),
    )
}

fn failed_event() -> AuditEvent {
    AuditEvent {
        interaction_id: InteractionId::new(),
        user: UserContext::new("user-9", "fp-9", 20.0),
        raw_payload: "hello".into(),
        policy: None,
        transform: None,
        result: AuditResult::failed("route", "all providers failed"),
        total_latency_ms: 12,
    }
}

#[tokio::test]
async fn audit_write_error_surfaces_as_store_write() {
    let store = Arc::new(FailingStore::always());
    let logger = logger(store.clone());
    let event = failed_event();

    let err = logger.log(&event).await.unwrap_err();
    assert!(matches!(err, GatewayError::StoreWrite { .. }));
    assert_eq!(store.audit_attempts(), 1);
    assert_eq!(store.audit_count(&event.interaction_id).await.unwrap(), 0);
}

#[tokio::test]
async fn ledger_is_still_attempted_when_audit_fails() {
    let store = Arc::new(FailingStore::new(FailureMode::Error, FailureMode::Pass));
    let logger = logger(store.clone());

    logger.log(&failed_event()).await.unwrap_err();
    assert_eq!(store.ledger_attempts(), 1);
    assert_eq!(store.ledger_for_user("user-9").await.unwrap().len(), 1);
}

#[tokio::test]
async fn ledger_failure_is_reported_on_the_receipt() {
    let store = Arc::new(FailingStore::ledger_only());
    let logger = logger(store.clone());
    let event = failed_event();

    let receipt = logger.log(&event).await.unwrap();
    assert_eq!(receipt.audit, AuditWrite::Inserted);
    assert!(matches!(receipt.ledger, LedgerStatus::Failed(_)));
    assert_eq!(store.audit_count(&event.interaction_id).await.unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn hanging_store_is_bounded_by_write_timeout() {
    let store = Arc::new(FailingStore::hanging());
    let logger = logger(store.clone());

    let started = tokio::time::Instant::now();
    let err = logger.log(&failed_event()).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, GatewayError::StoreWrite { .. }));
    assert!(err.to_string().contains("timed out"));
    // One timeout for the audit write, one for the ledger write.
    assert!(elapsed >= Duration::from_secs(6));
    assert!(elapsed < Duration::from_secs(7));
}
