// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit store that fails on demand, for exercising the best-effort audit paths.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use trustgate_audit::MemoryAuditStore;
use trustgate_core::{AuditRecord, AuditStore, AuditWrite, GatewayError, InteractionId, TrustLedgerEntry};

/// What a write does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Delegate to the in-memory store.
    Pass,
    Error,
    /// Never completes. The logger's write timeout decides.
    Hang,
}

/// An [`AuditStore`] whose writes can error or hang. Reads always succeed
/// against whatever actually got written.
pub struct FailingStore {
    inner: MemoryAuditStore,
    audit: FailureMode,
    ledger: FailureMode,
    audit_attempts: AtomicUsize,
    ledger_attempts: AtomicUsize,
}

impl FailingStore {
    pub fn new(audit: FailureMode, ledger: FailureMode) -> Self {
        Self {
            inner: MemoryAuditStore::new(),
            audit,
            ledger,
            audit_attempts: AtomicUsize::new(0),
            ledger_attempts: AtomicUsize::new(0),
        }
    }

    /// Every write errors.
    pub fn always() -> Self {
        Self::new(FailureMode::Error, FailureMode::Error)
    }

    /// Every write hangs.
    pub fn hanging() -> Self {
        Self::new(FailureMode::Hang, FailureMode::Hang)
    }

    /// Audit records persist; ledger writes error.
    pub fn ledger_only() -> Self {
        Self::new(FailureMode::Pass, FailureMode::Error)
    }

    pub fn audit_attempts(&self) -> usize {
        self.audit_attempts.load(Ordering::SeqCst)
    }

    pub fn ledger_attempts(&self) -> usize {
        self.ledger_attempts.load(Ordering::SeqCst)
    }
}

async fn fail(mode: FailureMode, what: &str) -> Result<(), GatewayError> {
    match mode {
        FailureMode::Pass => Ok(()),
        FailureMode::Error => Err(GatewayError::store(format!("{what}: disk I/O error"))),
        FailureMode::Hang => std::future::pending().await,
    }
}

#[async_trait]
impl AuditStore for FailingStore {
    async fn write_audit(&self, record: &AuditRecord) -> Result<AuditWrite, GatewayError> {
        self.audit_attempts.fetch_add(1, Ordering::SeqCst);
        fail(self.audit, "audit write").await?;
        self.inner.write_audit(record).await
    }

    async fn write_ledger(&self, entry: &TrustLedgerEntry) -> Result<(), GatewayError> {
        self.ledger_attempts.fetch_add(1, Ordering::SeqCst);
        fail(self.ledger, "ledger write").await?;
        self.inner.write_ledger(entry).await
    }

    async fn get_audit(&self, id: &InteractionId) -> Result<Option<AuditRecord>, GatewayError> {
        self.inner.get_audit(id).await
    }

    async fn audit_count(&self, id: &InteractionId) -> Result<usize, GatewayError> {
        self.inner.audit_count(id).await
    }

    async fn ledger_for_user(&self, user_id: &str) -> Result<Vec<TrustLedgerEntry>, GatewayError> {
        self.inner.ledger_for_user(user_id).await
    }
}
