// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory audit store for tests and `storage.backend = "memory"`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use trustgate_core::{AuditRecord, AuditStore, AuditWrite, GatewayError, InteractionId, TrustLedgerEntry};

/// Audit store backed by process memory. Contents are lost on exit.
#[derive(Default)]
pub struct MemoryAuditStore {
    records: RwLock<HashMap<InteractionId, AuditRecord>>,
    ledger: RwLock<Vec<TrustLedgerEntry>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of audit records across all interactions.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Every ledger entry, in write order.
    pub async fn ledger(&self) -> Vec<TrustLedgerEntry> {
        self.ledger.read().await.clone()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn write_audit(&self, record: &AuditRecord) -> Result<AuditWrite, GatewayError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.interaction_id) {
            return Ok(AuditWrite::Duplicate);
        }
        records.insert(record.interaction_id.clone(), record.clone());
        Ok(AuditWrite::Inserted)
    }

    async fn write_ledger(&self, entry: &TrustLedgerEntry) -> Result<(), GatewayError> {
        self.ledger.write().await.push(entry.clone());
        Ok(())
    }

    async fn get_audit(&self, id: &InteractionId) -> Result<Option<AuditRecord>, GatewayError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn audit_count(&self, id: &InteractionId) -> Result<usize, GatewayError> {
        Ok(usize::from(self.records.read().await.contains_key(id)))
    }

    async fn ledger_for_user(&self, user_id: &str) -> Result<Vec<TrustLedgerEntry>, GatewayError> {
        Ok(self
            .ledger
            .read()
            .await
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }
}
