// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`AuditStore`] trait.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};
use trustgate_config::model::StorageConfig;
use trustgate_core::{AuditRecord, AuditStore, AuditWrite, GatewayError, InteractionId, TrustLedgerEntry};

use crate::database::Database;
use crate::queries;

/// SQLite-backed audit store.
///
/// Audit rows are keyed by interaction id and inserted with `INSERT OR IGNORE`,
/// so a repeated write is reported as a duplicate instead of an error.
pub struct SqliteAuditStore {
    db: Database,
}

impl SqliteAuditStore {
    /// Open the database described by `[storage]`.
    pub async fn open(config: &StorageConfig) -> Result<Self, GatewayError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        debug!(path = %config.database_path, "SQLite audit store initialized");
        Ok(Self { db })
    }

    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Delete audit records whose retention has expired.
    pub async fn purge_expired(&self) -> Result<usize, GatewayError> {
        let removed = queries::audit::purge_expired(&self.db, Utc::now()).await?;
        if removed > 0 {
            info!(removed, "expired audit records purged");
        }
        Ok(removed)
    }
}

#[async_trait]
impl AuditStore for SqliteAuditStore {
    async fn write_audit(&self, record: &AuditRecord) -> Result<AuditWrite, GatewayError> {
        queries::audit::insert_audit(&self.db, record).await
    }

    async fn write_ledger(&self, entry: &TrustLedgerEntry) -> Result<(), GatewayError> {
        queries::ledger::insert_ledger(&self.db, entry).await
    }

    async fn get_audit(&self, id: &InteractionId) -> Result<Option<AuditRecord>, GatewayError> {
        queries::audit::get_audit(&self.db, id).await
    }

    async fn audit_count(&self, id: &InteractionId) -> Result<usize, GatewayError> {
        queries::audit::audit_count(&self.db, id).await
    }

    async fn ledger_for_user(&self, user_id: &str) -> Result<Vec<TrustLedgerEntry>, GatewayError> {
        queries::ledger::ledger_for_user(&self.db, user_id).await
    }
}
