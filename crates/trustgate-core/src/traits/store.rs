// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only store for audit records and trust-ledger entries.

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::types::{AuditRecord, AuditWrite, InteractionId, TrustLedgerEntry};

/// Persistence capability used by the audit logger.
///
/// Records are keyed by interaction id and never mutated once written.
#[async_trait]
pub trait AuditStore: Send + Sync + 'static {
    /// Persist an audit record. A second write with the same interaction id
    /// must return [`AuditWrite::Duplicate`] and leave the first record intact.
    async fn write_audit(&self, record: &AuditRecord) -> Result<AuditWrite, GatewayError>;

    /// Append a trust-ledger entry.
    async fn write_ledger(&self, entry: &TrustLedgerEntry) -> Result<(), GatewayError>;

    /// Fetch the audit record for an interaction, if one exists.
    async fn get_audit(&self, id: &InteractionId) -> Result<Option<AuditRecord>, GatewayError>;

    /// Number of audit records stored for an interaction (0 or 1 for a correct store).
    async fn audit_count(&self, id: &InteractionId) -> Result<usize, GatewayError>;

    /// All ledger entries for a user, oldest first.
    async fn ledger_for_user(&self, user_id: &str) -> Result<Vec<TrustLedgerEntry>, GatewayError>;
}
