// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit record operations.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::params;
use trustgate_core::types::AuditOutcome;
use trustgate_core::{AuditRecord, AuditWrite, GatewayError, InteractionId};

use crate::database::{map_tr_err, Database};

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Insert a record unless one already exists for its interaction id.
pub async fn insert_audit(db: &Database, record: &AuditRecord) -> Result<AuditWrite, GatewayError> {
    let record_json = serde_json::to_string(record).map_err(GatewayError::store)?;
    let interaction_id = record.interaction_id.0.clone();
    let fingerprint_hash = record.fingerprint_hash.clone();
    let recorded_at = timestamp(&record.timestamp);
    let outcome = match &record.outcome {
        AuditOutcome::Served => "served".to_string(),
        AuditOutcome::Failsafe { stage, .. } => format!("failsafe:{stage}"),
    };
    let provider_used = record.routing_trace.provider_used.clone();
    let cost = record.billing.cost;
    let expires_at = timestamp(&record.retention_policy.expires_at);

    let inserted = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO audit_records \
                 (interaction_id, fingerprint_hash, recorded_at, outcome, provider_used, cost, expires_at, record_json) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    interaction_id,
                    fingerprint_hash,
                    recorded_at,
                    outcome,
                    provider_used,
                    cost,
                    expires_at,
                    record_json,
                ],
            )
        })
        .await
        .map_err(map_tr_err)?;

    Ok(if inserted == 0 {
        AuditWrite::Duplicate
    } else {
        AuditWrite::Inserted
    })
}

/// Fetch the record for an interaction.
pub async fn get_audit(db: &Database, id: &InteractionId) -> Result<Option<AuditRecord>, GatewayError> {
    let id = id.0.clone();
    let json = db
        .connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT record_json FROM audit_records WHERE interaction_id = ?1",
                params![id],
                |row| row.get::<_, String>(0),
            );
            match result {
                Ok(json) => Ok(Some(json)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)?;

    json.map(|j| serde_json::from_str(&j).map_err(GatewayError::store))
        .transpose()
}

/// Number of rows for an interaction. The primary key keeps this at 0 or 1.
pub async fn audit_count(db: &Database, id: &InteractionId) -> Result<usize, GatewayError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM audit_records WHERE interaction_id = ?1",
                params![id],
                |row| row.get::<_, i64>(0),
            )
        })
        .await
        .map(|n| n as usize)
        .map_err(map_tr_err)
}

/// Delete records whose retention expired before `now`. Returns the number removed.
pub async fn purge_expired(db: &Database, now: DateTime<Utc>) -> Result<usize, GatewayError> {
    let now = timestamp(&now);
    db.connection()
        .call(move |conn| conn.execute("DELETE FROM audit_records WHERE expires_at < ?1", params![now]))
        .await
        .map_err(map_tr_err)
}
