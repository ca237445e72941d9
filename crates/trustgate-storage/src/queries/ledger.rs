// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trust-ledger operations.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::params;
use trustgate_core::{GatewayError, InteractionId, TrustLedgerEntry};

use crate::database::{map_tr_err, Database};

/// Append a ledger entry.
pub async fn insert_ledger(db: &Database, entry: &TrustLedgerEntry) -> Result<(), GatewayError> {
    let user_id = entry.user_id.clone();
    let interaction_id = entry.interaction_id.0.clone();
    let delta = entry.delta;
    let reason = entry.reason.clone();
    let recorded_at = entry.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);

    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO trust_ledger (user_id, interaction_id, delta, reason, recorded_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![user_id, interaction_id, delta, reason, recorded_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// All entries for a user, oldest first.
pub async fn ledger_for_user(db: &Database, user_id: &str) -> Result<Vec<TrustLedgerEntry>, GatewayError> {
    let user_id = user_id.to_string();
    let rows = db
        .connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, interaction_id, delta, reason, recorded_at \
                 FROM trust_ledger WHERE user_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![user_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
        .await
        .map_err(map_tr_err)?;

    rows.into_iter()
        .map(|(user_id, interaction_id, delta, reason, recorded_at)| {
            let timestamp = DateTime::parse_from_rfc3339(&recorded_at)
                .map_err(GatewayError::store)?
                .with_timezone(&Utc);
            Ok(TrustLedgerEntry {
                user_id,
                interaction_id: InteractionId(interaction_id),
                delta,
                reason,
                timestamp,
            })
        })
        .collect()
}
