// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The audit logger: builds one privacy-scrubbed record per interaction,
//! persists it idempotently, and appends a best-effort trust-ledger delta.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use trustgate_config::model::{AuditConfig, PolicyConfig, TierConfig};
use trustgate_core::types::{
    AuditOutcome, Billing, DispatchAttempt, RetentionPolicy, RoutingTrace, TransformMetadata,
};
use trustgate_core::{
    round_to, AuditRecord, AuditStore, AuditWrite, GatewayError, InteractionId, LogDetail,
    RoutingOutcome, RoutingPolicy, SaltSource, TrustLedgerEntry, UserContext, FAILSAFE_PROVIDER_ID,
};
use trustgate_transform::salted_hash;

use crate::detail::{trim_trace, trim_transform};
use crate::heuristics::{payload_complexity, quality_signal};

/// Retention applied when no tier can be resolved.
const FALLBACK_RETENTION: (LogDetail, u32) = (LogDetail::Summary, 7);

/// How the interaction ended, as far as the audit trail is concerned.
#[derive(Debug, Clone)]
pub enum AuditResult {
    /// A provider (or the router's failsafe responder) produced an answer.
    Routed(RoutingOutcome),
    /// The gateway gave up at `stage` and answered with its failsafe response.
    ///
    /// `attempts` holds whatever dispatches the router made before giving
    /// up; `fallback_used` is set once the router was reached at all.
    Failed {
        stage: String,
        reason: String,
        attempts: Vec<DispatchAttempt>,
        fallback_used: bool,
    },
}

impl AuditResult {
    /// A failure before any provider was tried.
    pub fn failed(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            stage: stage.into(),
            reason: reason.into(),
            attempts: Vec::new(),
            fallback_used: false,
        }
    }
}

/// Everything the logger needs to describe one interaction.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub interaction_id: InteractionId,
    pub user: UserContext,
    pub raw_payload: String,
    /// `None` when the request failed before policy resolution.
    pub policy: Option<RoutingPolicy>,
    pub transform: Option<TransformMetadata>,
    pub result: AuditResult,
    pub total_latency_ms: u64,
}

/// Outcome of the ledger half of a log call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerStatus {
    Written,
    /// Not written because the audit record was a duplicate.
    Skipped,
    Failed(String),
}

impl std::fmt::Display for LedgerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerStatus::Written => write!(f, "written"),
            LedgerStatus::Skipped => write!(f, "skipped"),
            LedgerStatus::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// What a successful [`AuditLogger::log`] did.
#[derive(Debug, Clone)]
pub struct LogReceipt {
    pub record_id: InteractionId,
    pub logged_at: DateTime<Utc>,
    pub audit: AuditWrite,
    pub ledger: LedgerStatus,
}

/// Builds and persists audit records.
pub struct AuditLogger {
    store: Arc<dyn AuditStore>,
    salts: Arc<dyn SaltSource>,
    config: AuditConfig,
    tiers: Vec<TierConfig>,
    write_timeout: Duration,
}

impl AuditLogger {
    pub fn new(
        store: Arc<dyn AuditStore>,
        salts: Arc<dyn SaltSource>,
        config: &AuditConfig,
        policy: &PolicyConfig,
    ) -> Self {
        Self {
            store,
            salts,
            write_timeout: Duration::from_millis(config.write_timeout_ms),
            config: config.clone(),
            tiers: policy.tiers.clone(),
        }
    }

    pub fn store(&self) -> &Arc<dyn AuditStore> {
        &self.store
    }

    /// Retention read from the tier table at write time. Never revisited.
    fn retention(&self, policy: Option<&RoutingPolicy>, now: DateTime<Utc>) -> RetentionPolicy {
        let (log_detail, retain_days) = match policy {
            Some(p) => self
                .tiers
                .iter()
                .find(|t| t.name == p.routing_tier)
                .map(|t| (t.log_detail, t.retention_days))
                .unwrap_or((p.log_detail, p.retention_days)),
            None => self
                .tiers
                .iter()
                .min_by(|a, b| a.min_trust.total_cmp(&b.min_trust))
                .map(|t| (t.log_detail, t.retention_days))
                .unwrap_or(FALLBACK_RETENTION),
        };
        RetentionPolicy {
            log_detail,
            retain_days,
            expires_at: now + chrono::Duration::days(i64::from(retain_days)),
        }
    }

    /// Build the record for `event` as of `now`. Pure apart from the salt lookup.
    pub fn build_record(&self, event: &AuditEvent, now: DateTime<Utc>) -> AuditRecord {
        let salt = self.salts.salt_for(&event.user.user_id);
        let payload_hash = match &event.transform {
            Some(metadata) => metadata.raw_payload_hash.clone(),
            None => salted_hash(&salt, event.raw_payload.as_bytes()),
        };
        let fingerprint_hash = salted_hash(&salt, event.user.fingerprint.as_bytes());

        let retention = self.retention(event.policy.as_ref(), now);
        let detail = retention.log_detail;
        let routing_tier = event.policy.as_ref().map(|p| p.routing_tier.clone());
        let discount_pct = event.policy.as_ref().map_or(0.0, |p| p.discount_pct);

        let (trace, cost, quality, outcome) = match &event.result {
            AuditResult::Routed(routed) => {
                let failsafe = routed.provider_used == FAILSAFE_PROVIDER_ID;
                let trace = RoutingTrace {
                    routing_tier,
                    provider_used: routed.provider_used.clone(),
                    fallback_used: routed.fallback_used,
                    latency_ms: routed.latency_ms,
                    attempts: routed.attempts.clone(),
                };
                let outcome = if failsafe {
                    AuditOutcome::Failsafe {
                        stage: "route".to_string(),
                        reason: "no provider could serve the request".to_string(),
                    }
                } else {
                    AuditOutcome::Served
                };
                (trace, routed.cost, quality_signal(&routed.output_text, failsafe), outcome)
            }
            AuditResult::Failed {
                stage,
                reason,
                attempts,
                fallback_used,
            } => {
                let trace = RoutingTrace {
                    routing_tier,
                    provider_used: FAILSAFE_PROVIDER_ID.to_string(),
                    fallback_used: *fallback_used,
                    latency_ms: event.total_latency_ms,
                    attempts: attempts.clone(),
                };
                let outcome = AuditOutcome::Failsafe {
                    stage: stage.clone(),
                    reason: reason.clone(),
                };
                (trace, 0.0, quality_signal("", true), outcome)
            }
        };

        let trust_delta = match outcome {
            AuditOutcome::Served if quality.score >= self.config.quality_threshold => {
                self.config.success_trust_delta
            }
            AuditOutcome::Served => 0.0,
            AuditOutcome::Failsafe { .. } => self.config.failsafe_trust_delta,
        };

        AuditRecord {
            interaction_id: event.interaction_id.clone(),
            fingerprint_hash,
            timestamp: now,
            payload_hash,
            payload_complexity: payload_complexity(&event.raw_payload),
            transform_metadata: event.transform.clone().map(|m| trim_transform(m, detail)),
            routing_trace: trim_trace(trace, detail),
            quality_signal: quality,
            billing: Billing {
                cost,
                credits: round_to(cost * self.config.credits_per_currency, 6),
                discount_pct,
            },
            trust_delta,
            retention_policy: retention,
            outcome,
        }
    }

    fn ledger_entry(&self, event: &AuditEvent, record: &AuditRecord) -> TrustLedgerEntry {
        let reason = match &record.outcome {
            AuditOutcome::Served => format!("served:{}", record.quality_signal.band),
            AuditOutcome::Failsafe { stage, .. } => format!("failsafe:{stage}"),
        };
        TrustLedgerEntry {
            user_id: event.user.user_id.clone(),
            interaction_id: event.interaction_id.clone(),
            delta: record.trust_delta,
            reason,
            timestamp: record.timestamp,
        }
    }

    /// Persist the record for `event`, then the ledger delta.
    ///
    /// Returns [`GatewayError::StoreWrite`] only when the audit record itself
    /// could not be written. The ledger write is attempted either way and its
    /// result is reported on the receipt.
    pub async fn log(&self, event: &AuditEvent) -> Result<LogReceipt, GatewayError> {
        let logged_at = Utc::now();
        let record = self.build_record(event, logged_at);

        let audit = match tokio::time::timeout(self.write_timeout, self.store.write_audit(&record)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::store(format!(
                "audit write timed out after {:?}",
                self.write_timeout
            ))),
        };

        let ledger = match &audit {
            Ok(AuditWrite::Duplicate) => LedgerStatus::Skipped,
            _ => self.write_ledger(&self.ledger_entry(event, &record)).await,
        };

        match audit {
            Ok(write) => {
                info!(
                    interaction_id = %record.interaction_id,
                    audit = %write,
                    ledger = %ledger,
                    cost = record.billing.cost,
                    "audit record written"
                );
                Ok(LogReceipt {
                    record_id: record.interaction_id,
                    logged_at,
                    audit: write,
                    ledger,
                })
            }
            Err(e) => {
                warn!(interaction_id = %record.interaction_id, error = %e, ledger = %ledger, "audit write failed");
                Err(match e {
                    GatewayError::StoreWrite { .. } => e,
                    other => GatewayError::store(other.to_string()),
                })
            }
        }
    }

    async fn write_ledger(&self, entry: &TrustLedgerEntry) -> LedgerStatus {
        match tokio::time::timeout(self.write_timeout, self.store.write_ledger(entry)).await {
            Ok(Ok(())) => LedgerStatus::Written,
            Ok(Err(e)) => {
                warn!(interaction_id = %entry.interaction_id, error = %e, "trust ledger write failed");
                LedgerStatus::Failed(e.to_string())
            }
            Err(_) => {
                warn!(interaction_id = %entry.interaction_id, "trust ledger write timed out");
                LedgerStatus::Failed(format!("timed out after {:?}", self.write_timeout))
            }
        }
    }
}
