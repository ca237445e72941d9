// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the policy, transform, router, audit, and gateway crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Provider id reserved for the built-in last-resort responder.
pub const FAILSAFE_PROVIDER_ID: &str = "failsafe";

/// Label attached to every heuristic signal so consumers never mistake it for a semantic judgment.
pub const HEURISTIC_METHOD: &str = "heuristic";

/// Unique identifier for one gateway interaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InteractionId(pub String);

impl InteractionId {
    /// Mint a fresh random (UUID v4) interaction id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for InteractionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InteractionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// --- Identity ---

/// Per-request snapshot of who is asking, supplied by the external identity source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: String,
    /// Device/session fingerprint. Only ever persisted as a salted hash.
    pub fingerprint: String,
    /// Tier label asserted by the identity source. Informational; the policy
    /// engine derives the routing tier from `trust_score`.
    #[serde(default)]
    pub tier: Option<String>,
    /// Aggregated trust score in `[0, 100]`. `None` means the identity source
    /// did not supply one, which the policy engine rejects.
    #[serde(default)]
    pub trust_score: Option<f64>,
}

impl UserContext {
    pub fn new(user_id: impl Into<String>, fingerprint: impl Into<String>, trust_score: f64) -> Self {
        Self {
            user_id: user_id.into(),
            fingerprint: fingerprint.into(),
            tier: None,
            trust_score: Some(trust_score),
        }
    }
}

/// Caller-supplied request metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestMeta {
    /// Surface the request arrived on (e.g. "cli", "web").
    pub channel: String,
    pub requested_at: DateTime<Utc>,
}

impl Default for RequestMeta {
    fn default() -> Self {
        Self {
            channel: "unknown".to_string(),
            requested_at: Utc::now(),
        }
    }
}

// --- Policy ---

/// Degree of privacy-preserving modification applied before a request leaves the trust boundary.
///
/// Variants are ordered from weakest to strongest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransformStrength {
    None,
    Light,
    Standard,
    Heavy,
}

/// How much detail an audit record retains. Ordered from least to most.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogDetail {
    Summary,
    Detailed,
    Full,
}

/// What a user's context entitles this request to. Computed per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingPolicy {
    pub routing_tier: String,
    /// Provider ids in preference order.
    pub allowed_providers: Vec<String>,
    pub transform_strength: TransformStrength,
    /// In `(0, 1]`; `1.0` means no discount.
    pub cost_multiplier: f64,
    pub discount_pct: f64,
    pub log_detail: LogDetail,
    pub retention_days: u32,
}

// --- Transform ---

/// A single transformation rule that can fire on a payload.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransformKind {
    Email,
    Phone,
    CardNumber,
    IpAddress,
    Url,
    Handle,
    UserIdentifier,
    NamedEntity,
    Date,
    Number,
    Truncation,
    Segmentation,
}

/// A transformation that fired, with how many spans it touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformApplied {
    pub kind: TransformKind,
    pub count: usize,
}

/// Non-reversible description of what the transform stage did. Never holds payload text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformMetadata {
    pub strength: TransformStrength,
    pub transformations_applied: Vec<TransformApplied>,
    /// Hex SHA-256 of the per-user salt followed by the raw payload.
    pub raw_payload_hash: String,
    pub original_chars: usize,
    pub transformed_chars: usize,
    pub segment_count: usize,
}

impl TransformMetadata {
    /// Returns true if the given transformation fired at least once.
    pub fn applied(&self, kind: TransformKind) -> bool {
        self.transformations_applied.iter().any(|t| t.kind == kind && t.count > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformResult {
    pub transformed_payload: String,
    /// Bounded segments of the transformed payload. A single segment unless
    /// heavy transformation split it.
    pub segments: Vec<String>,
    pub metadata: TransformMetadata,
}

// --- Providers ---

/// Liveness of a provider as last observed by the health cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum HealthStatus {
    /// Not probed yet.
    Unknown,
    Healthy,
    Unavailable(String),
}

impl HealthStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// Static description of a registered provider plus its cached health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub id: String,
    pub display_name: String,
    pub model_name: String,
    /// Price of one billing unit (input or output token).
    pub cost_per_unit: f64,
    /// Higher is better. Informational.
    pub quality_tier: u8,
    /// Largest payload (in characters) this provider accepts.
    pub max_size: usize,
    pub health_status: HealthStatus,
    pub endpoint: Option<String>,
}

/// Options passed to a provider's generate call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    pub interaction_id: InteractionId,
    pub routing_tier: String,
    pub max_units: Option<u32>,
}

/// What a provider returns from a generate call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateOutput {
    pub output_text: String,
    pub units_in: u32,
    pub units_out: u32,
    /// Model that actually served the call, if the backend reports one.
    #[serde(default)]
    pub model_name: Option<String>,
}

impl GenerateOutput {
    pub fn units_used(&self) -> u64 {
        u64::from(self.units_in) + u64::from(self.units_out)
    }
}

/// One dispatch attempt made by the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchAttempt {
    pub provider: String,
    pub succeeded: bool,
    pub latency_ms: u64,
    #[serde(default)]
    pub error: Option<String>,
}

/// Result of a successful route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingOutcome {
    pub output_text: String,
    pub provider_used: String,
    pub model_name: String,
    pub units_in: u32,
    pub units_out: u32,
    pub units_used: u64,
    pub cost: f64,
    pub latency_ms: u64,
    pub fallback_used: bool,
    pub attempts: Vec<DispatchAttempt>,
}

// --- Audit ---

/// An approximate score derived from surface features only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicSignal {
    /// Normalized to `[0, 1]`.
    pub score: f64,
    pub band: String,
    /// Always [`HEURISTIC_METHOD`].
    pub method: String,
}

impl HeuristicSignal {
    pub fn new(score: f64, band: impl Into<String>) -> Self {
        Self {
            score,
            band: band.into(),
            method: HEURISTIC_METHOD.to_string(),
        }
    }
}

/// Routing details retained in an audit record, trimmed by [`LogDetail`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingTrace {
    pub routing_tier: Option<String>,
    pub provider_used: String,
    pub fallback_used: bool,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<DispatchAttempt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Billing {
    pub cost: f64,
    pub credits: f64,
    pub discount_pct: f64,
}

/// Retention resolved at write time. Never updated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    pub log_detail: LogDetail,
    pub retain_days: u32,
    pub expires_at: DateTime<Utc>,
}

/// How an interaction ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AuditOutcome {
    Served,
    Failsafe { stage: String, reason: String },
}

/// Append-only, privacy-scrubbed record of one interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub interaction_id: InteractionId,
    pub fingerprint_hash: String,
    pub timestamp: DateTime<Utc>,
    pub payload_hash: String,
    pub payload_complexity: HeuristicSignal,
    pub transform_metadata: Option<TransformMetadata>,
    pub routing_trace: RoutingTrace,
    pub quality_signal: HeuristicSignal,
    pub billing: Billing,
    pub trust_delta: f64,
    pub retention_policy: RetentionPolicy,
    pub outcome: AuditOutcome,
}

/// Append-only trust adjustment. Aggregation into a live score happens elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustLedgerEntry {
    pub user_id: String,
    pub interaction_id: InteractionId,
    pub delta: f64,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

/// Result of an idempotent audit write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum AuditWrite {
    Inserted,
    /// A record with the same interaction id already existed; nothing was written.
    Duplicate,
}

// --- Gateway boundary ---

/// A request entering the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayRequest {
    pub user: UserContext,
    #[serde(default)]
    pub meta: RequestMeta,
    pub payload: String,
}

/// Routing details surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingInfo {
    pub interaction_id: InteractionId,
    /// `None` when the request failed before a policy was resolved.
    pub routing_tier: Option<String>,
    pub transform_strength: Option<TransformStrength>,
    pub provider_selected: String,
    pub fallback_used: bool,
    pub total_latency_ms: u64,
}

/// The response every non-rejected request receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub output_text: String,
    pub provider: String,
    pub model_name: String,
    pub cost: f64,
    pub units_in: u32,
    pub units_out: u32,
    pub routing_info: RoutingInfo,
}

impl GatewayResponse {
    pub fn is_failsafe(&self) -> bool {
        self.provider == FAILSAFE_PROVIDER_ID
    }
}
