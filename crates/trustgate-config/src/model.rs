// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Trustgate gateway.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};
use trustgate_core::{LogDetail, TransformStrength};

/// Top-level Trustgate configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Gateway identity and failsafe behavior.
    #[serde(default)]
    pub gateway: GatewaySection,

    /// Trust tiers, discount curve, and transform whitelist.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Prompt transformation limits.
    #[serde(default)]
    pub transform: TransformConfig,

    /// Health cache and dispatch timeouts.
    #[serde(default)]
    pub router: RouterConfig,

    /// Audit logging and trust-ledger settings.
    #[serde(default)]
    pub audit: AuditConfig,

    /// Audit store backend.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Registered provider backends.
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            gateway: GatewaySection::default(),
            policy: PolicyConfig::default(),
            transform: TransformConfig::default(),
            router: RouterConfig::default(),
            audit: AuditConfig::default(),
            storage: StorageConfig::default(),
            providers: default_providers(),
        }
    }
}

impl GatewayConfig {
    /// Look up a provider by id.
    pub fn provider(&self, id: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.id == id)
    }

    /// Worst-case end-to-end latency of one request, in milliseconds.
    ///
    /// Health probe + route budget + audit write. Policy and transform are
    /// synchronous and not counted.
    pub fn latency_bound_ms(&self) -> u64 {
        self.router.probe_timeout_ms + self.router.route_budget_secs * 1000 + self.audit.write_timeout_ms
    }
}

/// Gateway identity and failsafe behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    /// Display name used in logs.
    #[serde(default = "default_gateway_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Text returned to the caller when no provider could serve the request.
    #[serde(default = "default_failsafe_message")]
    pub failsafe_message: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            name: default_gateway_name(),
            log_level: default_log_level(),
            failsafe_message: default_failsafe_message(),
        }
    }
}

fn default_gateway_name() -> String {
    "trustgate".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_failsafe_message() -> String {
    "We're sorry, we couldn't complete your request right now. Please try again shortly.".to_string()
}

/// Trust policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Tier bands. Order in the file does not matter; the engine sorts by
    /// `min_trust` descending. The lowest band catches every score below it.
    #[serde(default = "default_tiers")]
    pub tiers: Vec<TierConfig>,

    /// Trust score at which discounting starts.
    #[serde(default = "default_discount_floor")]
    pub discount_floor: f64,

    /// Discount reached at trust 100, in percent.
    #[serde(default = "default_max_discount_pct")]
    pub max_discount_pct: f64,

    /// User ids allowed to bypass prompt transformation entirely.
    #[serde(default)]
    pub transform_whitelist: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
            discount_floor: default_discount_floor(),
            max_discount_pct: default_max_discount_pct(),
            transform_whitelist: Vec::new(),
        }
    }
}

fn default_discount_floor() -> f64 {
    50.0
}

fn default_max_discount_pct() -> f64 {
    40.0
}

/// One trust band.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TierConfig {
    pub name: String,

    /// Inclusive lower bound on trust score.
    pub min_trust: f64,

    /// Provider ids in preference order.
    pub providers: Vec<String>,

    pub transform_strength: TransformStrength,

    pub log_detail: LogDetail,

    /// How long audit records written under this tier are kept.
    pub retention_days: u32,
}

fn tier(
    name: &str,
    min_trust: f64,
    providers: &[&str],
    transform_strength: TransformStrength,
    log_detail: LogDetail,
    retention_days: u32,
) -> TierConfig {
    TierConfig {
        name: name.to_string(),
        min_trust,
        providers: providers.iter().map(|p| p.to_string()).collect(),
        transform_strength,
        log_detail,
        retention_days,
    }
}

fn default_tiers() -> Vec<TierConfig> {
    vec![
        tier(
            "sovereign",
            85.0,
            &["local", "cloud-premium", "cloud-standard"],
            TransformStrength::Light,
            LogDetail::Full,
            365,
        ),
        tier(
            "trusted",
            70.0,
            &["cloud-premium", "cloud-standard", "local"],
            TransformStrength::Standard,
            LogDetail::Detailed,
            90,
        ),
        tier(
            "verified",
            50.0,
            &["cloud-standard", "cloud-economy"],
            TransformStrength::Standard,
            LogDetail::Detailed,
            30,
        ),
        tier(
            "basic",
            0.0,
            &["cloud-economy", "mock"],
            TransformStrength::Heavy,
            LogDetail::Summary,
            7,
        ),
    ]
}

/// Prompt transformation limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TransformConfig {
    /// Payloads longer than this (in characters) are rejected.
    #[serde(default = "default_max_payload_chars")]
    pub max_payload_chars: usize,

    /// Heavy transformation truncates to this many characters.
    #[serde(default = "default_heavy_max_chars")]
    pub heavy_max_chars: usize,

    /// Heavy transformation splits into segments of at most this many words.
    #[serde(default = "default_segment_max_words")]
    pub segment_max_words: usize,

    /// Longest raw-payload substring allowed to appear in transform metadata.
    #[serde(default = "default_leakage_threshold")]
    pub leakage_threshold: usize,

    /// Secret mixed into derived per-user salts. `None` requires an external salt source.
    #[serde(default)]
    pub salt_secret: Option<String>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            max_payload_chars: default_max_payload_chars(),
            heavy_max_chars: default_heavy_max_chars(),
            segment_max_words: default_segment_max_words(),
            leakage_threshold: default_leakage_threshold(),
            salt_secret: None,
        }
    }
}

fn default_max_payload_chars() -> usize {
    32_000
}

fn default_heavy_max_chars() -> usize {
    2_000
}

fn default_segment_max_words() -> usize {
    60
}

fn default_leakage_threshold() -> usize {
    8
}

/// Health cache and dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// How long a health snapshot stays fresh. At most 30.
    #[serde(default = "default_health_ttl_secs")]
    pub health_ttl_secs: u64,

    /// Per-provider probe timeout. At most 2000.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Timeout for a single dispatch attempt.
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,

    /// Total time allowed for all dispatch attempts of one request. At most 30.
    #[serde(default = "default_route_budget_secs")]
    pub route_budget_secs: u64,

    /// Zero-cost provider selected ahead of tier order whenever it is healthy and allowed.
    #[serde(default = "default_local_provider")]
    pub local_provider: Option<String>,

    /// Upper bound on output units requested from a provider.
    #[serde(default)]
    pub max_units: Option<u32>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            health_ttl_secs: default_health_ttl_secs(),
            probe_timeout_ms: default_probe_timeout_ms(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
            route_budget_secs: default_route_budget_secs(),
            local_provider: default_local_provider(),
            max_units: None,
        }
    }
}

fn default_health_ttl_secs() -> u64 {
    30
}

fn default_probe_timeout_ms() -> u64 {
    2_000
}

fn default_attempt_timeout_secs() -> u64 {
    20
}

fn default_route_budget_secs() -> u64 {
    30
}

fn default_local_provider() -> Option<String> {
    Some("local".to_string())
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Timeout for each store write.
    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,

    /// Credits charged per unit of currency.
    #[serde(default = "default_credits_per_currency")]
    pub credits_per_currency: f64,

    /// Ledger delta for a served request whose quality signal clears the threshold.
    #[serde(default = "default_success_delta")]
    pub success_trust_delta: f64,

    /// Ledger delta for a request that ended in failsafe.
    #[serde(default)]
    pub failsafe_trust_delta: f64,

    /// Quality score at or above which a served request earns `success_trust_delta`.
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            write_timeout_ms: default_write_timeout_ms(),
            credits_per_currency: default_credits_per_currency(),
            success_trust_delta: default_success_delta(),
            failsafe_trust_delta: 0.0,
            quality_threshold: default_quality_threshold(),
        }
    }
}

fn default_write_timeout_ms() -> u64 {
    3_000
}

fn default_credits_per_currency() -> f64 {
    1_000.0
}

fn default_success_delta() -> f64 {
    0.1
}

fn default_quality_threshold() -> f64 {
    0.4
}

/// Which audit store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Sqlite,
}

/// Audit store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default = "default_store_backend")]
    pub backend: StoreBackend,

    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_store_backend() -> StoreBackend {
    StoreBackend::Sqlite
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("trustgate").join("audit.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("trustgate-audit.db"))
        .display()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// How a provider backend is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// JSON over HTTP (`GET /health`, `POST /generate`).
    Http,
    /// In-process deterministic responder.
    Echo,
}

/// One provider backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    pub id: String,

    #[serde(default)]
    pub display_name: Option<String>,

    pub kind: ProviderKind,

    /// Base URL for HTTP providers.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token for HTTP providers. Never logged.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Price of one billing unit.
    #[serde(default)]
    pub cost_per_unit: f64,

    #[serde(default = "default_quality_tier")]
    pub quality_tier: u8,

    /// Largest payload accepted, in characters.
    #[serde(default = "default_max_size")]
    pub max_size: usize,
}

fn default_model_name() -> String {
    "default".to_string()
}

fn default_quality_tier() -> u8 {
    1
}

fn default_max_size() -> usize {
    32_000
}

fn provider(
    id: &str,
    display_name: &str,
    kind: ProviderKind,
    endpoint: Option<&str>,
    model_name: &str,
    cost_per_unit: f64,
    quality_tier: u8,
) -> ProviderConfig {
    ProviderConfig {
        id: id.to_string(),
        display_name: Some(display_name.to_string()),
        kind,
        endpoint: endpoint.map(str::to_string),
        api_key: None,
        model_name: model_name.to_string(),
        cost_per_unit,
        quality_tier,
        max_size: default_max_size(),
    }
}

fn default_providers() -> Vec<ProviderConfig> {
    vec![
        provider("local", "Local model", ProviderKind::Echo, None, "local-echo", 0.0, 2),
        provider(
            "cloud-premium",
            "Cloud premium",
            ProviderKind::Http,
            Some("http://127.0.0.1:8101"),
            "premium-large",
            0.000_03,
            4,
        ),
        provider(
            "cloud-standard",
            "Cloud standard",
            ProviderKind::Http,
            Some("http://127.0.0.1:8102"),
            "standard-medium",
            0.000_01,
            3,
        ),
        provider(
            "cloud-economy",
            "Cloud economy",
            ProviderKind::Http,
            Some("http://127.0.0.1:8103"),
            "economy-small",
            0.000_002,
            2,
        ),
        provider("mock", "Mock responder", ProviderKind::Echo, None, "mock-echo", 0.0, 1),
    ]
}
