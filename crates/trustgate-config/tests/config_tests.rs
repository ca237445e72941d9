// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Trustgate configuration system.

use trustgate_config::diagnostic::ConfigError;
use trustgate_config::model::{ProviderKind, StoreBackend};
use trustgate_config::{load_and_validate_str, load_config_from_str};
use trustgate_core::{LogDetail, TransformStrength};

#[test]
fn full_config_deserializes() {
    let toml = r#"
[gateway]
name = "edge-1"
log_level = "debug"

[policy]
discount_floor = 40.0
max_discount_pct = 30.0
transform_whitelist = ["svc-internal"]

[[policy.tiers]]
name = "top"
min_trust = 80.0
providers = ["on-prem", "remote"]
transform_strength = "light"
log_detail = "full"
retention_days = 180

[[policy.tiers]]
name = "rest"
min_trust = 0.0
providers = ["remote"]
transform_strength = "heavy"
log_detail = "summary"
retention_days = 7

[router]
health_ttl_secs = 15
probe_timeout_ms = 500
attempt_timeout_secs = 10
route_budget_secs = 25
local_provider = "on-prem"

[audit]
write_timeout_ms = 1000

[storage]
backend = "memory"

[[providers]]
id = "on-prem"
kind = "echo"

[[providers]]
id = "remote"
kind = "http"
endpoint = "https://llm.example.com"
cost_per_unit = 0.00002
quality_tier = 3
"#;

    let config = load_and_validate_str(toml).expect("valid config");
    assert_eq!(config.gateway.name, "edge-1");
    assert_eq!(config.policy.tiers.len(), 2);
    assert_eq!(config.policy.tiers[0].transform_strength, TransformStrength::Light);
    assert_eq!(config.policy.tiers[1].log_detail, LogDetail::Summary);
    assert_eq!(config.policy.transform_whitelist, vec!["svc-internal"]);
    assert_eq!(config.router.local_provider.as_deref(), Some("on-prem"));
    assert_eq!(config.storage.backend, StoreBackend::Memory);
    assert_eq!(config.providers.len(), 2);
    assert_eq!(config.providers[1].kind, ProviderKind::Http);
    assert_eq!(config.latency_bound_ms(), 500 + 25_000 + 1_000);
}

#[test]
fn empty_config_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults are valid");
    assert_eq!(config.gateway.name, "trustgate");
    assert_eq!(config.router.health_ttl_secs, 30);
    assert_eq!(config.policy.max_discount_pct, 40.0);
}

#[test]
fn unknown_key_produces_suggestion() {
    let toml = r#"
[router]
helth_ttl_secs = 5
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    let found = errors.iter().any(|e| match e {
        ConfigError::UnknownKey { key, suggestion, .. } => {
            key == "helth_ttl_secs" && suggestion.as_deref() == Some("health_ttl_secs")
        }
        _ => false,
    });
    assert!(found, "expected unknown key with suggestion, got {errors:?}");
}

#[test]
fn wrong_type_is_reported() {
    let toml = r#"
[router]
health_ttl_secs = "soon"
"#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn semantic_errors_are_collected() {
    let toml = r#"
[router]
health_ttl_secs = 120
probe_timeout_ms = 9000
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(errors.len() >= 2, "expected both timeout errors, got {errors:?}");
}
