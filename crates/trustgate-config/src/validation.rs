// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express: tier table ordering, provider
//! references, and the timeout bounds that make up the end-to-end latency cap.

use std::collections::HashSet;

use trustgate_core::{TransformStrength, FAILSAFE_PROVIDER_ID};

use crate::diagnostic::ConfigError;
use crate::model::{GatewayConfig, ProviderKind, StoreBackend, TierConfig};

/// Upper bound on the health cache TTL.
pub const MAX_HEALTH_TTL_SECS: u64 = 30;
/// Upper bound on a single health probe.
pub const MAX_PROBE_TIMEOUT_MS: u64 = 2_000;
/// Upper bound on the total dispatch budget of one request.
pub const MAX_ROUTE_BUDGET_SECS: u64 = 30;
/// Upper bound on one audit store write.
pub const MAX_WRITE_TIMEOUT_MS: u64 = 5_000;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every error instead of failing fast.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    validate_providers(config, &mut errors);
    validate_policy(config, &mut errors);
    validate_transform(config, &mut errors);
    validate_router(config, &mut errors);
    validate_audit(config, &mut errors);

    if config.storage.backend == StoreBackend::Sqlite && config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation("storage.database_path must not be empty"));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn validate_providers(config: &GatewayConfig, errors: &mut Vec<ConfigError>) {
    let mut seen = HashSet::new();
    for (i, provider) in config.providers.iter().enumerate() {
        if provider.id.trim().is_empty() {
            errors.push(ConfigError::validation(format!("providers[{i}].id must not be empty")));
            continue;
        }
        if provider.id == FAILSAFE_PROVIDER_ID {
            errors.push(ConfigError::validation(format!(
                "providers[{i}].id `{FAILSAFE_PROVIDER_ID}` is reserved for the built-in responder"
            )));
        }
        if !seen.insert(provider.id.as_str()) {
            errors.push(ConfigError::validation(format!(
                "duplicate provider id `{}` in [[providers]]",
                provider.id
            )));
        }
        if !(provider.cost_per_unit.is_finite() && provider.cost_per_unit >= 0.0) {
            errors.push(ConfigError::validation(format!(
                "providers.{}.cost_per_unit must be a non-negative number, got {}",
                provider.id, provider.cost_per_unit
            )));
        }
        if provider.max_size == 0 {
            errors.push(ConfigError::validation(format!(
                "providers.{}.max_size must be at least 1",
                provider.id
            )));
        }
        if provider.kind == ProviderKind::Http
            && provider.endpoint.as_deref().is_none_or(|e| e.trim().is_empty())
        {
            errors.push(ConfigError::validation(format!(
                "providers.{} is an http provider and needs an endpoint",
                provider.id
            )));
        }
    }
}

fn validate_policy(config: &GatewayConfig, errors: &mut Vec<ConfigError>) {
    let policy = &config.policy;

    if policy.tiers.is_empty() {
        errors.push(ConfigError::validation("policy.tiers must define at least one tier"));
        return;
    }

    if !(0.0..100.0).contains(&policy.max_discount_pct) {
        errors.push(ConfigError::validation(format!(
            "policy.max_discount_pct must be in [0, 100), got {}",
            policy.max_discount_pct
        )));
    }
    if !(0.0..100.0).contains(&policy.discount_floor) {
        errors.push(ConfigError::validation(format!(
            "policy.discount_floor must be in [0, 100), got {}",
            policy.discount_floor
        )));
    }

    let mut names = HashSet::new();
    let mut thresholds = HashSet::new();
    for tier in &policy.tiers {
        if !names.insert(tier.name.as_str()) {
            errors.push(ConfigError::validation(format!("duplicate tier name `{}`", tier.name)));
        }
        if !(0.0..=100.0).contains(&tier.min_trust) {
            errors.push(ConfigError::validation(format!(
                "tier `{}` min_trust must be in [0, 100], got {}",
                tier.name, tier.min_trust
            )));
        }
        if !thresholds.insert(tier.min_trust.to_bits()) {
            errors.push(ConfigError::validation(format!(
                "tier `{}` shares min_trust {} with another tier",
                tier.name, tier.min_trust
            )));
        }
        if tier.transform_strength == TransformStrength::None {
            errors.push(ConfigError::validation(format!(
                "tier `{}` transform_strength must not be `none`; use policy.transform_whitelist",
                tier.name
            )));
        }
        if tier.providers.is_empty() {
            errors.push(ConfigError::validation(format!(
                "tier `{}` must list at least one provider",
                tier.name
            )));
        }
        for id in &tier.providers {
            if config.provider(id).is_none() {
                errors.push(ConfigError::validation(format!(
                    "tier `{}` references unknown provider `{id}`",
                    tier.name
                )));
            }
        }
    }

    // Higher tiers must never get a stronger transform, or poorer retention.
    let mut sorted: Vec<&TierConfig> = policy.tiers.iter().collect();
    sorted.sort_by(|a, b| b.min_trust.total_cmp(&a.min_trust));
    for pair in sorted.windows(2) {
        let (higher, lower) = (pair[0], pair[1]);
        if higher.transform_strength > lower.transform_strength {
            errors.push(ConfigError::validation(format!(
                "tier `{}` has a stronger transform than lower tier `{}`",
                higher.name, lower.name
            )));
        }
        if higher.log_detail < lower.log_detail || higher.retention_days < lower.retention_days {
            errors.push(ConfigError::validation(format!(
                "tier `{}` retains less than lower tier `{}`",
                higher.name, lower.name
            )));
        }
    }
}

fn validate_transform(config: &GatewayConfig, errors: &mut Vec<ConfigError>) {
    let transform = &config.transform;
    if transform.max_payload_chars == 0 {
        errors.push(ConfigError::validation("transform.max_payload_chars must be at least 1"));
    }
    if transform.heavy_max_chars == 0 {
        errors.push(ConfigError::validation("transform.heavy_max_chars must be at least 1"));
    }
    if transform.segment_max_words == 0 {
        errors.push(ConfigError::validation("transform.segment_max_words must be at least 1"));
    }
    if transform.leakage_threshold == 0 {
        errors.push(ConfigError::validation("transform.leakage_threshold must be at least 1"));
    }
}

fn validate_router(config: &GatewayConfig, errors: &mut Vec<ConfigError>) {
    let router = &config.router;
    if router.health_ttl_secs == 0 || router.health_ttl_secs > MAX_HEALTH_TTL_SECS {
        errors.push(ConfigError::validation(format!(
            "router.health_ttl_secs must be in 1..={MAX_HEALTH_TTL_SECS}, got {}",
            router.health_ttl_secs
        )));
    }
    if router.probe_timeout_ms == 0 || router.probe_timeout_ms > MAX_PROBE_TIMEOUT_MS {
        errors.push(ConfigError::validation(format!(
            "router.probe_timeout_ms must be in 1..={MAX_PROBE_TIMEOUT_MS}, got {}",
            router.probe_timeout_ms
        )));
    }
    if router.route_budget_secs == 0 || router.route_budget_secs > MAX_ROUTE_BUDGET_SECS {
        errors.push(ConfigError::validation(format!(
            "router.route_budget_secs must be in 1..={MAX_ROUTE_BUDGET_SECS}, got {}",
            router.route_budget_secs
        )));
    }
    if router.attempt_timeout_secs == 0 || router.attempt_timeout_secs > router.route_budget_secs {
        errors.push(ConfigError::validation(format!(
            "router.attempt_timeout_secs must be in 1..=route_budget_secs ({}), got {}",
            router.route_budget_secs, router.attempt_timeout_secs
        )));
    }
    if let Some(local) = &router.local_provider {
        match config.provider(local) {
            None => errors.push(ConfigError::validation(format!(
                "router.local_provider references unknown provider `{local}`"
            ))),
            Some(p) if p.cost_per_unit != 0.0 => errors.push(ConfigError::validation(format!(
                "router.local_provider `{local}` must have cost_per_unit = 0"
            ))),
            Some(_) => {}
        }
    }
}

fn validate_audit(config: &GatewayConfig, errors: &mut Vec<ConfigError>) {
    let audit = &config.audit;
    if audit.write_timeout_ms == 0 || audit.write_timeout_ms > MAX_WRITE_TIMEOUT_MS {
        errors.push(ConfigError::validation(format!(
            "audit.write_timeout_ms must be in 1..={MAX_WRITE_TIMEOUT_MS}, got {}",
            audit.write_timeout_ms
        )));
    }
    if !(audit.credits_per_currency.is_finite() && audit.credits_per_currency >= 0.0) {
        errors.push(ConfigError::validation(format!(
            "audit.credits_per_currency must be non-negative, got {}",
            audit.credits_per_currency
        )));
    }
    if !(0.0..=1.0).contains(&audit.quality_threshold) {
        errors.push(ConfigError::validation(format!(
            "audit.quality_threshold must be in [0, 1], got {}",
            audit.quality_threshold
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustgate_core::LogDetail;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn none_strength_tier_is_rejected() {
        let mut config = GatewayConfig::default();
        config.policy.tiers[0].transform_strength = TransformStrength::None;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "must not be `none`"));
    }

    #[test]
    fn unknown_tier_provider_is_rejected() {
        let mut config = GatewayConfig::default();
        config.policy.tiers[1].providers.push("ghost".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "unknown provider `ghost`"));
    }

    #[test]
    fn inverted_strength_ordering_is_rejected() {
        let mut config = GatewayConfig::default();
        // sovereign (top) gets heavier transform than basic (bottom)
        config.policy.tiers[0].transform_strength = TransformStrength::Heavy;
        config.policy.tiers[3].transform_strength = TransformStrength::Light;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "stronger transform"));
    }

    #[test]
    fn inverted_retention_is_rejected() {
        let mut config = GatewayConfig::default();
        config.policy.tiers[0].log_detail = LogDetail::Summary;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "retains less"));
    }

    #[test]
    fn probe_timeout_above_two_seconds_is_rejected() {
        let mut config = GatewayConfig::default();
        config.router.probe_timeout_ms = 5_000;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "probe_timeout_ms"));
    }

    #[test]
    fn attempt_timeout_above_budget_is_rejected() {
        let mut config = GatewayConfig::default();
        config.router.attempt_timeout_secs = 31;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "attempt_timeout_secs"));
    }

    #[test]
    fn paid_local_provider_is_rejected() {
        let mut config = GatewayConfig::default();
        config.router.local_provider = Some("cloud-premium".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "cost_per_unit = 0"));
    }

    #[test]
    fn reserved_and_duplicate_provider_ids_are_rejected() {
        let mut config = GatewayConfig::default();
        let mut dup = config.providers[0].clone();
        config.providers.push(dup.clone());
        dup.id = FAILSAFE_PROVIDER_ID.to_string();
        config.providers.push(dup);
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "duplicate provider id"));
        assert!(has_error(&errors, "reserved"));
    }

    #[test]
    fn http_provider_without_endpoint_is_rejected() {
        let mut config = GatewayConfig::default();
        config.providers[1].endpoint = None;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "needs an endpoint"));
    }

    #[test]
    fn collects_multiple_errors() {
        let mut config = GatewayConfig::default();
        config.router.health_ttl_secs = 0;
        config.audit.write_timeout_ms = 0;
        config.policy.max_discount_pct = 150.0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.len() >= 3);
    }
}
