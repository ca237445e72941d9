// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trust-tier policy resolution.
//!
//! Resolution order: context validation > tier band lookup > discount curve >
//! transform whitelist. No I/O, no clock, no shared state.

use std::collections::HashSet;

use trustgate_config::model::{PolicyConfig, TierConfig};
use trustgate_core::types::RequestMeta;
use trustgate_core::{GatewayError, RoutingPolicy, TransformStrength, UserContext};
use tracing::debug;

use crate::discount::DiscountCurve;

/// Maps a user context to the routing policy it is entitled to.
#[derive(Debug, Clone)]
pub struct TrustPolicyEngine {
    /// Sorted by `min_trust`, highest first.
    tiers: Vec<TierConfig>,
    curve: DiscountCurve,
    whitelist: HashSet<String>,
}

impl TrustPolicyEngine {
    pub fn new(config: &PolicyConfig) -> Result<Self, GatewayError> {
        if config.tiers.is_empty() {
            return Err(GatewayError::Config("policy defines no tiers".to_string()));
        }
        let mut tiers = config.tiers.clone();
        tiers.sort_by(|a, b| b.min_trust.total_cmp(&a.min_trust));
        Ok(Self {
            tiers,
            curve: DiscountCurve::from_config(config),
            whitelist: config.transform_whitelist.iter().cloned().collect(),
        })
    }

    /// Resolve the policy for one request.
    ///
    /// Fails with [`GatewayError::InvalidContext`] before anything else runs
    /// if the trust score is missing or out of range.
    pub fn evaluate(
        &self,
        user: &UserContext,
        meta: &RequestMeta,
    ) -> Result<RoutingPolicy, GatewayError> {
        let trust_score = validate_context(user)?;
        let tier = self.tier_for(trust_score);

        let transform_strength = if self.whitelist.contains(&user.user_id) {
            TransformStrength::None
        } else {
            // A tier misconfigured with `none` still gets the lightest transform.
            tier.transform_strength.max(TransformStrength::Light)
        };

        let discount_pct = self.curve.discount_pct(trust_score);
        let policy = RoutingPolicy {
            routing_tier: tier.name.clone(),
            allowed_providers: tier.providers.clone(),
            transform_strength,
            cost_multiplier: self.curve.cost_multiplier(trust_score),
            discount_pct,
            log_detail: tier.log_detail,
            retention_days: tier.retention_days,
        };

        debug!(
            user_id = %user.user_id,
            channel = %meta.channel,
            trust_score,
            tier = %policy.routing_tier,
            strength = %policy.transform_strength,
            multiplier = policy.cost_multiplier,
            "policy resolved"
        );

        Ok(policy)
    }

    /// Tier band for a valid trust score. Boundary values belong to the higher tier;
    /// scores below every threshold fall into the lowest tier.
    fn tier_for(&self, trust_score: f64) -> &TierConfig {
        self.tiers
            .iter()
            .find(|t| trust_score >= t.min_trust)
            .unwrap_or_else(|| &self.tiers[self.tiers.len() - 1])
    }

    /// Names of all tiers, highest first.
    pub fn tier_names(&self) -> Vec<&str> {
        self.tiers.iter().map(|t| t.name.as_str()).collect()
    }

    /// Retention lookup by tier name, used by the audit logger at write time.
    pub fn tier(&self, name: &str) -> Option<&TierConfig> {
        self.tiers.iter().find(|t| t.name == name)
    }
}

/// Check a user context and return its trust score.
pub fn validate_context(user: &UserContext) -> Result<f64, GatewayError> {
    if user.user_id.trim().is_empty() {
        return Err(GatewayError::InvalidContext("user_id is empty".to_string()));
    }
    match user.trust_score {
        None => Err(GatewayError::InvalidContext("trust_score is missing".to_string())),
        Some(score) if score.is_nan() || !(0.0..=100.0).contains(&score) => Err(
            GatewayError::InvalidContext(format!("trust_score {score} is outside [0, 100]")),
        ),
        Some(score) => Ok(score),
    }
}
