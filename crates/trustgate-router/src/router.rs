// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider selection and dispatch with a single fallback.
//!
//! Selection order: zero-cost local override > first healthy provider in tier
//! order > built-in failsafe responder.

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use trustgate_config::model::RouterConfig;
use trustgate_core::types::{DispatchAttempt, GenerateOptions, GenerateOutput, ProviderDescriptor};
use trustgate_core::{
    GatewayError, HealthStatus, InteractionId, ProviderBackend, RoutingOutcome, RoutingPolicy,
    UserContext, FAILSAFE_PROVIDER_ID,
};

use crate::backends::FailsafeBackend;
use crate::pricing::calculate_cost;
use crate::registry::{HealthSnapshot, ProviderRegistry};

/// Which provider a selection pass picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Provider {
        id: String,
        /// Chosen because it is the configured zero-cost local provider.
        local_override: bool,
    },
    Failsafe,
}

impl Selection {
    pub fn provider_id(&self) -> &str {
        match self {
            Selection::Provider { id, .. } => id,
            Selection::Failsafe => FAILSAFE_PROVIDER_ID,
        }
    }
}

/// Selects a live provider for a request and dispatches to it.
pub struct ProviderRouter {
    registry: Arc<ProviderRegistry>,
    failsafe: FailsafeBackend,
    local_provider: Option<String>,
    attempt_timeout: Duration,
    route_budget: Duration,
    max_units: Option<u32>,
}

impl ProviderRouter {
    pub fn new(registry: Arc<ProviderRegistry>, config: &RouterConfig) -> Self {
        Self {
            registry,
            failsafe: FailsafeBackend::default(),
            local_provider: config.local_provider.clone(),
            attempt_timeout: Duration::from_secs(config.attempt_timeout_secs),
            route_budget: Duration::from_secs(config.route_budget_secs),
            max_units: config.max_units,
        }
    }

    /// Replace the text the failsafe responder returns.
    pub fn with_failsafe_message(mut self, message: impl Into<String>) -> Self {
        self.failsafe = FailsafeBackend::new(message);
        self
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn failsafe_message(&self) -> &str {
        self.failsafe.message()
    }

    /// Probe every provider now.
    pub async fn refresh_health(&self) -> Arc<HealthSnapshot> {
        self.registry.refresh_health().await
    }

    /// Health of every provider as of the last refresh.
    pub fn health(&self) -> BTreeMap<String, HealthStatus> {
        self.registry.health()
    }

    /// Pick a provider for a payload of `payload_chars` characters, skipping `excluded`.
    ///
    /// Candidates are the policy's providers that are healthy and accept the
    /// payload size. The local provider wins whenever it is a candidate.
    pub fn select(&self, policy: &RoutingPolicy, payload_chars: usize, excluded: &[String]) -> Selection {
        let snapshot = self.registry.snapshot();
        let candidates: Vec<&str> = policy
            .allowed_providers
            .iter()
            .map(String::as_str)
            .filter(|id| !excluded.iter().any(|e| e == id))
            .filter(|id| snapshot.is_available(id))
            .filter(|id| {
                self.registry
                    .get(id)
                    .is_some_and(|p| p.descriptor.max_size >= payload_chars)
            })
            .collect();

        if let Some(local) = &self.local_provider
            && candidates.contains(&local.as_str())
        {
            return Selection::Provider {
                id: local.clone(),
                local_override: true,
            };
        }

        match candidates.first() {
            Some(id) => Selection::Provider {
                id: id.to_string(),
                local_override: false,
            },
            None => Selection::Failsafe,
        }
    }

    /// Route a transformed payload under `policy`.
    ///
    /// `segments` is the payload as the transform kernel split it; each
    /// segment goes to the provider as its own generate call and the answers
    /// are joined. Makes at most two dispatch attempts (the selection and one
    /// fallback), each bounded by the per-attempt timeout and the remaining
    /// route budget.
    pub async fn route<S>(
        &self,
        interaction_id: &InteractionId,
        segments: &[S],
        policy: &RoutingPolicy,
        user: &UserContext,
    ) -> Result<RoutingOutcome, GatewayError>
    where
        S: AsRef<str> + Sync,
    {
        if segments.is_empty() {
            return Err(GatewayError::Internal("nothing to dispatch".to_string()));
        }
        let started = Instant::now();
        let deadline = started + self.route_budget;
        self.registry.ensure_fresh().await;

        let largest_segment = segments
            .iter()
            .map(|s| s.as_ref().chars().count())
            .max()
            .unwrap_or(0);
        let options = GenerateOptions {
            interaction_id: interaction_id.clone(),
            routing_tier: policy.routing_tier.clone(),
            max_units: self.max_units,
        };

        let first = self.select(policy, largest_segment, &[]);
        let intended = match &first {
            Selection::Provider { id, local_override: true } => id.clone(),
            _ => policy
                .allowed_providers
                .first()
                .cloned()
                .unwrap_or_else(|| FAILSAFE_PROVIDER_ID.to_string()),
        };
        debug!(
            interaction_id = %interaction_id,
            tier = %policy.routing_tier,
            asserted_tier = user.tier.as_deref().unwrap_or("-"),
            selected = first.provider_id(),
            intended = %intended,
            segments = segments.len(),
            "provider selected"
        );

        let mut attempts = Vec::with_capacity(2);
        let primary_err = match self.dispatch(&first, segments, &options, deadline, &mut attempts).await {
            Ok((descriptor, output)) => {
                return Ok(self.outcome(descriptor, output, policy, &intended, started, attempts));
            }
            Err(e) => e,
        };
        if let Selection::Provider { id, .. } = &first {
            self.registry.mark_unavailable(id, &primary_err.to_string());
        }

        let excluded = vec![first.provider_id().to_string()];
        let second = self.select(policy, largest_segment, &excluded);
        if second == first {
            // Only the failsafe responder can be selected twice; never retry it.
            return Err(GatewayError::AllProvidersFailed {
                primary: Box::new(primary_err),
                fallback: Box::new(GatewayError::Internal("no fallback candidate".to_string())),
                attempts,
            });
        }
        warn!(
            interaction_id = %interaction_id,
            failed = first.provider_id(),
            fallback = second.provider_id(),
            error = %primary_err,
            "primary provider failed, falling back"
        );

        match self.dispatch(&second, segments, &options, deadline, &mut attempts).await {
            Ok((descriptor, output)) => Ok(self.outcome(descriptor, output, policy, &intended, started, attempts)),
            Err(fallback_err) => {
                if let Selection::Provider { id, .. } = &second {
                    self.registry.mark_unavailable(id, &fallback_err.to_string());
                }
                Err(GatewayError::AllProvidersFailed {
                    primary: Box::new(primary_err),
                    fallback: Box::new(fallback_err),
                    attempts,
                })
            }
        }
    }

    /// One attempt against one provider: every segment, in order, under a
    /// single timeout. A panic inside the backend counts as a failed attempt.
    async fn dispatch<S>(
        &self,
        selection: &Selection,
        segments: &[S],
        options: &GenerateOptions,
        deadline: Instant,
        attempts: &mut Vec<DispatchAttempt>,
    ) -> Result<(ProviderDescriptor, GenerateOutput), GatewayError>
    where
        S: AsRef<str> + Sync,
    {
        let (descriptor, backend, segments): (ProviderDescriptor, &dyn ProviderBackend, &[S]) = match selection {
            // The failsafe responder ignores its input; one call is enough.
            Selection::Failsafe => (FailsafeBackend::descriptor(), &self.failsafe, &segments[..1]),
            Selection::Provider { id, .. } => {
                let provider = self
                    .registry
                    .get(id)
                    .ok_or_else(|| GatewayError::Config(format!("provider `{id}` is not registered")))?;
                (provider.descriptor.clone(), provider.backend.as_ref(), segments)
            }
        };

        let started = Instant::now();
        let remaining = deadline.saturating_duration_since(started);
        let limit = self.attempt_timeout.min(remaining);

        let result = if limit.is_zero() {
            Err(GatewayError::Timeout { duration: self.route_budget })
        } else {
            let calls = AssertUnwindSafe(generate_all(backend, segments, options)).catch_unwind();
            match tokio::time::timeout(limit, calls).await {
                Ok(Ok(Ok(output))) => Ok(output),
                Ok(Ok(Err(e))) => {
                    debug!(provider = %descriptor.id, kind = e.kind(), "generate failed");
                    Err(scrub_failure(&descriptor.id, e))
                }
                Ok(Err(_panic)) => {
                    warn!(provider = %descriptor.id, "provider panicked during generate");
                    Err(GatewayError::ProviderUnavailable {
                        provider: descriptor.id.clone(),
                        message: "generate panicked".to_string(),
                        status: None,
                    })
                }
                Err(_) => Err(GatewayError::Timeout { duration: limit }),
            }
        };

        let latency_ms = started.elapsed().as_millis() as u64;
        attempts.push(DispatchAttempt {
            provider: descriptor.id.clone(),
            succeeded: result.is_ok(),
            latency_ms,
            error: result.as_ref().err().map(ToString::to_string),
        });

        result.map(|output| (descriptor, output))
    }

    fn outcome(
        &self,
        descriptor: ProviderDescriptor,
        output: GenerateOutput,
        policy: &RoutingPolicy,
        intended: &str,
        started: Instant,
        attempts: Vec<DispatchAttempt>,
    ) -> RoutingOutcome {
        let units_used = output.units_used();
        let cost = calculate_cost(descriptor.cost_per_unit, units_used, policy.cost_multiplier);
        let fallback_used = descriptor.id != intended;
        let latency_ms = started.elapsed().as_millis() as u64;

        info!(
            provider = %descriptor.id,
            units_used,
            cost,
            latency_ms,
            fallback_used,
            "request routed"
        );

        RoutingOutcome {
            output_text: output.output_text,
            model_name: output.model_name.unwrap_or_else(|| descriptor.model_name.clone()),
            provider_used: descriptor.id,
            units_in: output.units_in,
            units_out: output.units_out,
            units_used,
            cost,
            latency_ms,
            fallback_used,
            attempts,
        }
    }
}

/// Send every segment to `backend` in order and join the answers.
async fn generate_all<S: AsRef<str>>(
    backend: &dyn ProviderBackend,
    segments: &[S],
    options: &GenerateOptions,
) -> Result<GenerateOutput, GatewayError> {
    let mut joined: Option<GenerateOutput> = None;
    for segment in segments {
        let output = backend.generate(segment.as_ref(), options).await?;
        joined = Some(match joined {
            None => output,
            Some(mut acc) => {
                acc.output_text.push('\n');
                acc.output_text.push_str(&output.output_text);
                acc.units_in = acc.units_in.saturating_add(output.units_in);
                acc.units_out = acc.units_out.saturating_add(output.units_out);
                acc.model_name = acc.model_name.or(output.model_name);
                acc
            }
        });
    }
    joined.ok_or_else(|| GatewayError::Internal("nothing to dispatch".to_string()))
}

/// Reduce a backend failure to what the router can vouch for: the provider,
/// the failure kind, and the HTTP status if there was one. Backend-supplied
/// text may quote the payload and never leaves this module.
fn scrub_failure(provider: &str, err: GatewayError) -> GatewayError {
    match err {
        GatewayError::Timeout { .. } => err,
        GatewayError::ProviderUnavailable { status, .. } => GatewayError::ProviderUnavailable {
            provider: provider.to_string(),
            message: match status {
                Some(code) => format!("returned status {code}"),
                None => "generate failed".to_string(),
            },
            status,
        },
        other => GatewayError::ProviderUnavailable {
            provider: provider.to_string(),
            message: format!("generate failed ({})", other.kind()),
            status: None,
        },
    }
}
