// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The request orchestrator.
//!
//! One call to [`Gateway::handle`] drives a request through policy resolution,
//! prompt transformation, routing and audit logging. Caller errors are
//! rejected before any side effect; every other failure, panics included,
//! degrades to the failsafe response followed by a best-effort audit write.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use trustgate_audit::{AuditEvent, AuditLogger, AuditResult, LedgerStatus};
use trustgate_core::types::{RoutingInfo, TransformMetadata};
use trustgate_core::{
    AuditStore, GatewayError, GatewayRequest, GatewayResponse, InteractionId, RoutingOutcome,
    RoutingPolicy, FAILSAFE_PROVIDER_ID,
};
use trustgate_policy::TrustPolicyEngine;
use trustgate_router::redact::redact;
use trustgate_router::{FailsafeBackend, ProviderRouter};
use trustgate_transform::PromptTransformKernel;

use crate::state::GatewayState;

/// How far one interaction got, kept outside the staged future so that it
/// survives a panic inside a stage.
struct Progress {
    interaction_id: InteractionId,
    state: GatewayState,
    policy: Option<RoutingPolicy>,
    transform: Option<TransformMetadata>,
}

impl Progress {
    fn new() -> Self {
        Self {
            interaction_id: InteractionId::new(),
            state: GatewayState::Received,
            policy: None,
            transform: None,
        }
    }

    fn advance(&mut self, next: GatewayState) {
        debug!(
            interaction_id = %self.interaction_id,
            from = %self.state,
            to = %next,
            "state transition"
        );
        self.state = next;
    }
}

/// Trust-gated request gateway. `Send + Sync`; share it behind an `Arc`.
pub struct Gateway {
    policy: TrustPolicyEngine,
    kernel: PromptTransformKernel,
    router: Arc<ProviderRouter>,
    audit: AuditLogger,
}

impl Gateway {
    pub fn new(
        policy: TrustPolicyEngine,
        kernel: PromptTransformKernel,
        router: Arc<ProviderRouter>,
        audit: AuditLogger,
    ) -> Self {
        Self {
            policy,
            kernel,
            router,
            audit,
        }
    }

    pub fn router(&self) -> &Arc<ProviderRouter> {
        &self.router
    }

    pub fn audit_store(&self) -> &Arc<dyn AuditStore> {
        self.audit.store()
    }

    /// Serve one request.
    ///
    /// Returns `Err` only for [`GatewayError::Rejected`], wrapping an invalid
    /// user context or payload. Nothing is audited for a rejected request.
    pub async fn handle(&self, request: GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        let started = Instant::now();
        let mut progress = Progress::new();
        debug!(
            interaction_id = %progress.interaction_id,
            channel = %request.meta.channel,
            "request received"
        );

        let staged = AssertUnwindSafe(self.run_stages(&request, &mut progress))
            .catch_unwind()
            .await;

        let routed = match staged {
            Ok(Ok(routed)) => Ok(routed),
            Ok(Err(e)) if e.is_caller_error() => {
                warn!(interaction_id = %progress.interaction_id, error = %e, "request rejected");
                return Err(GatewayError::Rejected {
                    interaction_id: progress.interaction_id,
                    source: Box::new(e),
                });
            }
            Ok(Err(e)) => {
                let attempts = match &e {
                    GatewayError::AllProvidersFailed { attempts, .. } => attempts.clone(),
                    _ => Vec::new(),
                };
                Err((redact(&e.to_string(), &[]), attempts))
            }
            // Panic text may quote the payload. Only the fact of the panic
            // is recorded.
            Err(_panic) => Err(("panicked".to_string(), Vec::new())),
        };

        let route_attempted = matches!(progress.state, GatewayState::Transformed | GatewayState::Routed);
        let result = match routed {
            Ok(routed) => {
                progress.advance(GatewayState::Routed);
                AuditResult::Routed(routed)
            }
            Err((reason, attempts)) => {
                let stage = progress.state.pending_stage();
                warn!(
                    interaction_id = %progress.interaction_id,
                    stage,
                    reason = %reason,
                    attempts = attempts.len(),
                    "request degraded to failsafe"
                );
                AuditResult::Failed {
                    stage: stage.to_string(),
                    reason,
                    attempts,
                    fallback_used: route_attempted,
                }
            }
        };

        let event = AuditEvent {
            interaction_id: progress.interaction_id.clone(),
            user: request.user,
            raw_payload: request.payload,
            policy: progress.policy.clone(),
            transform: progress.transform.clone(),
            result,
            total_latency_ms: started.elapsed().as_millis() as u64,
        };
        self.record(&event).await;
        if progress.state == GatewayState::Routed {
            progress.advance(GatewayState::Logged);
        }

        let total_latency_ms = started.elapsed().as_millis() as u64;
        let response = match &event.result {
            AuditResult::Routed(routed) => self.served_response(&progress, routed, total_latency_ms),
            AuditResult::Failed { .. } => self.failsafe_response(&progress, route_attempted, total_latency_ms),
        };

        progress.advance(if response.is_failsafe() {
            GatewayState::Failsafe
        } else {
            GatewayState::Responded
        });
        info!(
            interaction_id = %progress.interaction_id,
            provider = %response.provider,
            cost = response.cost,
            fallback_used = response.routing_info.fallback_used,
            total_latency_ms,
            "request completed"
        );
        Ok(response)
    }

    async fn run_stages(
        &self,
        request: &GatewayRequest,
        progress: &mut Progress,
    ) -> Result<RoutingOutcome, GatewayError> {
        let policy = self.policy.evaluate(&request.user, &request.meta)?;
        progress.policy = Some(policy.clone());
        progress.advance(GatewayState::PolicyResolved);

        let transformed = self
            .kernel
            .transform(&request.payload, &request.user, policy.transform_strength)?;
        progress.transform = Some(transformed.metadata.clone());
        progress.advance(GatewayState::Transformed);

        self.router
            .route(&progress.interaction_id, &transformed.segments, &policy, &request.user)
            .await
    }

    /// Write the audit record, logging and discarding any failure.
    async fn record(&self, event: &AuditEvent) {
        match AssertUnwindSafe(self.audit.log(event)).catch_unwind().await {
            Ok(Ok(receipt)) => {
                if let LedgerStatus::Failed(_) = receipt.ledger {
                    debug!(interaction_id = %event.interaction_id, "ledger failure ignored");
                }
            }
            Ok(Err(e)) => {
                warn!(
                    interaction_id = %event.interaction_id,
                    error = %e,
                    "audit failure ignored, response unaffected"
                );
            }
            Err(panic) => {
                warn!(
                    interaction_id = %event.interaction_id,
                    panic = %panic_message(panic.as_ref()),
                    "audit logger panicked, response unaffected"
                );
            }
        }
    }

    fn routing_info(
        &self,
        progress: &Progress,
        provider_selected: &str,
        fallback_used: bool,
        total_latency_ms: u64,
    ) -> RoutingInfo {
        RoutingInfo {
            interaction_id: progress.interaction_id.clone(),
            routing_tier: progress.policy.as_ref().map(|p| p.routing_tier.clone()),
            transform_strength: progress.policy.as_ref().map(|p| p.transform_strength),
            provider_selected: provider_selected.to_string(),
            fallback_used,
            total_latency_ms,
        }
    }

    fn served_response(&self, progress: &Progress, routed: &RoutingOutcome, total_latency_ms: u64) -> GatewayResponse {
        GatewayResponse {
            output_text: routed.output_text.clone(),
            provider: routed.provider_used.clone(),
            model_name: routed.model_name.clone(),
            cost: routed.cost,
            units_in: routed.units_in,
            units_out: routed.units_out,
            routing_info: self.routing_info(progress, &routed.provider_used, routed.fallback_used, total_latency_ms),
        }
    }

    fn failsafe_response(&self, progress: &Progress, route_attempted: bool, total_latency_ms: u64) -> GatewayResponse {
        GatewayResponse {
            output_text: self.router.failsafe_message().to_string(),
            provider: FAILSAFE_PROVIDER_ID.to_string(),
            model_name: FailsafeBackend::descriptor().model_name,
            cost: 0.0,
            units_in: 0,
            units_out: 0,
            routing_info: self.routing_info(progress, FAILSAFE_PROVIDER_ID, route_attempted, total_latency_ms),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tracing_test::traced_test;
    use trustgate_audit::MemoryAuditStore;
    use trustgate_config::model::GatewayConfig;
    use trustgate_core::types::{AuditOutcome, GenerateOptions, GenerateOutput, ProviderDescriptor};
    use std::sync::atomic::{AtomicBool, Ordering};
    use trustgate_core::{HealthStatus, ProviderBackend, SaltSource, UserContext};
    use trustgate_router::{EchoBackend, ProviderRegistry};
    use trustgate_transform::DerivedSalt;

    struct Exploding;

    #[async_trait]
    impl ProviderBackend for Exploding {
        async fn probe(&self) -> bool {
            true
        }

        async fn generate(&self, _: &str, _: &GenerateOptions) -> Result<GenerateOutput, GatewayError> {
            panic!("generate exploded")
        }
    }

    /// Panics on its first lookup, which the transform stage makes.
    struct PanicOnce(AtomicBool);

    impl SaltSource for PanicOnce {
        fn salt_for(&self, _: &str) -> Vec<u8> {
            if !self.0.swap(true, Ordering::SeqCst) {
                panic!("salt store unreachable for Plan a trip");
            }
            b"fixed".to_vec()
        }
    }

    fn descriptor(id: &str) -> ProviderDescriptor {
        ProviderDescriptor {
            id: id.to_string(),
            display_name: id.to_string(),
            model_name: format!("{id}-model"),
            cost_per_unit: 0.0,
            quality_tier: 1,
            max_size: 32_000,
            health_status: HealthStatus::Unknown,
            endpoint: None,
        }
    }

    async fn gateway(backend: Arc<dyn ProviderBackend>) -> (Gateway, Arc<MemoryAuditStore>) {
        gateway_with_salts(backend, Arc::new(DerivedSalt::new("gateway-unit"))).await
    }

    async fn gateway_with_salts(
        backend: Arc<dyn ProviderBackend>,
        salts: Arc<dyn SaltSource>,
    ) -> (Gateway, Arc<MemoryAuditStore>) {
        let config = GatewayConfig::default();
        let mut registry = ProviderRegistry::with_router_config(&config.router);
        registry.register(descriptor("local"), backend).unwrap();
        let store = Arc::new(MemoryAuditStore::new());
        let gateway = Gateway::builder(config)
            .with_registry(registry)
            .with_store(store.clone())
            .with_salts(salts)
            .build()
            .await
            .unwrap();
        (gateway, store)
    }

    fn request(payload: &str) -> GatewayRequest {
        GatewayRequest {
            user: UserContext::new("u-1", "fp-1", 95.0),
            meta: Default::default(),
            payload: payload.to_string(),
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn served_request_walks_every_state() {
        let (gateway, store) = gateway(Arc::new(EchoBackend::new("local-echo"))).await;
        let response = gateway.handle(request("What is the capital of France?")).await.unwrap();

        assert_eq!(response.provider, "local");
        assert_eq!(store.len().await, 1);
        for state in ["policy_resolved", "transformed", "routed", "logged", "responded"] {
            assert!(logs_contain(&format!("to={state}")), "missing transition to {state}");
        }
        assert!(!logs_contain("to=failsafe"));
    }

    #[tokio::test]
    #[traced_test]
    async fn provider_panic_is_contained_by_the_router() {
        let (gateway, store) = gateway(Arc::new(Exploding)).await;
        let response = gateway.handle(request("Plan a trip")).await.unwrap();

        // The only registered provider panicked, so the router's own
        // failsafe responder answers and the request is still "routed".
        assert!(response.is_failsafe());
        assert_eq!(response.cost, 0.0);
        assert_eq!(store.len().await, 1);
        assert!(logs_contain("provider panicked during generate"));
        assert!(!logs_contain("request degraded to failsafe"));
        assert!(!gateway.router().health()["local"].is_available());
    }

    #[tokio::test]
    #[traced_test]
    async fn panic_inside_transform_is_contained_and_not_quoted() {
        let salts = Arc::new(PanicOnce(AtomicBool::new(false)));
        let (gateway, store) = gateway_with_salts(Arc::new(EchoBackend::new("local-echo")), salts).await;
        let response = gateway.handle(request("Plan a trip")).await.unwrap();

        assert!(response.is_failsafe());
        assert!(!response.routing_info.fallback_used);
        assert!(logs_contain("request degraded to failsafe"));
        assert!(logs_contain("to=failsafe"));

        assert_eq!(store.len().await, 1);
        let record = store
            .get_audit(&response.routing_info.interaction_id)
            .await
            .unwrap()
            .unwrap();
        match &record.outcome {
            AuditOutcome::Failsafe { stage, reason } => {
                assert_eq!(stage, "transform");
                assert_eq!(reason, "panicked");
            }
            other => panic!("expected failsafe outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn rejection_logs_and_skips_audit() {
        let (gateway, store) = gateway(Arc::new(EchoBackend::new("local-echo"))).await;
        let err = gateway.handle(request("")).await.err().unwrap();

        assert!(matches!(err, GatewayError::Rejected { .. }));
        assert!(store.is_empty().await);
        assert!(logs_contain("request rejected"));
    }

    #[test]
    fn panic_message_handles_both_payload_types() {
        let text: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(text.as_ref()), "boom");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(panic_message(owned.as_ref()), "owned boom");
        let other: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }

    #[test]
    fn progress_starts_received() {
        let progress = Progress::new();
        assert_eq!(progress.state, GatewayState::Received);
        assert!(progress.policy.is_none());
        assert!(progress.transform.is_none());
    }

    #[test]
    fn gateway_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Gateway>();
    }
}
