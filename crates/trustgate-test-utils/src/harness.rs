// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end gateway tests.
//!
//! `TestHarness` assembles a complete gateway in which every configured
//! provider is replaced by a [`MockBackend`] carrying the provider's real
//! descriptor (id, cost, size limit), backed by an in-memory audit store.

use std::collections::BTreeMap;
use std::sync::Arc;

use trustgate_audit::MemoryAuditStore;
use trustgate_config::model::{GatewayConfig, StoreBackend};
use trustgate_core::types::{ProviderDescriptor, RequestMeta};
use trustgate_core::{
    AuditStore, GatewayError, GatewayRequest, GatewayResponse, HealthStatus, UserContext,
};
use trustgate_gateway::Gateway;
use trustgate_router::ProviderRegistry;
use trustgate_transform::DerivedSalt;

use crate::mock_backend::{GenerateBehavior, MockBackend, ProbeBehavior};

/// Salt secret used by every harness, so hashes are reproducible across tests.
pub const HARNESS_SALT_SECRET: &str = "trustgate-test-harness";

/// Descriptor for a provider config entry.
pub fn descriptor_for(config: &GatewayConfig, id: &str) -> Option<ProviderDescriptor> {
    config.provider(id).map(|p| ProviderDescriptor {
        id: p.id.clone(),
        display_name: p.display_name.clone().unwrap_or_else(|| p.id.clone()),
        model_name: p.model_name.clone(),
        cost_per_unit: p.cost_per_unit,
        quality_tier: p.quality_tier,
        max_size: p.max_size,
        health_status: HealthStatus::Unknown,
        endpoint: p.endpoint.clone(),
    })
}

/// A registry holding a mock for every configured provider.
pub fn mock_registry(
    config: &GatewayConfig,
) -> Result<(ProviderRegistry, BTreeMap<String, Arc<MockBackend>>), GatewayError> {
    let mut registry = ProviderRegistry::with_router_config(&config.router);
    let mut backends = BTreeMap::new();
    for provider in &config.providers {
        let backend = Arc::new(MockBackend::new(provider.model_name.clone()));
        let descriptor = descriptor_for(config, &provider.id)
            .ok_or_else(|| GatewayError::Config(format!("provider `{}` vanished", provider.id)))?;
        registry.register(descriptor, backend.clone())?;
        backends.insert(provider.id.clone(), backend);
    }
    Ok((registry, backends))
}

/// Build a request with a fixed fingerprint.
pub fn request(user_id: &str, trust_score: f64, payload: &str) -> GatewayRequest {
    GatewayRequest {
        user: UserContext::new(user_id, format!("fp-{user_id}"), trust_score),
        meta: RequestMeta {
            channel: "test".to_string(),
            ..RequestMeta::default()
        },
        payload: payload.to_string(),
    }
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: GatewayConfig,
    store: Option<Arc<dyn AuditStore>>,
    probes: Vec<(String, ProbeBehavior)>,
    generates: Vec<(String, GenerateBehavior)>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        let mut config = GatewayConfig::default();
        config.storage.backend = StoreBackend::Memory;
        config.transform.salt_secret = Some(HARNESS_SALT_SECRET.to_string());
        Self {
            config,
            store: None,
            probes: Vec::new(),
            generates: Vec::new(),
        }
    }

    /// Adjust the configuration before the gateway is built.
    pub fn with_config(mut self, adjust: impl FnOnce(&mut GatewayConfig)) -> Self {
        adjust(&mut self.config);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn AuditStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_probe(mut self, provider: &str, behavior: ProbeBehavior) -> Self {
        self.probes.push((provider.to_string(), behavior));
        self
    }

    pub fn with_generate(mut self, provider: &str, behavior: GenerateBehavior) -> Self {
        self.generates.push((provider.to_string(), behavior));
        self
    }

    /// Mark providers as failing their health probe.
    pub fn unhealthy(mut self, providers: &[&str]) -> Self {
        for provider in providers {
            self.probes.push((provider.to_string(), ProbeBehavior::Unhealthy));
        }
        self
    }

    pub async fn build(self) -> Result<TestHarness, GatewayError> {
        let (registry, backends) = mock_registry(&self.config)?;
        for (id, behavior) in self.probes {
            if let Some(backend) = backends.get(&id) {
                backend.set_probe(behavior);
            }
        }
        for (id, behavior) in self.generates {
            if let Some(backend) = backends.get(&id) {
                backend.set_generate(behavior);
            }
        }

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryAuditStore::new()));
        let gateway = Gateway::builder(self.config.clone())
            .with_registry(registry)
            .with_store(store)
            .with_salts(Arc::new(DerivedSalt::new(HARNESS_SALT_SECRET)))
            .build()
            .await?;

        Ok(TestHarness {
            gateway: Arc::new(gateway),
            backends,
            config: self.config,
        })
    }
}

/// A gateway wired to mock backends.
pub struct TestHarness {
    pub gateway: Arc<Gateway>,
    pub backends: BTreeMap<String, Arc<MockBackend>>,
    pub config: GatewayConfig,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A harness with every default provider healthy and echoing.
    pub async fn new() -> Result<Self, GatewayError> {
        Self::builder().build().await
    }

    pub fn backend(&self, id: &str) -> Option<&Arc<MockBackend>> {
        self.backends.get(id)
    }

    pub fn store(&self) -> &Arc<dyn AuditStore> {
        self.gateway.audit_store()
    }

    /// Send one request through the gateway.
    pub async fn ask(
        &self,
        user_id: &str,
        trust_score: f64,
        payload: &str,
    ) -> Result<GatewayResponse, GatewayError> {
        self.gateway.handle(request(user_id, trust_score, payload)).await
    }
}
