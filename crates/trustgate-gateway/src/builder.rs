// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assembles a [`Gateway`] from configuration, with optional injected collaborators.

use std::sync::Arc;

use tracing::info;
use trustgate_audit::{AuditLogger, MemoryAuditStore};
use trustgate_config::model::{GatewayConfig, StoreBackend};
use trustgate_core::{AuditStore, GatewayError, SaltSource};
use trustgate_policy::TrustPolicyEngine;
use trustgate_router::{ProviderRegistry, ProviderRouter};
use trustgate_storage::SqliteAuditStore;
use trustgate_transform::{DerivedSalt, PromptTransformKernel};

use crate::gateway::Gateway;

/// Builder for [`Gateway`].
///
/// Anything not injected is built from the configuration: providers from
/// `[[providers]]`, the store from `[storage]`, salts from `transform.salt_secret`.
pub struct GatewayBuilder {
    config: GatewayConfig,
    registry: Option<ProviderRegistry>,
    store: Option<Arc<dyn AuditStore>>,
    salts: Option<Arc<dyn SaltSource>>,
}

impl GatewayBuilder {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            registry: None,
            store: None,
            salts: None,
        }
    }

    /// Use a pre-populated registry instead of `[[providers]]`.
    pub fn with_registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn AuditStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_salts(mut self, salts: Arc<dyn SaltSource>) -> Self {
        self.salts = Some(salts);
        self
    }

    pub async fn build(self) -> Result<Gateway, GatewayError> {
        let config = self.config;
        let policy = TrustPolicyEngine::new(&config.policy)?;

        let salts: Arc<dyn SaltSource> = match (self.salts, &config.transform.salt_secret) {
            (Some(salts), _) => salts,
            (None, Some(secret)) => Arc::new(DerivedSalt::new(secret)),
            (None, None) => Arc::new(DerivedSalt::ephemeral()),
        };

        let registry = match self.registry {
            Some(registry) => registry,
            None => ProviderRegistry::from_config(&config)?,
        };
        let router = ProviderRouter::new(Arc::new(registry), &config.router)
            .with_failsafe_message(config.gateway.failsafe_message.clone());

        let store: Arc<dyn AuditStore> = match self.store {
            Some(store) => store,
            None => match config.storage.backend {
                StoreBackend::Memory => Arc::new(MemoryAuditStore::new()),
                StoreBackend::Sqlite => Arc::new(SqliteAuditStore::open(&config.storage).await?),
            },
        };

        let audit = AuditLogger::new(store, salts.clone(), &config.audit, &config.policy);
        let kernel = PromptTransformKernel::new(config.transform.clone(), salts);

        info!(
            name = %config.gateway.name,
            providers = router.registry().len(),
            tiers = policy.tier_names().len(),
            latency_bound_ms = config.latency_bound_ms(),
            "gateway ready"
        );

        Ok(Gateway::new(policy, kernel, Arc::new(router), audit))
    }
}

impl Gateway {
    pub fn builder(config: GatewayConfig) -> GatewayBuilder {
        GatewayBuilder::new(config)
    }

    /// Build a gateway entirely from configuration.
    pub async fn from_config(config: GatewayConfig) -> Result<Self, GatewayError> {
        GatewayBuilder::new(config).build().await
    }
}
