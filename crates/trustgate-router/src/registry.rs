// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider registry with a TTL-bounded health cache.
//!
//! Readers load the current [`HealthSnapshot`] without locking. A refresh
//! probes every provider concurrently and swaps in a new snapshot; two
//! refreshes racing each other is harmless, the last store wins.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use futures::future::join_all;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use trustgate_config::model::{GatewayConfig, RouterConfig};
use trustgate_core::types::ProviderDescriptor;
use trustgate_core::{GatewayError, HealthStatus, ProviderBackend, FAILSAFE_PROVIDER_ID};

use crate::backends::build_backend;

/// One registered provider: its static description and its backend.
#[derive(Clone)]
pub struct RegisteredProvider {
    pub descriptor: ProviderDescriptor,
    pub backend: Arc<dyn ProviderBackend>,
}

/// Health of every registered provider as of one refresh.
#[derive(Debug, Clone, Default)]
pub struct HealthSnapshot {
    pub statuses: BTreeMap<String, HealthStatus>,
    /// `None` until the first refresh completes.
    pub refreshed_at: Option<Instant>,
}

impl HealthSnapshot {
    pub fn status(&self, id: &str) -> HealthStatus {
        self.statuses.get(id).cloned().unwrap_or(HealthStatus::Unknown)
    }

    pub fn is_available(&self, id: &str) -> bool {
        self.statuses.get(id).is_some_and(HealthStatus::is_available)
    }
}

/// Process-wide set of provider backends plus their cached health.
pub struct ProviderRegistry {
    providers: Vec<RegisteredProvider>,
    snapshot: ArcSwap<HealthSnapshot>,
    ttl: Duration,
    probe_timeout: Duration,
    refresh_lock: Mutex<()>,
}

impl ProviderRegistry {
    pub fn new(ttl: Duration, probe_timeout: Duration) -> Self {
        Self {
            providers: Vec::new(),
            snapshot: ArcSwap::from_pointee(HealthSnapshot::default()),
            ttl,
            probe_timeout,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Registry with timings from `[router]` and no providers.
    pub fn with_router_config(config: &RouterConfig) -> Self {
        Self::new(
            Duration::from_secs(config.health_ttl_secs),
            Duration::from_millis(config.probe_timeout_ms),
        )
    }

    /// Registry with every `[[providers]]` entry built and registered.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut registry = Self::with_router_config(&config.router);
        for provider in &config.providers {
            let descriptor = ProviderDescriptor {
                id: provider.id.clone(),
                display_name: provider.display_name.clone().unwrap_or_else(|| provider.id.clone()),
                model_name: provider.model_name.clone(),
                cost_per_unit: provider.cost_per_unit,
                quality_tier: provider.quality_tier,
                max_size: provider.max_size,
                health_status: HealthStatus::Unknown,
                endpoint: provider.endpoint.clone(),
            };
            registry.register(descriptor, build_backend(provider)?)?;
        }
        Ok(registry)
    }

    /// Add a provider. Ids must be unique and may not shadow the failsafe responder.
    pub fn register(
        &mut self,
        descriptor: ProviderDescriptor,
        backend: Arc<dyn ProviderBackend>,
    ) -> Result<(), GatewayError> {
        if descriptor.id == FAILSAFE_PROVIDER_ID {
            return Err(GatewayError::Config(format!(
                "provider id `{FAILSAFE_PROVIDER_ID}` is reserved"
            )));
        }
        if self.get(&descriptor.id).is_some() {
            return Err(GatewayError::Config(format!(
                "provider `{}` registered twice",
                descriptor.id
            )));
        }
        debug!(provider = %descriptor.id, "provider registered");
        self.providers.push(RegisteredProvider { descriptor, backend });
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&RegisteredProvider> {
        self.providers.iter().find(|p| p.descriptor.id == id)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Current health snapshot. Never blocks and never probes.
    pub fn snapshot(&self) -> Arc<HealthSnapshot> {
        self.snapshot.load_full()
    }

    /// Descriptors in registration order with health filled in from the current snapshot.
    pub fn descriptors(&self) -> Vec<ProviderDescriptor> {
        let snapshot = self.snapshot.load();
        self.providers
            .iter()
            .map(|p| ProviderDescriptor {
                health_status: snapshot.status(&p.descriptor.id),
                ..p.descriptor.clone()
            })
            .collect()
    }

    /// Health of every provider as of the current snapshot.
    pub fn health(&self) -> BTreeMap<String, HealthStatus> {
        let snapshot = self.snapshot.load();
        self.providers
            .iter()
            .map(|p| (p.descriptor.id.clone(), snapshot.status(&p.descriptor.id)))
            .collect()
    }

    fn is_stale(&self, snapshot: &HealthSnapshot) -> bool {
        match snapshot.refreshed_at {
            None => true,
            Some(at) => at.elapsed() >= self.ttl,
        }
    }

    /// Refresh the health cache if its TTL has expired.
    pub async fn ensure_fresh(&self) {
        if !self.is_stale(&self.snapshot.load()) {
            return;
        }
        let _guard = self.refresh_lock.lock().await;
        // Another caller may have refreshed while we waited.
        if self.is_stale(&self.snapshot.load()) {
            self.probe_all().await;
        }
    }

    /// Probe every provider now, regardless of TTL.
    pub async fn refresh_health(&self) -> Arc<HealthSnapshot> {
        let _guard = self.refresh_lock.lock().await;
        self.probe_all().await
    }

    async fn probe_all(&self) -> Arc<HealthSnapshot> {
        let timeout = self.probe_timeout;
        let probes = self.providers.iter().map(|p| async move {
            let status = match tokio::time::timeout(timeout, p.backend.probe()).await {
                Ok(true) => HealthStatus::Healthy,
                Ok(false) => HealthStatus::Unavailable("probe failed".to_string()),
                Err(_) => HealthStatus::Unavailable(format!("probe timed out after {timeout:?}")),
            };
            (p.descriptor.id.clone(), status)
        });
        let statuses: BTreeMap<String, HealthStatus> = join_all(probes).await.into_iter().collect();

        let healthy = statuses.values().filter(|s| s.is_available()).count();
        for (id, status) in &statuses {
            if let HealthStatus::Unavailable(reason) = status {
                warn!(provider = %id, reason = %reason, "provider marked unavailable");
            }
        }
        info!(healthy, total = statuses.len(), "provider health refreshed");

        let snapshot = Arc::new(HealthSnapshot {
            statuses,
            refreshed_at: Some(Instant::now()),
        });
        self.snapshot.store(Arc::clone(&snapshot));
        snapshot
    }

    /// Mark a provider unavailable until the next refresh window.
    pub fn mark_unavailable(&self, id: &str, reason: &str) {
        self.snapshot.rcu(|current| {
            let mut next = HealthSnapshot::clone(current);
            next.statuses
                .insert(id.to_string(), HealthStatus::Unavailable(reason.to_string()));
            next
        });
        warn!(provider = %id, reason = %reason, "provider marked unavailable after dispatch failure");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::EchoBackend;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use trustgate_core::types::{GenerateOptions, GenerateOutput};

    struct SlowProbe {
        delay: Duration,
        probes: AtomicUsize,
    }

    #[async_trait]
    impl ProviderBackend for SlowProbe {
        async fn probe(&self) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            true
        }

        async fn generate(&self, _: &str, _: &GenerateOptions) -> Result<GenerateOutput, GatewayError> {
            Err(GatewayError::Internal("unused".into()))
        }
    }

    fn descriptor(id: &str) -> ProviderDescriptor {
        ProviderDescriptor {
            id: id.to_string(),
            display_name: id.to_string(),
            model_name: "m".to_string(),
            cost_per_unit: 0.0,
            quality_tier: 1,
            max_size: 1000,
            health_status: HealthStatus::Unknown,
            endpoint: None,
        }
    }

    fn registry() -> ProviderRegistry {
        ProviderRegistry::new(Duration::from_secs(30), Duration::from_secs(2))
    }

    #[test]
    fn rejects_duplicate_and_reserved_ids() {
        let mut reg = registry();
        reg.register(descriptor("a"), Arc::new(EchoBackend::new("m"))).unwrap();
        assert!(reg.register(descriptor("a"), Arc::new(EchoBackend::new("m"))).is_err());
        assert!(reg.register(descriptor("failsafe"), Arc::new(EchoBackend::new("m"))).is_err());
    }

    #[test]
    fn from_default_config_registers_all_providers() {
        let reg = ProviderRegistry::from_config(&GatewayConfig::default()).unwrap();
        assert_eq!(reg.len(), GatewayConfig::default().providers.len());
        assert!(reg.get("local").is_some());
        assert!(reg.health().values().all(|s| *s == HealthStatus::Unknown));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_probe_times_out_and_marks_unavailable() {
        let mut reg = registry();
        let slow = Arc::new(SlowProbe {
            delay: Duration::from_secs(5),
            probes: AtomicUsize::new(0),
        });
        reg.register(descriptor("slow"), slow.clone()).unwrap();
        reg.register(descriptor("fast"), Arc::new(EchoBackend::new("m"))).unwrap();

        let snapshot = reg.refresh_health().await;
        assert!(!snapshot.is_available("slow"));
        assert!(snapshot.is_available("fast"));
        assert_eq!(slow.probes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ensure_fresh_respects_ttl() {
        let mut reg = registry();
        let probe = Arc::new(SlowProbe {
            delay: Duration::from_millis(10),
            probes: AtomicUsize::new(0),
        });
        reg.register(descriptor("p"), probe.clone()).unwrap();

        reg.ensure_fresh().await;
        reg.ensure_fresh().await;
        assert_eq!(probe.probes.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        reg.ensure_fresh().await;
        assert_eq!(probe.probes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn mark_unavailable_survives_until_refresh() {
        let mut reg = registry();
        reg.register(descriptor("a"), Arc::new(EchoBackend::new("m"))).unwrap();
        reg.refresh_health().await;
        assert!(reg.snapshot().is_available("a"));

        reg.mark_unavailable("a", "dispatch failed");
        assert!(!reg.snapshot().is_available("a"));
        reg.ensure_fresh().await;
        assert!(!reg.snapshot().is_available("a"));

        reg.refresh_health().await;
        assert!(reg.snapshot().is_available("a"));
    }
}
