// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `trustgate providers` command: probe every configured provider and print its health.

use trustgate_config::GatewayConfig;
use trustgate_core::types::ProviderDescriptor;
use trustgate_core::{GatewayError, HealthStatus};
use trustgate_router::ProviderRegistry;

/// Probe all providers once and return their descriptors with fresh health.
pub async fn probe_providers(config: &GatewayConfig) -> Result<Vec<ProviderDescriptor>, GatewayError> {
    let registry = ProviderRegistry::from_config(config)?;
    registry.refresh_health().await;
    Ok(registry.descriptors())
}

fn status_label(status: &HealthStatus) -> String {
    match status {
        HealthStatus::Healthy => "healthy".to_string(),
        HealthStatus::Unknown => "unknown".to_string(),
        HealthStatus::Unavailable(reason) => format!("unavailable ({reason})"),
    }
}

/// Render descriptors as an aligned plain-text table.
pub fn render_table(descriptors: &[ProviderDescriptor]) -> String {
    let width = descriptors.iter().map(|d| d.id.len()).max().unwrap_or(2).max(2);
    let mut out = format!("{:<width$}  {:<18}  {:>12}  STATUS\n", "ID", "MODEL", "COST/UNIT");
    for d in descriptors {
        out.push_str(&format!(
            "{:<width$}  {:<18}  {:>12.6}  {}\n",
            d.id,
            d.model_name,
            d.cost_per_unit,
            status_label(&d.health_status)
        ));
    }
    out
}

/// Run the `trustgate providers` command.
pub async fn run_providers(config: &GatewayConfig, json: bool) -> Result<(), GatewayError> {
    let descriptors = probe_providers(config).await?;
    if json {
        let text = serde_json::to_string_pretty(&descriptors)
            .map_err(|e| GatewayError::Internal(format!("failed to serialize providers: {e}")))?;
        println!("{text}");
    } else {
        print!("{}", render_table(&descriptors));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustgate_config::model::{ProviderConfig, ProviderKind};

    fn echo(id: &str) -> ProviderConfig {
        ProviderConfig {
            id: id.into(),
            display_name: None,
            kind: ProviderKind::Echo,
            endpoint: None,
            api_key: None,
            model_name: format!("{id}-echo"),
            cost_per_unit: 0.0,
            quality_tier: 1,
            max_size: 1_000,
        }
    }

    #[tokio::test]
    async fn echo_providers_probe_healthy() {
        let config = GatewayConfig {
            providers: vec![echo("local"), echo("mock")],
            ..GatewayConfig::default()
        };
        let descriptors = probe_providers(&config).await.unwrap();
        assert_eq!(descriptors.len(), 2);
        assert!(descriptors.iter().all(|d| d.health_status == HealthStatus::Healthy));
    }

    #[test]
    fn table_lists_every_provider() {
        let mut descriptor = ProviderDescriptor {
            id: "cloud-economy".into(),
            display_name: "Cloud economy".into(),
            model_name: "economy-small".into(),
            cost_per_unit: 0.000_002,
            quality_tier: 2,
            max_size: 32_000,
            health_status: HealthStatus::Unavailable("probe failed".into()),
            endpoint: None,
        };
        let table = render_table(std::slice::from_ref(&descriptor));
        assert!(table.starts_with("ID"));
        assert!(table.contains("cloud-economy"));
        assert!(table.contains("0.000002"));
        assert!(table.contains("unavailable (probe failed)"));

        descriptor.health_status = HealthStatus::Healthy;
        assert!(render_table(&[descriptor]).contains("healthy"));
    }
}
