// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The built-in last-resort responder.

use async_trait::async_trait;
use trustgate_core::types::{GenerateOptions, GenerateOutput, ProviderDescriptor};
use trustgate_core::{GatewayError, HealthStatus, ProviderBackend, FAILSAFE_PROVIDER_ID};

/// Default message returned when nothing else can serve a request.
pub const DEFAULT_FAILSAFE_MESSAGE: &str =
    "We're sorry, we couldn't complete your request right now. Please try again shortly.";

/// Always-available responder that returns a fixed apology and bills nothing.
#[derive(Debug, Clone)]
pub struct FailsafeBackend {
    message: String,
}

impl FailsafeBackend {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Descriptor for the failsafe provider. Never part of the registry.
    pub fn descriptor() -> ProviderDescriptor {
        ProviderDescriptor {
            id: FAILSAFE_PROVIDER_ID.to_string(),
            display_name: "Failsafe".to_string(),
            model_name: FAILSAFE_PROVIDER_ID.to_string(),
            cost_per_unit: 0.0,
            quality_tier: 0,
            max_size: usize::MAX,
            health_status: HealthStatus::Healthy,
            endpoint: None,
        }
    }
}

impl Default for FailsafeBackend {
    fn default() -> Self {
        Self::new(DEFAULT_FAILSAFE_MESSAGE)
    }
}

#[async_trait]
impl ProviderBackend for FailsafeBackend {
    async fn probe(&self) -> bool {
        true
    }

    async fn generate(
        &self,
        _payload: &str,
        _options: &GenerateOptions,
    ) -> Result<GenerateOutput, GatewayError> {
        Ok(GenerateOutput {
            output_text: self.message.clone(),
            units_in: 0,
            units_out: 0,
            model_name: Some(FAILSAFE_PROVIDER_ID.to_string()),
        })
    }
}
