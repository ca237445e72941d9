// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process deterministic responder for local and mock providers.

use async_trait::async_trait;
use trustgate_core::types::{GenerateOptions, GenerateOutput};
use trustgate_core::{GatewayError, ProviderBackend};

/// Echoes the (already transformed) payload back with a model prefix.
///
/// Always healthy. Units are whitespace-separated words.
#[derive(Debug, Clone)]
pub struct EchoBackend {
    model_name: String,
}

impl EchoBackend {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
        }
    }
}

#[async_trait]
impl ProviderBackend for EchoBackend {
    async fn probe(&self) -> bool {
        true
    }

    async fn generate(
        &self,
        payload: &str,
        options: &GenerateOptions,
    ) -> Result<GenerateOutput, GatewayError> {
        let mut words: Vec<&str> = payload.split_whitespace().collect();
        if let Some(max) = options.max_units {
            words.truncate(max as usize);
        }
        let output_text = format!("[{}] {}", self.model_name, words.join(" "));
        Ok(GenerateOutput {
            units_in: payload.split_whitespace().count() as u32,
            units_out: output_text.split_whitespace().count() as u32,
            output_text,
            model_name: Some(self.model_name.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustgate_core::InteractionId;

    fn options(max_units: Option<u32>) -> GenerateOptions {
        GenerateOptions {
            interaction_id: InteractionId::new(),
            routing_tier: "basic".into(),
            max_units,
        }
    }

    #[tokio::test]
    async fn echoes_payload_with_model_prefix() {
        let backend = EchoBackend::new("echo-1");
        let out = backend.generate("hello there", &options(None)).await.unwrap();
        assert_eq!(out.output_text, "[echo-1] hello there");
        assert_eq!(out.units_in, 2);
        assert_eq!(out.units_out, 3);
        assert_eq!(out.model_name.as_deref(), Some("echo-1"));
    }

    #[tokio::test]
    async fn respects_max_units() {
        let backend = EchoBackend::new("echo-1");
        let out = backend.generate("a b c d e", &options(Some(2))).await.unwrap();
        assert_eq!(out.output_text, "[echo-1] a b");
    }

    #[tokio::test]
    async fn always_probes_healthy() {
        assert!(EchoBackend::new("m").probe().await);
    }
}
