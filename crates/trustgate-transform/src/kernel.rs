// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The prompt transformation kernel.

use std::sync::Arc;

use trustgate_config::model::TransformConfig;
use trustgate_core::types::{TransformApplied, TransformKind, TransformMetadata, TransformResult};
use trustgate_core::{GatewayError, SaltSource, TransformStrength, UserContext};
use tracing::debug;

use crate::hashing::salted_hash;
use crate::rules::{self, IDENTIFIER_RULES, NUMERIC_RULES};
use crate::segment;

/// Applies a transform strength to a raw payload.
///
/// Pure apart from the salt lookup: no network, no clock.
pub struct PromptTransformKernel {
    config: TransformConfig,
    salts: Arc<dyn SaltSource>,
}

impl PromptTransformKernel {
    pub fn new(config: TransformConfig, salts: Arc<dyn SaltSource>) -> Self {
        Self { config, salts }
    }

    /// Transform `payload` for `user` at `strength`.
    ///
    /// `None` hands the payload over byte for byte. Every other strength
    /// also trims surrounding whitespace.
    ///
    /// Fails with [`GatewayError::InvalidPayload`] for empty, oversized, or
    /// control-character-bearing payloads.
    pub fn transform(
        &self,
        payload: &str,
        user: &UserContext,
        strength: TransformStrength,
    ) -> Result<TransformResult, GatewayError> {
        self.validate(payload)?;

        let mut applied = Applied::default();
        let mut text = match strength {
            TransformStrength::None => payload.to_string(),
            _ => payload.trim().to_string(),
        };

        if strength >= TransformStrength::Light {
            for rule in IDENTIFIER_RULES.iter() {
                let (out, n) = rule.apply(&text);
                applied.record(rule.kind, n);
                text = out;
            }
            let (out, n) = rules::redact_identifiers(&text, &[&user.user_id, &user.fingerprint]);
            applied.record(TransformKind::UserIdentifier, n);
            text = out;
        }

        if strength >= TransformStrength::Standard {
            // Numbers and dates first so month names are not mistaken for names.
            for rule in NUMERIC_RULES.iter() {
                let (out, n) = rule.apply(&text);
                applied.record(rule.kind, n);
                text = out;
            }
            let (out, n) = rules::generalize_names(&text);
            applied.record(TransformKind::NamedEntity, n);
            text = out;
        }

        let segments = if strength >= TransformStrength::Heavy {
            if let Some(truncated) = segment::truncate_at_word(&text, self.config.heavy_max_chars) {
                applied.record(TransformKind::Truncation, 1);
                text = truncated;
            }
            let segments = segment::segment(&text, self.config.segment_max_words);
            if segments.len() > 1 {
                applied.record(TransformKind::Segmentation, segments.len());
            }
            text = segments.join("\n");
            segments
        } else {
            vec![text.clone()]
        };

        let salt = self.salts.salt_for(&user.user_id);
        let metadata = TransformMetadata {
            strength,
            transformations_applied: applied.0,
            raw_payload_hash: salted_hash(&salt, payload.as_bytes()),
            original_chars: payload.chars().count(),
            transformed_chars: text.chars().count(),
            segment_count: segments.len(),
        };

        debug!(
            strength = %strength,
            fired = metadata.transformations_applied.len(),
            original_chars = metadata.original_chars,
            transformed_chars = metadata.transformed_chars,
            "payload transformed"
        );

        Ok(TransformResult {
            transformed_payload: text,
            segments,
            metadata,
        })
    }

    fn validate(&self, payload: &str) -> Result<(), GatewayError> {
        if payload.trim().is_empty() {
            return Err(GatewayError::InvalidPayload("payload is empty".to_string()));
        }
        let chars = payload.chars().count();
        if chars > self.config.max_payload_chars {
            return Err(GatewayError::InvalidPayload(format!(
                "payload has {chars} characters, limit is {}",
                self.config.max_payload_chars
            )));
        }
        if payload
            .chars()
            .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
        {
            return Err(GatewayError::InvalidPayload(
                "payload contains control characters".to_string(),
            ));
        }
        Ok(())
    }
}

/// Transformations that fired, in first-fired order.
#[derive(Default)]
struct Applied(Vec<TransformApplied>);

impl Applied {
    fn record(&mut self, kind: TransformKind, count: usize) {
        if count == 0 {
            return;
        }
        match self.0.iter_mut().find(|a| a.kind == kind) {
            Some(existing) => existing.count += count,
            None => self.0.push(TransformApplied { kind, count }),
        }
    }
}
