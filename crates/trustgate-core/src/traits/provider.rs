// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider backend capability.

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::types::{GenerateOptions, GenerateOutput};

/// A text-generation backend.
///
/// The router treats every provider through exactly this capability. Timeouts
/// are imposed by the caller, so implementations may block for as long as the
/// underlying service does.
#[async_trait]
pub trait ProviderBackend: Send + Sync + 'static {
    /// Liveness probe. `false` (or a timeout imposed by the caller) marks the
    /// provider unavailable until the next health refresh.
    async fn probe(&self) -> bool;

    /// Generate a completion for an already-transformed payload.
    async fn generate(
        &self,
        payload: &str,
        options: &GenerateOptions,
    ) -> Result<GenerateOutput, GatewayError>;
}
