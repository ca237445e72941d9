// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Concrete [`ProviderBackend`] implementations.

pub mod echo;
pub mod failsafe;
pub mod http;

use std::sync::Arc;

use trustgate_config::model::{ProviderConfig, ProviderKind};
use trustgate_core::{GatewayError, ProviderBackend};

pub use echo::EchoBackend;
pub use failsafe::FailsafeBackend;
pub use http::HttpBackend;

/// Build the backend a provider entry describes.
pub fn build_backend(config: &ProviderConfig) -> Result<Arc<dyn ProviderBackend>, GatewayError> {
    match config.kind {
        ProviderKind::Echo => Ok(Arc::new(EchoBackend::new(&config.model_name))),
        ProviderKind::Http => {
            let endpoint = config.endpoint.as_deref().ok_or_else(|| {
                GatewayError::Config(format!("provider `{}` is http but has no endpoint", config.id))
            })?;
            Ok(Arc::new(HttpBackend::new(
                &config.id,
                endpoint,
                &config.model_name,
                config.api_key.clone(),
            )?))
        }
    }
}
