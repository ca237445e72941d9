// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Trustgate request gateway.

use thiserror::Error;

use crate::types::{DispatchAttempt, InteractionId};

/// The primary error type used across all Trustgate components.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed user context (missing or out-of-range trust score, blank user id).
    #[error("invalid user context: {0}")]
    InvalidContext(String),

    /// Empty or malformed request text.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// A single provider failed to serve a request. Recovered locally by the router.
    #[error("provider `{provider}` unavailable: {message}")]
    ProviderUnavailable {
        provider: String,
        message: String,
        /// HTTP status, when the provider answered with one.
        status: Option<u16>,
    },

    /// Both the selected provider and its fallback failed.
    #[error("all providers failed (primary: {primary}; fallback: {fallback})")]
    AllProvidersFailed {
        primary: Box<GatewayError>,
        fallback: Box<GatewayError>,
        /// Every dispatch attempt made before giving up.
        attempts: Vec<DispatchAttempt>,
    },

    /// The primary audit record could not be persisted.
    #[error("store write failed: {source}")]
    StoreWrite {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A request was rejected at the gateway boundary before any side effect.
    #[error("request {interaction_id} rejected: {source}")]
    Rejected {
        interaction_id: InteractionId,
        source: Box<GatewayError>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Configuration errors surfaced at runtime (unknown provider, bad tier table).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Wrap any error as a store write failure.
    pub fn store<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::StoreWrite { source: err.into() }
    }

    /// Short, fixed name of the error variant. Safe to persist: it never
    /// carries text supplied by a provider or the caller.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidContext(_) => "invalid_context",
            Self::InvalidPayload(_) => "invalid_payload",
            Self::ProviderUnavailable { .. } => "provider_unavailable",
            Self::AllProvidersFailed { .. } => "all_providers_failed",
            Self::StoreWrite { .. } => "store_write",
            Self::Rejected { .. } => "rejected",
            Self::Timeout { .. } => "timeout",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }

    /// Returns true for failures that represent a caller contract violation.
    ///
    /// These are the only errors the gateway surfaces to its caller instead of
    /// degrading to a failsafe response.
    pub fn is_caller_error(&self) -> bool {
        match self {
            Self::InvalidContext(_) | Self::InvalidPayload(_) => true,
            Self::Rejected { source, .. } => source.is_caller_error(),
            _ => false,
        }
    }
}
