// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Trustgate request gateway.
//!
//! This crate provides the shared data model, the error taxonomy, and the
//! capability traits (provider backend, audit store, salt source) that the
//! policy, transform, router, audit, and gateway crates are built on.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::GatewayError;
pub use types::{
    AuditRecord, AuditWrite, GatewayRequest, GatewayResponse, HealthStatus, InteractionId,
    LogDetail, RoutingOutcome, RoutingPolicy, TransformStrength, TrustLedgerEntry, UserContext,
    FAILSAFE_PROVIDER_ID,
};

pub use traits::{AuditStore, ProviderBackend, SaltSource};

/// Round a monetary value to a fixed number of decimal places.
///
/// All billing arithmetic goes through this so that repeated float operations
/// never drift between the router's cost and the audit record's billing.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
