// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider routing for the Trustgate gateway.
//!
//! [`ProviderRegistry`] owns the configured backends and a TTL-bounded health
//! cache. [`ProviderRouter`] selects a healthy provider allowed by the trust
//! policy, dispatches under a time budget, and falls back once on failure.

pub mod backends;
pub mod pricing;
pub mod redact;
pub mod registry;
pub mod router;

pub use backends::{build_backend, EchoBackend, FailsafeBackend, HttpBackend};
pub use pricing::calculate_cost;
pub use registry::{HealthSnapshot, ProviderRegistry, RegisteredProvider};
pub use router::{ProviderRouter, Selection};
