// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trust policy resolution for the Trustgate gateway.
//!
//! This crate provides:
//! - [`TrustPolicyEngine`]: maps a user context to a [`RoutingPolicy`] (pure, no I/O)
//! - [`DiscountCurve`]: the monotone trust-to-discount mapping behind `cost_multiplier`
//!
//! [`RoutingPolicy`]: trustgate_core::RoutingPolicy

pub mod discount;
pub mod engine;

pub use discount::DiscountCurve;
pub use engine::{validate_context, TrustPolicyEngine};
