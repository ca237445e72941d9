// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request orchestration for the Trustgate gateway.
//!
//! [`Gateway`] runs each request through the trust policy engine, the prompt
//! transform kernel, the provider router and the audit logger, and always
//! answers: either with a provider's output, with the failsafe response, or
//! (for malformed input only) with [`GatewayError::Rejected`].
//!
//! [`GatewayError::Rejected`]: trustgate_core::GatewayError::Rejected

pub mod builder;
pub mod gateway;
pub mod state;

pub use builder::GatewayBuilder;
pub use gateway::Gateway;
pub use state::GatewayState;
