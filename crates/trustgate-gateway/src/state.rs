// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-request lifecycle states.
//!
//! Each request goes through: Received -> PolicyResolved -> Transformed ->
//! Routed -> Logged -> Responded. Failsafe is reachable from any state and is
//! terminal, like Responded.

/// States of a single interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayState {
    /// Interaction id minted, nothing evaluated yet.
    Received,
    PolicyResolved,
    Transformed,
    /// A provider (or the router's failsafe responder) answered.
    Routed,
    /// Audit write attempted. Its result does not affect the response.
    Logged,
    Responded,
    Failsafe,
}

impl GatewayState {
    /// The stage being attempted while in this state, as recorded in failsafe audits.
    pub fn pending_stage(self) -> &'static str {
        match self {
            GatewayState::Received => "policy",
            GatewayState::PolicyResolved => "transform",
            GatewayState::Transformed => "route",
            GatewayState::Routed => "audit",
            GatewayState::Logged | GatewayState::Responded | GatewayState::Failsafe => "respond",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, GatewayState::Responded | GatewayState::Failsafe)
    }
}

impl std::fmt::Display for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayState::Received => write!(f, "received"),
            GatewayState::PolicyResolved => write!(f, "policy_resolved"),
            GatewayState::Transformed => write!(f, "transformed"),
            GatewayState::Routed => write!(f, "routed"),
            GatewayState::Logged => write!(f, "logged"),
            GatewayState::Responded => write!(f, "responded"),
            GatewayState::Failsafe => write!(f, "failsafe"),
        }
    }
}
