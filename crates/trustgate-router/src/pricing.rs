// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost calculation for dispatched requests.
//!
//! Providers price every billing unit (input and output alike) at a flat
//! `cost_per_unit`. The trust policy's `cost_multiplier` applies on top.

use trustgate_core::round_to;

/// Decimal places kept on every computed cost.
pub const COST_DECIMALS: u32 = 6;

/// Calculate cost for `units_used` units at `cost_per_unit`, discounted by `cost_multiplier`.
///
/// Formula: `cost_per_unit * units_used * cost_multiplier`, rounded to six decimals.
pub fn calculate_cost(cost_per_unit: f64, units_used: u64, cost_multiplier: f64) -> f64 {
    round_to(cost_per_unit * units_used as f64 * cost_multiplier, COST_DECIMALS)
}
