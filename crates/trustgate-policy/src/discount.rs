// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trust-to-discount curve.
//!
//! Discount is zero up to `floor`, then rises linearly to `max_pct` at trust 100.
//! It never decreases as trust rises, so neither does the price a user pays fall
//! out of order: `cost_multiplier(a) >= cost_multiplier(b)` whenever `a < b`.

use trustgate_config::model::PolicyConfig;
use trustgate_core::round_to;

/// Decimal places kept on discount percentages and multipliers.
const DISCOUNT_PRECISION: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountCurve {
    floor: f64,
    max_pct: f64,
}

impl DiscountCurve {
    pub fn new(floor: f64, max_pct: f64) -> Self {
        Self {
            floor: floor.clamp(0.0, 99.0),
            max_pct: max_pct.clamp(0.0, 99.0),
        }
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::new(config.discount_floor, config.max_discount_pct)
    }

    /// Discount percentage for a trust score in `[0, 100]`.
    pub fn discount_pct(&self, trust_score: f64) -> f64 {
        if trust_score <= self.floor {
            return 0.0;
        }
        let progress = ((trust_score - self.floor) / (100.0 - self.floor)).min(1.0);
        round_to(progress * self.max_pct, DISCOUNT_PRECISION).min(self.max_pct)
    }

    /// `1 - discount/100`, always in `(0, 1]`.
    pub fn cost_multiplier(&self, trust_score: f64) -> f64 {
        round_to(1.0 - self.discount_pct(trust_score) / 100.0, 4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn curve() -> DiscountCurve {
        DiscountCurve::new(50.0, 40.0)
    }

    #[test]
    fn no_discount_at_or_below_floor() {
        assert_eq!(curve().discount_pct(0.0), 0.0);
        assert_eq!(curve().discount_pct(50.0), 0.0);
        assert_eq!(curve().cost_multiplier(30.0), 1.0);
    }

    #[test]
    fn discount_capped_at_max() {
        assert_eq!(curve().discount_pct(100.0), 40.0);
        assert_eq!(curve().cost_multiplier(100.0), 0.6);
    }

    #[test]
    fn discount_is_linear_between_floor_and_cap() {
        assert_eq!(curve().discount_pct(75.0), 20.0);
        assert_eq!(curve().cost_multiplier(75.0), 0.8);
    }

    #[test]
    fn zero_max_means_flat_pricing() {
        let flat = DiscountCurve::new(50.0, 0.0);
        assert_eq!(flat.cost_multiplier(99.0), 1.0);
    }

    proptest! {
        #[test]
        fn multiplier_is_monotone_non_increasing(a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let c = curve();
            prop_assert!(c.cost_multiplier(lo) >= c.cost_multiplier(hi));
        }

        #[test]
        fn multiplier_stays_in_unit_interval(score in 0.0f64..=100.0, floor in 0.0f64..99.0, max in 0.0f64..99.0) {
            let m = DiscountCurve::new(floor, max).cost_multiplier(score);
            prop_assert!(m > 0.0 && m <= 1.0);
        }
    }
}
