//! Nexus indicator calculation for IP Box.
//!
//! `Nexus = min(1, ((a + b) × 1.3) / (a + b + c + d))`, or 1.0 when the
//! denominator is zero (no costs incurred yet).

use serde::{Deserialize, Serialize};

/// The four cost components of the Nexus formula, all non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NexusComponents {
    /// Direct B+R costs
    pub a: f64,
    /// B+R acquired from unrelated parties
    pub b: f64,
    /// B+R acquired from related parties
    pub c: f64,
    /// Purchase of finished IP
    pub d: f64,
}

impl NexusComponents {
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    /// Compute the Nexus ratio, clamped to [0, 1].
    pub fn ratio(&self) -> f64 {
        let denominator = self.a + self.b + self.c + self.d;
        if denominator <= 0.0 {
            return 1.0;
        }
        (((self.a + self.b) * 1.3) / denominator).min(1.0)
    }

    /// Sum of all components.
    pub fn total(&self) -> f64 {
        self.a + self.b + self.c + self.d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_components_yield_one() {
        assert_eq!(NexusComponents::default().ratio(), 1.0);
    }

    #[test]
    fn direct_costs_only_clamp_to_one() {
        let n = NexusComponents::new(50_000.0, 10_000.0, 0.0, 0.0);
        assert_eq!(n.ratio(), 1.0);
    }

    #[test]
    fn related_costs_lower_the_ratio() {
        let n = NexusComponents::new(100_000.0, 0.0, 50_000.0, 50_000.0);
        // ((100000) * 1.3) / 200000 = 0.65
        assert!((n.ratio() - 0.65).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn ratio_always_in_unit_interval(
            a in 0.0..1e9f64,
            b in 0.0..1e9f64,
            c in 0.0..1e9f64,
            d in 0.0..1e9f64,
        ) {
            let ratio = NexusComponents::new(a, b, c, d).ratio();
            prop_assert!((0.0..=1.0).contains(&ratio));
        }

        #[test]
        fn ratio_matches_formula_when_denominator_positive(
            a in 0.0..1e9f64,
            b in 0.0..1e9f64,
            c in 0.01..1e9f64,
            d in 0.0..1e9f64,
        ) {
            let ratio = NexusComponents::new(a, b, c, d).ratio();
            let expected = (((a + b) * 1.3) / (a + b + c + d)).min(1.0);
            prop_assert!((ratio - expected).abs() < 1e-12);
        }
    }
}
