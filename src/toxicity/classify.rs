//! Bulk volume classification
//!
//! Splits each bar's volume into buy and sell pressure with
//! P(buy) = N(dP / sigma), where dP is the close-to-close change and sigma
//! the standard deviation of dP over the whole input.

use super::Bar;
use crate::series::stats::sample_std;

/// Stand-in for a zero price-change deviation
pub const SIGMA_FLOOR: f64 = 1e-12;

/// Buy probability per bar; the first bar has no price change and is `None`
pub fn buy_probabilities(bars: &[Bar]) -> Vec<Option<f64>> {
    if bars.is_empty() {
        return Vec::new();
    }

    let deltas: Vec<f64> = bars.windows(2).map(|w| w[1].close - w[0].close).collect();
    let sigma = match sample_std(&deltas) {
        Some(s) if s > SIGMA_FLOOR => s,
        _ => SIGMA_FLOOR,
    };

    std::iter::once(None)
        .chain(deltas.iter().map(|d| Some(normal_cdf(d / sigma))))
        .collect()
}

/// Standard normal CDF approximation (Abramowitz and Stegun 7.1.26)
pub fn normal_cdf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs() / std::f64::consts::SQRT_2;

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    0.5 * (1.0 + sign * y)
}
