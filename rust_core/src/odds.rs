//! American odds arithmetic: implied probability, no-vig devigging,
//! expected value and Kelly staking.
//!
//! Prices follow the US convention: -110 risks 110 to win 100, +120 risks
//! 100 to win 120. Probabilities are fractions in [0, 1].

use std::f64::consts::SQRT_2;

/// Error function, Abramowitz & Stegun 7.1.26 rational approximation.
/// Max absolute error 1.5e-7, far below the precision anything downstream
/// reports.
#[inline]
pub fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// P(Z <= z) for a standard normal.
#[inline]
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / SQRT_2))
}

/// Implied win probability of an American price, vig included.
pub fn american_to_prob(price: i32) -> f64 {
    let p = f64::from(price);
    if price < 0 {
        p.abs() / (p.abs() + 100.0)
    } else {
        100.0 / (p + 100.0)
    }
}

/// A two-way market with the book's margin stripped out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoVigMarket {
    pub prob_a: f64,
    pub prob_b: f64,
    /// Book hold in percent. Zero for an arb-free pair of prices.
    pub hold_pct: f64,
}

/// No-vig probabilities for a two-way market by proportional
/// normalization of the raw implied probabilities.
pub fn no_vig_two_way(price_a: i32, price_b: i32) -> NoVigMarket {
    let raw_a = american_to_prob(price_a);
    let raw_b = american_to_prob(price_b);
    let sum = raw_a + raw_b;
    if sum <= 0.0 {
        return NoVigMarket {
            prob_a: 0.5,
            prob_b: 0.5,
            hold_pct: 0.0,
        };
    }
    NoVigMarket {
        prob_a: raw_a / sum,
        prob_b: raw_b / sum,
        hold_pct: (sum - 1.0).max(0.0) * 100.0,
    }
}

/// Expected value percent (per unit risked) and full-Kelly fraction for a
/// win probability at an American price. The probability is clamped to
/// [0.01, 0.99] before sizing; Kelly is floored at zero.
pub fn ev_and_kelly(win_prob: f64, price: i32) -> (f64, f64) {
    let (win, loss) = if price >= 0 {
        (f64::from(price), 100.0)
    } else {
        (100.0, f64::from(price.abs()))
    };
    let p = win_prob.clamp(0.01, 0.99);
    let q = 1.0 - p;
    let b = win / loss;

    let ev = p * win - q * loss;
    let ev_pct = ev / loss * 100.0;
    let kelly = if b > 0.0 {
        ((b * p - q) / b).max(0.0)
    } else {
        0.0
    };
    (ev_pct, kelly)
}
