//! Bernoulli likelihood under a logit parameterization.
//!
//! A binary choice `y ∈ {0, 1}` with log-odds `η` has
//! - `P(y = 1) = inv_logit(η)`
//! - `P(y = 0) = 1 - inv_logit(η)`
//!
//! Both branches are evaluated through the softplus form so that no single
//! observation can overflow for large |η|.

use super::stable::{log1m_inv_logit, log_inv_logit};

/// Log probability mass of `y` under Bernoulli(inv_logit(logit)).
///
/// Returns NAN for outcomes other than 0 or 1, or a NaN logit.
///
/// # Example
/// ```
/// use ql_math::bernoulli_logit_lpmf;
///
/// let lp = bernoulli_logit_lpmf(1, 0.0);
/// assert!((lp - 0.5f64.ln()).abs() < 1e-15);
/// ```
pub fn bernoulli_logit_lpmf(y: u8, logit: f64) -> f64 {
    match y {
        1 => log_inv_logit(logit),
        0 => log1m_inv_logit(logit),
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        (a - b).abs() <= tol
    }

    #[test]
    fn zero_logit_is_coin_flip() {
        assert!(approx_eq(bernoulli_logit_lpmf(1, 0.0), 0.5f64.ln(), 1e-15));
        assert!(approx_eq(bernoulli_logit_lpmf(0, 0.0), 0.5f64.ln(), 1e-15));
    }

    #[test]
    fn matches_naive_formula_in_safe_range() {
        for logit in [-5.0f64, -1.0, -0.25, 0.5, 3.0] {
            let p1: f64 = 1.0 / (1.0 + (-logit).exp());
            assert!(approx_eq(bernoulli_logit_lpmf(1, logit), p1.ln(), 1e-12));
            assert!(approx_eq(bernoulli_logit_lpmf(0, logit), (1.0 - p1).ln(), 1e-12));
        }
    }

    #[test]
    fn extreme_logits_stay_finite() {
        let lp = bernoulli_logit_lpmf(0, 1.0e4);
        assert!(lp.is_finite());
        assert!(approx_eq(lp, -1.0e4, 1e-6));

        let lp = bernoulli_logit_lpmf(1, -1.0e4);
        assert!(lp.is_finite());
        assert!(approx_eq(lp, -1.0e4, 1e-6));

        let lp = bernoulli_logit_lpmf(1, 1.0e4);
        assert!(lp <= 0.0 && lp > -1e-300);
    }

    #[test]
    fn invalid_outcome_is_nan() {
        assert!(bernoulli_logit_lpmf(2, 0.0).is_nan());
    }

    #[test]
    fn nan_logit_propagates() {
        assert!(bernoulli_logit_lpmf(1, f64::NAN).is_nan());
    }
}
