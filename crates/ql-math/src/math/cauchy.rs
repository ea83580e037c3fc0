//! Half-Cauchy scale priors and the tangent construction.
//!
//! If `u ~ Uniform(0, π/2)` then `scale · tan(u) ~ HalfCauchy(0, scale)`.
//! Sampling the bounded `u` and mapping it through the tangent gives the
//! heavy-tailed prior without an unbounded sampler coordinate.

use super::stable::LOG_TWO_OVER_PI;
use std::f64::consts::FRAC_PI_2;

/// log HalfCauchy(x; 0, scale) for x >= 0.
///
/// Returns NEG_INFINITY for negative `x`, NAN for a non-positive scale.
pub fn half_cauchy_lpdf(x: f64, scale: f64) -> f64 {
    if x.is_nan() || scale.is_nan() || scale <= 0.0 {
        return f64::NAN;
    }
    if x < 0.0 {
        return f64::NEG_INFINITY;
    }
    let z = x / scale;
    LOG_TWO_OVER_PI - scale.ln() - (z * z).ln_1p()
}

/// log Uniform(u; 0, π/2) on the half-open support `[0, π/2)`.
pub fn uniform_quarter_turn_lpdf(u: f64) -> f64 {
    if u.is_nan() {
        return f64::NAN;
    }
    if (0.0..FRAC_PI_2).contains(&u) {
        LOG_TWO_OVER_PI
    } else {
        f64::NEG_INFINITY
    }
}

/// Map `u ∈ [0, π/2)` to `scale · tan(u)`.
///
/// Returns the mapped value and `log |dx/du| = ln(scale) - 2 ln cos(u)`.
/// A density stated over `x` becomes a density over the sampler coordinate
/// `u` by adding this term. Returns None outside the support or if the
/// mapped value overflows.
pub fn tan_scale_transform(u: f64, scale: f64) -> Option<(f64, f64)> {
    if !(0.0..FRAC_PI_2).contains(&u) || !scale.is_finite() || scale <= 0.0 {
        return None;
    }
    let x = scale * u.tan();
    if !x.is_finite() {
        return None;
    }
    let cos = u.cos();
    let log_jacobian = scale.ln() - 2.0 * cos.ln();
    if !log_jacobian.is_finite() {
        return None;
    }
    Some((x, log_jacobian))
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
    fn half_cauchy_at_zero() {
        let expected = (2.0 / (std::f64::consts::PI * 5.0)).ln();
        assert!(approx_eq(half_cauchy_lpdf(0.0, 5.0), expected, 1e-15));
    }

    #[test]
    fn half_cauchy_at_scale_is_half_peak() {
        let peak = half_cauchy_lpdf(0.0, 5.0);
        assert!(approx_eq(half_cauchy_lpdf(5.0, 5.0), peak - 2.0f64.ln(), 1e-14));
    }

    #[test]
    fn half_cauchy_negative_support() {
        assert_eq!(half_cauchy_lpdf(-1.0, 5.0), f64::NEG_INFINITY);
        assert!(half_cauchy_lpdf(1.0, 0.0).is_nan());
    }

    #[test]
    fn uniform_support() {
        assert!(approx_eq(uniform_quarter_turn_lpdf(0.0), LOG_TWO_OVER_PI, 0.0));
        assert_eq!(uniform_quarter_turn_lpdf(FRAC_PI_2), f64::NEG_INFINITY);
        assert_eq!(uniform_quarter_turn_lpdf(-1e-12), f64::NEG_INFINITY);
    }

    #[test]
    fn tan_transform_values() {
        let (x, lj) = tan_scale_transform(0.0, 5.0).unwrap();
        assert_eq!(x, 0.0);
        assert!(approx_eq(lj, 5.0f64.ln(), 1e-15));

        let u = std::f64::consts::FRAC_PI_4;
        let (x, _) = tan_scale_transform(u, 5.0).unwrap();
        assert!(approx_eq(x, 5.0, 1e-12));
    }

    #[test]
    fn tan_transform_rejects_boundary() {
        assert!(tan_scale_transform(FRAC_PI_2, 5.0).is_none());
        assert!(tan_scale_transform(-0.1, 5.0).is_none());
        assert!(tan_scale_transform(f64::NAN, 5.0).is_none());
        assert!(tan_scale_transform(0.3, 0.0).is_none());
    }

    #[test]
    fn half_cauchy_plus_jacobian_is_uniform() {
        for u in [0.0, 0.1, 0.7, 1.2, 1.5] {
            let (x, lj) = tan_scale_transform(u, 5.0).unwrap();
            let via_x = half_cauchy_lpdf(x, 5.0) + lj;
            assert!(approx_eq(via_x, uniform_quarter_turn_lpdf(u), 1e-10), "u={u}");
        }
    }

    #[test]
    fn jacobian_grows_toward_the_pole() {
        let (_, near_zero) = tan_scale_transform(0.1, 5.0).unwrap();
        let (_, near_pole) = tan_scale_transform(1.5, 5.0).unwrap();
        assert!(near_pole > near_zero);
    }
}
