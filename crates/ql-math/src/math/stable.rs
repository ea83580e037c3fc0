//! Numerically stable primitives for log-domain logistic math.

/// 0.5 * ln(2*pi)
pub const LOG_SQRT_2PI: f64 = 0.918_938_533_204_672_8;

/// ln(2/pi)
pub const LOG_TWO_OVER_PI: f64 = -0.451_582_705_289_454_8;

/// Stable log(1 + exp(x)) (softplus).
///
/// Never exponentiates a positive argument, so large |x| neither overflows
/// nor loses the linear tail. NaN propagates.
pub fn log1p_exp(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

/// Logistic sigmoid 1 / (1 + exp(-x)).
///
/// Evaluated on the branch that keeps the exponent non-positive.
pub fn inv_logit(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Stable log(inv_logit(x)) = -log1p_exp(-x).
pub fn log_inv_logit(x: f64) -> f64 {
    -log1p_exp(-x)
}

/// Stable log(1 - inv_logit(x)) = -log1p_exp(x).
pub fn log1m_inv_logit(x: f64) -> f64 {
    -log1p_exp(x)
}
