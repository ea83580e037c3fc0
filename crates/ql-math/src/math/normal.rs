//! Normal log densities, normalizing constant included.

use super::stable::LOG_SQRT_2PI;

/// log N(x; mu, sigma).
///
/// Returns NAN when `sigma` is not a positive finite number.
pub fn normal_lpdf(x: f64, mu: f64, sigma: f64) -> f64 {
    if sigma.is_nan() || sigma <= 0.0 || sigma.is_infinite() {
        return f64::NAN;
    }
    let z = (x - mu) / sigma;
    -LOG_SQRT_2PI - sigma.ln() - 0.5 * z * z
}

/// Sum of log N(x_i; 0, sigma) over a slice.
pub fn normal_lpdf_sum(values: &[f64], mu: f64, sigma: f64) -> f64 {
    if sigma.is_nan() || sigma <= 0.0 || sigma.is_infinite() {
        return f64::NAN;
    }
    let n = values.len() as f64;
    let sq: f64 = values
        .iter()
        .map(|x| {
            let z = (x - mu) / sigma;
            z * z
        })
        .sum();
    -n * (LOG_SQRT_2PI + sigma.ln()) - 0.5 * sq
}
