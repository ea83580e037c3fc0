//! Errors raised while turning a parameter vector into a density.
//!
//! None of these abort sampling: [`crate::LogDensity::log_density`] maps every
//! variant to negative infinity so the engine rejects the proposal.

use crate::params::ParameterGroup;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("parameter vector has length {actual}, expected {expected} for {num_subjects} subjects")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        num_subjects: usize,
    },

    #[error("{group} raw deviates have length {actual}, expected {expected}")]
    GroupLengthMismatch {
        group: ParameterGroup,
        expected: usize,
        actual: usize,
    },

    #[error("{parameter} is not finite: {value}")]
    NonFinite { parameter: String, value: f64 },

    #[error("{group} dispersion pretransform {value} is outside [0, pi/2) or overflows")]
    DegenerateDispersion { group: ParameterGroup, value: f64 },

    #[error("log density is not finite: {value}")]
    NonFiniteDensity { value: f64 },

    #[error("invalid model configuration: {0}")]
    Config(#[from] ql_config::ValidationError),
}

/// A batch of draws failed; `index` is the first invalid draw in input order.
#[derive(Debug, Error)]
#[error("invalid draw {index}: {source}")]
pub struct DrawError {
    pub index: usize,
    #[source]
    pub source: ModelError,
}
