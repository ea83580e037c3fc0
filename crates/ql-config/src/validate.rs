//! Configuration validation errors and semantic validation.

use thiserror::Error;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Validate a model configuration semantically.
pub fn validate_model_config(config: &crate::model::ModelConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    validate_positive_scale("priors.group_mean_sd", config.priors.group_mean_sd)?;
    validate_positive_scale("priors.raw_sd", config.priors.raw_sd)?;
    validate_positive_scale("priors.dispersion_scale", config.priors.dispersion_scale)?;

    Ok(())
}

/// Scales must be finite and strictly positive.
fn validate_positive_scale(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("Must be finite, got {}", value),
        });
    }

    if value <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("Must be positive, got {}", value),
        });
    }

    Ok(())
}
