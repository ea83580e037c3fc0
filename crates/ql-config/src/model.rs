//! Model configuration types.
//!
//! These types match the model.json layout. Every field has a default, so an
//! empty object `{}` with only a schema version is a complete configuration.

use serde::{Deserialize, Serialize};

/// Complete model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub priors: PriorSettings,

    #[serde(default)]
    pub execution: ExecutionSettings,
}

/// Prior hyperparameters shared by the three parameter groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorSettings {
    /// Standard deviation of the Normal(0, sd) prior on each group mean.
    #[serde(default = "default_group_mean_sd")]
    pub group_mean_sd: f64,

    /// Standard deviation of the Normal(0, sd) prior on per-subject raw deviates.
    #[serde(default = "default_raw_sd")]
    pub raw_sd: f64,

    /// Scale of the implied half-Cauchy prior on each group dispersion
    /// (`dispersion = scale * tan(sd_unif)`).
    #[serde(default = "default_dispersion_scale")]
    pub dispersion_scale: f64,

    /// State the dispersion prior on the dispersion and add the log-Jacobian
    /// of the tangent map once per group.
    ///
    /// The sampler coordinate is `sd_unif` either way. `false` puts a uniform
    /// prior on `sd_unif`, which implies half-Cauchy on the dispersion. `true`
    /// writes `HalfCauchy(0, dispersion_scale)` on the dispersion and adds
    /// `log |d dispersion / d sd_unif|`. The two agree up to rounding, so the
    /// flag only changes how the breakdown splits the dispersion term.
    #[serde(default)]
    pub include_dispersion_jacobian: bool,
}

/// Execution knobs for the density evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSettings {
    /// Subjects are evaluated in parallel once the dataset has at least this
    /// many. Below it evaluation is sequential. 0 disables parallelism.
    #[serde(default = "default_parallel_min_subjects")]
    pub parallel_min_subjects: usize,
}

fn default_group_mean_sd() -> f64 {
    100.0
}

fn default_raw_sd() -> f64 {
    1.0
}

fn default_dispersion_scale() -> f64 {
    5.0
}

fn default_parallel_min_subjects() -> usize {
    16
}

impl Default for PriorSettings {
    fn default() -> Self {
        PriorSettings {
            group_mean_sd: default_group_mean_sd(),
            raw_sd: default_raw_sd(),
            dispersion_scale: default_dispersion_scale(),
            include_dispersion_jacobian: false,
        }
    }
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        ExecutionSettings {
            parallel_min_subjects: default_parallel_min_subjects(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            description: None,
            priors: PriorSettings::default(),
            execution: ExecutionSettings::default(),
        }
    }
}

impl ModelConfig {
    /// Load model configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, crate::validate::ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::validate::ValidationError::IoError(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json(&content)
    }

    /// Parse model configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, crate::validate::ValidationError> {
        serde_json::from_str(json).map_err(|e| {
            crate::validate::ValidationError::ParseError(format!("Invalid JSON: {}", e))
        })
    }

    /// Whether a dataset with `num_subjects` subjects should be evaluated in parallel.
    pub fn parallel_for(&self, num_subjects: usize) -> bool {
        self.execution.parallel_min_subjects > 0
            && num_subjects >= self.execution.parallel_min_subjects
    }

    /// Builder: toggle the dispersion Jacobian term.
    pub fn with_dispersion_jacobian(mut self, enabled: bool) -> Self {
        self.priors.include_dispersion_jacobian = enabled;
        self
    }

    /// Builder: set the parallel threshold.
    pub fn with_parallel_min_subjects(mut self, threshold: usize) -> Self {
        self.execution.parallel_min_subjects = threshold;
        self
    }
}
