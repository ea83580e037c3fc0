//! Log-posterior density of the hierarchical bandit model.
//!
//! The density is a sum of three parts:
//! - priors: group means `~ Normal(0, group_mean_sd)`, raw deviates
//!   `~ Normal(0, raw_sd)`, and one dispersion term per group
//! - the dispersion log-Jacobian, only when
//!   `priors.include_dispersion_jacobian` is set
//! - the choice log-likelihood over all subjects and trials
//!
//! The sampler coordinate is always the pretransform `sd_unif`. By default
//! its prior is `Uniform(0, π/2)`, which implies `HalfCauchy(0, scale)` on the
//! dispersion. With the Jacobian flag the prior is written on the dispersion
//! as `HalfCauchy(0, scale)` and `log |d sd / d sd_unif|` is added. Both forms
//! give the same density up to rounding.
//!
//! [`HierarchicalModel`] owns no mutable state. It can be shared across
//! chains and threads and evaluated concurrently.

use crate::dataset::TrialDataset;
use crate::error::ModelError;
use crate::likelihood::total_log_likelihood;
use crate::params::{GroupDraw, ParameterDraw, ParameterGroup, ParameterLayout};
use crate::transform::{transform, GroupTransform, TransformedParameters};
use ql_config::{validate_model_config, ModelConfig, PriorSettings};
use ql_math::{half_cauchy_lpdf, normal_lpdf, normal_lpdf_sum, uniform_quarter_turn_lpdf};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// The seam a posterior engine drives.
pub trait LogDensity: Send + Sync {
    /// Length of the flat parameter vector.
    fn dim(&self) -> usize;

    /// Name of each coordinate, in order.
    fn parameter_names(&self) -> Vec<String>;

    /// Total log density at `position`. Invalid positions return
    /// `f64::NEG_INFINITY` rather than an error so the engine rejects them.
    fn log_density(&self, position: &[f64]) -> f64;
}

/// Prior contributions of one group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupPriorTerms {
    pub mean: f64,
    pub raw: f64,
    /// Uniform term on `sd_unif`, or the half-Cauchy term on the dispersion
    /// when the Jacobian flag is set.
    pub dispersion: f64,
    /// Dispersion log-Jacobian as applied (0 when disabled).
    pub log_jacobian: f64,
}

impl GroupPriorTerms {
    fn compute(draw: &GroupDraw, transformed: &GroupTransform, priors: &PriorSettings) -> Self {
        let (dispersion, log_jacobian) = if priors.include_dispersion_jacobian {
            (
                half_cauchy_lpdf(transformed.dispersion, priors.dispersion_scale),
                transformed.log_jacobian,
            )
        } else {
            (uniform_quarter_turn_lpdf(draw.sd_unif), 0.0)
        };
        GroupPriorTerms {
            mean: normal_lpdf(draw.mean, 0.0, priors.group_mean_sd),
            raw: normal_lpdf_sum(&draw.raw, 0.0, priors.raw_sd),
            dispersion,
            log_jacobian,
        }
    }

    pub fn log_prior(&self) -> f64 {
        self.mean + self.raw + self.dispersion
    }

    /// Everything this group contributes to the total.
    pub fn total(&self) -> f64 {
        self.log_prior() + self.log_jacobian
    }
}

/// Density split into its components.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityBreakdown {
    pub itemp: GroupPriorTerms,
    pub beta_int: GroupPriorTerms,
    pub beta_reward: GroupPriorTerms,
    pub log_prior: f64,
    pub log_jacobian: f64,
    pub log_likelihood: f64,
    pub total: f64,
}

impl DensityBreakdown {
    pub fn group(&self, group: ParameterGroup) -> &GroupPriorTerms {
        match group {
            ParameterGroup::Itemp => &self.itemp,
            ParameterGroup::BetaInt => &self.beta_int,
            ParameterGroup::BetaReward => &self.beta_reward,
        }
    }
}

/// Dataset plus configuration: a complete model ready for evaluation.
#[derive(Debug, Clone)]
pub struct HierarchicalModel {
    dataset: Arc<TrialDataset>,
    config: ModelConfig,
    layout: ParameterLayout,
}

impl HierarchicalModel {
    /// Validates the configuration once up front.
    pub fn new(
        dataset: impl Into<Arc<TrialDataset>>,
        config: ModelConfig,
    ) -> Result<Self, ModelError> {
        validate_model_config(&config)?;
        let dataset = dataset.into();
        let layout = ParameterLayout::new(dataset.num_subjects());
        Ok(HierarchicalModel {
            dataset,
            config,
            layout,
        })
    }

    pub fn dataset(&self) -> &TrialDataset {
        &self.dataset
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn layout(&self) -> ParameterLayout {
        self.layout
    }

    /// Whether subjects are evaluated on the rayon pool.
    pub fn is_parallel(&self) -> bool {
        self.config.parallel_for(self.dataset.num_subjects())
    }

    /// Split a flat position into a typed draw for this dataset.
    pub fn parse_draw(&self, position: &[f64]) -> Result<ParameterDraw, ModelError> {
        ParameterDraw::from_slice(position, self.dataset.num_subjects())
    }

    /// Map a draw into model space.
    pub fn transform(&self, draw: &ParameterDraw) -> Result<TransformedParameters, ModelError> {
        draw.check_subjects(self.dataset.num_subjects())?;
        transform(draw, &self.config.priors)
    }

    /// Evaluate every density component for one draw.
    pub fn density_breakdown(&self, draw: &ParameterDraw) -> Result<DensityBreakdown, ModelError> {
        let transformed = self.transform(draw)?;
        let priors = &self.config.priors;

        let terms = |group: ParameterGroup| {
            GroupPriorTerms::compute(draw.group(group), transformed.group(group), priors)
        };
        let itemp = terms(ParameterGroup::Itemp);
        let beta_int = terms(ParameterGroup::BetaInt);
        let beta_reward = terms(ParameterGroup::BetaReward);

        let log_prior = itemp.log_prior() + beta_int.log_prior() + beta_reward.log_prior();
        let log_jacobian = itemp.log_jacobian + beta_int.log_jacobian + beta_reward.log_jacobian;
        let log_likelihood = total_log_likelihood(&self.dataset, &transformed, self.is_parallel());
        let total = log_prior + log_jacobian + log_likelihood;

        if !total.is_finite() {
            return Err(ModelError::NonFiniteDensity { value: total });
        }

        Ok(DensityBreakdown {
            itemp,
            beta_int,
            beta_reward,
            log_prior,
            log_jacobian,
            log_likelihood,
            total,
        })
    }

    /// Total log density, with the reason when the position is invalid.
    pub fn try_log_density(&self, position: &[f64]) -> Result<f64, ModelError> {
        let draw = self.parse_draw(position)?;
        Ok(self.density_breakdown(&draw)?.total)
    }
}

impl LogDensity for HierarchicalModel {
    fn dim(&self) -> usize {
        self.layout.dim()
    }

    fn parameter_names(&self) -> Vec<String> {
        self.layout.parameter_names()
    }

    fn log_density(&self, position: &[f64]) -> f64 {
        match self.try_log_density(position) {
            Ok(total) => total,
            Err(e) => {
                debug!(error = %e, "rejecting position");
                f64::NEG_INFINITY
            }
        }
    }
}
