//! Flat sampler vectors and typed parameter draws.
//!
//! The sampler sees one unconstrained vector of length `6 + 3S`. Each of the
//! three groups owns a contiguous block `[mean, sd_unif, raw[1..S]]`, in the
//! order itemp, beta_int, beta_reward.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three hierarchical parameter groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterGroup {
    /// Inverse temperature of the choice rule.
    Itemp,
    /// Learning-rate intercept on the logit scale.
    BetaInt,
    /// Learning-rate reward coefficient on the logit scale.
    BetaReward,
}

impl ParameterGroup {
    /// All groups in flat-layout order.
    pub const ALL: [ParameterGroup; 3] = [
        ParameterGroup::Itemp,
        ParameterGroup::BetaInt,
        ParameterGroup::BetaReward,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ParameterGroup::Itemp => "itemp",
            ParameterGroup::BetaInt => "beta_int",
            ParameterGroup::BetaReward => "beta_reward",
        }
    }

    /// Position of this group's block in the flat layout.
    pub fn ordinal(self) -> usize {
        match self {
            ParameterGroup::Itemp => 0,
            ParameterGroup::BetaInt => 1,
            ParameterGroup::BetaReward => 2,
        }
    }
}

impl fmt::Display for ParameterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One group's sampler-space values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDraw {
    pub mean: f64,
    /// Dispersion pretransform, valid on `[0, π/2)`.
    pub sd_unif: f64,
    /// Per-subject standard-normal deviates.
    pub raw: Vec<f64>,
}

impl GroupDraw {
    pub fn new(mean: f64, sd_unif: f64, raw: Vec<f64>) -> Self {
        GroupDraw { mean, sd_unif, raw }
    }
}

/// A full typed draw: one [`GroupDraw`] per group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDraw {
    pub itemp: GroupDraw,
    pub beta_int: GroupDraw,
    pub beta_reward: GroupDraw,
}

impl ParameterDraw {
    pub fn group(&self, group: ParameterGroup) -> &GroupDraw {
        match group {
            ParameterGroup::Itemp => &self.itemp,
            ParameterGroup::BetaInt => &self.beta_int,
            ParameterGroup::BetaReward => &self.beta_reward,
        }
    }

    /// Subject count implied by the itemp block.
    pub fn num_subjects(&self) -> usize {
        self.itemp.raw.len()
    }

    /// Check that every group carries exactly `num_subjects` deviates.
    pub fn check_subjects(&self, num_subjects: usize) -> Result<(), ModelError> {
        for group in ParameterGroup::ALL {
            let actual = self.group(group).raw.len();
            if actual != num_subjects {
                return Err(ModelError::GroupLengthMismatch {
                    group,
                    expected: num_subjects,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Split a flat sampler vector into a typed draw.
    pub fn from_slice(values: &[f64], num_subjects: usize) -> Result<Self, ModelError> {
        let layout = ParameterLayout::new(num_subjects);
        if values.len() != layout.dim() {
            return Err(ModelError::DimensionMismatch {
                expected: layout.dim(),
                actual: values.len(),
                num_subjects,
            });
        }

        let block = |group: ParameterGroup| {
            let start = layout.mean_index(group);
            GroupDraw {
                mean: values[start],
                sd_unif: values[start + 1],
                raw: values[start + 2..start + layout.block_len()].to_vec(),
            }
        };

        Ok(ParameterDraw {
            itemp: block(ParameterGroup::Itemp),
            beta_int: block(ParameterGroup::BetaInt),
            beta_reward: block(ParameterGroup::BetaReward),
        })
    }

    /// Flatten back into sampler order.
    pub fn to_vec(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(3 * (2 + self.num_subjects()));
        for group in ParameterGroup::ALL {
            let g = self.group(group);
            out.push(g.mean);
            out.push(g.sd_unif);
            out.extend_from_slice(&g.raw);
        }
        out
    }
}

/// Index arithmetic for the flat layout of a fixed subject count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterLayout {
    num_subjects: usize,
}

impl ParameterLayout {
    pub fn new(num_subjects: usize) -> Self {
        ParameterLayout { num_subjects }
    }

    pub fn num_subjects(&self) -> usize {
        self.num_subjects
    }

    /// Length of one group's block.
    pub fn block_len(&self) -> usize {
        2 + self.num_subjects
    }

    /// Total vector length, `6 + 3S`.
    pub fn dim(&self) -> usize {
        3 * self.block_len()
    }

    pub fn mean_index(&self, group: ParameterGroup) -> usize {
        group.ordinal() * self.block_len()
    }

    pub fn sd_unif_index(&self, group: ParameterGroup) -> usize {
        self.mean_index(group) + 1
    }

    /// Index of subject `s` (0-based) in a group's raw block.
    pub fn raw_index(&self, group: ParameterGroup, s: usize) -> Option<usize> {
        (s < self.num_subjects).then(|| self.mean_index(group) + 2 + s)
    }

    /// Names in flat order, with 1-based subject subscripts.
    pub fn parameter_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.dim());
        for group in ParameterGroup::ALL {
            names.push(format!("{}_mean", group));
            names.push(format!("{}_sd_unif", group));
            names.extend((1..=self.num_subjects).map(|s| format!("{}_raw[{}]", group, s)));
        }
        names
    }
}
