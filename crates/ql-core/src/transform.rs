//! Non-centered hierarchical transform.
//!
//! For each group: `dispersion = scale * tan(sd_unif)` and
//! `value[s] = mean + dispersion * raw[s]`. The same routine runs for all
//! three groups.

use crate::error::ModelError;
use crate::params::{GroupDraw, ParameterDraw, ParameterGroup};
use ql_config::PriorSettings;
use ql_math::{inv_logit, tan_scale_transform};

/// One group mapped into model space.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTransform {
    pub dispersion: f64,
    /// `log |d dispersion / d sd_unif|`. Only added to the density when the
    /// dispersion prior is stated on the dispersion itself.
    pub log_jacobian: f64,
    /// Per-subject values, `mean + dispersion * raw[s]`.
    pub values: Vec<f64>,
}

/// Transform one group. Rejects non-finite inputs and a pretransform outside
/// `[0, π/2)` or one whose dispersion overflows.
pub fn transform_group(
    group: ParameterGroup,
    draw: &GroupDraw,
    scale: f64,
) -> Result<GroupTransform, ModelError> {
    if !draw.mean.is_finite() {
        return Err(ModelError::NonFinite {
            parameter: format!("{}_mean", group),
            value: draw.mean,
        });
    }

    let (dispersion, log_jacobian) = tan_scale_transform(draw.sd_unif, scale).ok_or(
        ModelError::DegenerateDispersion {
            group,
            value: draw.sd_unif,
        },
    )?;

    let mut values = Vec::with_capacity(draw.raw.len());
    for (s, &raw) in draw.raw.iter().enumerate() {
        let value = draw.mean + dispersion * raw;
        if !value.is_finite() {
            return Err(ModelError::NonFinite {
                parameter: format!("{}[{}]", group, s + 1),
                value,
            });
        }
        values.push(value);
    }

    Ok(GroupTransform {
        dispersion,
        log_jacobian,
        values,
    })
}

/// Model-space parameters of one subject.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubjectParameters {
    pub itemp: f64,
    pub beta_int: f64,
    pub beta_reward: f64,
}

impl SubjectParameters {
    /// Learning rate after an outcome of `reward` (0 or 1).
    pub fn learning_rate(&self, reward: u8) -> f64 {
        inv_logit(self.beta_int + self.beta_reward * f64::from(reward))
    }
}

/// All three groups mapped into model space.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedParameters {
    pub itemp: GroupTransform,
    pub beta_int: GroupTransform,
    pub beta_reward: GroupTransform,
}

impl TransformedParameters {
    pub fn group(&self, group: ParameterGroup) -> &GroupTransform {
        match group {
            ParameterGroup::Itemp => &self.itemp,
            ParameterGroup::BetaInt => &self.beta_int,
            ParameterGroup::BetaReward => &self.beta_reward,
        }
    }

    pub fn num_subjects(&self) -> usize {
        self.itemp.values.len()
    }

    /// Parameters of subject `s` (0-based).
    ///
    /// # Panics
    /// If `s` is out of range.
    pub fn subject(&self, s: usize) -> SubjectParameters {
        SubjectParameters {
            itemp: self.itemp.values[s],
            beta_int: self.beta_int.values[s],
            beta_reward: self.beta_reward.values[s],
        }
    }

    /// Sum of the three groups' log-Jacobian terms.
    pub fn log_jacobian(&self) -> f64 {
        ParameterGroup::ALL
            .iter()
            .map(|&g| self.group(g).log_jacobian)
            .sum()
    }
}

/// Transform a full draw.
pub fn transform(
    draw: &ParameterDraw,
    priors: &PriorSettings,
) -> Result<TransformedParameters, ModelError> {
    draw.check_subjects(draw.num_subjects())?;
    let scale = priors.dispersion_scale;
    Ok(TransformedParameters {
        itemp: transform_group(ParameterGroup::Itemp, &draw.itemp, scale)?,
        beta_int: transform_group(ParameterGroup::BetaInt, &draw.beta_int, scale)?,
        beta_reward: transform_group(ParameterGroup::BetaReward, &draw.beta_reward, scale)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn test_non_centered_values() {
        let draw = GroupDraw::new(1.0, FRAC_PI_4, vec![-1.0, 0.0, 0.5]);
        let g = transform_group(ParameterGroup::Itemp, &draw, 5.0).unwrap();
        assert!((g.dispersion - 5.0).abs() < 1e-12);
        assert!((g.values[0] - (-4.0)).abs() < 1e-12);
        assert_eq!(g.values[1], 1.0);
        assert!((g.values[2] - 3.5).abs() < 1e-12);
        // cos(π/4)^2 = 1/2
        assert!((g.log_jacobian - (5.0f64.ln() - 0.5f64.ln())).abs() < 1e-12);
    }

    #[test]
    fn test_zero_pretransform_collapses_group() {
        let draw = GroupDraw::new(0.3, 0.0, vec![10.0, -10.0]);
        let g = transform_group(ParameterGroup::BetaInt, &draw, 5.0).unwrap();
        assert_eq!(g.dispersion, 0.0);
        assert_eq!(g.values, vec![0.3, 0.3]);
    }

    #[test]
    fn test_pretransform_out_of_support() {
        for u in [-0.1, std::f64::consts::FRAC_PI_2, 2.0, f64::NAN] {
            let draw = GroupDraw::new(0.0, u, vec![0.0]);
            let err = transform_group(ParameterGroup::BetaReward, &draw, 5.0).unwrap_err();
            assert!(matches!(
                err,
                ModelError::DegenerateDispersion {
                    group: ParameterGroup::BetaReward,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_non_finite_mean_and_deviate() {
        let draw = GroupDraw::new(f64::INFINITY, 0.5, vec![0.0]);
        assert!(matches!(
            transform_group(ParameterGroup::Itemp, &draw, 5.0),
            Err(ModelError::NonFinite { .. })
        ));

        let draw = GroupDraw::new(0.0, 0.5, vec![0.0, f64::NAN]);
        match transform_group(ParameterGroup::Itemp, &draw, 5.0) {
            Err(ModelError::NonFinite { parameter, .. }) => assert_eq!(parameter, "itemp[2]"),
            other => panic!("expected NonFinite, got {:?}", other),
        }
    }

    #[test]
    fn test_learning_rate() {
        let p = SubjectParameters {
            itemp: 1.0,
            beta_int: 0.0,
            beta_reward: 2.0,
        };
        assert_eq!(p.learning_rate(0), 0.5);
        assert!((p.learning_rate(1) - 1.0 / (1.0 + (-2.0f64).exp())).abs() < 1e-15);
    }

    #[test]
    fn test_full_transform_subjects() {
        let draw = ParameterDraw {
            itemp: GroupDraw::new(1.0, 0.0, vec![0.0, 0.0]),
            beta_int: GroupDraw::new(-0.5, 0.0, vec![0.0, 0.0]),
            beta_reward: GroupDraw::new(0.25, 0.0, vec![0.0, 0.0]),
        };
        let t = transform(&draw, &PriorSettings::default()).unwrap();
        assert_eq!(t.num_subjects(), 2);
        assert_eq!(
            t.subject(1),
            SubjectParameters {
                itemp: 1.0,
                beta_int: -0.5,
                beta_reward: 0.25
            }
        );
        let expected = 3.0 * 5.0f64.ln();
        assert!((t.log_jacobian() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_transform_rejects_ragged_draw() {
        let draw = ParameterDraw {
            itemp: GroupDraw::new(1.0, 0.0, vec![0.0, 0.0]),
            beta_int: GroupDraw::new(0.0, 0.0, vec![0.0]),
            beta_reward: GroupDraw::new(0.0, 0.0, vec![0.0, 0.0]),
        };
        assert!(matches!(
            transform(&draw, &PriorSettings::default()),
            Err(ModelError::GroupLengthMismatch {
                group: ParameterGroup::BetaInt,
                ..
            })
        ));
    }
}
