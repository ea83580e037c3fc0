//! Choice likelihood.
//!
//! `respond_left ~ BernoulliLogit(itemp * (q[left] - q[right]))`, evaluated on
//! the pre-update Q-values of each trial.

use crate::dataset::TrialDataset;
use crate::recurrence::{run_subject, TrialObserver, TrialStep};
use crate::transform::{SubjectParameters, TransformedParameters};
use ql_math::bernoulli_logit_lpmf;
use rayon::prelude::*;

/// Logit of choosing left.
#[inline]
pub fn choice_logit(itemp: f64, q_left: f64, q_right: f64) -> f64 {
    itemp * (q_left - q_right)
}

/// Log-probability of the observed choice on one trial.
#[inline]
pub fn trial_log_likelihood(step: &TrialStep<'_>, itemp: f64) -> f64 {
    bernoulli_logit_lpmf(
        step.trial.respond_left,
        choice_logit(itemp, step.q_left(), step.q_right()),
    )
}

/// Observer that sums trial log-likelihoods for one subject.
#[derive(Debug, Clone, Copy)]
pub struct LikelihoodAccumulator {
    itemp: f64,
    total: f64,
}

impl LikelihoodAccumulator {
    pub fn new(itemp: f64) -> Self {
        LikelihoodAccumulator { itemp, total: 0.0 }
    }

    pub fn total(&self) -> f64 {
        self.total
    }
}

impl TrialObserver for LikelihoodAccumulator {
    fn observe(&mut self, step: &TrialStep<'_>) {
        self.total += trial_log_likelihood(step, self.itemp);
    }
}

/// Log-likelihood of subject `s` (0-based).
pub fn subject_log_likelihood(dataset: &TrialDataset, params: &SubjectParameters, s: usize) -> f64 {
    let mut acc = LikelihoodAccumulator::new(params.itemp);
    run_subject(dataset.subject(s), params, &mut acc);
    acc.total()
}

/// Log-likelihood summed over all subjects.
///
/// In parallel mode subject totals are collected in subject order and then
/// summed left to right, so both modes produce the same bits.
pub fn total_log_likelihood(
    dataset: &TrialDataset,
    transformed: &TransformedParameters,
    parallel: bool,
) -> f64 {
    let per_subject = |s: usize| subject_log_likelihood(dataset, &transformed.subject(s), s);

    if parallel {
        let partials: Vec<f64> = (0..dataset.num_subjects())
            .into_par_iter()
            .map(per_subject)
            .collect();
        partials.iter().sum()
    } else {
        (0..dataset.num_subjects()).map(per_subject).sum()
    }
}
