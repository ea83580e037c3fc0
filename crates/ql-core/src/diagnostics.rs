//! Per-draw diagnostics replay.
//!
//! For a retained draw, rerun the recurrence for every subject and record at
//! the pre-update point of each trial:
//! - the pointwise choice log-likelihood
//! - a snapshot of all four Q-values
//! - the left and right prediction errors
//!
//! Each record also carries the draw's group dispersions and per-subject
//! parameter values.
//!
//! Arrays are flattened subject-major: trial `t` of subject `s` (both 0-based)
//! sits at `s * T + t`, which is `(s - 1) * T + t` in 1-based terms.

use crate::dataset::{TrialDataset, NUM_BANDITS};
use crate::density::HierarchicalModel;
use crate::error::{DrawError, ModelError};
use crate::likelihood::trial_log_likelihood;
use crate::recurrence::{run_subject, QValues, TrialObserver, TrialStep};
use crate::transform::{SubjectParameters, TransformedParameters};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Diagnostics for one draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawDiagnostics {
    pub num_subjects: usize,
    pub num_trials: usize,
    pub itemp_sd: f64,
    pub beta_int_sd: f64,
    pub beta_reward_sd: f64,
    /// Per-subject values, length `S` each.
    pub itemp: Vec<f64>,
    pub beta_int: Vec<f64>,
    pub beta_reward: Vec<f64>,
    /// Pointwise log-likelihood, length `S * T`.
    pub log_lik: Vec<f64>,
    /// Q-values at the start of each trial, length `S * T * 4`.
    pub q_store: Vec<f64>,
    pub prediction_error_left: Vec<f64>,
    pub prediction_error_right: Vec<f64>,
}

impl DrawDiagnostics {
    fn zeroed(num_trials: usize, transformed: &TransformedParameters) -> Self {
        let num_subjects = transformed.num_subjects();
        let n = num_subjects * num_trials;
        DrawDiagnostics {
            num_subjects,
            num_trials,
            itemp_sd: transformed.itemp.dispersion,
            beta_int_sd: transformed.beta_int.dispersion,
            beta_reward_sd: transformed.beta_reward.dispersion,
            itemp: transformed.itemp.values.clone(),
            beta_int: transformed.beta_int.values.clone(),
            beta_reward: transformed.beta_reward.values.clone(),
            log_lik: vec![0.0; n],
            q_store: vec![0.0; n * NUM_BANDITS],
            prediction_error_left: vec![0.0; n],
            prediction_error_right: vec![0.0; n],
        }
    }

    /// Flat index of trial `t` of subject `s`, both 0-based.
    pub fn flat_index(&self, s: usize, t: usize) -> Option<usize> {
        (s < self.num_subjects && t < self.num_trials).then(|| s * self.num_trials + t)
    }

    pub fn log_lik_at(&self, s: usize, t: usize) -> Option<f64> {
        self.flat_index(s, t).map(|i| self.log_lik[i])
    }

    /// Q-values at the start of trial `t` of subject `s`.
    pub fn stored_values(&self, s: usize, t: usize) -> Option<QValues> {
        let i = self.flat_index(s, t)? * NUM_BANDITS;
        let mut q = [0.0; NUM_BANDITS];
        q.copy_from_slice(&self.q_store[i..i + NUM_BANDITS]);
        Some(q)
    }

    pub fn prediction_errors_at(&self, s: usize, t: usize) -> Option<(f64, f64)> {
        self.flat_index(s, t)
            .map(|i| (self.prediction_error_left[i], self.prediction_error_right[i]))
    }

    /// Sum of the pointwise log-likelihood in flat order.
    pub fn total_log_lik(&self) -> f64 {
        self.log_lik.iter().sum()
    }
}

/// Writes one subject's trials into its slices of the output arrays.
struct SubjectRecorder<'a> {
    itemp: f64,
    log_lik: &'a mut [f64],
    q_store: &'a mut [f64],
    pe_left: &'a mut [f64],
    pe_right: &'a mut [f64],
}

impl TrialObserver for SubjectRecorder<'_> {
    fn observe(&mut self, step: &TrialStep<'_>) {
        let t = step.trial_index;
        self.log_lik[t] = trial_log_likelihood(step, self.itemp);
        self.q_store[t * NUM_BANDITS..(t + 1) * NUM_BANDITS].copy_from_slice(step.q);
        self.pe_left[t] = step.prediction_error_left();
        self.pe_right[t] = step.prediction_error_right();
    }
}

fn record_subject(
    dataset: &TrialDataset,
    s: usize,
    params: &SubjectParameters,
    mut recorder: SubjectRecorder<'_>,
) {
    run_subject(dataset.subject(s), params, &mut recorder);
}

/// Replay every subject and collect the traces.
pub fn compute_diagnostics(
    dataset: &TrialDataset,
    transformed: &TransformedParameters,
    parallel: bool,
) -> DrawDiagnostics {
    let num_trials = dataset.num_trials();
    let mut out = DrawDiagnostics::zeroed(num_trials, transformed);
    if num_trials == 0 {
        return out;
    }

    let q_chunk = num_trials * NUM_BANDITS;
    let DrawDiagnostics {
        log_lik,
        q_store,
        prediction_error_left,
        prediction_error_right,
        ..
    } = &mut out;

    if parallel {
        log_lik
            .par_chunks_mut(num_trials)
            .zip(q_store.par_chunks_mut(q_chunk))
            .zip(prediction_error_left.par_chunks_mut(num_trials))
            .zip(prediction_error_right.par_chunks_mut(num_trials))
            .enumerate()
            .for_each(|(s, (((log_lik, q_store), pe_left), pe_right))| {
                let params = transformed.subject(s);
                let recorder = SubjectRecorder {
                    itemp: params.itemp,
                    log_lik,
                    q_store,
                    pe_left,
                    pe_right,
                };
                record_subject(dataset, s, &params, recorder);
            });
    } else {
        log_lik
            .chunks_mut(num_trials)
            .zip(q_store.chunks_mut(q_chunk))
            .zip(prediction_error_left.chunks_mut(num_trials))
            .zip(prediction_error_right.chunks_mut(num_trials))
            .enumerate()
            .for_each(|(s, (((log_lik, q_store), pe_left), pe_right))| {
                let params = transformed.subject(s);
                let recorder = SubjectRecorder {
                    itemp: params.itemp,
                    log_lik,
                    q_store,
                    pe_left,
                    pe_right,
                };
                record_subject(dataset, s, &params, recorder);
            });
    }

    out
}

impl HierarchicalModel {
    /// Diagnostics for one flat position.
    pub fn diagnostics(&self, position: &[f64]) -> Result<DrawDiagnostics, ModelError> {
        let draw = self.parse_draw(position)?;
        let transformed = self.transform(&draw)?;
        Ok(compute_diagnostics(
            self.dataset(),
            &transformed,
            self.is_parallel(),
        ))
    }
}

/// Diagnostics for a batch of retained draws, in input order.
///
/// Draws are processed in parallel. An invalid draw fails the whole batch and
/// the error names the first invalid draw in input order.
pub fn diagnose_draws(
    model: &HierarchicalModel,
    draws: &[Vec<f64>],
) -> Result<Vec<DrawDiagnostics>, DrawError> {
    let results: Vec<Result<DrawDiagnostics, ModelError>> = draws
        .par_iter()
        .map(|position| model.diagnostics(position))
        .collect();
    results
        .into_iter()
        .enumerate()
        .map(|(index, result)| result.map_err(|source| DrawError { index, source }))
        .collect()
}
