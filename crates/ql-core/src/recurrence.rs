//! Per-subject Q-value recurrence.
//!
//! Each subject starts from `q = [0; 4]`. On every trial the observer sees the
//! pre-update state, then the left bandit is updated, then the right. When
//! both sides show the same bandit the right update reads the value the left
//! update just wrote.

use crate::dataset::{Trial, NUM_BANDITS};
use crate::transform::SubjectParameters;

/// Latent value per bandit, indexed by [`crate::BanditId::index`].
pub type QValues = [f64; NUM_BANDITS];

/// What an observer sees at the pre-update point of one trial.
#[derive(Debug, Clone, Copy)]
pub struct TrialStep<'a> {
    /// 0-based trial index within the subject.
    pub trial_index: usize,
    pub trial: &'a Trial,
    /// State before this trial's updates.
    pub q: &'a QValues,
    pub alpha_left: f64,
    pub alpha_right: f64,
}

impl TrialStep<'_> {
    pub fn q_left(&self) -> f64 {
        self.q[self.trial.bandit_left.index()]
    }

    pub fn q_right(&self) -> f64 {
        self.q[self.trial.bandit_right.index()]
    }

    pub fn prediction_error_left(&self) -> f64 {
        f64::from(self.trial.reward_left) - self.q_left()
    }

    /// Measured against the pre-update state, even for same-bandit trials.
    pub fn prediction_error_right(&self) -> f64 {
        f64::from(self.trial.reward_right) - self.q_right()
    }
}

/// Hook invoked once per trial, before the update.
pub trait TrialObserver {
    fn observe(&mut self, step: &TrialStep<'_>);
}

impl<F> TrialObserver for F
where
    F: FnMut(&TrialStep<'_>),
{
    fn observe(&mut self, step: &TrialStep<'_>) {
        self(step)
    }
}

/// Run one subject's trials in order and return the terminal state.
pub fn run_subject<O>(trials: &[Trial], params: &SubjectParameters, observer: &mut O) -> QValues
where
    O: TrialObserver + ?Sized,
{
    let mut q: QValues = [0.0; NUM_BANDITS];

    for (trial_index, trial) in trials.iter().enumerate() {
        let alpha_left = params.learning_rate(trial.reward_left);
        let alpha_right = params.learning_rate(trial.reward_right);

        observer.observe(&TrialStep {
            trial_index,
            trial,
            q: &q,
            alpha_left,
            alpha_right,
        });

        let left = trial.bandit_left.index();
        q[left] += alpha_left * (f64::from(trial.reward_left) - q[left]);
        let right = trial.bandit_right.index();
        q[right] += alpha_right * (f64::from(trial.reward_right) - q[right]);
    }

    q
}
