//! Fuzz target for density evaluation.
//!
//! Any position, in or out of support, must yield a finite density or
//! negative infinity. NaN and panics are bugs.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use ql_config::ModelConfig;
use ql_core::{HierarchicalModel, LogDensity, Trial, TrialDataset};

#[derive(Debug, Arbitrary)]
struct Input {
    trials: Vec<[u8; 5]>,
    num_subjects: u8,
    position: Vec<f64>,
    jacobian: bool,
}

fuzz_target!(|input: Input| {
    let num_subjects = usize::from(input.num_subjects % 8) + 1;
    let num_trials = (input.trials.len() / num_subjects).min(64);
    let trials: Vec<Trial> = input
        .trials
        .iter()
        .take(num_subjects * num_trials)
        .filter_map(|t| {
            Trial::from_raw(
                i64::from(t[0] % 2),
                i64::from(t[1] % 2),
                i64::from(t[2] % 2),
                i64::from(t[3] % 4 + 1),
                i64::from(t[4] % 4 + 1),
            )
            .ok()
        })
        .collect();
    let Ok(data) = TrialDataset::new(num_subjects, num_trials, trials) else {
        return;
    };
    let config = ModelConfig::default().with_dispersion_jacobian(input.jacobian);
    let Ok(model) = HierarchicalModel::new(data, config) else {
        return;
    };

    let lp = model.log_density(&input.position);
    assert!(lp.is_finite() || lp == f64::NEG_INFINITY, "lp = {lp}");
});
