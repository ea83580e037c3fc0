//! Hierarchical reward-dependent learning-rate bandit model.
//!
//! This library provides the log-posterior density a sampler evaluates, and
//! the per-draw diagnostics replay:
//! - Trial dataset loading and validation
//! - Flat parameter layout and the non-centered group transform
//! - The per-subject Q-value recurrence and its choice likelihood
//! - Density breakdown and the `LogDensity` seam for posterior engines
//! - Pointwise log-likelihood, stored-value and prediction-error traces
//!
//! The binary entry point is in `main.rs`.

pub mod dataset;
pub mod density;
pub mod diagnostics;
pub mod error;
pub mod exit_codes;
pub mod likelihood;
pub mod logging;
pub mod params;
pub mod recurrence;
pub mod transform;

pub use dataset::{BanditId, DatasetError, Trial, TrialArrays, TrialDataset, NUM_BANDITS};
pub use density::{DensityBreakdown, GroupPriorTerms, HierarchicalModel, LogDensity};
pub use diagnostics::{diagnose_draws, DrawDiagnostics};
pub use error::{DrawError, ModelError};
pub use params::{GroupDraw, ParameterDraw, ParameterGroup, ParameterLayout};
pub use recurrence::{run_subject, QValues, TrialObserver, TrialStep};
pub use transform::{transform, GroupTransform, SubjectParameters, TransformedParameters};
