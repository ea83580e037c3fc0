//! Observed two-armed bandit trials.
//!
//! The dataset is validated once at construction and is read-only afterwards,
//! so every density evaluation can share it without checks. Trials are stored
//! subject-major: subject `s` (0-based) owns `trials[s*T .. (s+1)*T]`.
//!
//! The JSON file format mirrors the original model's data block:
//!
//! ```json
//! {
//!   "NS": 2, "NT": 3,
//!   "respond_left": [[1, 0, 1], [0, 0, 1]],
//!   "reward_left":  [[1, 0, 0], [1, 1, 0]],
//!   "reward_right": [[0, 1, 0], [0, 0, 1]],
//!   "bandit_left":  [[1, 3, 2], [4, 4, 1]],
//!   "bandit_right": [[2, 4, 2], [3, 1, 2]]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Number of distinct bandits a trial can present.
pub const NUM_BANDITS: usize = 4;

/// Errors for a single trial's raw values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrialError {
    #[error("{field} must be 0 or 1, got {value}")]
    NotBinary { field: &'static str, value: i64 },

    #[error("{field} must be a bandit in 1..={max}, got {value}", max = NUM_BANDITS)]
    BanditOutOfRange { field: &'static str, value: i64 },
}

/// Dataset construction errors. All are fatal and raised before any density
/// evaluation.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("{field} has {actual} rows, expected NS = {expected}")]
    RowCountMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{field} row for subject {subject} has {actual} trials, expected NT = {expected}")]
    TrialCountMismatch {
        field: &'static str,
        subject: usize,
        expected: usize,
        actual: usize,
    },

    #[error("dataset holds {actual} trials, expected {num_subjects} x {num_trials}")]
    ShapeMismatch {
        num_subjects: usize,
        num_trials: usize,
        actual: usize,
    },

    #[error("invalid trial (subject {subject}, trial {trial}): {source}")]
    InvalidTrial {
        subject: usize,
        trial: usize,
        #[source]
        source: TrialError,
    },
}

/// A bandit identity in `1..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BanditId(u8);

impl BanditId {
    /// Returns None outside `1..=4`.
    pub fn new(id: u8) -> Option<Self> {
        if (1..=NUM_BANDITS as u8).contains(&id) {
            Some(BanditId(id))
        } else {
            None
        }
    }

    /// The 1-based identifier as it appears in the data.
    pub fn get(self) -> u8 {
        self.0
    }

    /// 0-based slot in a Q-value vector.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

/// One observed trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trial {
    /// 1 if the left option was chosen.
    pub respond_left: u8,
    /// Outcome of the left bandit (0 or 1).
    pub reward_left: u8,
    /// Outcome of the right bandit (0 or 1).
    pub reward_right: u8,
    pub bandit_left: BanditId,
    pub bandit_right: BanditId,
}

impl Trial {
    /// Validate one trial's raw integer values.
    pub fn from_raw(
        respond_left: i64,
        reward_left: i64,
        reward_right: i64,
        bandit_left: i64,
        bandit_right: i64,
    ) -> Result<Self, TrialError> {
        Ok(Trial {
            respond_left: binary("respond_left", respond_left)?,
            reward_left: binary("reward_left", reward_left)?,
            reward_right: binary("reward_right", reward_right)?,
            bandit_left: bandit("bandit_left", bandit_left)?,
            bandit_right: bandit("bandit_right", bandit_right)?,
        })
    }
}

fn binary(field: &'static str, value: i64) -> Result<u8, TrialError> {
    match value {
        0 => Ok(0),
        1 => Ok(1),
        _ => Err(TrialError::NotBinary { field, value }),
    }
}

fn bandit(field: &'static str, value: i64) -> Result<BanditId, TrialError> {
    u8::try_from(value)
        .ok()
        .and_then(BanditId::new)
        .ok_or(TrialError::BanditOutOfRange { field, value })
}

/// Array-of-rows form used by the JSON file format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialArrays {
    #[serde(rename = "NS")]
    pub num_subjects: usize,
    #[serde(rename = "NT")]
    pub num_trials: usize,
    pub respond_left: Vec<Vec<i64>>,
    pub reward_left: Vec<Vec<i64>>,
    pub reward_right: Vec<Vec<i64>>,
    pub bandit_left: Vec<Vec<i64>>,
    pub bandit_right: Vec<Vec<i64>>,
}

impl TrialArrays {
    fn check_shape(&self) -> Result<(), DatasetError> {
        let fields: [(&'static str, &Vec<Vec<i64>>); 5] = [
            ("respond_left", &self.respond_left),
            ("reward_left", &self.reward_left),
            ("reward_right", &self.reward_right),
            ("bandit_left", &self.bandit_left),
            ("bandit_right", &self.bandit_right),
        ];
        for (field, rows) in fields {
            if rows.len() != self.num_subjects {
                return Err(DatasetError::RowCountMismatch {
                    field,
                    expected: self.num_subjects,
                    actual: rows.len(),
                });
            }
            for (s, row) in rows.iter().enumerate() {
                if row.len() != self.num_trials {
                    return Err(DatasetError::TrialCountMismatch {
                        field,
                        subject: s + 1,
                        expected: self.num_trials,
                        actual: row.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Immutable, validated trial data for all subjects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialDataset {
    num_subjects: usize,
    num_trials: usize,
    trials: Vec<Trial>,
}

impl TrialDataset {
    /// Build from subject-major trials; `trials.len()` must equal `S * T`.
    pub fn new(
        num_subjects: usize,
        num_trials: usize,
        trials: Vec<Trial>,
    ) -> Result<Self, DatasetError> {
        let expected = num_subjects.checked_mul(num_trials);
        if expected != Some(trials.len()) {
            return Err(DatasetError::ShapeMismatch {
                num_subjects,
                num_trials,
                actual: trials.len(),
            });
        }
        Ok(TrialDataset {
            num_subjects,
            num_trials,
            trials,
        })
    }

    /// Build from per-subject rows. Every subject must have the same trial count.
    pub fn from_subjects(subjects: Vec<Vec<Trial>>) -> Result<Self, DatasetError> {
        let num_subjects = subjects.len();
        let num_trials = subjects.first().map_or(0, Vec::len);
        for (s, row) in subjects.iter().enumerate() {
            if row.len() != num_trials {
                return Err(DatasetError::TrialCountMismatch {
                    field: "trials",
                    subject: s + 1,
                    expected: num_trials,
                    actual: row.len(),
                });
            }
        }
        let trials = subjects.into_iter().flatten().collect();
        Self::new(num_subjects, num_trials, trials)
    }

    /// Validate the array form: dimensions first, then every value.
    pub fn from_arrays(arrays: &TrialArrays) -> Result<Self, DatasetError> {
        arrays.check_shape()?;

        let mut trials = Vec::with_capacity(arrays.num_subjects * arrays.num_trials);
        for s in 0..arrays.num_subjects {
            for t in 0..arrays.num_trials {
                let trial = Trial::from_raw(
                    arrays.respond_left[s][t],
                    arrays.reward_left[s][t],
                    arrays.reward_right[s][t],
                    arrays.bandit_left[s][t],
                    arrays.bandit_right[s][t],
                )
                .map_err(|source| DatasetError::InvalidTrial {
                    subject: s + 1,
                    trial: t + 1,
                    source,
                })?;
                trials.push(trial);
            }
        }

        Self::new(arrays.num_subjects, arrays.num_trials, trials)
    }

    /// Parse and validate a JSON dataset.
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        let arrays: TrialArrays = serde_json::from_str(json)
            .map_err(|e| DatasetError::Parse(format!("Invalid JSON: {}", e)))?;
        Self::from_arrays(&arrays)
    }

    /// Load and validate a JSON dataset file.
    pub fn from_file(path: &Path) -> Result<Self, DatasetError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DatasetError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Convert back to the array form.
    pub fn to_arrays(&self) -> TrialArrays {
        let rows = |f: fn(&Trial) -> i64| -> Vec<Vec<i64>> {
            self.subjects()
                .map(|trials| trials.iter().map(f).collect())
                .collect()
        };
        TrialArrays {
            num_subjects: self.num_subjects,
            num_trials: self.num_trials,
            respond_left: rows(|t| i64::from(t.respond_left)),
            reward_left: rows(|t| i64::from(t.reward_left)),
            reward_right: rows(|t| i64::from(t.reward_right)),
            bandit_left: rows(|t| i64::from(t.bandit_left.get())),
            bandit_right: rows(|t| i64::from(t.bandit_right.get())),
        }
    }

    pub fn num_subjects(&self) -> usize {
        self.num_subjects
    }

    pub fn num_trials(&self) -> usize {
        self.num_trials
    }

    /// Total number of observations, `S * T`.
    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    /// Trials of subject `s` (0-based), in order.
    ///
    /// # Panics
    /// If `s >= num_subjects`.
    pub fn subject(&self, s: usize) -> &[Trial] {
        assert!(s < self.num_subjects, "subject {s} out of range");
        let start = s * self.num_trials;
        &self.trials[start..start + self.num_trials]
    }

    /// Iterate subjects in order.
    pub fn subjects(&self) -> impl ExactSizeIterator<Item = &[Trial]> + '_ {
        (0..self.num_subjects).map(move |s| self.subject(s))
    }

    /// Trial `t` of subject `s` (both 0-based).
    pub fn trial(&self, s: usize, t: usize) -> Option<&Trial> {
        if s >= self.num_subjects || t >= self.num_trials {
            return None;
        }
        self.trials.get(s * self.num_trials + t)
    }
}
