//! Configuration snapshots for reproducible evaluation output.
//!
//! A snapshot captures the exact configuration used to evaluate a density or
//! replay diagnostics, so results can be matched to their priors later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::model::ModelConfig;
use crate::resolve::{ConfigPath, ConfigSource};

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// Path the config was loaded from.
    #[serde(default)]
    pub path: Option<String>,

    /// Source of the configuration.
    pub source: String,

    /// SHA-256 of the canonical JSON serialization of the effective config.
    pub config_hash: String,

    /// Whether the dispersion log-Jacobian enters the density.
    pub include_dispersion_jacobian: bool,
}

impl ConfigSnapshot {
    /// Snapshot the effective config and where it came from.
    pub fn capture(config: &ModelConfig, resolved: &ConfigPath) -> Self {
        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: config.schema_version.clone(),
            path: resolved.path.as_ref().map(|p| p.display().to_string()),
            source: resolved.source.to_string(),
            config_hash: config_hash(config),
            include_dispersion_jacobian: config.priors.include_dispersion_jacobian,
        }
    }

    /// Snapshot for built-in defaults.
    pub fn builtin(config: &ModelConfig) -> Self {
        Self::capture(
            config,
            &ConfigPath {
                path: None,
                source: ConfigSource::BuiltinDefault,
            },
        )
    }
}

/// Hash of the effective configuration.
///
/// Hashing the re-serialized struct rather than the file bytes makes two files
/// that differ only in whitespace or omitted defaults compare equal.
pub fn config_hash(config: &ModelConfig) -> String {
    let canonical = serde_json::to_vec(config).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    hex::encode(hasher.finalize())
}
