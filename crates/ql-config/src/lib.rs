//! Configuration loading and validation for the hierarchical bandit model.
//!
//! This crate provides:
//! - Typed Rust structs for model.json (prior scales, Jacobian policy, execution)
//! - Config resolution (CLI → env → XDG → system → defaults)
//! - Semantic validation
//! - Config snapshots recorded alongside evaluation output

pub mod model;
pub mod resolve;
pub mod snapshot;
pub mod validate;

use std::path::Path;

pub use model::{ExecutionSettings, ModelConfig, PriorSettings};
pub use resolve::{resolve_config, ConfigPath, ConfigSource};
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_model_config, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

/// A validated configuration together with its provenance.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ModelConfig,
    pub snapshot: ConfigSnapshot,
}

/// Resolve, parse and validate the model configuration.
///
/// An explicit CLI path that does not exist is an error rather than a silent
/// fall-through to defaults.
pub fn load_config(cli_path: Option<&Path>) -> ValidationResult<LoadedConfig> {
    if let Some(path) = cli_path {
        if !path.exists() {
            return Err(ValidationError::IoError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
    }

    let resolved = resolve_config(cli_path);
    let config = match &resolved.path {
        Some(path) => ModelConfig::from_file(path)?,
        None => ModelConfig::default(),
    };
    validate_model_config(&config)?;

    let snapshot = ConfigSnapshot::capture(&config, &resolved);
    Ok(LoadedConfig { config, snapshot })
}
