//! No-mock configuration loading + resolution tests.
//!
//! Covers:
//! - Loading real JSON files from a temp directory
//! - Resolution order (CLI > QL_MODEL_CONFIG > QL_CONFIG_DIR)
//! - Validation failures surfacing through `load_config`

use ql_config::resolve::{ENV_CONFIG_DIR, ENV_MODEL_CONFIG_PATH};
use ql_config::{load_config, resolve_config, ConfigSource, ModelConfig, ValidationError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use tempfile::TempDir;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

struct EnvGuard {
    keys: Vec<String>,
    saved: Vec<Option<String>>,
}

impl EnvGuard {
    fn new(keys: &[&str]) -> Self {
        let mut saved = Vec::with_capacity(keys.len());
        for key in keys {
            saved.push(env::var(key).ok());
        }
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            saved,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (idx, key) in self.keys.iter().enumerate() {
            match self.saved.get(idx).and_then(|v| v.as_ref()) {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }
}

fn with_env_lock<T>(f: impl FnOnce() -> T) -> T {
    let _guard = ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .expect("env lock poisoned");
    f()
}

fn write_config(path: &Path, json: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create config parent");
    }
    fs::write(path, json).expect("write config");
    path.to_path_buf()
}

const JACOBIAN_ON: &str = r#"{
  "schema_version": "1.0.0",
  "description": "density over the dispersion",
  "priors": { "include_dispersion_jacobian": true }
}"#;

const WIDE_SCALE: &str = r#"{
  "schema_version": "1.0.0",
  "priors": { "dispersion_scale": 10.0 }
}"#;

#[test]
fn test_load_from_cli_path() {
    with_env_lock(|| {
        let _env = EnvGuard::new(&[ENV_MODEL_CONFIG_PATH, ENV_CONFIG_DIR]);
        env::remove_var(ENV_MODEL_CONFIG_PATH);
        env::remove_var(ENV_CONFIG_DIR);

        let dir = TempDir::new().expect("tempdir");
        let path = write_config(&dir.path().join("model.json"), JACOBIAN_ON);

        let loaded = load_config(Some(&path)).expect("load config");
        assert!(loaded.config.priors.include_dispersion_jacobian);
        assert_eq!(loaded.snapshot.source, "CLI argument");
        assert!(loaded.snapshot.include_dispersion_jacobian);
        assert_eq!(
            loaded.config.description.as_deref(),
            Some("density over the dispersion")
        );
    });
}

#[test]
fn test_cli_beats_environment() {
    with_env_lock(|| {
        let _env = EnvGuard::new(&[ENV_MODEL_CONFIG_PATH, ENV_CONFIG_DIR]);
        let dir = TempDir::new().expect("tempdir");
        let cli = write_config(&dir.path().join("cli/model.json"), JACOBIAN_ON);
        let from_env = write_config(&dir.path().join("env/model.json"), WIDE_SCALE);
        env::set_var(ENV_MODEL_CONFIG_PATH, &from_env);

        let resolved = resolve_config(Some(&cli));
        assert_eq!(resolved.source, ConfigSource::CliArgument);
        assert_eq!(resolved.path.as_deref(), Some(cli.as_path()));
    });
}

#[test]
fn test_env_path_beats_config_dir() {
    with_env_lock(|| {
        let _env = EnvGuard::new(&[ENV_MODEL_CONFIG_PATH, ENV_CONFIG_DIR]);
        let dir = TempDir::new().expect("tempdir");
        let direct = write_config(&dir.path().join("direct.json"), WIDE_SCALE);
        let config_dir = dir.path().join("confdir");
        write_config(&config_dir.join("model.json"), JACOBIAN_ON);

        env::set_var(ENV_MODEL_CONFIG_PATH, &direct);
        env::set_var(ENV_CONFIG_DIR, &config_dir);

        let loaded = load_config(None).expect("load config");
        assert_eq!(loaded.config.priors.dispersion_scale, 10.0);
        assert_eq!(loaded.snapshot.source, "environment variable");

        env::remove_var(ENV_MODEL_CONFIG_PATH);
        let loaded = load_config(None).expect("load config");
        assert!(loaded.config.priors.include_dispersion_jacobian);
        assert_eq!(loaded.config.priors.dispersion_scale, 5.0);
    });
}

#[test]
fn test_missing_cli_path_is_error() {
    let err = load_config(Some(Path::new("/nonexistent/ql/model.json"))).unwrap_err();
    assert!(matches!(err, ValidationError::IoError(_)));
    assert_eq!(err.code(), 60);
}

#[test]
fn test_invalid_scale_rejected_on_load() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(
        &dir.path().join("model.json"),
        r#"{"schema_version": "1.0.0", "priors": {"group_mean_sd": -3.0}}"#,
    );
    match load_config(Some(&path)) {
        Err(ValidationError::InvalidValue { field, .. }) => {
            assert_eq!(field, "priors.group_mean_sd");
        }
        other => panic!("expected InvalidValue, got {:?}", other),
    }
}

#[test]
fn test_wrong_schema_version_rejected_on_load() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(&dir.path().join("model.json"), r#"{"schema_version": "2.0.0"}"#);
    let err = load_config(Some(&path)).unwrap_err();
    assert!(matches!(err, ValidationError::VersionMismatch { .. }));
}

#[test]
fn test_round_trip_through_file() {
    let dir = TempDir::new().expect("tempdir");
    let config = ModelConfig::default()
        .with_dispersion_jacobian(true)
        .with_parallel_min_subjects(2);
    let json = serde_json::to_string_pretty(&config).expect("serialize");
    let path = write_config(&dir.path().join("model.json"), &json);

    let reloaded = ModelConfig::from_file(&path).expect("reload");
    assert_eq!(reloaded, config);
}
