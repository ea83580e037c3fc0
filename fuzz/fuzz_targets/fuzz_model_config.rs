//! Fuzz target for model.json parsing and validation.
//!
//! Arbitrary input must parse to a config or an error, and validation of any
//! parsed config must not panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ql_config::{validate_model_config, ModelConfig};

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = serde_json::from_slice::<ModelConfig>(data) {
        let _ = validate_model_config(&config);
    }
});
