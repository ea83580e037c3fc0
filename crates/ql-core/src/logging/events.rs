//! Structured event definitions for logging.
//!
//! Every event carries the run id and the pipeline stage it belongs to.

use serde::{Deserialize, Serialize};

/// Log levels for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Pipeline stages of one CLI run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration.
    Init,
    /// Dataset and draw loading.
    Load,
    /// Density evaluation.
    Evaluate,
    /// Diagnostics replay.
    Diagnose,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Load => "load",
            Stage::Evaluate => "evaluate",
            Stage::Diagnose => "diagnose",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
    pub const CONFIG_ERROR: &str = "config.error";

    pub const DATA_LOADED: &str = "data.loaded";
    pub const DATA_ERROR: &str = "data.error";
    pub const DRAWS_LOADED: &str = "draws.loaded";

    pub const DENSITY_EVALUATED: &str = "density.evaluated";
    pub const DENSITY_REJECTED: &str = "density.rejected";

    pub const DIAGNOSTICS_STARTED: &str = "diagnostics.started";
    pub const DIAGNOSTICS_FINISHED: &str = "diagnostics.finished";

    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Run-scoped context: the run id every stage span is tagged with.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
        }
    }

    /// Span that tags every event inside it with this run id and `stage`.
    pub fn stage_span(&self, stage: Stage) -> tracing::Span {
        tracing::info_span!("stage", run_id = %self.run_id, stage = %stage)
    }
}
