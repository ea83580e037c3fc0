//! Structured logging for ql-core.
//!
//! Two output modes, both on stderr:
//! - human-readable console lines for interactive use
//! - JSONL for pipelines that post-process a run's log
//!
//! stdout is reserved for command payloads.
//!
//! ```ignore
//! use ql_core::logging::{init_logging, LogConfig, LogContext, Stage, event_names};
//!
//! init_logging(&LogConfig::from_env(None, None));
//! let ctx = LogContext::new(generate_run_id());
//! let _span = ctx.stage_span(Stage::Load).entered();
//! tracing::info!(target: event_names::DATA_LOADED, num_subjects = 12, "dataset loaded");
//! ```

pub mod config;
pub mod events;
pub mod layer;

pub use config::{LogConfig, LogFormat, LogLevel};
pub use events::{event_names, Level, LogContext, Stage};
pub use layer::JsonlLayer;

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. Call once at startup.
///
/// Event targets are dotted event names rather than module paths, so the
/// fallback filter is a bare level rather than a `ql_core=` directive.
/// `RUST_LOG` is only honoured when `QL_LOG` is unset.
pub fn init_logging(config: &LogConfig) {
    let filter = if std::env::var_os(config::ENV_LOG).is_some() {
        EnvFilter::new(config.level.to_string())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.to_string()))
    };

    match config.format {
        LogFormat::Human => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(std::io::stderr().is_terminal());

            if config.timestamps {
                let _ = tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init();
            } else {
                let _ = tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .try_init();
            }
        }
        LogFormat::Jsonl => {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(JsonlLayer::stderr())
                .try_init();
        }
    }
}

/// Unique id for one invocation, `run-` plus 12 hex characters.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("run-{}", &uuid[..12])
}
