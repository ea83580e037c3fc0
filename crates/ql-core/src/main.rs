//! ql-core: evaluate the hierarchical bandit model from the command line.
//!
//! - `layout` prints the flat parameter layout for a dataset
//! - `density` evaluates the log density of one flat draw
//! - `diagnose` replays retained draws into per-trial diagnostics
//!
//! JSON payloads go to stdout; logs go to stderr.

use clap::{Args, Parser, Subcommand};
use ql_config::{load_config, ConfigSnapshot, LoadedConfig, ValidationError};
use ql_core::exit_codes::ExitCode;
use ql_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogContext, LogFormat, LogLevel, Stage,
};
use ql_core::{
    diagnose_draws, DatasetError, DensityBreakdown, DrawDiagnostics, HierarchicalModel,
    LogDensity, ModelError, TrialDataset,
};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Hierarchical reward-dependent learning-rate bandit model
#[derive(Parser)]
#[command(name = "ql-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Model configuration file (model.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format on stderr (human, jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Worker threads for parallel evaluation
    #[arg(long, global = true, env = "RAYON_NUM_THREADS")]
    threads: Option<usize>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the flat parameter layout for a dataset
    Layout(LayoutArgs),

    /// Evaluate the log density of one flat draw
    Density(DensityArgs),

    /// Replay retained draws into pointwise diagnostics
    Diagnose(DiagnoseArgs),
}

#[derive(Args, Debug)]
struct LayoutArgs {
    /// Dataset JSON file
    #[arg(long)]
    data: PathBuf,
}

#[derive(Args, Debug)]
struct DensityArgs {
    /// Dataset JSON file
    #[arg(long)]
    data: PathBuf,

    /// JSON array holding one flat parameter vector
    #[arg(long)]
    draw: PathBuf,
}

#[derive(Args, Debug)]
struct DiagnoseArgs {
    /// Dataset JSON file
    #[arg(long)]
    data: PathBuf,

    /// JSON array of flat parameter vectors
    #[arg(long)]
    draws: PathBuf,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ValidationError),

    #[error("dataset error: {0}")]
    Data(#[from] DatasetError),

    #[error("failed to read draws from {path}: {message}")]
    DrawFile { path: String, message: String },

    #[error("invalid draw {index}: {source}")]
    InvalidDraw {
        index: usize,
        #[source]
        source: ModelError,
    },

    #[error("model error: {0}")]
    Model(ModelError),

    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Config(_) => ExitCode::ConfigError,
            CliError::Data(_) | CliError::DrawFile { .. } => ExitCode::DataError,
            CliError::InvalidDraw { .. } => ExitCode::InvalidDraw,
            CliError::Model(ModelError::Config(_)) => ExitCode::ConfigError,
            CliError::Model(_) => ExitCode::InternalError,
            CliError::Serialize(_) => ExitCode::InternalError,
            CliError::Output(_) => ExitCode::IoError,
        }
    }
}

#[derive(Serialize)]
struct LayoutOutput {
    num_subjects: usize,
    num_trials: usize,
    dim: usize,
    parameter_names: Vec<String>,
}

#[derive(Serialize)]
struct DensityOutput<'a> {
    run_id: &'a str,
    config: &'a ConfigSnapshot,
    dim: usize,
    log_density: f64,
    breakdown: DensityBreakdown,
}

#[derive(Serialize)]
struct DiagnoseOutput<'a> {
    run_id: &'a str,
    config: &'a ConfigSnapshot,
    num_draws: usize,
    draws: Vec<DrawDiagnostics>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            let _ = e.print();
            std::process::exit(code.as_i32());
        }
    };

    let log_config = LogConfig::from_env(cli.global.log_level, cli.global.log_format);
    init_logging(&log_config);

    let ctx = LogContext::new(generate_run_id());
    init_threads(cli.global.threads);

    let result = match &cli.command {
        Commands::Layout(args) => run_layout(&cli.global, &ctx, args),
        Commands::Density(args) => run_density(&cli.global, &ctx, args),
        Commands::Diagnose(args) => run_diagnose(&cli.global, &ctx, args),
    };

    let exit_code = match result {
        Ok(()) => ExitCode::Clean,
        Err(e) => {
            let code = e.exit_code();
            error!(target: event_names::INTERNAL_ERROR, exit_code = %code, "{}", e);
            eprintln!("ql-core: {}", e);
            code
        }
    };

    info!(target: event_names::RUN_FINISHED, run_id = %ctx.run_id, exit_code = %exit_code, "run finished");
    std::process::exit(exit_code.as_i32());
}

/// Build the global rayon pool when a thread count was requested.
fn init_threads(threads: Option<usize>) {
    let Some(num_threads) = threads else {
        return;
    };
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        warn!(num_threads, error = %e, "could not configure thread pool");
    }
}

fn load_model_config(global: &GlobalOpts, ctx: &LogContext) -> Result<LoadedConfig, CliError> {
    let _span = ctx.stage_span(Stage::Init).entered();
    let loaded = load_config(global.config.as_deref()).inspect_err(|e| {
        error!(target: event_names::CONFIG_ERROR, code = e.code(), "{}", e);
    })?;

    match &loaded.snapshot.path {
        Some(path) => info!(
            target: event_names::CONFIG_LOADED,
            path = %path,
            source = %loaded.snapshot.source,
            config_hash = %loaded.snapshot.config_hash,
            "configuration loaded"
        ),
        None => info!(
            target: event_names::CONFIG_DEFAULT_USED,
            config_hash = %loaded.snapshot.config_hash,
            "using built-in configuration"
        ),
    }
    Ok(loaded)
}

fn load_dataset(path: &Path, ctx: &LogContext) -> Result<TrialDataset, CliError> {
    let _span = ctx.stage_span(Stage::Load).entered();
    let dataset = TrialDataset::from_file(path).inspect_err(|e| {
        error!(target: event_names::DATA_ERROR, path = %path.display(), "{}", e);
    })?;
    info!(
        target: event_names::DATA_LOADED,
        path = %path.display(),
        num_subjects = dataset.num_subjects(),
        num_trials = dataset.num_trials(),
        "dataset loaded"
    );
    Ok(dataset)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let draw_error = |message: String| CliError::DrawFile {
        path: path.display().to_string(),
        message,
    };
    let content = std::fs::read_to_string(path).map_err(|e| draw_error(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| draw_error(e.to_string()))
}

fn build_model(
    global: &GlobalOpts,
    ctx: &LogContext,
    data: &Path,
) -> Result<(HierarchicalModel, ConfigSnapshot), CliError> {
    let LoadedConfig { config, snapshot } = load_model_config(global, ctx)?;
    let dataset = load_dataset(data, ctx)?;
    let model = HierarchicalModel::new(Arc::new(dataset), config).map_err(CliError::Model)?;
    Ok((model, snapshot))
}

fn write_output<T: Serialize>(global: &GlobalOpts, value: &T) -> Result<(), CliError> {
    let json = if global.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", json)?;
    stdout.flush()?;
    Ok(())
}

fn run_layout(global: &GlobalOpts, ctx: &LogContext, args: &LayoutArgs) -> Result<(), CliError> {
    info!(target: event_names::RUN_STARTED, run_id = %ctx.run_id, command = "layout", "run started");
    let dataset = load_dataset(&args.data, ctx)?;
    let layout = ql_core::ParameterLayout::new(dataset.num_subjects());

    write_output(
        global,
        &LayoutOutput {
            num_subjects: dataset.num_subjects(),
            num_trials: dataset.num_trials(),
            dim: layout.dim(),
            parameter_names: layout.parameter_names(),
        },
    )
}

fn run_density(global: &GlobalOpts, ctx: &LogContext, args: &DensityArgs) -> Result<(), CliError> {
    info!(target: event_names::RUN_STARTED, run_id = %ctx.run_id, command = "density", "run started");
    let (model, snapshot) = build_model(global, ctx, &args.data)?;
    let position: Vec<f64> = read_json(&args.draw)?;

    let _span = ctx.stage_span(Stage::Evaluate).entered();
    let breakdown = model
        .parse_draw(&position)
        .and_then(|draw| model.density_breakdown(&draw))
        .map_err(|source| {
            warn!(target: event_names::DENSITY_REJECTED, error = %source, "draw rejected");
            CliError::InvalidDraw { index: 0, source }
        })?;

    info!(
        target: event_names::DENSITY_EVALUATED,
        total = breakdown.total,
        log_prior = breakdown.log_prior,
        log_jacobian = breakdown.log_jacobian,
        log_likelihood = breakdown.log_likelihood,
        parallel = model.is_parallel(),
        "density evaluated"
    );

    write_output(
        global,
        &DensityOutput {
            run_id: &ctx.run_id,
            config: &snapshot,
            dim: model.dim(),
            log_density: breakdown.total,
            breakdown,
        },
    )
}

fn run_diagnose(
    global: &GlobalOpts,
    ctx: &LogContext,
    args: &DiagnoseArgs,
) -> Result<(), CliError> {
    info!(target: event_names::RUN_STARTED, run_id = %ctx.run_id, command = "diagnose", "run started");
    let (model, snapshot) = build_model(global, ctx, &args.data)?;
    let draws: Vec<Vec<f64>> = {
        let _span = ctx.stage_span(Stage::Load).entered();
        let draws: Vec<Vec<f64>> = read_json(&args.draws)?;
        info!(target: event_names::DRAWS_LOADED, num_draws = draws.len(), "draws loaded");
        draws
    };

    let _span = ctx.stage_span(Stage::Diagnose).entered();
    info!(target: event_names::DIAGNOSTICS_STARTED, num_draws = draws.len(), "replaying draws");

    let diagnostics = diagnose_draws(&model, &draws).map_err(|e| {
        warn!(target: event_names::DENSITY_REJECTED, index = e.index, error = %e.source, "draw rejected");
        CliError::InvalidDraw {
            index: e.index,
            source: e.source,
        }
    })?;

    info!(
        target: event_names::DIAGNOSTICS_FINISHED,
        num_draws = diagnostics.len(),
        "diagnostics finished"
    );

    write_output(
        global,
        &DiagnoseOutput {
            run_id: &ctx.run_id,
            config: &snapshot,
            num_draws: diagnostics.len(),
            draws: diagnostics,
        },
    )
}
