//! Command-line entry point for the cnnflow pipeline.

use anyhow::Context;
use clap::Parser;
use cnnflow::constants::{CONFIG_FILE_PATH, LOG_DIR, PARAMS_FILE_PATH};
use cnnflow::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Prepare a transfer-learning image classifier.
#[derive(Debug, Parser)]
#[command(name = "cnnflow", version, about)]
struct Cli {
    /// Pipeline configuration file.
    #[arg(long, default_value = CONFIG_FILE_PATH)]
    config: PathBuf,

    /// Hyperparameter overrides; `params.yaml` is used when present.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Run only the named stage; repeat to run several.
    #[arg(long = "stage", value_name = "NAME")]
    stages: Vec<String>,

    /// Stdout log format.
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormat,

    /// Directory of the run log file.
    #[arg(long, default_value = LOG_DIR)]
    log_dir: PathBuf,

    /// Log to stdout only.
    #[arg(long)]
    no_log_file: bool,
}

fn load_params(explicit: Option<&Path>) -> anyhow::Result<Params> {
    let path = match explicit {
        Some(path) => path,
        None if Path::new(PARAMS_FILE_PATH).is_file() => Path::new(PARAMS_FILE_PATH),
        None => return Ok(Params::default()),
    };
    Params::from_yaml(path).with_context(|| format!("failed to load params from {}", path.display()))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let params = load_params(cli.params.as_deref())?;

    let mut pipeline = TrainingPipeline::standard(Arc::new(HttpDownloader::new()), Arc::new(BuiltinZoo))?;
    if !cli.stages.is_empty() {
        pipeline = pipeline.select(cli.stages.as_slice())?;
    }

    let ctx = PipelineContext::new(cli.config, params);
    info!(run_id = %ctx.run_id(), config = %ctx.config_path().display(), "Starting run");
    let reports = pipeline.run(&ctx).await?;

    for report in &reports {
        info!(
            stage = %report.name,
            status = %report.status,
            duration_ms = report.duration_ms(),
            artifacts = report.artifacts.len(),
            "Stage report"
        );
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        format: cli.log_format,
        log_dir: (!cli.no_log_file).then(|| cli.log_dir.clone()),
        ..LoggingConfig::default()
    };
    init_logging(&logging).context("failed to initialize logging")?;

    if let Err(e) = run(cli).await {
        let chain = format!("{e:#}");
        error!(error = %chain, "Run failed");
        return Err(e);
    }
    Ok(())
}
