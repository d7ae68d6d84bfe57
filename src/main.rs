use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use nb_batch::config::{Config, RunMode};
use nb_batch::driver::BatchDriver;
use nb_batch::engine::PapermillEngine;
use nb_batch::report::Reporter;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "nb-batch",
    version,
    about = "Run parameterized notebooks one after another and report progress"
)]
struct Cli {
    /// Configuration file (defaults to $NB_BATCH_CONFIG or nb_batch.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep going after a failed notebook and report all failures at the end
    #[arg(long)]
    continue_on_error: bool,

    /// Skip per-item headers and progress bars
    #[arg(long)]
    quiet_progress: bool,

    /// Variant to run; without one, `run.mode` from the config decides
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute one notebook once per value of a parameter
    Sweep(SweepArgs),
    /// Execute each listed notebook in place
    List(ListArgs),
}

#[derive(Args, Debug)]
struct SweepArgs {
    /// Notebook name, with or without .ipynb
    #[arg(long)]
    notebook: Option<String>,
    /// Parameter to vary
    #[arg(long)]
    parameter: Option<String>,
    /// Parameter value (repeatable); parsed as JSON, otherwise taken as text
    #[arg(long = "value", value_name = "VALUE")]
    values: Vec<String>,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Notebook names, executed in the given order
    notebooks: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    nb_batch::load_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(nb_batch::DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;
    apply_cli(&mut config, &cli);

    let batch = config.batch().context("invalid batch definition")?;
    info!(
        "Running {} items from {}",
        batch.len(),
        config.run.project_dir.display()
    );

    let engine = PapermillEngine::from_config(&config.engine);
    let driver = BatchDriver::new(&engine, config.driver_options());
    let mut reporter = Reporter::new(
        io::stdout(),
        config.run.show_progress,
        config.run.bar_length,
    );

    let summary = driver.run(&batch, &mut reporter).await?;
    summary.ensure_complete()?;
    Ok(())
}

fn apply_cli(config: &mut Config, cli: &Cli) {
    if cli.continue_on_error {
        config.run.stop_on_error = false;
    }
    if cli.quiet_progress {
        config.run.show_progress = false;
    }
    match &cli.command {
        Some(Command::Sweep(args)) => {
            config.run.mode = RunMode::Sweep;
            if let Some(notebook) = &args.notebook {
                config.sweep.notebook = notebook.clone();
            }
            if let Some(parameter) = &args.parameter {
                config.sweep.parameter = parameter.clone();
            }
            if !args.values.is_empty() {
                config.sweep.values = args.values.iter().map(|v| parse_value(v)).collect();
            }
        }
        Some(Command::List(args)) => {
            config.run.mode = RunMode::List;
            if !args.notebooks.is_empty() {
                config.list.notebooks = args.notebooks.clone();
            }
        }
        None => {}
    }
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
