//! Stratus CLI - command-line access to the ML platform SDK.
//!
//! Provides a `stratus` command for managing datasets, training pipelines,
//! tuning jobs and tensorboard experiments.

mod commands;
mod config;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{dataset, job, settings, tensorboard, tuning};
use commands::{DatasetCommand, JobCommand, TensorboardCommand, TuningCommand};

/// Stratus CLI - manage ML platform resources from the terminal
#[derive(Parser, Debug)]
#[command(
    name = "stratus",
    author,
    version,
    about = "Stratus - ML platform resource management",
    long_about = "Stratus drives datasets, training pipelines, tuning jobs and tensorboard experiments\non the managed ML platform, waiting on long-running work where needed."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Configuration file (defaults to ./stratus.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Project override
    #[arg(long, global = true)]
    project: Option<String>,

    /// Location override
    #[arg(long, global = true)]
    location: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage datasets
    #[command(subcommand)]
    Dataset(DatasetCommand),

    /// Inspect, wait on and tear down training pipelines
    #[command(subcommand)]
    Job(JobCommand),

    /// Create and wait on tuning jobs
    #[command(subcommand)]
    Tuning(TuningCommand),

    /// Tensorboard experiment helpers
    #[command(subcommand)]
    Tensorboard(TensorboardCommand),

    /// Show the resolved configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(());
    };

    let overrides = config::Overrides { project: args.project, location: args.location };
    let client_config = config::load_config(args.config.as_deref(), &overrides)?;

    if let Command::Config { json } = command {
        return settings::show(&client_config, json);
    }

    let ctx = config::connect(client_config)?;
    match command {
        Command::Dataset(cmd) => dataset::execute(&ctx, cmd).await?,
        Command::Job(cmd) => job::execute(&ctx, cmd).await?,
        Command::Tuning(cmd) => tuning::execute(&ctx, cmd).await?,
        Command::Tensorboard(cmd) => tensorboard::execute(&ctx, cmd).await?,
        Command::Config { .. } => {}
    }

    Ok(())
}
