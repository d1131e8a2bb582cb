//! Lumen CLI - terminal front-end for running pretrained models
//!
//! This CLI provides a `lumen` command that lists the registered models,
//! runs a single input through one of them, or starts an interactive session
//! that mirrors the select / load / run / clear workflow.

mod commands;
mod terminal;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lumen_core::LumenConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::{interactive, models, run};

/// Lumen - pick a model, load it, feed it input, look at the result
#[derive(Parser, Debug)]
#[command(
    name = "lumen",
    author,
    version,
    about = "Lumen - run pretrained text and image models from the terminal",
    long_about = "Lumen drives hosted Hugging Face models (Stable Diffusion, DialoGPT, ViT).\nSet HF_API_TOKEN or huggingface.api_token in ~/.lumen/config.toml before loading a model."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error). Defaults to RUST_LOG, then the config file, then warn
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Configuration file to use instead of ~/.lumen/config.toml and ./.lumenrc
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory generated images are saved to (overrides output.image_dir)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered models and their load state
    Models {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load a model and run a single input through it
    Run {
        /// Model display name (e.g. "Text Generation")
        #[arg(short, long)]
        model: String,

        /// Text input
        #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
        input: Option<String>,

        /// File input; the path is handed to the model as-is
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Start an interactive session (default)
    Interactive,
}

fn load_config(args: &Args) -> anyhow::Result<LumenConfig> {
    let mut config = match &args.config {
        Some(path) => LumenConfig::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => LumenConfig::discover_and_load().context("Failed to load configuration")?,
    };

    config.apply_env();
    if let Some(dir) = &args.output_dir {
        config.output.image_dir.clone_from(dir);
    }
    config.validate()?;
    Ok(config)
}

fn init_tracing(cli_level: Option<&str>, config_level: Option<&str>) -> anyhow::Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(config_level.unwrap_or("warn")))?,
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let config = load_config(&args)?;
    init_tracing(args.log_level.as_deref(), config.log_level.as_deref())?;
    tracing::debug!(models = ?config.models.enabled, "Configuration loaded");

    match args.command.unwrap_or(Command::Interactive) {
        Command::Models { json } => models::execute(&config, json),
        Command::Run { model, input, file } => run::execute(&config, &model, input, file).await,
        Command::Interactive => interactive::execute(&config).await,
    }
}
