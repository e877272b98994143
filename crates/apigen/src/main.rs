//! `apigen` command line interface.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use apigen_core::engine::{generate, NoExtensionManager};
use apigen_core::generators::finder::ModelTypeFinder;
use apigen_core::{ApiModel, Configuration};

#[derive(Parser)]
#[command(name = "apigen", version, about = "Generate TypeScript interface code from an API description")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate artifacts from a description into a destination directory
    Generate(GenerateArgs),
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Path to the JSON API description
    #[arg(long)]
    description: PathBuf,
    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Destination directory for generated artifacts
    #[arg(long)]
    out: PathBuf,
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => run_generate(&args),
    }
}

fn run_generate(args: &GenerateArgs) -> ExitCode {
    let api = match ApiModel::load(&args.description) {
        Ok(api) => api,
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let config = match &args.config {
        Some(path) => match Configuration::load(path) {
            Ok(config) => config,
            Err(err) => {
                error!("{err}");
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => Configuration::default(),
    };

    let finder = ModelTypeFinder::new(&api);
    match generate(&api, &finder, Arc::new(NoExtensionManager), &config, &args.out) {
        Ok(()) => {
            println!("Generated into {}", args.out.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    // APIGEN_LOG controls the log level: "trace", "debug", "info", "warn",
    // "error", or a full tracing filter spec.
    let filter = match std::env::var("APIGEN_LOG") {
        Ok(level) if is_plain_level(&level) => format!("apigen_core={level},apigen={level}"),
        Ok(spec) => spec,
        Err(_) => "apigen_core=warn".to_string(),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}
