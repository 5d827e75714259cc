//! route-kit
//!
//! ```text
//! route-kit serve --config route-kit.toml
//!     → config (load + validate)
//!     → lifecycle::startup (echo handler per [[routes]] entry,
//!       query and body validation middleware)
//!     → http::server (HTTPS bootstrap, graceful shutdown on Ctrl+C)
//!
//! route-kit check --spec body.toml --data request.json
//!     → SpecificationDocument → ObjectDataSpecification
//!     → validation::process → processed JSON or the message list
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;

use route_kit::config::load_config;
use route_kit::http::middleware::REQUEST_BODY_LABEL;
use route_kit::http::server::NoEvents;
use route_kit::lifecycle::{shutdown_signal, startup, Shutdown};
use route_kit::observability::logging;
use route_kit::validation::{process, ProcessingResult, SpecificationDocument};

#[derive(Parser)]
#[command(name = "route-kit")]
#[command(about = "Validating HTTPS endpoints from declarative specifications", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the configured routes over HTTPS
    Serve {
        #[arg(short, long, default_value = "route-kit.toml")]
        config: PathBuf,
    },
    /// Validate a JSON document against a specification document
    Check {
        /// Specification document (.toml or .json)
        #[arg(short, long)]
        spec: PathBuf,

        /// JSON data to validate
        #[arg(short, long)]
        data: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Serve { config } => serve(&config).await,
        Commands::Check { spec, data } => check(&spec, &data),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn serve(path: &Path) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = load_config(path)?;
    logging::init(&config.logging.level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "route-kit starting");

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.trigger();
    });

    startup::serve(&config, Arc::new(NoEvents), &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(ExitCode::SUCCESS)
}

fn check(spec: &Path, data: &Path) -> Result<ExitCode, Box<dyn std::error::Error>> {
    logging::init("warn");

    let specification = SpecificationDocument::load(spec)?.build(REQUEST_BODY_LABEL)?;
    let raw: Value = serde_json::from_str(&std::fs::read_to_string(data)?)?;

    match process(&raw, &specification) {
        ProcessingResult::Valid { processed_data } => {
            println!("{}", serde_json::to_string_pretty(&processed_data)?);
            Ok(ExitCode::SUCCESS)
        }
        ProcessingResult::Invalid {
            validation_errors_messages,
        } => {
            for message in &validation_errors_messages {
                eprintln!("{}", message);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
