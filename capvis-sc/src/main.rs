//! capvis-sc (Sanity Checker) - Challenge submission validator
//!
//! Checks a participant's prediction spreadsheet against the submission
//! schema and the reference dataset for a mode, from the command line or
//! over HTTP.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use capvis_common::CheckerConfig;
use capvis_sc::api::buildinfo::BuildInfo;
use capvis_sc::catalog::{sample_submission, ReferenceCatalog};
use capvis_sc::{build_router, AppState, ValidationEngine, ValidationMode, ValidationReport};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "capvis-sc", version, about = "Capsule Vision submission sanity checker")]
struct Cli {
    /// Config file (overrides CAPVIS_CONFIG and the per-user config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a submission file
    Check {
        /// Submission file (.xlsx or .csv)
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = ValidationMode::Test)]
        mode: ValidationMode,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the ground-truth file for a mode
    Reference {
        #[arg(long, value_enum)]
        mode: ValidationMode,

        #[arg(long)]
        out: PathBuf,
    },
    /// Print (or write) a correctly formatted sample submission as CSV
    Sample {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run the HTTP server
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let (config, config_source) =
        CheckerConfig::resolve(cli.config.as_deref()).context("Failed to load configuration")?;

    // Logs go to stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let build = BuildInfo::current();
    info!(
        "Starting capvis-sc v{} [{}] built {} ({})",
        build.version, build.git_hash, build.build_timestamp, build.build_profile
    );
    config_source.log();

    match cli.command {
        Command::Check { file, mode, json } => {
            let engine = ValidationEngine::new(config);
            let report = engine.validate_path(mode, &file);
            print_report(&report, json)?;
            Ok(if report.passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Reference { mode, out } => {
            let payload = ReferenceCatalog::ground_truth_payload(&config, mode)?
                .with_context(|| format!("{} mode has no downloadable ground truth", mode))?;
            std::fs::write(&out, &payload.bytes)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            info!("Wrote {} ({} bytes) to {}", payload.file_name, payload.bytes.len(), out.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::Sample { out } => {
            let csv = sample_submission().to_csv()?;
            match out {
                Some(path) => std::fs::write(&path, csv)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => print!("{}", csv),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Serve { port } => {
            let addr = format!("{}:{}", config.server.host, port.unwrap_or(config.server.port));
            let app = build_router(AppState::new(ValidationEngine::new(config)));

            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("capvis-sc listening on http://{}", addr);
            info!("Health check: http://{}/health", addr);

            axum::serve(listener, app).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_report(report: &ValidationReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("Mode: {}", report.mode);
    for message in report.messages() {
        println!("  - {}", message);
    }
    println!("{}", report.summary());
    Ok(())
}
