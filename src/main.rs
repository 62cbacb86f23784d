//! Lead Pulse main entry point
//!
//! This is the command-line interface for the daily lead-source report.

use clap::Parser;
use lead_pulse::config::{load_config_with_hash, Config};
use lead_pulse::output::{print_outcome, write_outputs};
use lead_pulse::Pipeline;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Lead Pulse: daily lead-source reporting for Zoho CRM
///
/// Lead Pulse pulls the contacts created since the start of yesterday,
/// groups them by lead source, and asks a language model for a marketing
/// report. Credentials are read from OPENAI_API_KEY, ZOHO_CLIENT_ID,
/// ZOHO_CLIENT_SECRET and ZOHO_REFRESH_TOKEN.
#[derive(Parser, Debug)]
#[command(name = "lead-pulse")]
#[command(version)]
#[command(about = "Daily lead-source report for Zoho CRM", long_about = None)]
struct Cli {
    /// Path to an optional TOML settings file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write the markdown run summary to this path
    #[arg(long, value_name = "PATH")]
    report_out: Option<PathBuf>,

    /// Write a JSON export of the run to this path
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Validate config and show the query that would be issued, without any network calls
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    let (config, config_hash) = match load_config_with_hash(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    match (&cli.config, &config_hash) {
        (Some(path), Some(hash)) => tracing::info!(
            "Configuration loaded from {} (hash: {})",
            path.display(),
            hash
        ),
        _ => tracing::info!("Configuration loaded from environment with default settings"),
    }

    let report_out = cli
        .report_out
        .clone()
        .or_else(|| config.output.report_path.clone().map(PathBuf::from));
    let export = cli
        .export
        .clone()
        .or_else(|| config.output.export_path.clone().map(PathBuf::from));

    let pipeline = Pipeline::new(config)?;

    if cli.dry_run {
        handle_dry_run(pipeline.config(), &pipeline.preview_query());
        return Ok(());
    }

    let state = pipeline.run().await;
    print_outcome(&state);

    if state.is_failed() {
        std::process::exit(1);
    }

    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S %:z").to_string();
    write_outputs(&state, &generated_at, report_out.as_deref(), export.as_deref())?;

    Ok(())
}

/// Sets up the logging/tracing subscriber
///
/// `-q` and `-v` win over `RUST_LOG`; without either flag `RUST_LOG` is used
/// when set, falling back to info for this crate.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = match verbosity_directive(verbose, quiet) {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("lead_pulse=info,warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Filter directive forced by the command-line flags, if any
fn verbosity_directive(verbose: u8, quiet: bool) -> Option<&'static str> {
    if quiet {
        return Some("error");
    }
    match verbose {
        0 => None,
        1 => Some("lead_pulse=debug,info"),
        2 => Some("lead_pulse=trace,debug"),
        _ => Some("trace"),
    }
}

/// Handles the --dry-run mode: shows endpoints and the query without calling them
fn handle_dry_run(config: &Config, query: &str) {
    println!("=== Lead Pulse Dry Run ===\n");

    println!("Endpoints:");
    println!("  Token: {}", config.endpoints.token_url);
    println!("  COQL: {}", config.endpoints.coql_url);
    println!("  LLM: {}", config.endpoints.llm_base_url);

    println!("\nModel:");
    println!("  Name: {}", config.llm.model);
    println!("  Temperature: {}", config.llm.temperature);

    println!("\nQuery:");
    println!("  {}", query);

    println!("\n✓ Configuration is valid");
}
