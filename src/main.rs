//! Main entry point for the UFC Elo rating tool
//!
//! Loads the fight history, pulls any newly completed events, replays every
//! bout through the rating engine and prints the ranking.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, warn};
use ufc_elo::config::{validate_config, AppConfig};
use ufc_elo::rating::RankingKey;
use ufc_elo::report::{self, OutputFormat, ReportOptions};
use ufc_elo::service::AppState;

/// UFC Elo - rank fighters by replaying their fight history
#[derive(Parser)]
#[command(
    name = "ufc-elo",
    version,
    about = "Calculate and display Elo ratings for UFC fighters",
    long_about = "Replays the recorded UFC fight history through an Elo rating model, \
                 appends newly completed events fetched from the results provider, \
                 and prints the highest rated fighters."
)]
struct Args {
    /// Number of fighters to display
    #[arg(short, long, value_name = "N", help = "Number of top fighters to display")]
    number: Option<usize>,

    /// Verbose table
    #[arg(
        short,
        long,
        help = "Show peak rating, record, streak, schedule strength and recent form"
    )]
    verbose: bool,

    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// History file override
    #[arg(long, value_name = "FILE", help = "Override the fight history CSV path")]
    history: Option<PathBuf>,

    /// Skip fetching
    #[arg(long, help = "Rate the recorded history without fetching new events")]
    offline: bool,

    /// Fail on malformed history rows
    #[arg(long, help = "Abort when the history contains a malformed row")]
    strict: bool,

    /// Ranking key
    #[arg(
        long,
        value_name = "KEY",
        default_value = "rating",
        help = "Order the ranking by rating, peak or schedule"
    )]
    sort: RankingKey,

    /// Output format
    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "table",
        help = "Output format: table or json"
    )]
    format: OutputFormat,

    /// Single fighter lookup
    #[arg(long, value_name = "NAME", help = "Show a single fighter instead of the ranking")]
    fighter: Option<String>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,
}

/// Initialize structured logging with the configured level
///
/// Log lines go to stderr so the ranking on stdout stays clean.
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if let Some(history) = &args.history {
        config.store.path = history.clone();
    }

    if args.strict {
        config.store.strict = true;
    }

    if args.offline {
        config.fetch.enabled = false;
    }

    if let Some(number) = args.number {
        config.display.top = number;
    }

    if args.verbose {
        config.display.verbose = true;
    }

    validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let options = ReportOptions {
        top: config.display.top,
        verbose: config.display.verbose,
        key: args.sort,
        format: args.format,
    };

    let mut app_state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize: {:#}", e);
            std::process::exit(1);
        }
    };

    let (standings, summary) = match app_state.run().await {
        Ok(result) => result,
        Err(e) => {
            error!("Rating run failed: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Some(sync) = &summary.sync {
        if !sync.persisted {
            warn!("Ratings include fetched events that could not be saved");
        }
    }

    if let Some(name) = &args.fighter {
        match report::render_fighter(&standings, name, &options)? {
            Some(out) => println!("{}", out),
            None => {
                eprintln!("No fighter named '{}' in the history", name);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    println!("{}", report::render(&standings, &options)?);
    Ok(())
}
