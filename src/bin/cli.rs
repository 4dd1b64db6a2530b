//! podfilter CLI
//!
//! Fetches every configured feed, drops episodes matching the feed's rules,
//! and writes the filtered feeds to disk.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::LevelFilter;
use podfilter::{
    error::Result,
    models::{Config, FeedStatus},
    pipeline,
    services::RuleRegistry,
    storage::{FeedWriter, LocalStorage},
    utils::http::HttpSource,
};

/// podfilter - Podcast Feed Filter
#[derive(Parser, Debug)]
#[command(
    name = "podfilter",
    version,
    about = "Drops unwanted episodes from podcast RSS feeds"
)]
struct Cli {
    /// Path to the feed configuration file
    #[arg(short, long, default_value = "feeds.yaml")]
    config: PathBuf,

    /// Log level (overrides LOGLEVEL and the config file)
    #[arg(long, global = true, value_parser = parse_level)]
    log_level: Option<LevelFilter>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch, filter and write every configured feed
    Run {
        /// Directory that relative file_name entries resolve against
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Write a JSON run report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Filter and report without writing any feed
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate configuration and rule chains without fetching
    Validate,
}

fn parse_level(value: &str) -> std::result::Result<LevelFilter, String> {
    value.parse().map_err(|_| {
        format!("unknown log level '{value}' (expected off, error, warn, info, debug or trace)")
    })
}

/// Initialize logging.
///
/// An explicit level wins; otherwise `LOGLEVEL` is consulted and the
/// configured default is used when it is unset.
fn init_logging(explicit: Option<LevelFilter>, default_level: &str) {
    let mut builder = match explicit {
        Some(level) => {
            let mut builder = env_logger::Builder::new();
            builder.filter_level(level);
            builder
        }
        None => env_logger::Builder::from_env(
            env_logger::Env::new().filter_or("LOGLEVEL", default_level),
        ),
    };
    builder.format_timestamp_secs().init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config);
    let default_level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    let explicit = cli
        .log_level
        .or_else(|| cli.verbose.then_some(LevelFilter::Debug));
    init_logging(explicit, &default_level);

    let config = config?;
    log::info!("Loaded configuration from {}", cli.config.display());

    let registry = RuleRegistry::with_builtins();
    let jobs = pipeline::run_validate(&config, &registry)?;

    match cli.command {
        Command::Validate => {
            log::info!("All validations passed!");
        }

        Command::Run {
            output_dir,
            report,
            dry_run,
        } => {
            let source = HttpSource::new(&config.fetch)?;
            let storage = LocalStorage::new(&output_dir);
            let writer = (!dry_run).then_some(&storage as &dyn FeedWriter);
            if dry_run {
                log::info!("Dry run: no feeds will be written");
            }

            let run = pipeline::run_feeds(&jobs, &source, writer, config.fetch.max_concurrent).await;

            for outcome in &run.feeds {
                match &outcome.status {
                    FeedStatus::Filtered { stats, output } => log::info!(
                        "✓ {}: kept {}/{}, dropped {}{}",
                        outcome.name,
                        stats.items_kept,
                        stats.items_total,
                        stats.items_dropped,
                        output
                            .as_ref()
                            .map(|o| format!(" -> {o}"))
                            .unwrap_or_default()
                    ),
                    FeedStatus::Failed { error } => {
                        log::error!("✗ {}: {}", outcome.name, error)
                    }
                }
            }

            if let Some(path) = report {
                let json = serde_json::to_string_pretty(&run)?;
                std::fs::write(&path, json)?;
                log::info!("Run report saved to {}", path.display());
            }

            if !run.is_success() {
                log::error!("{} of {} feeds failed", run.failed(), run.feeds.len());
                std::process::exit(1);
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
