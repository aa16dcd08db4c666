//! Prowl main entry point
//!
//! This is the command-line interface for the Prowl product crawler.

use anyhow::Context;
use clap::Parser;
use prowl::config::{load_config_with_hash, Config};
use prowl::crawler::run_crawl;
use prowl::output::{print_summary, CrawlSummary};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Prowl: a product page discovery crawler
///
/// Prowl follows links from each seed URL up to the configured depth and
/// records every page whose URL matches a product pattern. Results are
/// written as JSON, one entry per seed.
#[derive(Parser, Debug)]
#[command(name = "prowl")]
#[command(version = "1.0.0")]
#[command(about = "A product page discovery crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed URL to crawl; repeat to crawl several (replaces configured seeds)
    #[arg(long = "seed", value_name = "URL")]
    seeds: Vec<String>,

    /// Path of the JSON result file
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Override the maximum link depth
    #[arg(long)]
    max_depth: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    apply_overrides(&mut config, &cli);
    prowl::config::validate(&config).context("invalid configuration")?;

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let result_path = config.output.result_path.clone();
    let results = run_crawl(config, cancel).await.context("crawl failed")?;

    print_summary(&CrawlSummary::from_results(&results), &result_path);

    Ok(())
}

/// Applies command-line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if !cli.seeds.is_empty() {
        config.seeds = cli.seeds.clone();
    }
    if let Some(output) = &cli.output {
        config.output.result_path = output.clone();
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
}

/// Cancels the crawl on Ctrl-C; partial results are still written
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling crawl");
            cancel.cancel();
        }
    });
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("prowl=info,warn"),
            1 => EnvFilter::new("prowl=debug,info"),
            2 => EnvFilter::new("prowl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
