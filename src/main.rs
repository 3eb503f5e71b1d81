//! Linkscan main entry point
//!
//! This is the command-line interface for the Linkscan broken link checker.

use anyhow::Context;
use clap::Parser;
use linkscan::config::{load_config_with_hash, validate_concurrency, Config};
use linkscan::crawler::Crawler;
use linkscan::output::{print_report, CrawlStatistics};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Linkscan: a broken link checker
///
/// Linkscan crawls every page under the root URL with a fixed number of
/// concurrent workers and reports each link that answers with an error status.
#[derive(Parser, Debug)]
#[command(name = "linkscan")]
#[command(version)]
#[command(about = "Scan a site for broken links", long_about = None)]
struct Cli {
    /// Root URL to scan; https:// is assumed when no scheme is given
    #[arg(value_name = "ROOT_URL")]
    root_url: String,

    /// Number of concurrent workers
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Show succeeded links (-v) and debug logging (-vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_settings(&cli)?;

    println!("Start scanning: {}", cli.root_url);

    let crawler = Crawler::from_config(&cli.root_url, &config)
        .with_context(|| format!("Failed to start crawl of {}", cli.root_url))?;

    let report = crawler
        .crawl_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for interrupt: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
        .context("Crawl failed")?;

    print_report(&report, cli.verbose >= 1).context("Failed to write report")?;
    tracing::info!("{}", CrawlStatistics::from_report(&report));

    if report.worker_failures > 0 {
        anyhow::bail!("{} worker task(s) failed", report.worker_failures);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let default_filter = if quiet {
        "error"
    } else {
        match verbose {
            0 | 1 => "linkscan=info,warn",
            2 => "linkscan=debug,info",
            _ => "trace",
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file if one was given and applies CLI overrides
fn load_settings(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(concurrency) = cli.concurrency {
        validate_concurrency(concurrency).context("Invalid --concurrency")?;
        config.crawler.concurrency = concurrency;
    }

    Ok(config)
}
