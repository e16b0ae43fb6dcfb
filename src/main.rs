//! Kumo-Swarm main entry point
//!
//! Command-line interface for the pooled frontier crawler.

use clap::Parser;
use kumo_swarm::config::load_config_with_hash;
use kumo_swarm::crawler::Controller;
use kumo_swarm::services::{ServiceHandles, SqliteServices};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Kumo-Swarm: a pooled frontier web crawler
///
/// Drains a shared URL frontier with a pool of workers, storing each
/// fetched page exactly once, until the frontier is empty and every
/// worker is idle.
#[derive(Parser, Debug)]
#[command(name = "kumo-swarm")]
#[command(version = "1.0.0")]
#[command(about = "A pooled frontier web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Clear any leftover frontier before seeding
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, &config_hash);
        return Ok(());
    }

    handle_crawl(config, cli.fresh).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kumo_swarm=info,warn"),
            1 => EnvFilter::new("kumo_swarm=debug,info"),
            2 => EnvFilter::new("kumo_swarm=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the crawl plan
fn handle_dry_run(config: &kumo_swarm::config::Config, config_hash: &str) {
    println!("=== Kumo-Swarm Dry Run ===\n");

    println!("Crawl target:");
    println!("  Domain: {}", config.crawl.domain);
    println!("  Seeds ({}):", config.crawl.seeds.len());
    for seed in &config.crawl.seeds {
        println!("    * {}", seed);
    }

    println!("\nWorker pool:");
    println!("  Workers: {}", config.crawler.workers);
    println!("  Poll interval: {}ms", config.crawler.poll_interval_ms);
    println!(
        "  Idle backoff: {}ms (max {}ms)",
        config.crawler.idle_backoff_ms, config.crawler.max_idle_backoff_ms
    );

    println!("\nRetry policy:");
    println!("  Max attempts: {}", config.retry.max_attempts);
    println!("  Base wait: {}ms", config.retry.base_wait_ms);

    println!("\nFetcher:");
    println!("  User agent: {}", config.fetcher.user_agent);
    println!("  Charsets: {}", config.fetcher.charsets.join(", "));
    if let Some(proxy) = &config.fetcher.proxy {
        println!("  Proxy: {}", proxy);
    }

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);

    println!("\n✓ Configuration is valid (hash: {})", config_hash);
    println!(
        "✓ Would start {} workers over {} seed URLs",
        config.crawler.workers,
        config.crawl.seeds.len()
    );
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: kumo_swarm::config::Config,
    fresh: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let services = Arc::new(SqliteServices::new(std::path::Path::new(
        &config.storage.database_path,
    ))?);

    if fresh {
        tracing::info!("Starting fresh crawl (clearing leftover frontier)");
        services.clear_frontier()?;
    }

    let controller = Controller::new(config, ServiceHandles::from_shared(services))?;

    // Ctrl-C stops the pool between iterations; in-flight fetches finish
    let cancel = controller.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping workers");
            cancel.cancel();
        }
    });

    match controller.run().await {
        Ok(summary) => {
            tracing::info!(
                "Crawl completed: {} claimed, {} stored, {} without result",
                summary.pages_claimed,
                summary.pages_stored,
                summary.no_results
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
