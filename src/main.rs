//! hn-distill main entry point
//!
//! This is the command-line interface for the incremental Hacker News crawler.

use anyhow::Context;
use clap::Parser;
use hn_distill::config::{load_config_with_hash, Config};
use hn_distill::crawler::crawl;
use hn_distill::output::{load_statistics, print_run_summary, print_statistics};
use hn_distill::state::FrontierCache;
use hn_distill::storage::{open_storage, Storage};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// hn-distill: an incremental Hacker News crawler
///
/// Fetches the current top stories, collects each story's comment tree up to
/// the configured depth and count, and remembers which comments it has seen
/// so later runs only fetch what is new.
#[derive(Parser, Debug)]
#[command(name = "hn-distill")]
#[command(version = "1.0.0")]
#[command(about = "An incremental Hacker News crawler", long_about = None)]
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

    /// Ignore the frontier cache and collect every comment again
    #[arg(long)]
    fresh: bool,

    /// Validate config and show the effective settings without crawling
    #[arg(long, conflicts_with_all = ["stats", "fresh"])]
    dry_run: bool,

    /// Show statistics from the frontier cache and exit
    #[arg(long, conflicts_with_all = ["dry_run", "fresh"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).with_context(|| format!("loading {}", cli.config.display()));
        }
    };
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
        Ok(())
    } else if cli.stats {
        handle_stats(&config);
        Ok(())
    } else {
        handle_crawl(config, cli.fresh, cli.quiet).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("hn_distill=info,warn"),
            1 => EnvFilter::new("hn_distill=debug,info"),
            2 => EnvFilter::new("hn_distill=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== hn-distill Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Top stories: {}", config.crawler.top_n);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!(
        "  Max comments per story: {}",
        config.crawler.max_comments_per_story
    );
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!("  Max body chars: {}", config.crawler.max_body_chars);
    println!("  Batch pause: {}ms", config.crawler.batch_pause_ms);
    println!(
        "  Fetch articles: {}{}",
        config.crawler.fetch_articles,
        if config.crawler.fetch_articles {
            format!(" (first {} chars)", config.crawler.article_slice_chars)
        } else {
            String::new()
        }
    );

    println!("\nHTTP:");
    println!("  Base URL: {}", config.http.base_url);
    println!("  Timeout: {}ms", config.http.timeout_ms);
    println!(
        "  Retries: {} (backoff {}ms, max {}ms)",
        config.http.retries, config.http.backoff_ms, config.http.max_backoff_ms
    );
    println!("  Retry statuses: {:?}", config.http.retry_statuses);
    println!("  User agent: {}", config.http.user_agent);

    println!("\nOutput:");
    println!("  Data directory: {}", config.output.data_dir);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the frontier cache
fn handle_stats(config: &Config) {
    let storage = open_storage(Path::new(&config.output.data_dir));
    let path = storage.frontier_path();
    println!("Frontier cache: {}\n", path.display());

    let cache = FrontierCache::load(&path);
    print_statistics(&load_statistics(&cache));
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, fresh: bool, quiet: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring frontier cache)");
    } else {
        tracing::info!("Starting incremental crawl");
    }

    match crawl(config, fresh).await {
        Ok(summary) => {
            if !quiet {
                print_run_summary(&summary);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e).context("crawl failed")
        }
    }
}
