//! Sumi-Frontier main entry point
//!
//! Command-line interface for running a polite crawl over the persistent
//! URL frontier, or inspecting a saved one.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use sumi_frontier::config::{load_config, Config};
use sumi_frontier::crawler::crawl;
use sumi_frontier::frontier::{route, DomainRouter};
use sumi_frontier::storage::{open_stores, QueryCountStore, RecordStore};
use sumi_frontier::url::{extract_domain, is_valid, normalize_url, UrlFilter};
use tracing_subscriber::EnvFilter;

/// Sumi-Frontier: a persistent, polite crawl frontier
///
/// Crawls from a set of seed URLs, keeping every discovered URL in a SQLite
/// file so an interrupted crawl resumes where it stopped.
#[derive(Parser, Debug)]
#[command(name = "sumi-frontier")]
#[command(version)]
#[command(about = "A persistent, polite URL frontier for web crawling", long_about = None)]
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

    /// Resume from the saved frontier (default behavior)
    #[arg(long, conflicts_with = "fresh")]
    resume: bool,

    /// Wipe the saved frontier and start from the seeds
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Validate config and show how the seeds would be scheduled
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the saved frontier and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(&config, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_frontier=info,warn"),
            1 => EnvFilter::new("sumi_frontier=debug,info"),
            2 => EnvFilter::new("sumi_frontier=trace,debug"),
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

/// Handles the --dry-run mode: prints the effective config and seed routing
fn handle_dry_run(config: &Config) {
    println!("=== Sumi-Frontier Dry Run ===\n");

    println!("Crawler:");
    println!("  Workers: {}", config.crawler.workers);
    println!("  Politeness delay: {}ms", config.crawler.time_delay);
    println!("  Respect robots.txt: {}", config.crawler.respect_robots);
    if config.crawler.allowed_domains.is_empty() {
        println!("  Allowed domains: any");
    } else {
        println!("  Allowed domains: {}", config.crawler.allowed_domains.join(", "));
    }

    println!("\nUser Agent: {}", config.user_agent.header_value());
    println!("\nDatabase: {}", config.storage.database_path);

    let frontier = &config.frontier;
    println!("\nFrontier:");
    println!("  Queues: {}", frontier.queue_count);
    println!("  Query limit: {}", frontier.query_limit);
    println!("  Depth limit: {}", frontier.depth_limit);
    println!("  Breadth limits (advisory):");
    for depth in 0..frontier.breadth_limits.len() {
        match frontier.breadth_limit(depth) {
            Some(limit) => println!("    depth {}: {} pages", depth, limit),
            None => println!("    depth {}: unbounded", depth),
        }
    }

    let router = DomainRouter::new(frontier.queue_count);
    let filter = UrlFilter::new(config.crawler.allowed_domains.clone());
    println!("\nSeeds ({}):", config.crawler.seeds.len());
    for seed in &config.crawler.seeds {
        match normalize_url(seed) {
            Ok(url) if is_valid(&url, &filter) => {
                let domain = extract_domain(&url).unwrap_or_default();
                println!("  - {} -> queue {}", url, router.route(&domain));
            }
            Ok(url) => println!("  - {} (filtered out)", url),
            Err(e) => println!("  - {} (invalid: {})", seed, e),
        }
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: reads counters from the saved frontier
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let path = Path::new(&config.storage.database_path);
    println!("Database: {}\n", path.display());
    if !path.exists() {
        println!("No saved frontier found.");
        return Ok(());
    }

    let (records, query_counts) = open_stores(path)
        .with_context(|| format!("Failed to open frontier database {}", path.display()))?;

    let total = records.count()?;
    let completed = records.count_completed()?;
    let pending: Vec<_> = records
        .iterate()?
        .into_iter()
        .filter(|record| !record.completed)
        .collect();

    let queue_sizes = pending_per_queue(
        pending.iter().map(|record| record.url.as_str()),
        config.frontier.queue_count,
    );

    println!("URLs discovered: {}", total);
    println!("URLs completed:  {}", completed);
    println!("URLs pending:    {}", pending.len());
    println!("Query-stripped URLs tracked: {}", query_counts.tracked()?);
    println!("\nPending per queue:");
    for (queue, size) in queue_sizes.iter().enumerate().filter(|(_, size)| **size > 0) {
        println!("  queue {:>4}: {}", queue, size);
    }

    Ok(())
}

/// Counts pending URLs per politeness queue
fn pending_per_queue<'a>(urls: impl IntoIterator<Item = &'a str>, queue_count: usize) -> Vec<usize> {
    let queue_count = queue_count.max(1);
    let mut queue_sizes = vec![0usize; queue_count];
    for raw in urls {
        if let Ok(url) = url::Url::parse(raw) {
            let domain = extract_domain(&url).unwrap_or_default();
            queue_sizes[route(&domain, queue_count)] += 1;
        }
    }
    queue_sizes
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring saved frontier)");
    } else {
        tracing::info!("Starting crawl (resuming saved frontier if present)");
    }
    tracing::info!(
        "Seeds: {}, workers: {}, queues: {}",
        config.crawler.seeds.len(),
        config.crawler.workers,
        config.frontier.queue_count
    );

    let summary = crawl(config, fresh).await.context("Crawl failed")?;
    tracing::info!(
        "Crawl completed: {} processed, {} pending",
        summary.processed,
        summary.stats.pending
    );
    Ok(())
}
