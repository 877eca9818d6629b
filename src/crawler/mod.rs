//! Crawler module driving the frontier end to end
//!
//! This module contains a small crawl loop around [`Frontier`]:
//! - HTTP fetching with a shared reqwest client
//! - HTML parsing and link extraction
//! - Per-origin robots.txt checks
//! - A pool of tokio worker tasks with graceful Ctrl-C shutdown

mod fetcher;
mod parser;
mod worker;

pub use fetcher::{build_http_client, fetch_url, FetchOutcome, MAX_REDIRECTS};
pub use parser::{parse_html, ParsedPage};
pub use worker::{run_worker, CrawlContext, IDLE_BACKOFF, MAX_BACKOFF, MIN_BACKOFF};

use crate::config::Config;
use crate::frontier::{Frontier, FrontierStats};
use crate::FrontierError;
use std::sync::Arc;

/// What a finished crawl did
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// URLs taken from the frontier and processed
    pub processed: u64,
    /// Frontier counters when the workers stopped
    pub stats: FrontierStats,
}

/// Opens the frontier and runs a complete crawl
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `fresh` - Wipe the saved frontier and start from the seeds
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - The frontier drained or the crawl was interrupted
/// * `Err(FrontierError)` - Setup failed or a worker hit a storage error
pub async fn crawl(config: &Config, fresh: bool) -> Result<CrawlSummary, FrontierError> {
    let frontier = Arc::new(Frontier::open(config, fresh)?);
    run_workers(config, frontier).await
}

/// Runs `config.crawler.workers` workers over an opened frontier
pub async fn run_workers(
    config: &Config,
    frontier: Arc<Frontier>,
) -> Result<CrawlSummary, FrontierError> {
    let client = build_http_client(&config.user_agent)?;
    let robots_agent = config
        .crawler
        .respect_robots
        .then(|| config.user_agent.crawler_name.clone());
    let ctx = Arc::new(CrawlContext::new(Arc::clone(&frontier), client, robots_agent));

    let signal_ctx = Arc::clone(&ctx);
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight pages");
            signal_ctx.request_shutdown();
        }
    });

    tracing::info!(
        "Starting {} workers over {} pending urls",
        config.crawler.workers,
        frontier.pending_count()
    );
    let handles: Vec<_> = (0..config.crawler.workers as usize)
        .map(|id| tokio::spawn(run_worker(id, Arc::clone(&ctx))))
        .collect();

    let mut processed = 0;
    let mut first_error = None;
    for handle in handles {
        match handle.await {
            Ok(Ok(count)) => processed += count,
            Ok(Err(e)) => {
                tracing::error!("Worker failed: {}", e);
                ctx.request_shutdown();
                first_error.get_or_insert(e);
            }
            Err(e) => tracing::error!("Worker task panicked: {}", e),
        }
    }
    signal_task.abort();

    if let Some(e) = first_error {
        return Err(e);
    }

    let stats = frontier.stats()?;
    tracing::info!(
        "Crawl finished: {} urls processed, {} of {} completed, {} pending",
        processed,
        stats.completed,
        stats.records,
        stats.pending
    );
    Ok(CrawlSummary { processed, stats })
}
