//! Crawl worker loop
//!
//! Each worker repeatedly takes a URL from the shared frontier, checks
//! robots.txt, fetches, offers discovered links back and marks the URL
//! completed. A worker exits on shutdown, or once the frontier is drained and
//! no other worker is still processing a URL that could add more.

use crate::crawler::fetcher::{fetch_url, FetchOutcome};
use crate::crawler::parser::parse_html;
use crate::frontier::{Admission, Frontier, NextUrl};
use crate::robots::{self, RobotsCache};
use crate::FrontierError;
use reqwest::Client;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Shortest back-off after an empty `next()`
pub const MIN_BACKOFF: Duration = Duration::from_millis(10);
/// Longest back-off after an empty `next()`
pub const MAX_BACKOFF: Duration = Duration::from_secs(1);
/// Back-off while the queues are empty but peers are still processing
pub const IDLE_BACKOFF: Duration = Duration::from_millis(100);

/// State shared by every worker of one crawl
pub struct CrawlContext {
    pub frontier: Arc<Frontier>,
    pub client: Client,
    pub robots: RobotsCache,
    /// Product token matched against robots.txt groups; `None` skips the check
    pub robots_agent: Option<String>,
    /// Workers between `next()` and the end of processing its URL
    pub in_flight: AtomicUsize,
    pub shutdown: AtomicBool,
}

impl CrawlContext {
    pub fn new(frontier: Arc<Frontier>, client: Client, robots_agent: Option<String>) -> Self {
        Self {
            frontier,
            client,
            robots: RobotsCache::new(),
            robots_agent,
            in_flight: AtomicUsize::new(0),
            shutdown: AtomicBool::new(false),
        }
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

/// Runs one worker until the crawl is finished or shutdown is requested
///
/// # Returns
///
/// * `Ok(u64)` - Number of URLs this worker processed
/// * `Err(FrontierError)` - The frontier's store failed
pub async fn run_worker(id: usize, ctx: Arc<CrawlContext>) -> Result<u64, FrontierError> {
    let mut processed = 0;

    loop {
        if ctx.is_shutting_down() {
            tracing::info!("Worker {} stopping on shutdown", id);
            break;
        }

        // Counted before next() so an idle peer never sees "nothing pending,
        // nothing in flight" while this worker holds a URL.
        ctx.in_flight.fetch_add(1, Ordering::SeqCst);
        match ctx.frontier.next() {
            NextUrl::Ready { url, queue } => {
                tracing::trace!("Worker {} took {} from queue {}", id, url, queue);
                let result = process_url(&ctx, &url).await;
                ctx.in_flight.fetch_sub(1, Ordering::SeqCst);
                if let Err(e) = result {
                    ctx.request_shutdown();
                    return Err(e);
                }
                processed += 1;
            }
            NextUrl::Unavailable {
                pending,
                retry_after,
            } => {
                let in_flight = ctx.in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
                if pending == 0 && in_flight == 0 {
                    tracing::info!("Frontier is empty. Stopping worker {}.", id);
                    break;
                }
                let wait = retry_after
                    .unwrap_or(IDLE_BACKOFF)
                    .clamp(MIN_BACKOFF, MAX_BACKOFF);
                tokio::time::sleep(wait).await;
            }
        }
    }

    Ok(processed)
}

/// Fetches one URL, feeds its links to the frontier and marks it completed
async fn process_url(ctx: &CrawlContext, url: &str) -> Result<(), FrontierError> {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Frontier returned unparsable url {}: {}", url, e);
            ctx.frontier.complete(url)?;
            return Ok(());
        }
    };

    if let Some(agent) = &ctx.robots_agent {
        if !robots::is_allowed(&ctx.robots, &ctx.client, &parsed, agent).await {
            tracing::info!("Url {} disallowed by robots.txt", url);
            ctx.frontier.complete(url)?;
            return Ok(());
        }
    }

    match fetch_url(&ctx.client, url).await {
        FetchOutcome::Page {
            final_url,
            status,
            body,
        } => {
            let base = Url::parse(&final_url).unwrap_or(parsed);
            let page = parse_html(&body, &base);
            let mut added = 0;
            for link in &page.links {
                if ctx.frontier.add(link)? == Admission::Enqueued {
                    added += 1;
                }
            }
            tracing::info!(
                "Downloaded {} \"{}\", status <{}>, {} links ({} new)",
                url,
                page.title.as_deref().unwrap_or(""),
                status,
                page.links.len(),
                added
            );
        }
        FetchOutcome::NotHtml { content_type } => {
            tracing::debug!("Skipping {}: content type {}", url, content_type);
        }
        FetchOutcome::HttpError { status } => {
            tracing::info!("Downloaded {}, status <{}>", url, status);
        }
        FetchOutcome::NetworkError { error } => {
            tracing::warn!("Failed to fetch {}: {}", url, error);
        }
    }

    ctx.frontier.complete(url)?;
    Ok(())
}
