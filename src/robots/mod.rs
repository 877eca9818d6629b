//! Robots.txt handling module
//!
//! Workers consult robots.txt before fetching. Rules are fetched once per
//! origin and cached; a missing or unreachable robots.txt allows everything.

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsCache};
pub use parser::ParsedRobots;

use reqwest::Client;
use url::Url;

/// Fetches and parses `<origin>/robots.txt`
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `origin` - Serialized origin, e.g. "https://example.com"
///
/// # Returns
///
/// The parsed rules, or allow-all if the file is missing, not a success
/// response, or the request failed.
pub async fn fetch_robots(client: &Client, origin: &str) -> ParsedRobots {
    let robots_url = format!("{}/robots.txt", origin);
    let response = match client.get(&robots_url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("Failed to fetch {}: {}", robots_url, e);
            return ParsedRobots::allow_all();
        }
    };

    if !response.status().is_success() {
        tracing::debug!("No robots.txt at {} ({})", robots_url, response.status());
        return ParsedRobots::allow_all();
    }

    match response.text().await {
        Ok(body) => ParsedRobots::from_content(&body),
        Err(e) => {
            tracing::debug!("Failed to read {}: {}", robots_url, e);
            ParsedRobots::allow_all()
        }
    }
}

/// Checks a URL against robots.txt, fetching the origin's rules on a cache miss
///
/// # Arguments
///
/// * `cache` - Shared per-origin cache
/// * `client` - The HTTP client to use on a miss
/// * `url` - The URL about to be fetched
/// * `user_agent` - Product token matched against `User-agent` groups
pub async fn is_allowed(cache: &RobotsCache, client: &Client, url: &Url, user_agent: &str) -> bool {
    let origin = url.origin().ascii_serialization();
    let rules = match cache.get(&origin) {
        Some(rules) => rules,
        None => {
            tracing::debug!("Fetching robots.txt for {}", origin);
            let rules = fetch_robots(client, &origin).await;
            cache.insert(origin, rules.clone());
            rules
        }
    };
    rules.is_allowed(url.as_str(), user_agent)
}
