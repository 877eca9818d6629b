//! HTTP fetcher implementation
//!
//! Builds the shared reqwest client and classifies each fetch into a
//! [`FetchOutcome`]. Every outcome ends with the URL being marked completed;
//! only successful HTML pages contribute new links.

use crate::config::UserAgentConfig;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::time::Duration;

/// Maximum redirect hops followed per request
pub const MAX_REDIRECTS: usize = 10;

/// Result of fetching one URL
#[derive(Debug)]
pub enum FetchOutcome {
    /// Successfully fetched an HTML page
    Page {
        /// URL after redirects; links resolve against it
        final_url: String,
        status: u16,
        body: String,
    },

    /// Response was not HTML
    NotHtml { content_type: String },

    /// Non-success HTTP status
    HttpError { status: u16 },

    /// Connection, timeout, redirect or body error
    NetworkError { error: String },
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Client sending `Name/Version (+url; email)` as its user agent
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the response
pub async fn fetch_url(client: &Client, url: &str) -> FetchOutcome {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(&e),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchOutcome::HttpError {
            status: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();
    if !content_type.contains("text/html") {
        return FetchOutcome::NotHtml { content_type };
    }

    let final_url = response.url().to_string();
    match response.text().await {
        Ok(body) => FetchOutcome::Page {
            final_url,
            status: status.as_u16(),
            body,
        },
        Err(e) => classify_error(&e),
    }
}

fn classify_error(e: &reqwest::Error) -> FetchOutcome {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else if e.is_redirect() {
        "Too many redirects".to_string()
    } else {
        e.to_string()
    };
    FetchOutcome::NetworkError { error }
}
