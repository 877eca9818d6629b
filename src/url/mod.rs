//! URL handling module for Sumi-Frontier
//!
//! This module provides the collaborators the frontier consumes: URL
//! normalization, fingerprinting, domain extraction and the validity filter
//! applied to discovered links and to records reloaded after a restart.

mod domain;
mod fingerprint;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::extract_domain;
pub use fingerprint::{fingerprint, Fingerprint};
pub use matcher::matches_wildcard;
pub use normalize::normalize_url;

use url::Url;

/// File extensions that never lead to crawlable HTML
const BLOCKED_EXTENSIONS: &[&str] = &[
    "css", "js", "json", "xml", "bmp", "gif", "jpg", "jpeg", "ico", "png", "tif", "tiff", "svg",
    "webp", "mid", "mp2", "mp3", "mp4", "wav", "avi", "mov", "mpeg", "ram", "m4v", "mkv", "ogg",
    "ogv", "wma", "wmv", "swf", "pdf", "ps", "eps", "tex", "ppt", "pptx", "doc", "docx", "xls",
    "xlsx", "odt", "ods", "names", "data", "dat", "exe", "bz2", "tar", "msi", "bin", "7z", "psd",
    "dmg", "iso", "epub", "dll", "cnf", "tgz", "sha1", "thmx", "mso", "arff", "rtf", "jar", "csv",
    "rm", "smil", "zip", "rar", "gz", "apk", "img", "war", "sql", "ppsx", "bib",
];

/// Decides which URLs are worth handing to the frontier
#[derive(Debug, Clone, Default)]
pub struct UrlFilter {
    /// Wildcard domain patterns; empty allows every host
    allowed_domains: Vec<String>,
}

impl UrlFilter {
    /// Creates a filter restricted to the given domain patterns
    pub fn new(allowed_domains: Vec<String>) -> Self {
        Self {
            allowed_domains: allowed_domains
                .into_iter()
                .map(|pattern| pattern.to_lowercase())
                .collect(),
        }
    }

    /// Creates a filter that accepts any host
    pub fn allow_any_domain() -> Self {
        Self::default()
    }

    fn allows_host(&self, host: &str) -> bool {
        self.allowed_domains.is_empty()
            || self
                .allowed_domains
                .iter()
                .any(|pattern| matches_wildcard(pattern, host))
    }
}

/// Checks whether a URL is acceptable for crawling
///
/// A URL is valid when it uses HTTP(S), its host is covered by the filter's
/// domain patterns, and its last path segment does not name a non-HTML file.
///
/// # Examples
///
/// ```
/// use sumi_frontier::url::{is_valid, UrlFilter};
/// use url::Url;
///
/// let filter = UrlFilter::new(vec!["*.uci.edu".to_string()]);
/// assert!(is_valid(&Url::parse("https://www.ics.uci.edu/about").unwrap(), &filter));
/// assert!(!is_valid(&Url::parse("https://www.ics.uci.edu/paper.pdf").unwrap(), &filter));
/// assert!(!is_valid(&Url::parse("https://example.com/").unwrap(), &filter));
/// ```
pub fn is_valid(url: &Url, filter: &UrlFilter) -> bool {
    if url.scheme() != "http" && url.scheme() != "https" {
        return false;
    }

    let host = match extract_domain(url) {
        Some(host) => host,
        None => return false,
    };
    if !filter.allows_host(&host) {
        return false;
    }

    !has_blocked_extension(url.path())
}

fn has_blocked_extension(path: &str) -> bool {
    let last_segment = path.rsplit('/').next().unwrap_or("");
    match last_segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            BLOCKED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        }
        _ => false,
    }
}
