//! HTML link extraction
//!
//! Pulls followable links out of a fetched page. The frontier does all
//! normalization, filtering and deduplication, so this only resolves hrefs
//! against the page URL and drops ones that can never be fetched.

use scraper::{Html, Selector};
use url::Url;

/// What a worker needs from a fetched page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Trimmed `<title>` text, if any
    pub title: Option<String>,

    /// Absolute http(s) URLs, in document order
    pub links: Vec<String>,
}

/// Parses an HTML document
///
/// Links come from `<a href>` (except `download` anchors) and
/// `<link rel="canonical">`. Fragment-only, `javascript:`, `mailto:`, `tel:`
/// and `data:` hrefs are skipped.
///
/// # Example
///
/// ```
/// use sumi_frontier::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let parsed = parse_html(html, &Url::parse("https://example.com/").unwrap());
/// assert_eq!(parsed.title.as_deref(), Some("Test"));
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);
    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document, base_url),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let selector = match Selector::parse(r#"a[href], link[rel="canonical"][href]"#) {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    matches!(absolute.scheme(), "http" | "https").then(|| absolute.to_string())
}
