use url::Url;

/// Extracts the lowercase host of a URL
///
/// Returns `None` for URLs without a host (which never reach the frontier).
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_frontier::url::extract_domain;
///
/// let url = Url::parse("https://Vision.ICS.uci.edu:8443/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("vision.ics.uci.edu".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}
