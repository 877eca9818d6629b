/// Checks if a domain matches a wildcard pattern
///
/// `"example.com"` matches only itself; `"*.example.com"` matches the bare
/// domain and any subdomain at any depth.
///
/// # Examples
///
/// ```
/// use sumi_frontier::url::matches_wildcard;
///
/// assert!(matches_wildcard("*.uci.edu", "uci.edu"));
/// assert!(matches_wildcard("*.uci.edu", "www.ics.uci.edu"));
/// assert!(!matches_wildcard("*.uci.edu", "notuci.edu"));
/// assert!(!matches_wildcard("uci.edu", "ics.uci.edu"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            candidate == base
                || candidate
                    .strip_suffix(base)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => candidate == pattern,
    }
}
