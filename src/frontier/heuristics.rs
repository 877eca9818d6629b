//! Crawl-trap heuristics
//!
//! Two filters run on every new URL: a cap on distinct query variants per
//! query-stripped URL, and a cap on path depth. The query cap needs shared
//! durable state and is applied by the frontier through its
//! [`QueryCountStore`](crate::storage::QueryCountStore); this module holds the
//! pure parts.

use crate::config::FrontierConfig;
use url::Url;

/// Why a URL was refused by a trap heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Its query-stripped URL already admitted `query_limit` variants
    QueryLimit,
    /// Its path has more than `depth_limit` segments
    DepthLimit,
}

/// Limits applied by the trap heuristics
#[derive(Debug, Clone)]
pub struct TrapLimits {
    pub query_limit: u32,
    pub depth_limit: usize,
    /// Advisory per-depth breadth limits, `None` = unbounded. Not enforced.
    pub breadth_limits: Vec<Option<u32>>,
}

impl TrapLimits {
    /// Checks the depth limit
    pub fn check_depth(&self, url: &Url) -> Result<(), Rejection> {
        if path_depth(url) > self.depth_limit {
            Err(Rejection::DepthLimit)
        } else {
            Ok(())
        }
    }
}

impl From<&FrontierConfig> for TrapLimits {
    fn from(config: &FrontierConfig) -> Self {
        Self {
            query_limit: config.query_limit,
            depth_limit: config.depth_limit,
            breadth_limits: config
                .breadth_limits
                .iter()
                .map(|&limit| (limit > 0).then_some(limit))
                .collect(),
        }
    }
}

impl Default for TrapLimits {
    fn default() -> Self {
        Self::from(&FrontierConfig::default())
    }
}

/// Number of non-empty path segments
///
/// `/a/b/c` has depth 3; `/` has depth 0.
pub fn path_depth(url: &Url) -> usize {
    url.path().split('/').filter(|segment| !segment.is_empty()).count()
}

/// Returns the URL without its query string, or `None` if it has no query
pub fn strip_query(url: &Url) -> Option<Url> {
    url.query()?;
    let mut base = url.clone();
    base.set_query(None);
    Some(base)
}
