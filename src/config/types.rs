use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sumi-Frontier
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub frontier: FrontierConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URLs added when starting from seed
    pub seeds: Vec<String>,

    /// Domain patterns a URL must match to be crawled (empty allows any host)
    #[serde(rename = "allowed-domains", default)]
    pub allowed_domains: Vec<String>,

    /// Minimum time between two fetches served from the same queue (milliseconds)
    #[serde(rename = "time-delay")]
    pub time_delay: u64,

    /// Number of concurrent worker tasks
    pub workers: u32,

    /// Whether workers consult robots.txt before fetching
    #[serde(rename = "respect-robots", default = "default_respect_robots")]
    pub respect_robots: bool,
}

impl CrawlerConfig {
    /// Returns the politeness delay as a [`Duration`]
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.time_delay)
    }
}

fn default_respect_robots() -> bool {
    true
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the user agent as `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Durable state location
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database holding URL records and query counts
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Frontier tunables
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FrontierConfig {
    /// Distinct query variants admitted per query-stripped path
    #[serde(rename = "query-limit")]
    pub query_limit: u32,

    /// Maximum number of path segments
    #[serde(rename = "depth-limit")]
    pub depth_limit: usize,

    /// Pages allowed per directory level, indexed by depth (0 = unbounded).
    /// Accepted and reported but not enforced.
    #[serde(rename = "breadth-limits")]
    pub breadth_limits: Vec<u32>,

    /// Number of politeness queues
    #[serde(rename = "queue-count")]
    pub queue_count: usize,
}

impl FrontierConfig {
    /// Returns the advisory breadth limit for a directory depth
    ///
    /// Depths past the end of the list reuse the last entry; `0` means unbounded.
    pub fn breadth_limit(&self, depth: usize) -> Option<u32> {
        let index = depth.min(self.breadth_limits.len().checked_sub(1)?);
        match self.breadth_limits[index] {
            0 => None,
            limit => Some(limit),
        }
    }
}

impl Default for FrontierConfig {
    fn default() -> Self {
        Self {
            query_limit: 40,
            depth_limit: 15,
            breadth_limits: vec![0, 300, 150, 75],
            queue_count: 20,
        }
    }
}
