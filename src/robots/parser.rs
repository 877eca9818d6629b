//! Robots.txt rule evaluation, backed by the robotstxt crate

use robotstxt::DefaultMatcher;

/// Robots.txt rules for one origin
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt body; `None` allows everything
    content: Option<String>,
}

impl ParsedRobots {
    /// Wraps a fetched robots.txt body
    pub fn from_content(content: &str) -> Self {
        let content = Some(content.to_string()).filter(|c| !c.trim().is_empty());
        Self { content }
    }

    /// Rules that allow every URL
    ///
    /// Used when robots.txt is missing or could not be fetched.
    pub fn allow_all() -> Self {
        Self { content: None }
    }

    /// Checks a URL against the rules for `user_agent`
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL or path to check
    /// * `user_agent` - Product token of the crawler (e.g. "SumiFrontier")
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match &self.content {
            None => true,
            Some(content) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(content, user_agent, url)
            }
        }
    }
}
