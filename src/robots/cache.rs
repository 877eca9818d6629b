//! Per-origin robots.txt cache
//!
//! Entries expire after 24 hours and are then fetched again.

use crate::robots::ParsedRobots;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

const ROBOTS_TTL_HOURS: i64 = 24;

/// Parsed robots.txt plus the time it was fetched
#[derive(Debug, Clone)]
pub struct CachedRobots {
    pub rules: ParsedRobots,
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    pub fn new(rules: ParsedRobots) -> Self {
        Self {
            rules,
            fetched_at: Utc::now(),
        }
    }

    /// True once the entry is older than 24 hours
    pub fn is_stale(&self) -> bool {
        Utc::now() - self.fetched_at > Duration::hours(ROBOTS_TTL_HOURS)
    }
}

/// Robots.txt rules keyed by origin (`scheme://host[:port]`)
///
/// Safe to share between worker tasks. The lock is only held for map access,
/// never across a fetch, so two workers may occasionally fetch the same file.
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: Mutex<HashMap<String, CachedRobots>>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns fresh rules for `origin`, if cached
    pub fn get(&self, origin: &str) -> Option<ParsedRobots> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(origin)
            .filter(|cached| !cached.is_stale())
            .map(|cached| cached.rules.clone())
    }

    pub fn insert(&self, origin: String, rules: ParsedRobots) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(origin, CachedRobots::new(rules));
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    fn backdate(&self, origin: &str, hours: i64) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(cached) = entries.get_mut(origin) {
            cached.fetched_at = Utc::now() - Duration::hours(hours);
        }
    }
}
