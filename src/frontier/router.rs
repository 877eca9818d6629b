//! Domain routing onto politeness queues
//!
//! Every domain maps to exactly one queue, so all fetches against a domain
//! share that queue's politeness timer. Hosts of the form
//! `label.institution.tld` are first reduced to their last three labels, so
//! `vision.ics.uci.edu` and `www.ics.uci.edu` share one budget.

use sha2::{Digest, Sha256};

/// Maps domains to queue indices
#[derive(Debug, Clone, Copy)]
pub struct DomainRouter {
    queue_count: usize,
}

impl DomainRouter {
    /// Creates a router over `queue_count` queues (at least one)
    pub fn new(queue_count: usize) -> Self {
        Self {
            queue_count: queue_count.max(1),
        }
    }

    pub fn queue_count(&self) -> usize {
        self.queue_count
    }

    /// Returns the queue index for a domain
    pub fn route(&self, domain: &str) -> usize {
        route(domain, self.queue_count)
    }
}

/// Computes the queue index of `domain` among `queue_count` queues
///
/// The SHA-256 digest of the reduced domain is read as a big-endian 256-bit
/// integer and taken modulo `queue_count`, which keeps the assignment stable
/// across restarts and platforms.
///
/// # Examples
///
/// ```
/// use sumi_frontier::frontier::route;
///
/// assert_eq!(route("www.ics.uci.edu", 20), route("vision.ics.uci.edu", 20));
/// assert!(route("example.com", 20) < 20);
/// ```
pub fn route(domain: &str, queue_count: usize) -> usize {
    let modulus = queue_count.max(1) as u128;
    let reduced = institution_domain(domain);
    let digest = Sha256::digest(reduced.as_bytes());

    let index = digest
        .iter()
        .fold(0u128, |acc, &byte| (acc * 256 + byte as u128) % modulus);
    index as usize
}

/// Reduces a host to its last three dot-separated labels when it looks like
/// `host.subdomain.tld`
///
/// The last two labels must be at least two ASCII alphanumerics each; the
/// third label from the end contributes its trailing alphanumeric run (at
/// least two characters). Hosts that do not fit are returned unchanged.
pub fn institution_domain(domain: &str) -> &str {
    let labels: Vec<&str> = domain.rsplitn(4, '.').collect();
    if labels.len() < 3 {
        return domain;
    }

    let is_label = |label: &str| label.len() >= 2 && label.bytes().all(|b| b.is_ascii_alphanumeric());
    if !is_label(labels[0]) || !is_label(labels[1]) {
        return domain;
    }

    let third = labels[2];
    let run = third
        .bytes()
        .rev()
        .take_while(|b| b.is_ascii_alphanumeric())
        .count();
    if run < 2 {
        return domain;
    }

    let suffix_len = run + 1 + labels[1].len() + 1 + labels[0].len();
    &domain[domain.len() - suffix_len..]
}
