//! Integration tests for the frontier
//!
//! These open real SQLite files in temporary directories and exercise the
//! public API the way crawl workers do, including restarts and concurrent use.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use sumi_frontier::config::{Config, CrawlerConfig, FrontierConfig, StorageConfig, UserAgentConfig};
use sumi_frontier::frontier::route;
use sumi_frontier::storage::{QueryCountStore, SqliteQueryCountStore};
use sumi_frontier::{fingerprint, normalize_url, Admission, Completion, Frontier, NextUrl, Rejection};
use tempfile::TempDir;

fn create_test_config(db_path: &Path, seeds: &[&str], time_delay: u64) -> Config {
    Config {
        crawler: CrawlerConfig {
            seeds: seeds.iter().map(|s| s.to_string()).collect(),
            allowed_domains: vec![],
            time_delay,
            workers: 1,
            respect_robots: false,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        storage: StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
        },
        frontier: FrontierConfig::default(),
    }
}

fn drain(frontier: &Frontier) -> Vec<String> {
    let mut urls = Vec::new();
    while let NextUrl::Ready { url, .. } = frontier.next() {
        urls.push(url);
    }
    urls
}

/// Finds `n` hosts that land in pairwise distinct queues
fn hosts_in_distinct_queues(n: usize, queue_count: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    (0..)
        .map(|i| format!("site{}.com", i))
        .filter(|host| seen.insert(route(host, queue_count)))
        .take(n)
        .collect()
}

#[test]
fn test_equivalent_spellings_admitted_once() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir.path().join("f.db"), &[], 0);
    let frontier = Frontier::open(&config, false).unwrap();

    assert_eq!(frontier.add("https://example.com/a/").unwrap(), Admission::Enqueued);
    for spelling in [
        "https://EXAMPLE.com/a",
        "https://www.example.com/a#top",
        "https://example.com/./a",
        "https://example.com/a?utm_source=mail",
    ] {
        assert_eq!(frontier.add(spelling).unwrap(), Admission::Duplicate, "{}", spelling);
    }
    assert_eq!(frontier.pending_count(), 1);
}

#[test]
fn test_scheme_does_not_affect_identity() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir.path().join("f.db"), &[], 0);
    let frontier = Frontier::open(&config, false).unwrap();

    assert_eq!(frontier.add("http://example.com/a").unwrap(), Admission::Enqueued);
    assert_eq!(frontier.add("https://example.com/a").unwrap(), Admission::Duplicate);
}

#[test]
fn test_completion_survives_restart() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("f.db");
    let config = create_test_config(&db, &["https://a.com/", "https://b.com/"], 0);

    {
        let frontier = Frontier::open(&config, true).unwrap();
        assert_eq!(frontier.pending_count(), 2);
        let NextUrl::Ready { url, .. } = frontier.next() else {
            panic!("expected a ready url");
        };
        assert_eq!(frontier.complete(&url).unwrap(), Completion::Recorded);
    }

    let frontier = Frontier::open(&config, false).unwrap();
    let stats = frontier.stats().unwrap();
    assert_eq!(stats.records, 2);
    assert_eq!(stats.completed, 1);
    assert_eq!(frontier.pending_count(), 1);

    let remaining = drain(&frontier);
    assert_eq!(remaining.len(), 1);
    assert!(!frontier.is_crawled(&remaining[0]).unwrap());
}

#[test]
fn test_completed_urls_never_come_back() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("f.db");
    let config = create_test_config(&db, &["https://a.com/page"], 0);

    {
        let frontier = Frontier::open(&config, true).unwrap();
        drain(&frontier);
        frontier.complete("https://a.com/page").unwrap();
        assert_eq!(frontier.add("https://a.com/page").unwrap(), Admission::Duplicate);
        assert_eq!(
            frontier.complete("https://a.com/page").unwrap(),
            Completion::AlreadyComplete
        );
    }

    let frontier = Frontier::open(&config, false).unwrap();
    assert!(frontier.is_crawled("https://a.com/page").unwrap());
    assert_eq!(frontier.pending_count(), 0);
    assert_eq!(frontier.add("https://a.com/page").unwrap(), Admission::Duplicate);
}

#[test]
fn test_resume_does_not_re_add_seeds() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("f.db");

    {
        let config = create_test_config(&db, &["https://a.com/"], 0);
        let frontier = Frontier::open(&config, true).unwrap();
        drain(&frontier);
        frontier.complete("https://a.com/").unwrap();
    }

    let config = create_test_config(&db, &["https://a.com/", "https://new-seed.com/"], 0);
    let frontier = Frontier::open(&config, false).unwrap();
    assert_eq!(frontier.pending_count(), 0);
    assert_eq!(frontier.stats().unwrap().records, 1);
}

#[test]
fn test_restart_from_seed_wipes_everything() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("f.db");
    let mut config = create_test_config(&db, &["https://a.com/"], 0);
    config.frontier.query_limit = 1;

    {
        let frontier = Frontier::open(&config, true).unwrap();
        frontier.add("https://a.com/list?page=1").unwrap();
        assert_eq!(
            frontier.add("https://a.com/list?page=2").unwrap(),
            Admission::Rejected(Rejection::QueryLimit)
        );
        frontier.complete("https://a.com/").unwrap();
    }

    let frontier = Frontier::open(&config, true).unwrap();
    assert_eq!(frontier.stats().unwrap().records, 1);
    assert!(!frontier.is_crawled("https://a.com/").unwrap());
    // Query counters were cleared too
    assert_eq!(
        frontier.add("https://a.com/list?page=2").unwrap(),
        Admission::Enqueued
    );
}

#[test]
fn test_query_limit_per_stripped_url() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("f.db");
    let mut config = create_test_config(&db, &[], 0);
    config.frontier.query_limit = 3;

    {
        let frontier = Frontier::open(&config, false).unwrap();
        for id in 1..=3 {
            let url = format!("https://a.com/item?id={}", id);
            assert_eq!(frontier.add(&url).unwrap(), Admission::Enqueued);
        }
        assert_eq!(
            frontier.add("https://a.com/item?id=4").unwrap(),
            Admission::Rejected(Rejection::QueryLimit)
        );
        // Other paths have their own budget
        assert_eq!(frontier.add("https://a.com/other?id=4").unwrap(), Admission::Enqueued);

        let urls = drain(&frontier);
        assert!(urls.contains(&"https://a.com/item".to_string()));
        assert!(!urls.contains(&"https://a.com/item?id=4".to_string()));
        // item, 3 variants, other, 1 variant
        assert_eq!(urls.len(), 6);
    }

    let frontier = Frontier::open(&config, false).unwrap();
    assert_eq!(
        frontier.add("https://a.com/item?id=5").unwrap(),
        Admission::Rejected(Rejection::QueryLimit)
    );
}

#[test]
fn test_depth_limit() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir.path().join("f.db"), &[], 0);
    config.frontier.depth_limit = 2;
    let frontier = Frontier::open(&config, false).unwrap();

    assert_eq!(frontier.add("https://a.com/x/y").unwrap(), Admission::Enqueued);
    assert_eq!(
        frontier.add("https://a.com/x/y/z").unwrap(),
        Admission::Rejected(Rejection::DepthLimit)
    );
    assert_eq!(frontier.stats().unwrap().records, 1);
}

#[test]
fn test_round_robin_across_queues() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir.path().join("f.db"), &[], 0);
    config.frontier.queue_count = 8;
    let frontier = Frontier::open(&config, false).unwrap();

    let hosts = hosts_in_distinct_queues(3, 8);
    for host in &hosts {
        frontier.add(&format!("https://{}/1", host)).unwrap();
        frontier.add(&format!("https://{}/2", host)).unwrap();
    }

    let mut served = Vec::new();
    while let NextUrl::Ready { queue, .. } = frontier.next() {
        served.push(queue);
    }

    let mut order: Vec<usize> = hosts.iter().map(|h| route(h, 8)).collect();
    order.sort_unstable();
    let expected: Vec<usize> = order.iter().chain(order.iter()).copied().collect();
    assert_eq!(served, expected);
}

#[test]
fn test_politeness_delay_per_queue() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        &dir.path().join("f.db"),
        &["https://a.com/1", "https://a.com/2"],
        200,
    );
    let frontier = Frontier::open(&config, false).unwrap();

    assert!(matches!(frontier.next(), NextUrl::Ready { .. }));
    match frontier.next() {
        NextUrl::Unavailable {
            pending,
            retry_after,
        } => {
            assert_eq!(pending, 1);
            assert!(retry_after.unwrap() <= Duration::from_millis(200));
        }
        other => panic!("expected Unavailable, got {:?}", other),
    }

    thread::sleep(Duration::from_millis(250));
    assert!(matches!(frontier.next(), NextUrl::Ready { .. }));
}

#[test]
fn test_unknown_completion_is_not_persisted() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir.path().join("f.db"), &[], 0);
    let frontier = Frontier::open(&config, false).unwrap();

    assert_eq!(
        frontier.complete("https://never-added.com/").unwrap(),
        Completion::Unknown
    );
    assert!(!frontier.is_crawled("https://never-added.com/").unwrap());
    assert_eq!(
        frontier.add("https://never-added.com/").unwrap(),
        Admission::Enqueued
    );
}

#[test]
fn test_reload_skips_urls_no_longer_allowed() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("f.db");

    {
        let config = create_test_config(&db, &["https://example.com/", "https://www.ics.uci.edu/"], 0);
        Frontier::open(&config, true).unwrap();
    }

    let mut config = create_test_config(&db, &[], 0);
    config.crawler.allowed_domains = vec!["*.uci.edu".to_string()];
    let frontier = Frontier::open(&config, false).unwrap();
    assert_eq!(drain(&frontier), vec!["https://ics.uci.edu/".to_string()]);
}

#[test]
fn test_concurrent_adds_admit_each_url_once() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir.path().join("f.db"), &[], 0);
    let frontier = Arc::new(Frontier::open(&config, false).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let frontier = Arc::clone(&frontier);
            thread::spawn(move || {
                (0..50)
                    .filter(|i| {
                        let url = format!("https://host{}.com/page", i % 10);
                        let url = format!("{}{}", url, i);
                        frontier.add(&url).unwrap() == Admission::Enqueued
                    })
                    .count()
            })
        })
        .collect();

    let enqueued: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(enqueued, 50);
    assert_eq!(frontier.pending_count(), 50);
    assert_eq!(frontier.stats().unwrap().records, 50);
}

#[test]
fn test_concurrent_variants_respect_query_limit() {
    let dir = TempDir::new().unwrap();

    for round in 0..10 {
        let db_path = dir.path().join(format!("round{}.db", round));
        let mut config = create_test_config(&db_path, &[], 0);
        config.frontier.query_limit = 2;
        let frontier = Arc::new(Frontier::open(&config, false).unwrap());
        let barrier = Arc::new(Barrier::new(8));

        // Every thread races on ?id=1, then tries its own variant
        let handles: Vec<_> = (0..8)
            .map(|k| {
                let frontier = Arc::clone(&frontier);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let shared = frontier.add("http://a.com/x?id=1").unwrap();
                    let own = frontier.add(&format!("http://a.com/x?id={}", k + 2)).unwrap();
                    (shared, own)
                })
            })
            .collect();
        let outcomes: Vec<(Admission, Admission)> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        let shared_enqueued = outcomes
            .iter()
            .filter(|(shared, _)| *shared == Admission::Enqueued)
            .count();
        let own_enqueued = outcomes
            .iter()
            .filter(|(_, own)| *own == Admission::Enqueued)
            .count();
        assert_eq!(shared_enqueued, 1);
        assert_eq!(own_enqueued, 1);
        assert!(outcomes.iter().all(|(_, own)| matches!(
            own,
            Admission::Enqueued | Admission::Rejected(Rejection::QueryLimit)
        )));

        // Base plus exactly two variants
        assert_eq!(frontier.stats().unwrap().records, 3);
        assert_eq!(frontier.pending_count(), 3);
        drop(frontier);

        let counts = SqliteQueryCountStore::open(&db_path).unwrap();
        let base = fingerprint(&normalize_url("http://a.com/x").unwrap());
        assert_eq!(counts.count_for(&base).unwrap(), 2);
    }
}

#[test]
fn test_concurrent_next_hands_out_each_url_once() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir.path().join("f.db"), &[], 0);
    let frontier = Arc::new(Frontier::open(&config, false).unwrap());
    for i in 0..100 {
        frontier
            .add(&format!("https://host{}.com/page{}", i % 7, i))
            .unwrap();
    }

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let frontier = Arc::clone(&frontier);
            thread::spawn(move || drain(&frontier))
        })
        .collect();

    let mut all = Vec::new();
    for handle in handles {
        all.extend(handle.join().unwrap());
    }
    let unique: HashSet<_> = all.iter().collect();
    assert_eq!(all.len(), 100);
    assert_eq!(unique.len(), 100);
    assert_eq!(frontier.pending_count(), 0);
}

#[test]
fn test_query_limit_of_two() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir.path().join("f.db"), &[], 0);
    config.frontier.query_limit = 2;
    let frontier = Frontier::open(&config, false).unwrap();

    assert_eq!(frontier.add("http://a.com/x?id=1").unwrap(), Admission::Enqueued);
    assert_eq!(frontier.add("http://a.com/x?id=2").unwrap(), Admission::Enqueued);
    assert_eq!(
        frontier.add("http://a.com/x?id=3").unwrap(),
        Admission::Rejected(Rejection::QueryLimit)
    );
    assert_eq!(frontier.add("http://a.com/x").unwrap(), Admission::Duplicate);

    let urls = drain(&frontier);
    assert_eq!(urls.iter().filter(|u| *u == "http://a.com/x").count(), 1);
    assert_eq!(urls.len(), 3);
}

#[test]
fn test_depth_limit_of_three() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir.path().join("f.db"), &[], 0);
    config.frontier.depth_limit = 3;
    let frontier = Frontier::open(&config, false).unwrap();

    assert_eq!(frontier.add("http://a.com/a/b/c").unwrap(), Admission::Enqueued);
    assert_eq!(
        frontier.add("http://a.com/a/b/c/d").unwrap(),
        Admission::Rejected(Rejection::DepthLimit)
    );
}

#[test]
fn test_each_of_four_queues_served_once() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir.path().join("f.db"), &[], 0);
    config.frontier.queue_count = 4;
    let frontier = Frontier::open(&config, false).unwrap();

    for host in hosts_in_distinct_queues(4, 4) {
        frontier.add(&format!("https://{}/", host)).unwrap();
    }

    let served: Vec<usize> = (0..4)
        .map(|_| match frontier.next() {
            NextUrl::Ready { queue, .. } => queue,
            other => panic!("expected Ready, got {:?}", other),
        })
        .collect();
    assert_eq!(served, vec![0, 1, 2, 3]);
    assert_eq!(frontier.pending_count(), 0);
}
