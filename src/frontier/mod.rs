//! The URL frontier
//!
//! [`Frontier`] decides which URL each worker fetches next. It
//! - deduplicates URLs against the durable [`RecordStore`],
//! - refuses likely crawl traps (too many query variants, paths too deep),
//! - routes each URL to a politeness queue by domain,
//! - serves ready queues round-robin, honouring the politeness delay,
//! - reloads unfinished work from the store after a restart.
//!
//! All methods take `&self`; share the frontier between workers with an `Arc`.
//! Four locks guard the state: admission (dedup, query slot, persist,
//! enqueue), the queue pool (pop, cursor, timestamps), the query counters,
//! and the record store. The admission lock is always taken first; the other
//! three are never held together. No lock is held across anything but fast
//! local I/O.

mod heuristics;
mod queue;
mod router;

pub use heuristics::{path_depth, strip_query, Rejection, TrapLimits};
pub use queue::{Popped, QueuePool, QueueState};
pub use router::{institution_domain, route, DomainRouter};

use crate::config::Config;
use crate::storage::{
    open_stores, QueryCountStore, RecordStore, SqliteQueryCountStore, SqliteRecordStore,
};
use crate::url::{extract_domain, fingerprint, is_valid, normalize_url, Fingerprint, UrlFilter};
use crate::FrontierError;
use std::iter;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use url::Url;

/// Scheduling parameters of a [`Frontier`]
#[derive(Debug, Clone)]
pub struct FrontierSettings {
    pub limits: TrapLimits,
    pub queue_count: usize,
    pub politeness_delay: Duration,
}

impl FrontierSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            limits: TrapLimits::from(&config.frontier),
            queue_count: config.frontier.queue_count,
            politeness_delay: config.crawler.politeness_delay(),
        }
    }
}

impl Default for FrontierSettings {
    fn default() -> Self {
        Self {
            limits: TrapLimits::default(),
            queue_count: 20,
            politeness_delay: Duration::from_millis(500),
        }
    }
}

/// Outcome of [`Frontier::add`] for the URL that was passed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Persisted and queued for fetching
    Enqueued,
    /// Already known; nothing changed
    Duplicate,
    /// Could not be normalized or failed the validity filter
    Invalid,
    /// Refused by a trap heuristic; never persisted
    Rejected(Rejection),
}

/// Result of [`Frontier::next`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextUrl {
    /// A URL to fetch, and the politeness queue it came from
    Ready { url: String, queue: usize },
    /// No queue is ready right now
    ///
    /// This is the normal outcome under politeness pressure. The caller
    /// should back off (for about `retry_after`) rather than spin. `pending`
    /// is the number of queued URLs; `retry_after` is `None` when every queue
    /// is empty.
    Unavailable {
        pending: usize,
        retry_after: Option<Duration>,
    },
}

/// Outcome of [`Frontier::complete`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The record is now marked completed
    Recorded,
    /// The record was already completed
    AlreadyComplete,
    /// The frontier never admitted this URL
    Unknown,
}

/// Snapshot of frontier counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierStats {
    /// URLs ever admitted
    pub records: u64,
    /// URLs marked completed
    pub completed: u64,
    /// URLs waiting in the queues
    pub pending: usize,
    /// Waiting URLs per politeness queue
    pub queue_sizes: Vec<usize>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The URL frontier
pub struct Frontier<R = SqliteRecordStore, Q = SqliteQueryCountStore> {
    limits: TrapLimits,
    filter: UrlFilter,
    router: DomainRouter,
    admission: Mutex<()>,
    records: Mutex<R>,
    query_counts: Mutex<Q>,
    queues: Mutex<QueuePool>,
}

impl Frontier {
    /// Opens the frontier stored at the configured database path
    ///
    /// With `restart` set, both stores are wiped and the seeds are added.
    /// Otherwise unfinished URLs are reloaded; seeds are added only when the
    /// store holds no records at all.
    ///
    /// # Returns
    ///
    /// * `Ok(Frontier)` - Ready to serve workers
    /// * `Err(FrontierError)` - The durable stores could not be opened
    pub fn open(config: &Config, restart: bool) -> Result<Self, FrontierError> {
        let path = Path::new(&config.storage.database_path);
        match (path.exists(), restart) {
            (false, false) => tracing::info!(
                "Did not find save file {}, starting from seed.",
                path.display()
            ),
            (true, true) => tracing::info!("Found save file {}, wiping it.", path.display()),
            _ => {}
        }

        let (records, query_counts) = open_stores(path)?;
        Self::with_stores(
            FrontierSettings::from_config(config),
            UrlFilter::new(config.crawler.allowed_domains.clone()),
            records,
            query_counts,
            &config.crawler.seeds,
            restart,
        )
    }
}

impl<R: RecordStore, Q: QueryCountStore> Frontier<R, Q> {
    /// Builds a frontier over the given stores and runs the startup procedure
    pub fn with_stores(
        settings: FrontierSettings,
        filter: UrlFilter,
        mut records: R,
        mut query_counts: Q,
        seeds: &[String],
        restart: bool,
    ) -> Result<Self, FrontierError> {
        if restart {
            records.clear()?;
            query_counts.clear()?;
        }

        let frontier = Self {
            router: DomainRouter::new(settings.queue_count),
            queues: Mutex::new(QueuePool::new(
                settings.queue_count,
                settings.politeness_delay,
            )),
            limits: settings.limits,
            filter,
            admission: Mutex::new(()),
            records: Mutex::new(records),
            query_counts: Mutex::new(query_counts),
        };

        let empty_store = restart || frontier.reload()? == 0;
        if empty_store {
            frontier.add_seeds(seeds)?;
        }

        Ok(frontier)
    }

    /// Re-enqueues every incomplete, still-valid record
    ///
    /// Returns the total number of records in the store.
    fn reload(&self) -> Result<usize, FrontierError> {
        let records = lock(&self.records).iterate()?;
        let total = records.len();

        let mut queues = lock(&self.queues);
        let mut reloaded = 0;
        for record in records.into_iter().filter(|record| !record.completed) {
            match Url::parse(&record.url) {
                Ok(url) if is_valid(&url, &self.filter) => {
                    queues.push(self.queue_for(&url), record.url);
                    reloaded += 1;
                }
                _ => tracing::debug!("Not reloading {}", record.url),
            }
        }

        tracing::info!(
            "Found {} urls to be downloaded from {} total urls discovered.",
            reloaded,
            total
        );
        Ok(total)
    }

    fn add_seeds(&self, seeds: &[String]) -> Result<(), FrontierError> {
        for seed in seeds {
            let outcome = self.add(seed)?;
            tracing::debug!("Seed {}: {:?}", seed, outcome);
        }
        Ok(())
    }

    fn queue_for(&self, url: &Url) -> usize {
        let domain = extract_domain(url).unwrap_or_default();
        self.router.route(&domain)
    }

    /// Offers a discovered URL to the frontier
    ///
    /// The URL is normalized and fingerprinted; known URLs are ignored. A URL
    /// with a query string first gives its query-stripped form its own
    /// admission decision, then must win a slot under that form's query limit.
    /// Finally the depth limit applies. Admitted URLs are persisted before
    /// they become visible to [`Frontier::next`].
    ///
    /// Only storage failures are errors; every refusal is an [`Admission`].
    pub fn add(&self, raw_url: &str) -> Result<Admission, FrontierError> {
        let url = match normalize_url(raw_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Dropping {}: {}", raw_url, e);
                return Ok(Admission::Invalid);
            }
        };
        if !is_valid(&url, &self.filter) {
            tracing::debug!("Dropping invalid {}", url);
            return Ok(Admission::Invalid);
        }

        if lock(&self.records).contains(&fingerprint(&url))? {
            return Ok(Admission::Duplicate);
        }

        // The base (query-stripped) candidate goes first so it is tracked
        // even if the queried variant is refused.
        let mut outcome = Admission::Duplicate;
        for candidate in strip_query(&url).into_iter().chain(iter::once(url)) {
            outcome = self.admit(candidate)?;
        }
        Ok(outcome)
    }

    /// Runs one normalized candidate through dedup, heuristics and enqueue
    ///
    /// The admission lock is held from the dedup check through the persist,
    /// so concurrent adds of one variant take a single query slot.
    fn admit(&self, url: Url) -> Result<Admission, FrontierError> {
        let _admission = lock(&self.admission);
        let fp = fingerprint(&url);
        if lock(&self.records).contains(&fp)? {
            return Ok(Admission::Duplicate);
        }

        if let Some(base) = strip_query(&url) {
            let admitted = lock(&self.query_counts)
                .increment_if_below(&fingerprint(&base), self.limits.query_limit)?;
            if !admitted {
                tracing::debug!("Too many query variants of {}: {}", base, url);
                return Ok(Admission::Rejected(Rejection::QueryLimit));
            }
        }

        if let Err(rejection) = self.limits.check_depth(&url) {
            tracing::debug!("Too deep: {}", url);
            return Ok(Admission::Rejected(rejection));
        }

        lock(&self.records).put(&fp, url.as_str(), false)?;

        let queue = self.queue_for(&url);
        tracing::debug!("Added {} to queue {}", url, queue);
        lock(&self.queues).push(queue, url.into());
        Ok(Admission::Enqueued)
    }

    /// Hands out the next URL whose queue is past its politeness delay
    ///
    /// Never blocks. See [`NextUrl::Unavailable`] for the back-off contract.
    pub fn next(&self) -> NextUrl {
        let mut queues = lock(&self.queues);
        if let Some(popped) = queues.pop_ready() {
            tracing::trace!("Taking {} from queue {}", popped.url, popped.queue);
            return NextUrl::Ready {
                url: popped.url,
                queue: popped.queue,
            };
        }

        let retry_after = queues.next_ready_in(Instant::now());
        if queues.is_empty() {
            tracing::trace!("All queues are empty");
        } else {
            tracing::trace!(
                "No available queues; next ready in {:?}; sizes {:?}",
                retry_after,
                queues.queue_sizes()
            );
        }
        NextUrl::Unavailable {
            pending: queues.len(),
            retry_after,
        }
    }

    /// Returns true if the URL was admitted and has been completed
    pub fn is_crawled(&self, raw_url: &str) -> Result<bool, FrontierError> {
        let fp = match fingerprint_of(raw_url) {
            Some(fp) => fp,
            None => return Ok(false),
        };
        let record = lock(&self.records).get(&fp)?;
        Ok(record.is_some_and(|record| record.completed))
    }

    /// Marks a fetched URL as completed
    ///
    /// Completing a URL the frontier never admitted is reported as an error
    /// diagnostic and leaves the store untouched. Repeated calls are no-ops.
    pub fn complete(&self, raw_url: &str) -> Result<Completion, FrontierError> {
        let fp = match fingerprint_of(raw_url) {
            Some(fp) => fp,
            None => {
                tracing::error!("Completed url {}, which is not a valid URL.", raw_url);
                return Ok(Completion::Unknown);
            }
        };

        let mut records = lock(&self.records);
        match records.get(&fp)? {
            None => {
                tracing::error!("Completed url {}, but have not seen it before.", raw_url);
                Ok(Completion::Unknown)
            }
            Some(record) if record.completed => {
                tracing::debug!("Url {} was already completed", record.url);
                Ok(Completion::AlreadyComplete)
            }
            Some(record) => {
                records.put(&fp, &record.url, true)?;
                Ok(Completion::Recorded)
            }
        }
    }

    /// Number of URLs waiting in the queues
    pub fn pending_count(&self) -> usize {
        lock(&self.queues).len()
    }

    /// Current counters, for progress reporting
    pub fn stats(&self) -> Result<FrontierStats, FrontierError> {
        let (records, completed) = {
            let store = lock(&self.records);
            (store.count()?, store.count_completed()?)
        };
        let queues = lock(&self.queues);
        Ok(FrontierStats {
            records,
            completed,
            pending: queues.len(),
            queue_sizes: queues.queue_sizes(),
        })
    }

    pub fn queue_count(&self) -> usize {
        self.router.queue_count()
    }
}

fn fingerprint_of(raw_url: &str) -> Option<Fingerprint> {
    normalize_url(raw_url).ok().map(|url| fingerprint(&url))
}
