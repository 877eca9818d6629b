//! Politeness queues
//!
//! The pool holds N independent FIFO queues. A queue that served a URL less
//! than the politeness delay ago is cooling and is skipped; the pool hands
//! out URLs from ready queues in round-robin order.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Scheduling state of one queue at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// Nothing to serve
    Empty,
    /// Non-empty and past its politeness delay
    Ready,
    /// Served too recently
    Cooling,
}

#[derive(Debug, Default)]
struct PolitenessQueue {
    urls: VecDeque<String>,
    last_served: Option<Instant>,
}

impl PolitenessQueue {
    /// Remaining cool-down at `now`, or `None` when the queue is not cooling
    fn cooldown_remaining(&self, delay: Duration, now: Instant) -> Option<Duration> {
        let last = self.last_served?;
        // A stamp later than `now` counts as not cooling
        let elapsed = now.checked_duration_since(last)?;
        delay.checked_sub(elapsed).filter(|rest| !rest.is_zero())
    }

    fn state(&self, delay: Duration, now: Instant) -> QueueState {
        if self.cooldown_remaining(delay, now).is_some() {
            QueueState::Cooling
        } else if self.urls.is_empty() {
            QueueState::Empty
        } else {
            QueueState::Ready
        }
    }
}

/// A URL handed out by the pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popped {
    pub url: String,
    pub queue: usize,
}

/// Fixed set of politeness queues with a round-robin cursor
#[derive(Debug)]
pub struct QueuePool {
    queues: Vec<PolitenessQueue>,
    cursor: usize,
    delay: Duration,
}

impl QueuePool {
    /// Creates `count` empty queues (at least one) sharing one politeness delay
    pub fn new(count: usize, delay: Duration) -> Self {
        let queues = (0..count.max(1)).map(|_| PolitenessQueue::default()).collect();
        Self {
            queues,
            cursor: 0,
            delay,
        }
    }

    /// Appends a URL to the back of queue `index`
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`QueuePool::queue_count`].
    pub fn push(&mut self, index: usize, url: String) {
        self.queues[index].urls.push_back(url);
    }

    /// Pops from the first ready queue at or after the cursor, as of now
    pub fn pop_ready(&mut self) -> Option<Popped> {
        self.pop_ready_at(Instant::now())
    }

    /// Pops from the first ready queue at or after the cursor
    ///
    /// The served queue is stamped with `now` and the cursor moves just past
    /// it. When a full rotation finds no ready queue the cursor still advances
    /// by one and `None` is returned.
    pub fn pop_ready_at(&mut self, now: Instant) -> Option<Popped> {
        let count = self.queues.len();
        for offset in 0..count {
            let index = (self.cursor + offset) % count;
            let queue = &mut self.queues[index];
            if queue.state(self.delay, now) != QueueState::Ready {
                continue;
            }
            if let Some(url) = queue.urls.pop_front() {
                queue.last_served = Some(now);
                self.cursor = (index + 1) % count;
                return Some(Popped { url, queue: index });
            }
        }

        self.cursor = (self.cursor + 1) % count;
        None
    }

    /// Shortest remaining cool-down among non-empty queues
    ///
    /// Returns `Some(Duration::ZERO)` when a queue is ready now and `None` when
    /// every queue is empty.
    pub fn next_ready_in(&self, now: Instant) -> Option<Duration> {
        self.queues
            .iter()
            .filter(|queue| !queue.urls.is_empty())
            .map(|queue| queue.cooldown_remaining(self.delay, now).unwrap_or(Duration::ZERO))
            .min()
    }

    /// State of queue `index` at `now`
    pub fn state(&self, index: usize, now: Instant) -> QueueState {
        self.queues[index].state(self.delay, now)
    }

    /// Total number of queued URLs
    pub fn len(&self) -> usize {
        self.queues.iter().map(|queue| queue.urls.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(|queue| queue.urls.is_empty())
    }

    /// Number of queued URLs per queue
    pub fn queue_sizes(&self) -> Vec<usize> {
        self.queues.iter().map(|queue| queue.urls.len()).collect()
    }

    pub fn queue_count(&self) -> usize {
        self.queues.len()
    }
}
