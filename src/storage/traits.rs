//! Storage traits and error types
//!
//! The frontier talks to its durable state only through these two traits.

use crate::storage::UrlRecord;
use crate::url::Fingerprint;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable map from URL fingerprint to (URL, completed)
///
/// Implementations must make every `put` durable before returning: a crash
/// after `put` returns must not lose the write. A record's `completed` flag
/// never goes back to `false`.
pub trait RecordStore: Send {
    /// Inserts or updates a record
    fn put(&mut self, fingerprint: &Fingerprint, url: &str, completed: bool) -> StorageResult<()>;

    /// Looks up a record
    fn get(&self, fingerprint: &Fingerprint) -> StorageResult<Option<UrlRecord>>;

    /// Returns true if a record exists for the fingerprint
    fn contains(&self, fingerprint: &Fingerprint) -> StorageResult<bool>;

    /// Returns every record, in insertion order
    ///
    /// Only used at startup, before workers share the store.
    fn iterate(&self) -> StorageResult<Vec<UrlRecord>>;

    /// Total number of records
    fn count(&self) -> StorageResult<u64>;

    /// Number of records marked completed
    fn count_completed(&self) -> StorageResult<u64>;

    /// Removes every record (restart from seed)
    fn clear(&mut self) -> StorageResult<()>;
}

/// Durable counters of admitted query variants per query-stripped URL
pub trait QueryCountStore: Send {
    /// Atomically increments the counter if it is below `limit`
    ///
    /// A missing counter counts as 0. Returns `true` if the increment happened
    /// (the variant is admitted) and `false` otherwise, leaving the counter
    /// untouched.
    fn increment_if_below(&mut self, fingerprint: &Fingerprint, limit: u32) -> StorageResult<bool>;

    /// Current counter value (0 when absent)
    fn count_for(&self, fingerprint: &Fingerprint) -> StorageResult<u32>;

    /// Number of tracked query-stripped URLs
    fn tracked(&self) -> StorageResult<u64>;

    /// Removes every counter (restart from seed)
    fn clear(&mut self) -> StorageResult<()>;
}
