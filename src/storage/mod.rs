//! Storage module for persisting frontier state
//!
//! This module holds the two durable key-value stores the frontier is built on:
//! - URL records (fingerprint -> URL and completion flag)
//! - Query-admission counters (fingerprint of a query-stripped URL -> count)
//!
//! Both live in one SQLite file, each behind its own connection.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::{SqliteQueryCountStore, SqliteRecordStore};
pub use traits::{QueryCountStore, RecordStore, StorageError, StorageResult};

use crate::url::Fingerprint;
use std::path::Path;

/// A URL known to the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub fingerprint: Fingerprint,
    pub url: String,
    pub completed: bool,
}

/// Opens (or creates) both stores in the database at `path`
///
/// # Returns
///
/// * `Ok((SqliteRecordStore, SqliteQueryCountStore))` - Both stores ready for use
/// * `Err(StorageError)` - The database could not be opened or initialized
pub fn open_stores(path: &Path) -> StorageResult<(SqliteRecordStore, SqliteQueryCountStore)> {
    let records = SqliteRecordStore::open(path)?;
    let query_counts = SqliteQueryCountStore::open(path)?;
    Ok((records, query_counts))
}
