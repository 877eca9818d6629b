//! SQLite storage implementation
//!
//! Each store owns its own [`Connection`] so that record writes and query
//! counter updates never wait on each other.

use crate::storage::schema::{initialize_schema, PRAGMAS_SQL};
use crate::storage::traits::{QueryCountStore, RecordStore, StorageError, StorageResult};
use crate::storage::UrlRecord;
use crate::url::Fingerprint;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::Duration;

fn open_connection(path: &Path) -> StorageResult<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch(PRAGMAS_SQL)?;
    conn.busy_timeout(Duration::from_secs(5))?;
    initialize_schema(&conn)?;
    Ok(conn)
}

fn open_memory_connection() -> StorageResult<Connection> {
    let conn = Connection::open_in_memory()?;
    initialize_schema(&conn)?;
    Ok(conn)
}

fn decode_fingerprint(hex: &str) -> StorageResult<Fingerprint> {
    Fingerprint::from_hex(hex)
        .ok_or_else(|| StorageError::Corrupt(format!("invalid fingerprint '{}'", hex)))
}

/// SQLite-backed [`RecordStore`]
pub struct SqliteRecordStore {
    conn: Connection,
}

impl SqliteRecordStore {
    /// Opens or creates the record table in the database at `path`
    pub fn open(path: &Path) -> StorageResult<Self> {
        Ok(Self {
            conn: open_connection(path)?,
        })
    }

    /// Creates a store backed by a private in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self {
            conn: open_memory_connection()?,
        })
    }
}

impl RecordStore for SqliteRecordStore {
    fn put(&mut self, fingerprint: &Fingerprint, url: &str, completed: bool) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let completed_at = completed.then(|| now.clone());
        self.conn.execute(
            "INSERT INTO url_records (fingerprint, url, completed, discovered_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(fingerprint) DO UPDATE SET
                url = excluded.url,
                completed = MAX(url_records.completed, excluded.completed),
                completed_at = COALESCE(url_records.completed_at, excluded.completed_at)",
            params![fingerprint.to_hex(), url, completed, now, completed_at],
        )?;
        Ok(())
    }

    fn get(&self, fingerprint: &Fingerprint) -> StorageResult<Option<UrlRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT url, completed FROM url_records WHERE fingerprint = ?1",
                params![fingerprint.to_hex()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?)),
            )
            .optional()?;

        Ok(row.map(|(url, completed)| UrlRecord {
            fingerprint: *fingerprint,
            url,
            completed,
        }))
    }

    fn contains(&self, fingerprint: &Fingerprint) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM url_records WHERE fingerprint = ?1",
                params![fingerprint.to_hex()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn iterate(&self) -> StorageResult<Vec<UrlRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT fingerprint, url, completed FROM url_records ORDER BY rowid")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, bool>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(hex, url, completed)| {
                Ok(UrlRecord {
                    fingerprint: decode_fingerprint(&hex)?,
                    url,
                    completed,
                })
            })
            .collect()
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM url_records", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_completed(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM url_records WHERE completed = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn clear(&mut self) -> StorageResult<()> {
        self.conn.execute("DELETE FROM url_records", [])?;
        Ok(())
    }
}

/// SQLite-backed [`QueryCountStore`]
pub struct SqliteQueryCountStore {
    conn: Connection,
}

impl SqliteQueryCountStore {
    /// Opens or creates the counter table in the database at `path`
    pub fn open(path: &Path) -> StorageResult<Self> {
        Ok(Self {
            conn: open_connection(path)?,
        })
    }

    /// Creates a store backed by a private in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self {
            conn: open_memory_connection()?,
        })
    }
}

impl QueryCountStore for SqliteQueryCountStore {
    fn increment_if_below(&mut self, fingerprint: &Fingerprint, limit: u32) -> StorageResult<bool> {
        if limit == 0 {
            return Ok(false);
        }

        // Single statement: the check and the increment cannot interleave.
        let changed = self.conn.execute(
            "INSERT INTO query_counts (fingerprint, count) VALUES (?1, 1)
             ON CONFLICT(fingerprint) DO UPDATE SET count = count + 1
             WHERE query_counts.count < ?2",
            params![fingerprint.to_hex(), limit],
        )?;
        Ok(changed == 1)
    }

    fn count_for(&self, fingerprint: &Fingerprint) -> StorageResult<u32> {
        let count: Option<u32> = self
            .conn
            .query_row(
                "SELECT count FROM query_counts WHERE fingerprint = ?1",
                params![fingerprint.to_hex()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(count.unwrap_or(0))
    }

    fn tracked(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM query_counts", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn clear(&mut self) -> StorageResult<()> {
        self.conn.execute("DELETE FROM query_counts", [])?;
        Ok(())
    }
}
