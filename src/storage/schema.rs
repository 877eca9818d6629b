//! Database schema definitions
//!
//! This module contains the SQL schema for the Sumi-Frontier database.

/// Connection settings applied to every store connection
///
/// `synchronous = FULL` makes each committed statement durable on return.
pub const PRAGMAS_SQL: &str = "
    PRAGMA journal_mode = WAL;
    PRAGMA synchronous = FULL;
";

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Every URL the frontier has admitted
CREATE TABLE IF NOT EXISTS url_records (
    fingerprint TEXT PRIMARY KEY,
    url TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    discovered_at TEXT NOT NULL,
    completed_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_url_records_completed ON url_records(completed);

-- Admitted query variants per query-stripped URL
CREATE TABLE IF NOT EXISTS query_counts (
    fingerprint TEXT PRIMARY KEY,
    count INTEGER NOT NULL
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}
