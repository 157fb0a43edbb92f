//! SQL DDL for the archive tables.
//!
//! Defines `messages` (compressed bodies, keyed by send time and channel),
//! `messages_fts` (FTS5 index over the plain-text bodies), and `schema_meta`.
//! All DDL uses `IF NOT EXISTS` for idempotent initialization.
//!
//! The FTS table is standalone rather than external-content: the content
//! table holds compressed blobs the tokenizer could not read. Every
//! `messages_fts` row is inserted with the rowid of its `messages` row, in
//! the same transaction, so the two stay one-to-one.

use rusqlite::Connection;

/// All schema DDL statements for the archive tables.
const SCHEMA_SQL: &str = r#"
-- Message storage; body is the zlib-compressed text
CREATE TABLE IF NOT EXISTS messages (
    sender TEXT NOT NULL,
    channel TEXT NOT NULL,
    send_time TEXT NOT NULL,
    body BLOB,
    PRIMARY KEY (send_time, channel)
);

CREATE INDEX IF NOT EXISTS idx_messages_channel ON messages(channel);

-- Full-text search over decompressed bodies (BM25)
CREATE VIRTUAL TABLE IF NOT EXISTS messages_fts USING fts5(
    body,
    sender UNINDEXED,
    channel UNINDEXED,
    send_time UNINDEXED
);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"messages".to_string()));
        assert!(tables.contains(&"schema_meta".to_string()));

        // The FTS5 virtual table answers queries even when empty
        let count: i64 = conn
            .query_row("SELECT count(*) FROM messages_fts", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap(); // second call should not error
    }
}
