pub mod schema;
pub mod version;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

/// Open (or create) the archive database at the given path with the schema
/// initialized. The schema version marker is checked separately by the store.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    // Enable WAL mode for better concurrent read performance
    conn.pragma_update(None, "journal_mode", "WAL")?;

    schema::init_schema(&conn).context("failed to initialize schema")?;

    tracing::info!(path = %path.display(), "database initialized");
    Ok(conn)
}

/// Open an in-memory database with the schema initialized. Used by tests and
/// the `doctor` command.
pub fn open_memory_database() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    schema::init_schema(&conn).context("failed to initialize schema")?;
    Ok(conn)
}

/// Snapshot of archive health, reported by `flashback doctor`.
#[derive(Debug)]
pub struct HealthReport {
    pub schema_version: Option<u32>,
    pub message_count: i64,
    pub index_count: i64,
    pub integrity_ok: bool,
    pub integrity_details: String,
}

/// Run diagnostics against an open archive.
pub fn check_database_health(conn: &Connection) -> Result<HealthReport> {
    let schema_version = version::stored_version(conn)?;

    let message_count: i64 = conn.query_row("SELECT count(*) FROM messages", [], |r| r.get(0))?;
    let index_count: i64 =
        conn.query_row("SELECT count(*) FROM messages_fts", [], |r| r.get(0))?;

    let integrity_details: String =
        conn.query_row("PRAGMA integrity_check", [], |r| r.get(0))?;
    let integrity_ok = integrity_details == "ok" && message_count == index_count;

    Ok(HealthReport {
        schema_version,
        message_count,
        index_count,
        integrity_ok,
        integrity_details,
    })
}
