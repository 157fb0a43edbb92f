//! Schema version bookkeeping.
//!
//! The marker is seeded on first run and verified on every later run. There
//! is no migration path: a database written by a different schema version is
//! refused outright, and the store surfaces that as a permanent
//! initialization failure.

use rusqlite::{Connection, OptionalExtension};

/// The schema version that the current binary expects.
pub const SCHEMA_VERSION: u32 = 1;

/// Get the stored schema version, or `None` on a fresh database.
pub fn stored_version(conn: &Connection) -> rusqlite::Result<Option<u32>> {
    conn.query_row(
        "SELECT value FROM schema_meta WHERE key = 'schema_version'",
        [],
        |row| {
            let val: String = row.get(0)?;
            Ok(val.parse::<u32>().unwrap_or(0))
        },
    )
    .optional()
}

/// Seed the version marker on a fresh database.
pub fn seed_version(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;
    Ok(())
}
