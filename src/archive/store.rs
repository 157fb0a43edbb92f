//! The archive store — compressed rows plus a lockstep FTS index.
//!
//! [`MessageStore`] owns the SQLite handle and is the only writer. Append
//! inserts each message row (compressed) and its FTS entry (plain text) under
//! the same rowid in one transaction, so the index and the table can never
//! disagree. No triggers are involved; the pairing is enforced entirely by
//! this write path.
//!
//! Initialization failures (open errors, schema version mismatch) are cached:
//! every later operation short-circuits with the same stored error.

use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::archive::codec;
use crate::archive::types::{AppendOutcome, Message, Timestamp};
use crate::db::{self, version};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("schema version mismatch: database has {found}, binary expects {expected}")]
    VersionMismatch { found: u32, expected: u32 },
    #[error("failed to open archive: {0}")]
    Open(String),
    #[error("database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// Durable message archive with a full-text index.
///
/// Cheap to clone; clones share the underlying connection.
#[derive(Clone)]
pub struct MessageStore {
    state: Result<Arc<Mutex<Connection>>, StoreError>,
}

impl MessageStore {
    /// Open (or create) the archive at `path`. Never panics or returns early:
    /// a failed open is captured and reported by [`MessageStore::is_ready`]
    /// and by every subsequent operation.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            state: Self::init(db::open_database(path)),
        }
    }

    /// Open an in-memory archive (tests, `doctor`).
    pub fn open_in_memory() -> Self {
        Self {
            state: Self::init(db::open_memory_database()),
        }
    }

    fn init(opened: anyhow::Result<Connection>) -> Result<Arc<Mutex<Connection>>, StoreError> {
        let conn = opened.map_err(|e| StoreError::Open(format!("{e:#}")))?;

        // Seed the version marker on first run; refuse to run against a
        // database written by any other schema version.
        match version::stored_version(&conn)? {
            None => version::seed_version(&conn)?,
            Some(found) if found != version::SCHEMA_VERSION => {
                return Err(StoreError::VersionMismatch {
                    found,
                    expected: version::SCHEMA_VERSION,
                });
            }
            Some(_) => {}
        }

        Ok(Arc::new(Mutex::new(conn)))
    }

    /// Whether initialization (open + schema + version check) succeeded.
    /// On failure the returned error is the one every operation will repeat.
    pub fn is_ready(&self) -> Result<(), StoreError> {
        self.state.as_ref().map(|_| ()).map_err(Clone::clone)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        let handle = self.state.as_ref().map_err(Clone::clone)?;
        handle
            .lock()
            .map_err(|_| StoreError::Database("store lock poisoned".into()))
    }

    /// Append a batch of messages in one transaction.
    ///
    /// A `(send_time, channel)` collision means the row is already archived:
    /// it is skipped and counted, and the rest of the batch still commits.
    /// Any real failure rolls the whole batch back.
    pub fn append(&self, messages: &[Message]) -> Result<AppendOutcome, StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let mut outcome = AppendOutcome::default();
        {
            let mut insert_row = tx.prepare(
                "INSERT INTO messages (sender, channel, send_time, body) \
                 VALUES (?1, ?2, ?3, ?4) \
                 ON CONFLICT (send_time, channel) DO NOTHING",
            )?;
            let mut insert_fts = tx.prepare(
                "INSERT INTO messages_fts (rowid, body, sender, channel, send_time) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;

            for msg in messages {
                let compressed = codec::compress(&msg.body);
                let changed = insert_row.execute(params![
                    msg.sender,
                    msg.channel,
                    msg.send_time.as_str(),
                    compressed,
                ])?;

                if changed == 0 {
                    // Already archived
                    outcome.skipped += 1;
                    continue;
                }

                // Index entry shares the message row's rowid
                insert_fts.execute(params![
                    tx.last_insert_rowid(),
                    msg.body,
                    msg.sender,
                    msg.channel,
                    msg.send_time.as_str(),
                ])?;
                outcome.inserted += 1;
            }
        }
        tx.commit()?;

        if outcome.skipped > 0 {
            tracing::debug!(
                inserted = outcome.inserted,
                skipped = outcome.skipped,
                "append batch had already-archived rows"
            );
        }
        Ok(outcome)
    }

    /// Full-text search restricted to `channel`, optionally to `sender`.
    ///
    /// `query` must be an FTS5 match expression (see
    /// [`crate::archive::query::CommandParser::query_from_command`]). All
    /// values are bound as parameters; none can widen the channel scope.
    /// Results are ordered by relevance; bodies are decompressed.
    pub fn search(
        &self,
        sender: Option<&str>,
        channel: &str,
        query: &str,
    ) -> Result<Vec<Message>, StoreError> {
        let conn = self.conn()?;

        let sql_base = "SELECT m.sender, m.channel, m.send_time, m.body \
             FROM messages_fts JOIN messages m ON m.rowid = messages_fts.rowid \
             WHERE messages_fts MATCH ?1 AND messages_fts.channel = ?2";

        let mut results = Vec::new();
        let collect = |row: &rusqlite::Row<'_>| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Vec<u8>>(3)?,
            ))
        };

        let rows: Vec<(String, String, String, Vec<u8>)> = match sender {
            Some(sender) if !sender.is_empty() => {
                let sql = format!("{sql_base} AND messages_fts.sender = ?3 ORDER BY messages_fts.rank");
                let mut stmt = conn.prepare(&sql)?;
                let mapped = stmt.query_map(params![query, channel, sender], collect)?;
                mapped.collect::<Result<_, _>>()?
            }
            _ => {
                let sql = format!("{sql_base} ORDER BY messages_fts.rank");
                let mut stmt = conn.prepare(&sql)?;
                let mapped = stmt.query_map(params![query, channel], collect)?;
                mapped.collect::<Result<_, _>>()?
            }
        };

        for (sender, channel, send_time, body) in rows {
            results.push(Message {
                sender,
                channel,
                send_time: Timestamp::new(send_time),
                body: codec::decompress(&body),
            });
        }
        Ok(results)
    }

    /// The newest archived send time for `channel`, or `None` if the channel
    /// has no archived messages.
    pub fn latest_timestamp(&self, channel: &str) -> Result<Option<Timestamp>, StoreError> {
        let conn = self.conn()?;
        let ts: Option<String> = conn.query_row(
            "SELECT MAX(send_time) FROM messages WHERE channel = ?1",
            params![channel],
            |row| row.get(0),
        )?;
        Ok(ts.map(Timestamp::new))
    }
}
