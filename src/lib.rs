//! Flashback — a Slack archive bot with full-text recall.
//!
//! Flashback joins a workspace, mirrors every channel it is a member of into
//! a local SQLite database, and answers in-channel search commands by
//! uploading a transcript of matching history. Message bodies are stored
//! zlib-compressed; an FTS5 index kept in lockstep with the message table
//! makes them searchable.
//!
//! # Architecture
//!
//! - **Storage**: SQLite with an FTS5 keyword index over decompressed bodies;
//!   the message table holds the compressed copy. Both are written in one
//!   transaction so the index never drifts from the table.
//! - **Sync**: per-channel incremental backfill. Each channel tracks a
//!   frontier (the newest archived timestamp) and pages through remote
//!   history strictly newer than it.
//! - **Events**: a Socket Mode connection feeds live message events; each
//!   event is dispatched on its own task so a slow sync never stalls
//!   ingestion.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite initialization, schema, and the schema version check
//! - [`archive`] — Core engine: codec, message store, query translation, rendering
//! - [`slack`] — Wire types, the [`slack::ChatClient`] trait, and the Slack implementations
//! - [`bot`] — Channel registry, roster, sync engine, and the event dispatcher

pub mod archive;
pub mod bot;
pub mod config;
pub mod db;
pub mod slack;
