//! Core archive type definitions.
//!
//! Defines [`Message`] (an archived chat message), [`Timestamp`] (the
//! platform's sortable send-time token), and [`AppendOutcome`].

use serde::{Deserialize, Serialize};

/// A message send-time token, e.g. `"1724683000.000200"`.
///
/// The platform guarantees the token is unique per channel and that byte-wise
/// string comparison matches chronological order; the derived `Ord` relies on
/// that. The absence of a timestamp ("no messages archived yet") is always
/// `Option<Timestamp>::None`, never an empty token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Seconds since the epoch, if the token has the expected
    /// `seconds.fraction` shape.
    pub fn unix_seconds(&self) -> Option<i64> {
        let (secs, _frac) = self.0.split_once('.')?;
        secs.parse().ok()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Timestamp {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

/// An archived chat message. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// User id of the author.
    pub sender: String,
    /// Channel id the message was posted in.
    pub channel: String,
    /// Send-time token; unique together with `channel`.
    pub send_time: Timestamp,
    /// Plain message text. Stored compressed at rest.
    pub body: String,
}

/// Counts reported by a batch append.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Rows newly written to the archive.
    pub inserted: usize,
    /// Rows skipped because `(send_time, channel)` was already archived.
    pub skipped: usize,
}
