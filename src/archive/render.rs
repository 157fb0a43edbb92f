//! Search-result rendering.
//!
//! Builds the transcript document uploaded in reply to a search command:
//! chronologically ordered lines of the form
//! `*<name> posted on <time>:* <body>`, with user-mention tokens rewritten to
//! `@name`. Malformed data degrades (empty time, `@user` placeholder) rather
//! than failing the whole response.

use chrono::{TimeZone, Utc};
use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::archive::types::{Message, Timestamp};
use crate::bot::roster::UserMap;

fn mention_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<@(\w+)>").expect("mention pattern is valid"))
}

/// Replace `<@ID>` mention tokens with `@name`, falling back to `@user` for
/// ids missing from the roster.
pub fn rewrite_mentions(text: &str, users: &UserMap) -> String {
    mention_re()
        .replace_all(text, |caps: &Captures<'_>| {
            let name = users.display_name(&caps[1]).unwrap_or("user");
            format!("@{name}")
        })
        .into_owned()
}

/// Render a send-time token as a human-readable UTC time, or an empty string
/// when the token is malformed.
pub fn format_send_time(ts: &Timestamp) -> String {
    let Some(secs) = ts.unix_seconds() else {
        tracing::debug!(token = %ts, "malformed send-time token");
        return String::new();
    };
    match Utc.timestamp_opt(secs, 0) {
        chrono::LocalResult::Single(t) => t.format("%a %b %e %H:%M:%S UTC %Y").to_string(),
        _ => String::new(),
    }
}

/// Assemble the uploaded transcript: one line per message, oldest first.
pub fn format_transcript(messages: &[Message], users: &UserMap) -> String {
    let mut ordered: Vec<&Message> = messages.iter().collect();
    ordered.sort_by(|a, b| a.send_time.cmp(&b.send_time));

    let lines: Vec<String> = ordered
        .iter()
        .map(|msg| {
            let name = users.display_name(&msg.sender).unwrap_or("user");
            format!(
                "*{} posted on {}:* {}",
                name,
                format_send_time(&msg.send_time),
                rewrite_mentions(&msg.body, users)
            )
        })
        .collect();
    lines.join("\n")
}
