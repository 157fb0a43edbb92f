//! Search-command recognition and query translation.
//!
//! A command is a message that mentions the bot followed by a colon:
//! `<@U123>: find the budget doc`. The remainder is tokenized into word
//! keywords and joined into an FTS5 AND-expression. Each keyword is quoted so
//! no token is ever read as FTS5 syntax; the store binds the whole expression
//! as a parameter, so nothing here can widen a search's channel scope.

use anyhow::{bail, Result};
use regex::Regex;
use std::sync::OnceLock;

fn keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+").expect("keyword pattern is valid"))
}

/// Tokenize free text into word keywords and join them into a quoted FTS5
/// AND-expression, e.g. `"find" AND "budget"`. `None` when the text contains
/// no keywords.
pub fn keywords_to_query(text: &str) -> Option<String> {
    let keywords: Vec<String> = keyword_re()
        .find_iter(text)
        .map(|m| format!("\"{}\"", m.as_str()))
        .collect();
    if keywords.is_empty() {
        None
    } else {
        Some(keywords.join(" AND "))
    }
}

/// Recognizes bot commands and translates them to store queries.
///
/// Construction is configuration: the parser cannot exist without the bot's
/// identity, so recognition can never run unconfigured.
pub struct CommandParser {
    bot_id: String,
    bot_name: String,
    command_re: Regex,
}

impl CommandParser {
    pub fn new(bot_id: &str, bot_name: &str) -> Result<Self> {
        if bot_id.is_empty() {
            bail!("bot id must be resolved before commands can be recognized");
        }
        let command_re = Regex::new(&format!(r"(^|\W+)<@{}>:\W*(.+)", regex::escape(bot_id)))?;
        Ok(Self {
            bot_id: bot_id.to_string(),
            bot_name: bot_name.to_string(),
            command_re,
        })
    }

    pub fn bot_id(&self) -> &str {
        &self.bot_id
    }

    pub fn bot_name(&self) -> &str {
        &self.bot_name
    }

    /// True iff the text is a search command addressed to this bot.
    pub fn is_command(&self, text: &str) -> bool {
        self.command_re.is_match(text)
    }

    /// Extract the command remainder and translate it into an FTS5 AND-query.
    pub fn query_from_command(&self, text: &str) -> Result<String> {
        let Some(caps) = self.command_re.captures(text) else {
            bail!("invalid command: {text:?}");
        };
        let remainder = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

        let Some(query) = keywords_to_query(remainder) else {
            bail!("invalid command: {text:?}");
        };
        tracing::debug!(%query, "translated command");
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> CommandParser {
        CommandParser::new("U123", "flashback").unwrap()
    }

    #[test]
    fn empty_bot_id_is_rejected() {
        assert!(CommandParser::new("", "flashback").is_err());
    }

    #[test]
    fn recognizes_commands() {
        let p = parser();
        assert!(p.is_command("<@U123>: find budget"));
        assert!(p.is_command("hey <@U123>: find budget"));
        assert!(!p.is_command("just chatting"));
        assert!(!p.is_command("<@U999>: someone else's bot"));
        // Mention without a remainder is not a command
        assert!(!p.is_command("<@U123>:"));
    }

    #[test]
    fn translates_keywords_to_and_query() {
        let p = parser();
        let q = p.query_from_command("<@U123>: find budget").unwrap();
        assert_eq!(q, "\"find\" AND \"budget\"");
    }

    #[test]
    fn non_word_characters_separate_keywords() {
        let p = parser();
        let q = p
            .query_from_command("<@U123>: deploy, rollback... and (retry)")
            .unwrap();
        assert_eq!(q, "\"deploy\" AND \"rollback\" AND \"and\" AND \"retry\"");
    }

    #[test]
    fn fts_operators_are_neutralized_by_quoting() {
        let p = parser();
        let q = p.query_from_command("<@U123>: budget OR secrets").unwrap();
        // OR is just a quoted keyword, not an operator
        assert_eq!(q, "\"budget\" AND \"OR\" AND \"secrets\"");
    }

    #[test]
    fn non_command_text_fails_translation() {
        let p = parser();
        assert!(p.query_from_command("just chatting").is_err());
        // Punctuation-only remainder has no keywords
        assert!(p.query_from_command("<@U123>: ???").is_err());
    }

    #[test]
    fn keywords_to_query_on_plain_text() {
        assert_eq!(
            keywords_to_query("find the budget").as_deref(),
            Some("\"find\" AND \"the\" AND \"budget\"")
        );
        assert_eq!(keywords_to_query("..."), None);
        assert_eq!(keywords_to_query(""), None);
    }
}
