//! User roster resolution.
//!
//! The roster maps user ids to display names for result rendering, and is
//! where the bot discovers its own id (by display name). Refreshes are
//! wholesale: the map is rebuilt from the full remote listing.

use anyhow::{bail, Result};
use std::collections::HashMap;

use crate::slack::ChatClient;

/// Id → display name lookup.
#[derive(Debug, Clone, Default)]
pub struct UserMap {
    names: HashMap<String, String>,
}

impl UserMap {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            names: pairs
                .into_iter()
                .map(|(id, name)| (id.into(), name.into()))
                .collect(),
        }
    }

    pub fn display_name(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The bot's own identity as resolved from the roster.
#[derive(Debug, Clone)]
pub struct BotIdentity {
    pub id: String,
    pub name: String,
}

/// Rebuild the user map from the remote roster and locate the bot's own id.
/// A bot name missing from the roster is a fatal startup error.
pub async fn resolve_roster<C: ChatClient + ?Sized>(
    client: &C,
    bot_name: &str,
) -> Result<(UserMap, BotIdentity)> {
    let users = client.list_users().await?;

    let mut names = HashMap::with_capacity(users.len());
    let mut bot_id = None;
    for user in users {
        if user.name == bot_name {
            bot_id = Some(user.id.clone());
        }
        names.insert(user.id, user.name);
    }

    let Some(id) = bot_id else {
        bail!("bot {bot_name:?} not found in the user roster");
    };
    Ok((
        UserMap { names },
        BotIdentity {
            id,
            name: bot_name.to_string(),
        },
    ))
}
