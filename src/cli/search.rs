//! CLI `search` command — query the local archive from the terminal.

use anyhow::{bail, Result};

use crate::archive::query::keywords_to_query;
use crate::archive::store::MessageStore;
use crate::config::FlashbackConfig;

/// Run a store search directly and print the matches, oldest first.
pub fn search(
    config: &FlashbackConfig,
    channel: &str,
    sender: Option<&str>,
    keywords: &[String],
) -> Result<()> {
    let Some(query) = keywords_to_query(&keywords.join(" ")) else {
        bail!("no search keywords given");
    };

    let store = MessageStore::open(config.resolved_db_path());
    store.is_ready()?;

    let mut results = store.search(sender, channel, &query)?;
    if results.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    results.sort_by(|a, b| a.send_time.cmp(&b.send_time));
    println!("Found {} result(s)\n", results.len());
    for msg in &results {
        println!("  [{}] {}: {}", msg.send_time, msg.sender, msg.body);
    }

    Ok(())
}
