//! CLI `serve` command — run the archive bot.

use anyhow::{bail, Result};
use std::sync::Arc;

use crate::archive::store::MessageStore;
use crate::bot;
use crate::config::FlashbackConfig;
use crate::slack::http::SlackApiClient;
use crate::slack::socket;

/// Open the store, connect to the platform, and run until the event stream
/// closes. Store-not-ready and roster failures abort with a non-zero exit.
pub async fn serve(config: FlashbackConfig) -> Result<()> {
    let store = MessageStore::open(config.resolved_db_path());
    if let Err(err) = store.is_ready() {
        bail!("archive not ready: {err}");
    }

    if config.slack.bot_token.is_empty() {
        bail!("slack bot token is not configured (set [slack].bot_token or FLASHBACK_TOKEN)");
    }

    let client = Arc::new(SlackApiClient::new(config.slack.bot_token.clone()));
    let events = socket::connect(config.slack.app_token.clone()).await?;

    bot::run(
        client,
        events,
        store,
        &config.slack.bot_name,
        config.sync.page_size,
    )
    .await
}
