//! Live event dispatch.
//!
//! Each incoming message event runs on its own task: command handling (search
//! + transcript upload), then a sync cycle for the channel so anything missed
//! while disconnected is backfilled, then archival of the event itself.
//! Failures in any leg are logged and never unwind the event loop; per-channel
//! ordering comes from the channel sync lock, and no cross-channel ordering is
//! promised.

use anyhow::{anyhow, Context, Result};
use std::sync::Arc;

use crate::archive::query::CommandParser;
use crate::archive::render;
use crate::archive::store::MessageStore;
use crate::archive::types::Message;
use crate::bot::registry::ChannelRegistry;
use crate::bot::roster::UserMap;
use crate::bot::sync;
use crate::slack::{ChatClient, MessageEvent};

const TRANSCRIPT_FILENAME: &str = "search-results.txt";

pub struct Dispatcher<C: ChatClient + ?Sized> {
    client: Arc<C>,
    store: MessageStore,
    registry: Arc<ChannelRegistry>,
    parser: Arc<CommandParser>,
    users: Arc<UserMap>,
    page_size: u32,
}

impl<C: ChatClient + ?Sized> Dispatcher<C> {
    pub fn new(
        client: Arc<C>,
        store: MessageStore,
        registry: Arc<ChannelRegistry>,
        parser: Arc<CommandParser>,
        users: Arc<UserMap>,
        page_size: u32,
    ) -> Self {
        Self {
            client,
            store,
            registry,
            parser,
            users,
            page_size,
        }
    }

    /// Handle one live event. Never returns an error; each leg logs its own
    /// failures so one bad event cannot take down the loop.
    pub async fn handle_event(&self, event: MessageEvent) {
        if event.sender == self.parser.bot_id() {
            return;
        }
        tracing::debug!(
            channel = %event.channel,
            sender = %event.sender,
            "event received"
        );

        let is_command = self.parser.is_command(&event.text);
        if is_command {
            if let Err(err) = self.handle_command(&event).await {
                tracing::error!(
                    channel = %event.channel,
                    error = %format!("{err:#}"),
                    "search command failed"
                );
            }
        }

        if let Err(err) = self.ensure_synced(&event).await {
            tracing::error!(
                channel = %event.channel,
                error = %format!("{err:#}"),
                "event sync failed"
            );
        }

        // The sync usually catches the event itself; append dedupes if so
        if !is_command {
            if let Err(err) = self.store.append(&[Message {
                sender: event.sender,
                channel: event.channel.clone(),
                send_time: event.send_time,
                body: event.text,
            }]) {
                tracing::error!(
                    channel = %event.channel,
                    error = %err,
                    "failed to archive live event"
                );
            }
        }
    }

    /// Translate the command, search the channel's archive, and upload the
    /// transcript back to the requesting channel.
    async fn handle_command(&self, event: &MessageEvent) -> Result<()> {
        let query = self.parser.query_from_command(&event.text)?;
        let results = self
            .store
            .search(None, &event.channel, &query)
            .context("archive search failed")?;

        if results.is_empty() {
            tracing::info!(channel = %event.channel, %query, "search matched nothing");
            return Ok(());
        }

        let transcript = render::format_transcript(&results, &self.users);
        self.client
            .upload_document(&event.channel, TRANSCRIPT_FILENAME, &transcript)
            .await
            .context("transcript upload failed")?;

        tracing::info!(
            channel = %event.channel,
            matches = results.len(),
            "search transcript uploaded"
        );
        Ok(())
    }

    /// Make sure the channel is tracked (reconciling on a miss) and run a
    /// sync cycle for it.
    async fn ensure_synced(&self, event: &MessageEvent) -> Result<()> {
        let handle = match self.registry.get(&event.channel).await {
            Some(handle) => handle,
            None => {
                self.registry.reconcile(self.client.as_ref()).await?;
                self.registry
                    .get(&event.channel)
                    .await
                    .ok_or_else(|| anyhow!("no membership mapping for channel {}", event.channel))?
            }
        };

        sync::sync_channel(
            self.client.as_ref(),
            &self.store,
            &self.parser,
            &handle,
            self.page_size,
        )
        .await?;
        Ok(())
    }
}
