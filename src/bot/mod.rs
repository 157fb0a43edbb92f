//! Bot runtime: channel registry, roster, sync engine, and event dispatch.

pub mod dispatch;
pub mod registry;
pub mod roster;
pub mod sync;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::archive::query::CommandParser;
use crate::archive::store::MessageStore;
use crate::bot::dispatch::Dispatcher;
use crate::bot::registry::ChannelRegistry;
use crate::slack::{ChatClient, MessageEvent};

/// Run the bot: resolve the roster, reconcile channels, backfill each one,
/// then dispatch live events until the stream closes.
pub async fn run<C: ChatClient + 'static>(
    client: Arc<C>,
    mut events: mpsc::Receiver<MessageEvent>,
    store: MessageStore,
    bot_name: &str,
    page_size: u32,
) -> Result<()> {
    let (users, identity) = roster::resolve_roster(client.as_ref(), bot_name)
        .await
        .context("failed to resolve user roster")?;
    tracing::info!(bot_id = %identity.id, users = users.len(), "roster resolved");

    let parser = Arc::new(CommandParser::new(&identity.id, &identity.name)?);

    let registry = Arc::new(ChannelRegistry::new());
    registry
        .reconcile(client.as_ref())
        .await
        .context("initial channel reconciliation failed")?;

    // Backfill everything we already belong to before going live
    for channel in registry.snapshot().await {
        match sync::sync_channel(client.as_ref(), &store, &parser, &channel, page_size).await {
            Ok(outcome) => {
                tracing::info!(channel = %channel.id, outcome = %outcome, "initial sync")
            }
            Err(err) => {
                tracing::error!(channel = %channel.id, error = %format!("{err:#}"), "initial sync failed")
            }
        }
    }

    let dispatcher = Arc::new(Dispatcher::new(
        client,
        store,
        registry,
        parser,
        Arc::new(users),
        page_size,
    ));

    tracing::info!("archiving live events");
    while let Some(event) = events.recv().await {
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move {
            dispatcher.handle_event(event).await;
        });
    }

    tracing::info!("event stream closed, shutting down");
    Ok(())
}
