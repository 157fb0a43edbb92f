//! Per-channel incremental synchronization.
//!
//! A sync cycle holds the channel's lock throughout: compute the frontier
//! (the newest archived send time), page through remote history strictly
//! newer than it, and commit the accumulated batch in one append. The bot's
//! own messages and search commands are never archived but still advance the
//! frontier, otherwise they would be refetched forever. On failure nothing
//! moves: the next cycle recomputes the same frontier and refetches, and
//! append's key uniqueness absorbs any overlap.

use anyhow::Result;

use crate::archive::query::CommandParser;
use crate::archive::store::MessageStore;
use crate::archive::types::Message;
use crate::bot::registry::ChannelHandle;
use crate::slack::ChatClient;

/// What a sync cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The channel has no remote messages at all.
    EmptyChannel,
    /// The archive already holds the channel's newest message.
    UpToDate,
    /// Backfill ran over `fetched` remote messages.
    Synced {
        fetched: usize,
        inserted: usize,
        skipped: usize,
    },
}

impl std::fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyChannel => write!(f, "empty channel"),
            Self::UpToDate => write!(f, "up to date"),
            Self::Synced {
                fetched,
                inserted,
                skipped,
            } => write!(f, "fetched {fetched}, archived {inserted}, skipped {skipped}"),
        }
    }
}

/// Run one sync cycle for `channel`, holding its lock for the duration.
pub async fn sync_channel<C: ChatClient + ?Sized>(
    client: &C,
    store: &MessageStore,
    parser: &CommandParser,
    channel: &ChannelHandle,
    page_size: u32,
) -> Result<SyncOutcome> {
    let _guard = channel.sync_lock.lock().await;
    tracing::debug!(channel = %channel.id, "sync cycle starting");

    let Some(remote_latest) = client.channel_latest(&channel.id).await? else {
        return Ok(SyncOutcome::EmptyChannel);
    };

    let local_latest = store.latest_timestamp(&channel.id)?;
    if let Some(local) = &local_latest {
        if *local >= remote_latest {
            tracing::debug!(channel = %channel.id, "already up to date");
            return Ok(SyncOutcome::UpToDate);
        }
    }

    // Page strictly newer than the frontier until the remote side is drained
    let mut frontier = local_latest;
    let mut batch = Vec::new();
    let mut fetched = 0;
    loop {
        let page = client
            .fetch_history_page(&channel.id, frontier.as_ref(), page_size)
            .await?;
        fetched += page.messages.len();

        for msg in page.messages {
            // Every message advances the frontier, even ones not archived
            if frontier.as_ref().is_none_or(|f| msg.send_time > *f) {
                frontier = Some(msg.send_time.clone());
            }

            if msg.sender == parser.bot_id() || parser.is_command(&msg.text) {
                continue;
            }
            batch.push(Message {
                sender: msg.sender,
                channel: channel.id.clone(),
                send_time: msg.send_time,
                body: msg.text,
            });
        }

        if !page.has_more {
            break;
        }
    }

    if batch.is_empty() {
        return Ok(SyncOutcome::Synced {
            fetched,
            inserted: 0,
            skipped: 0,
        });
    }

    let outcome = store.append(&batch)?;
    tracing::info!(
        channel = %channel.id,
        fetched,
        inserted = outcome.inserted,
        skipped = outcome.skipped,
        "sync cycle committed"
    );
    Ok(SyncOutcome::Synced {
        fetched,
        inserted: outcome.inserted,
        skipped: outcome.skipped,
    })
}
