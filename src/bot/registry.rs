//! Channel registry.
//!
//! Tracks the channels the bot belongs to and reconciles them against the
//! remote membership lists. Each channel carries its own sync lock so syncs
//! of different channels never contend; the registry's map lock is held only
//! for reconciliation and lookups, never across a channel's sync.

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::slack::ChatClient;

/// A tracked channel with its per-channel sync lock.
#[derive(Debug)]
pub struct ChannelHandle {
    pub id: String,
    pub name: String,
    pub is_private: bool,
    /// Held for the whole of a sync cycle; see [`crate::bot::sync`].
    pub sync_lock: Mutex<()>,
}

#[derive(Default)]
pub struct ChannelRegistry {
    channels: Mutex<HashMap<String, Arc<ChannelHandle>>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile tracked channels against current remote membership: add the
    /// untracked, drop the departed. Not safe to run concurrently with
    /// itself; the map lock is held for the whole pass.
    pub async fn reconcile<C: ChatClient + ?Sized>(&self, client: &C) -> Result<()> {
        let mut channels = self.channels.lock().await;

        tracing::debug!("reconciling channel membership");
        let mut current = client.list_private_channels().await?;
        current.extend(client.list_public_channels().await?);

        for info in &current {
            if !channels.contains_key(&info.id) {
                tracing::info!(channel = %info.id, name = %info.name, private = info.is_private, "tracking channel");
                channels.insert(
                    info.id.clone(),
                    Arc::new(ChannelHandle {
                        id: info.id.clone(),
                        name: info.name.clone(),
                        is_private: info.is_private,
                        sync_lock: Mutex::new(()),
                    }),
                );
            }
        }

        channels.retain(|id, handle| {
            let keep = current.iter().any(|info| info.id == *id);
            if !keep {
                tracing::info!(channel = %id, name = %handle.name, "dropping departed channel");
            }
            keep
        });

        Ok(())
    }

    pub async fn get(&self, id: &str) -> Option<Arc<ChannelHandle>> {
        self.channels.lock().await.get(id).cloned()
    }

    /// Display name of a tracked channel; errors when untracked.
    pub async fn channel_name(&self, id: &str) -> Result<String> {
        self.get(id)
            .await
            .map(|handle| handle.name.clone())
            .ok_or_else(|| anyhow!("channel not found: {id}"))
    }

    /// Current handles, for iteration without holding the map lock.
    pub async fn snapshot(&self) -> Vec<Arc<ChannelHandle>> {
        self.channels.lock().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.channels.lock().await.len()
    }
}
