#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use flashback::archive::store::MessageStore;
use flashback::archive::types::{Message, Timestamp};
use flashback::bot::registry::ChannelHandle;
use flashback::slack::{ChannelInfo, ChatClient, HistoryPage, RemoteMessage, UserInfo};

/// Open a fresh in-memory archive.
pub fn test_store() -> MessageStore {
    let store = MessageStore::open_in_memory();
    store.is_ready().unwrap();
    store
}

pub fn msg(sender: &str, channel: &str, ts: &str, body: &str) -> Message {
    Message {
        sender: sender.into(),
        channel: channel.into(),
        send_time: Timestamp::new(ts),
        body: body.into(),
    }
}

pub fn remote(sender: &str, ts: &str, text: &str) -> RemoteMessage {
    RemoteMessage {
        sender: sender.into(),
        send_time: Timestamp::new(ts),
        text: text.into(),
    }
}

pub fn channel_info(id: &str, name: &str, is_private: bool) -> ChannelInfo {
    ChannelInfo {
        id: id.into(),
        name: name.into(),
        is_private,
    }
}

pub fn channel_handle(id: &str) -> ChannelHandle {
    ChannelHandle {
        id: id.into(),
        name: format!("chan-{id}"),
        is_private: false,
        sync_lock: tokio::sync::Mutex::new(()),
    }
}

/// Fixed-width send-time token: lexicographic order equals numeric order.
pub fn ts(i: u32) -> String {
    format!("1700000{i:03}.000000")
}

/// Scripted in-process chat platform.
///
/// History is the full channel timeline, oldest first; paging mirrors the
/// real API (strictly after the cursor, bounded pages, `has_more`).
#[derive(Default)]
pub struct FakeChat {
    pub users: Vec<UserInfo>,
    pub private_channels: Vec<ChannelInfo>,
    pub public_channels: Vec<ChannelInfo>,
    pub history: HashMap<String, Vec<RemoteMessage>>,
    pub uploads: Mutex<Vec<(String, String, String)>>,
    pub history_calls: Mutex<usize>,
}

impl FakeChat {
    pub fn with_users<I: IntoIterator<Item = (&'static str, &'static str)>>(pairs: I) -> Self {
        Self {
            users: pairs
                .into_iter()
                .map(|(id, name)| UserInfo {
                    id: id.into(),
                    name: name.into(),
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn history_call_count(&self) -> usize {
        *self.history_calls.lock().unwrap()
    }
}

#[async_trait]
impl ChatClient for FakeChat {
    async fn list_private_channels(&self) -> anyhow::Result<Vec<ChannelInfo>> {
        Ok(self.private_channels.clone())
    }

    async fn list_public_channels(&self) -> anyhow::Result<Vec<ChannelInfo>> {
        Ok(self.public_channels.clone())
    }

    async fn channel_latest(&self, channel: &str) -> anyhow::Result<Option<Timestamp>> {
        Ok(self
            .history
            .get(channel)
            .and_then(|msgs| msgs.last())
            .map(|m| m.send_time.clone()))
    }

    async fn fetch_history_page(
        &self,
        channel: &str,
        after: Option<&Timestamp>,
        limit: u32,
    ) -> anyhow::Result<HistoryPage> {
        *self.history_calls.lock().unwrap() += 1;

        let timeline = self.history.get(channel).cloned().unwrap_or_default();
        let newer: Vec<RemoteMessage> = timeline
            .into_iter()
            .filter(|m| after.is_none_or(|f| m.send_time > *f))
            .collect();

        let has_more = newer.len() > limit as usize;
        Ok(HistoryPage {
            messages: newer.into_iter().take(limit as usize).collect(),
            has_more,
        })
    }

    async fn list_users(&self) -> anyhow::Result<Vec<UserInfo>> {
        Ok(self.users.clone())
    }

    async fn upload_document(
        &self,
        channel: &str,
        filename: &str,
        content: &str,
    ) -> anyhow::Result<()> {
        self.uploads
            .lock()
            .unwrap()
            .push((channel.into(), filename.into(), content.into()));
        Ok(())
    }
}
