//! Chat platform interface.
//!
//! The core consumes the [`ChatClient`] capability trait and an event stream
//! of [`MessageEvent`]s; it never touches the wire. [`http::SlackApiClient`]
//! implements the trait against the Slack Web API, and [`socket`] supplies
//! the live event stream over a Socket Mode connection.

pub mod http;
pub mod socket;

use async_trait::async_trait;

use crate::archive::types::Timestamp;

/// A channel the bot is a member of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: String,
    pub name: String,
    pub is_private: bool,
}

/// A workspace user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
}

/// A message as returned by the history API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMessage {
    pub sender: String,
    pub send_time: Timestamp,
    pub text: String,
}

/// One page of channel history.
#[derive(Debug, Clone, Default)]
pub struct HistoryPage {
    pub messages: Vec<RemoteMessage>,
    /// More pages remain beyond this one.
    pub has_more: bool,
}

/// A live message event from the event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub sender: String,
    pub channel: String,
    pub send_time: Timestamp,
    pub text: String,
}

/// The chat platform capabilities the core consumes.
///
/// Listing calls return only channels the bot belongs to. History fetches are
/// strictly-after `after` (exclusive), bounded by `limit`.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn list_private_channels(&self) -> anyhow::Result<Vec<ChannelInfo>>;

    async fn list_public_channels(&self) -> anyhow::Result<Vec<ChannelInfo>>;

    /// Send time of the channel's newest message, `None` when the channel is
    /// empty.
    async fn channel_latest(&self, channel: &str) -> anyhow::Result<Option<Timestamp>>;

    async fn fetch_history_page(
        &self,
        channel: &str,
        after: Option<&Timestamp>,
        limit: u32,
    ) -> anyhow::Result<HistoryPage>;

    async fn list_users(&self) -> anyhow::Result<Vec<UserInfo>>;

    /// Upload a text document to a channel (search command responses).
    async fn upload_document(
        &self,
        channel: &str,
        filename: &str,
        content: &str,
    ) -> anyhow::Result<()>;
}
