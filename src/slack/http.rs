//! Thin Slack Web API client.
//!
//! Implements [`ChatClient`] over `conversations.*`, `users.list`, and
//! `files.upload`. Cursor pagination is followed for the listing calls;
//! history pagination stays with the caller (the sync engine drives it
//! through the frontier).

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::archive::types::Timestamp;
use crate::slack::{ChannelInfo, ChatClient, HistoryPage, RemoteMessage, UserInfo};

const API_BASE: &str = "https://slack.com/api";

pub struct SlackApiClient {
    http: reqwest::Client,
    token: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    ok: bool,
    error: Option<String>,
    #[serde(default)]
    channels: Vec<WireChannel>,
    #[serde(default)]
    members: Vec<WireUser>,
    #[serde(default)]
    messages: Vec<WireMessage>,
    #[serde(default)]
    has_more: bool,
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireChannel {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    is_private: bool,
    #[serde(default)]
    is_member: bool,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    deleted: bool,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(default)]
    user: String,
    ts: String,
    #[serde(default)]
    text: String,
}

impl SlackApiClient {
    pub fn new(token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
        }
    }

    async fn call(&self, method: &str, params: &[(&str, &str)]) -> Result<Envelope> {
        let url = format!("{API_BASE}/{method}");
        let envelope: Envelope = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .form(params)
            .send()
            .await
            .with_context(|| format!("request to {method} failed"))?
            .json()
            .await
            .with_context(|| format!("invalid response from {method}"))?;

        if !envelope.ok {
            bail!(
                "{method} returned error: {}",
                envelope.error.as_deref().unwrap_or("unknown")
            );
        }
        Ok(envelope)
    }

    /// List member channels of the given conversation types, following
    /// pagination cursors.
    async fn list_member_channels(&self, types: &str) -> Result<Vec<ChannelInfo>> {
        let mut channels = Vec::new();
        let mut cursor = String::new();

        loop {
            let mut params = vec![
                ("types", types),
                ("exclude_archived", "true"),
                ("limit", "200"),
            ];
            if !cursor.is_empty() {
                params.push(("cursor", cursor.as_str()));
            }
            let envelope = self.call("conversations.list", &params).await?;

            channels.extend(
                envelope
                    .channels
                    .into_iter()
                    .filter(|c| c.is_member)
                    .map(|c| ChannelInfo {
                        id: c.id,
                        name: c.name,
                        is_private: c.is_private,
                    }),
            );

            cursor = envelope
                .response_metadata
                .and_then(|m| m.next_cursor)
                .unwrap_or_default();
            if cursor.is_empty() {
                break;
            }
        }
        Ok(channels)
    }
}

#[async_trait]
impl ChatClient for SlackApiClient {
    async fn list_private_channels(&self) -> Result<Vec<ChannelInfo>> {
        self.list_member_channels("private_channel").await
    }

    async fn list_public_channels(&self) -> Result<Vec<ChannelInfo>> {
        self.list_member_channels("public_channel").await
    }

    async fn channel_latest(&self, channel: &str) -> Result<Option<Timestamp>> {
        let envelope = self
            .call("conversations.history", &[("channel", channel), ("limit", "1")])
            .await?;
        Ok(envelope
            .messages
            .into_iter()
            .next()
            .map(|m| Timestamp::new(m.ts)))
    }

    async fn fetch_history_page(
        &self,
        channel: &str,
        after: Option<&Timestamp>,
        limit: u32,
    ) -> Result<HistoryPage> {
        let limit = limit.to_string();
        let mut params = vec![
            ("channel", channel),
            ("limit", limit.as_str()),
            ("inclusive", "false"),
        ];
        if let Some(after) = after {
            params.push(("oldest", after.as_str()));
        }
        let envelope = self.call("conversations.history", &params).await?;

        let messages = envelope
            .messages
            .into_iter()
            .map(|m| RemoteMessage {
                sender: m.user,
                send_time: Timestamp::new(m.ts),
                text: m.text,
            })
            .collect();
        Ok(HistoryPage {
            messages,
            has_more: envelope.has_more,
        })
    }

    async fn list_users(&self) -> Result<Vec<UserInfo>> {
        let mut users = Vec::new();
        let mut cursor = String::new();

        loop {
            let mut params = vec![("limit", "200")];
            if !cursor.is_empty() {
                params.push(("cursor", cursor.as_str()));
            }
            let envelope = self.call("users.list", &params).await?;

            users.extend(
                envelope
                    .members
                    .into_iter()
                    .filter(|u| !u.deleted)
                    .map(|u| UserInfo { id: u.id, name: u.name }),
            );

            cursor = envelope
                .response_metadata
                .and_then(|m| m.next_cursor)
                .unwrap_or_default();
            if cursor.is_empty() {
                break;
            }
        }
        Ok(users)
    }

    async fn upload_document(&self, channel: &str, filename: &str, content: &str) -> Result<()> {
        self.call(
            "files.upload",
            &[
                ("channels", channel),
                ("filename", filename),
                ("content", content),
            ],
        )
        .await?;
        Ok(())
    }
}
