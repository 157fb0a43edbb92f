//! Socket Mode event stream.
//!
//! Opens a websocket via `apps.connections.open` and forwards message events
//! into an mpsc channel from a background task. Every envelope is acked
//! before forwarding; non-message envelopes are dropped. The task reconnects
//! when Slack closes the socket (it does so routinely) and exits when the
//! receiver side is dropped.

use anyhow::{bail, Context, Result};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use crate::archive::types::Timestamp;
use crate::slack::MessageEvent;

const EVENT_BUFFER: usize = 256;

#[derive(Debug, Deserialize)]
struct SocketEnvelope {
    #[serde(rename = "type")]
    kind: String,
    envelope_id: Option<String>,
    payload: Option<EventPayload>,
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    event: Option<WireEvent>,
}

#[derive(Debug, Deserialize)]
struct WireEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    user: String,
    #[serde(default)]
    channel: String,
    #[serde(default)]
    ts: String,
    #[serde(default)]
    text: String,
}

/// Open the Socket Mode connection and return the live event stream.
///
/// The background task owns the connection for the life of the process.
pub async fn connect(app_token: String) -> Result<mpsc::Receiver<MessageEvent>> {
    if app_token.is_empty() {
        bail!("slack app token is not configured");
    }

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    tokio::spawn(async move {
        loop {
            match run_connection(&app_token, &tx).await {
                Ok(()) => tracing::info!("socket mode connection closed, reconnecting"),
                Err(err) => {
                    tracing::error!(error = %format!("{err:#}"), "socket mode connection failed")
                }
            }
            if tx.is_closed() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_secs(3)).await;
        }
    });
    Ok(rx)
}

async fn open_socket_url(app_token: &str) -> Result<String> {
    #[derive(Debug, Deserialize)]
    struct OpenResponse {
        ok: bool,
        error: Option<String>,
        url: Option<String>,
    }

    let response: OpenResponse = reqwest::Client::new()
        .post("https://slack.com/api/apps.connections.open")
        .bearer_auth(app_token)
        .send()
        .await
        .context("apps.connections.open request failed")?
        .json()
        .await
        .context("invalid apps.connections.open response")?;

    if !response.ok {
        bail!(
            "apps.connections.open returned error: {}",
            response.error.as_deref().unwrap_or("unknown")
        );
    }
    response
        .url
        .context("apps.connections.open returned no url")
}

/// One websocket session: connect, ack, forward. Returns Ok when the server
/// closes the socket or asks for a reconnect.
async fn run_connection(app_token: &str, tx: &mpsc::Sender<MessageEvent>) -> Result<()> {
    let url = open_socket_url(app_token).await?;
    let (ws, _) = connect_async(url.as_str()).await.context("websocket connect failed")?;
    let (mut sink, mut stream) = ws.split();
    tracing::info!("socket mode connected");

    while let Some(frame) = stream.next().await {
        let frame = frame.context("websocket read failed")?;
        let text = match frame {
            WsMessage::Text(text) => text,
            WsMessage::Ping(data) => {
                sink.send(WsMessage::Pong(data)).await.ok();
                continue;
            }
            WsMessage::Close(_) => break,
            _ => continue,
        };

        let envelope: SocketEnvelope = match serde_json::from_str(text.as_str()) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::debug!(error = %err, "unparseable socket frame");
                continue;
            }
        };

        // Ack first; Slack redelivers unacked envelopes
        if let Some(envelope_id) = &envelope.envelope_id {
            let ack = json!({ "envelope_id": envelope_id }).to_string();
            sink.send(WsMessage::Text(ack.into()))
                .await
                .context("websocket ack failed")?;
        }

        match envelope.kind.as_str() {
            "events_api" => {
                let Some(event) = envelope.payload.and_then(|p| p.event) else {
                    continue;
                };
                // Plain channel messages only; joins, edits, and other
                // subtyped events are not archived
                if event.kind != "message" || event.subtype.is_some() {
                    continue;
                }
                let forwarded = tx
                    .send(MessageEvent {
                        sender: event.user,
                        channel: event.channel,
                        send_time: Timestamp::new(event.ts),
                        text: event.text,
                    })
                    .await;
                if forwarded.is_err() {
                    // Receiver dropped: shutdown
                    return Ok(());
                }
            }
            "disconnect" => {
                tracing::info!("server requested reconnect");
                break;
            }
            _ => {}
        }
    }
    Ok(())
}
