//! Slack implementation of the session contract: Web API calls over HTTP
//! plus an RTM-style websocket for the inbound event stream.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{FutureExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::Message as WsMessage, MaybeTlsStream, WebSocketStream,
};

use crate::error::{SendError, TransportError};
use crate::event::ChannelId;
use crate::session::{ChatSession, DirectoryEntry};

const DEFAULT_API_BASE: &str = "https://slack.com/api";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

type EventSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Deserialize)]
struct RtmConnectResponse {
    ok: bool,
    url: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatPostMessageResponse {
    ok: bool,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConversationsListResponse {
    ok: bool,
    #[serde(default)]
    channels: Vec<DirectoryEntry>,
    error: Option<String>,
}

/// Thin client over the Slack Web API endpoints the bot needs.
struct SlackApiClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl SlackApiClient {
    fn new(api_base: String, token: String) -> Result<Self, TransportError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("wb2k"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.trim().to_string(),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, TransportError> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Api(format!(
                "slack returned status {status}"
            )));
        }
        Ok(response.json::<T>().await?)
    }

    /// Opens an RTM session and returns the websocket URL to connect to.
    async fn rtm_connect_url(&self) -> Result<String, TransportError> {
        let response: RtmConnectResponse = self
            .call(self.http.post(format!("{}/rtm.connect", self.api_base)))
            .await?;
        if !response.ok {
            return Err(TransportError::Api(format!(
                "rtm.connect failed: {}",
                response.error.unwrap_or_else(|| "unknown error".to_string())
            )));
        }
        response
            .url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| TransportError::Api("rtm.connect did not return a url".to_string()))
    }

    async fn post_message(&self, channel: &str, text: &str) -> Result<(), TransportError> {
        let payload = serde_json::json!({"channel": channel, "text": text});
        let response: ChatPostMessageResponse = self
            .call(
                self.http
                    .post(format!("{}/chat.postMessage", self.api_base))
                    .json(&payload),
            )
            .await?;
        if !response.ok {
            return Err(TransportError::Api(format!(
                "chat.postMessage failed: {}",
                response.error.unwrap_or_else(|| "unknown error".to_string())
            )));
        }
        Ok(())
    }

    async fn list_conversations(&self, types: &str) -> Result<Vec<DirectoryEntry>, TransportError> {
        let response: ConversationsListResponse = self
            .call(
                self.http
                    .get(format!("{}/conversations.list", self.api_base))
                    .query(&[("types", types), ("limit", "1000")]),
            )
            .await?;
        if !response.ok {
            return Err(TransportError::Api(format!(
                "conversations.list failed: {}",
                response.error.unwrap_or_else(|| "unknown error".to_string())
            )));
        }
        Ok(response.channels)
    }
}

/// Production session backed by the Slack Web API and an event websocket.
pub struct SlackSession {
    api: SlackApiClient,
    socket: Option<EventSocket>,
}

impl SlackSession {
    pub fn new(token: String) -> Result<Self, TransportError> {
        Self::with_api_base(DEFAULT_API_BASE.to_string(), token)
    }

    pub fn with_api_base(api_base: String, token: String) -> Result<Self, TransportError> {
        Ok(Self {
            api: SlackApiClient::new(api_base, token)?,
            socket: None,
        })
    }
}

fn decode_frame(frame: WsMessage) -> Option<Value> {
    let text = match frame {
        WsMessage::Text(text) => text.to_string(),
        WsMessage::Binary(bytes) => String::from_utf8(bytes.to_vec()).ok()?,
        _ => return None,
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::trace!(%error, "dropping unparseable event frame");
            None
        }
    }
}

#[async_trait]
impl ChatSession for SlackSession {
    async fn connect(&mut self) -> Result<(), TransportError> {
        self.socket = None;
        let url = self.api.rtm_connect_url().await?;
        let (socket, _response) = connect_async(url.as_str()).await?;
        self.socket = Some(socket);
        Ok(())
    }

    async fn read(&mut self) -> Result<Vec<Value>, TransportError> {
        let Some(mut socket) = self.socket.take() else {
            return Err(TransportError::Closed);
        };

        let mut events = Vec::new();
        // Poll each buffered frame at most once; the first pending poll ends
        // the drain so read never blocks waiting for new traffic. The socket
        // goes back only after a clean drain.
        while let Some(next) = socket.next().now_or_never() {
            match next {
                Some(Ok(WsMessage::Close(_))) | None => {
                    return Err(TransportError::Closed);
                }
                Some(Ok(frame)) => {
                    if let Some(value) = decode_frame(frame) {
                        events.push(value);
                    }
                }
                Some(Err(error)) => {
                    return Err(error.into());
                }
            }
        }
        self.socket = Some(socket);
        Ok(events)
    }

    async fn send(&mut self, channel: &ChannelId, text: &str) -> Result<(), SendError> {
        if self.socket.is_none() {
            return Err(SendError::NotConnected);
        }
        self.api
            .post_message(channel.as_str(), text)
            .await
            .map_err(SendError::Transport)
    }

    async fn list_channels(&mut self) -> Result<Vec<DirectoryEntry>, TransportError> {
        self.api.list_conversations("public_channel").await
    }

    async fn list_groups(&mut self) -> Result<Vec<DirectoryEntry>, TransportError> {
        self.api.list_conversations("private_channel").await
    }
}
