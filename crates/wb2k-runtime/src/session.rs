//! Transport-facing session contract consumed by the run loop.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{SendError, TransportError};
use crate::event::ChannelId;

/// One entry from a channel or group directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DirectoryEntry {
    pub id: String,
    pub name: String,
}

/// Long-lived messaging session: connect, drain buffered events, send, and
/// query the channel directories. One session per process; all calls take
/// `&mut self` because the design is single-threaded by construction.
#[async_trait]
pub trait ChatSession {
    /// Establishes (or re-establishes) the event stream.
    async fn connect(&mut self) -> Result<(), TransportError>;

    /// Drains the events currently buffered on the stream without blocking.
    /// An empty vec means nothing arrived since the last drain.
    async fn read(&mut self) -> Result<Vec<Value>, TransportError>;

    /// Posts a message to the given channel.
    async fn send(&mut self, channel: &ChannelId, text: &str) -> Result<(), SendError>;

    /// Lists public channels visible to the bot.
    async fn list_channels(&mut self) -> Result<Vec<DirectoryEntry>, TransportError>;

    /// Lists private groups visible to the bot.
    async fn list_groups(&mut self) -> Result<Vec<DirectoryEntry>, TransportError>;
}
