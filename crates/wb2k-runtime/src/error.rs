//! Error types for the welcome-bot runtime.

use thiserror::Error;

/// Failure while resolving a channel name to its identifier.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("couldn't find #{channel}")]
    NotFound { channel: String },
    #[error("couldn't enumerate channels/groups")]
    Unavailable,
}

/// Failure on the underlying transport. Recoverable through the reconnect
/// state machine until the retry budget runs out.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("slack api call failed: {0}")]
    Api(String),
    #[error("connection closed")]
    Closed,
}

/// Failure to deliver one outbound welcome. Local and non-fatal; never
/// consumes retry budget.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("session is not connected")]
    NotConnected,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors that terminate the process with a single formatted fatal line.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("couldn't connect to Slack: {0}")]
    InitialConnect(#[source] TransportError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error("too many failed reconnect attempts, shutting down (gave up after {attempts})")]
    RetryExhausted { attempts: u32 },
}
