//! Connection manager: the connect/reconnect state machine and read loop.

use std::time::Duration;

use crate::backoff::{BackoffPolicy, RetryState};
use crate::error::FatalError;
use crate::event::{classify, ChannelId, Classification};
use crate::resolver::resolve;
use crate::session::ChatSession;
use crate::welcome::{compose_and_send, SendOutcome};

/// Read-only runtime configuration, fixed at startup.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Human-readable channel name to welcome users to.
    pub channel: String,
    /// Welcome template; `{user}` becomes a mention of the joining user.
    pub message: String,
    /// Consecutive failed reconnect attempts tolerated before giving up.
    pub max_retries: u32,
    /// Pause between successive drains of the event buffer while connected.
    /// Independent of the backoff interval.
    pub poll_interval: Duration,
}

impl RuntimeConfig {
    pub fn new(channel: impl Into<String>, message: impl Into<String>, max_retries: u32) -> Self {
        Self {
            channel: channel.into(),
            message: message.into(),
            max_retries,
            poll_interval: Duration::from_millis(500),
        }
    }
}

enum ConnectionState {
    Connected,
    Reconnecting,
}

/// Runs the welcome bot until the retry budget is exhausted.
///
/// Connects once (failure here is fatal), resolves the configured channel
/// exactly once, then alternates between draining buffered events and the
/// idle-poll sleep. A transport error on read enters the reconnect state;
/// each failed reconnect burns one unit of retry budget and suspends for the
/// backoff interval. Any successful reconnect or clean read cycle resets the
/// budget. Send failures never touch it.
pub async fn run_welcome_loop<S>(
    session: &mut S,
    config: &RuntimeConfig,
    backoff: &dyn BackoffPolicy,
) -> Result<(), FatalError>
where
    S: ChatSession + ?Sized,
{
    session.connect().await.map_err(FatalError::InitialConnect)?;
    tracing::info!("connected to Slack");

    let channel_id = resolve(&config.channel, session).await?;
    tracing::debug!(channel = %config.channel, id = %channel_id, "resolved channel id");
    tracing::info!(channel = %config.channel, "listening for joins");

    let mut retry = RetryState::new(config.max_retries);
    let mut state = ConnectionState::Connected;

    loop {
        match state {
            ConnectionState::Connected => match session.read().await {
                Ok(events) => {
                    for raw in events {
                        handle_event(session, &raw, &channel_id, config).await;
                    }
                    retry.reset();
                    tokio::time::sleep(config.poll_interval).await;
                }
                Err(error) => {
                    tracing::error!(%error, "lost connection to Slack, reconnecting");
                    state = ConnectionState::Reconnecting;
                }
            },
            ConnectionState::Reconnecting => match session.connect().await {
                Ok(()) => {
                    tracing::info!("reconnected to Slack");
                    retry.reset();
                    state = ConnectionState::Connected;
                }
                Err(error) => {
                    tracing::error!(%error, attempt = retry.attempts() + 1, "failed to reconnect to Slack");
                    if !retry.record_failure() {
                        return Err(FatalError::RetryExhausted {
                            attempts: retry.attempts(),
                        });
                    }
                    tokio::time::sleep(backoff.delay(retry.attempts())).await;
                }
            },
        }
    }
}

async fn handle_event<S>(
    session: &mut S,
    raw: &serde_json::Value,
    channel_id: &ChannelId,
    config: &RuntimeConfig,
) where
    S: ChatSession + ?Sized,
{
    match classify(raw) {
        Classification::Join(join) => {
            let who = join.display_name.as_deref().unwrap_or(&join.user_id);
            match compose_and_send(session, &join, channel_id, &config.message).await {
                SendOutcome::Sent => {
                    tracing::info!(user = who, channel = %config.channel, "welcomed user");
                }
                SendOutcome::Suppressed => {
                    tracing::debug!(
                        user = who,
                        event_channel = %join.channel_id,
                        "join in another channel, suppressed"
                    );
                }
                SendOutcome::Failed => {
                    tracing::error!(user = who, channel = %config.channel, "welcome not delivered");
                }
            }
        }
        Classification::Ignored => {
            tracing::trace!(payload = %raw, "ignored event");
        }
    }
}
