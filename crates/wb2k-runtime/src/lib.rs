//! Core runtime for the wb2k welcome bot.
//!
//! Owns the connect/reconnect state machine, the one-time channel
//! resolution, join-event classification, and welcome delivery. The Slack
//! transport itself lives behind the [`session::ChatSession`] trait so the
//! run loop can be exercised against an in-memory session in tests.

pub mod backoff;
pub mod error;
pub mod event;
pub mod resolver;
pub mod runtime;
pub mod session;
pub mod slack;
pub mod welcome;

pub use backoff::{BackoffPolicy, CappedExponentialBackoff, RetryState};
pub use error::{FatalError, ResolutionError, SendError, TransportError};
pub use event::{classify, ChannelId, Classification, JoinEvent};
pub use resolver::resolve;
pub use runtime::{run_welcome_loop, RuntimeConfig};
pub use session::{ChatSession, DirectoryEntry};
pub use slack::SlackSession;
pub use welcome::{compose_and_send, render_template, SendOutcome};
