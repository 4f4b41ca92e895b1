//! Welcome composition and delivery.

use crate::event::{ChannelId, JoinEvent};
use crate::session::ChatSession;

/// Outcome of one welcome attempt, returned to the caller instead of being
/// signalled through an error path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Welcome delivered to the event's channel.
    Sent,
    /// Event belongs to a different channel than the resolved one; nothing
    /// was sent and nothing is wrong.
    Suppressed,
    /// The session refused the send. Local and non-fatal.
    Failed,
}

/// Replaces every literal `{user}` in the template with a mention of the
/// actor. No other templating syntax is honored; a token-free template is
/// returned verbatim.
pub fn render_template(template: &str, user_id: &str) -> String {
    template.replace("{user}", &format!("<@{user_id}>"))
}

/// Sends the welcome for one join event, gated on the event's channel id
/// matching the resolved one. At most one message is sent per event.
pub async fn compose_and_send<S>(
    session: &mut S,
    join: &JoinEvent,
    resolved: &ChannelId,
    template: &str,
) -> SendOutcome
where
    S: ChatSession + ?Sized,
{
    if join.channel_id != *resolved {
        return SendOutcome::Suppressed;
    }

    let text = render_template(template, &join.user_id);
    match session.send(&join.channel_id, &text).await {
        Ok(()) => SendOutcome::Sent,
        Err(error) => {
            tracing::error!(%error, channel = %join.channel_id, "couldn't send welcome");
            SendOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::{compose_and_send, render_template, SendOutcome};
    use crate::error::{SendError, TransportError};
    use crate::event::{ChannelId, JoinEvent};
    use crate::session::{ChatSession, DirectoryEntry};

    struct RecordingSession {
        sent: Vec<(String, String)>,
        fail_sends: bool,
    }

    #[async_trait]
    impl ChatSession for RecordingSession {
        async fn connect(&mut self) -> Result<(), TransportError> {
            Ok(())
        }

        async fn read(&mut self) -> Result<Vec<Value>, TransportError> {
            Ok(Vec::new())
        }

        async fn send(&mut self, channel: &ChannelId, text: &str) -> Result<(), SendError> {
            if self.fail_sends {
                return Err(SendError::NotConnected);
            }
            self.sent.push((channel.as_str().to_string(), text.to_string()));
            Ok(())
        }

        async fn list_channels(&mut self) -> Result<Vec<DirectoryEntry>, TransportError> {
            Ok(Vec::new())
        }

        async fn list_groups(&mut self) -> Result<Vec<DirectoryEntry>, TransportError> {
            Ok(Vec::new())
        }
    }

    fn join_in(channel: &str) -> JoinEvent {
        JoinEvent {
            channel_id: ChannelId::new(channel),
            user_id: "U1".to_string(),
            display_name: Some("pat".to_string()),
            raw: json!({"subtype": "channel_join", "user": "U1", "channel": channel}),
        }
    }

    #[test]
    fn unit_render_template_replaces_every_token_occurrence() {
        assert_eq!(
            render_template("Welcome, {user}! :wave:", "U1"),
            "Welcome, <@U1>! :wave:"
        );
        assert_eq!(render_template("{user} {user}", "U2"), "<@U2> <@U2>");
    }

    #[test]
    fn unit_render_template_passes_tokenless_templates_through() {
        assert_eq!(render_template("Hello there.", "U1"), "Hello there.");
        assert_eq!(render_template("", "U1"), "");
    }

    #[test]
    fn regression_render_template_ignores_other_braced_tokens() {
        assert_eq!(render_template("{channel} {user}", "U1"), "{channel} <@U1>");
    }

    #[tokio::test]
    async fn unit_compose_and_send_sends_to_the_event_channel() {
        let mut session = RecordingSession {
            sent: Vec::new(),
            fail_sends: false,
        };
        let outcome = compose_and_send(
            &mut session,
            &join_in("C1"),
            &ChannelId::new("C1"),
            "Welcome, {user}! :wave:",
        )
        .await;
        assert_eq!(outcome, SendOutcome::Sent);
        assert_eq!(
            session.sent,
            vec![("C1".to_string(), "Welcome, <@U1>! :wave:".to_string())]
        );
    }

    #[tokio::test]
    async fn unit_compose_and_send_suppresses_mismatched_channels() {
        let mut session = RecordingSession {
            sent: Vec::new(),
            fail_sends: false,
        };
        let outcome =
            compose_and_send(&mut session, &join_in("C2"), &ChannelId::new("C1"), "{user}").await;
        assert_eq!(outcome, SendOutcome::Suppressed);
        assert!(session.sent.is_empty());
    }

    #[tokio::test]
    async fn unit_compose_and_send_reports_send_failure_as_local_outcome() {
        let mut session = RecordingSession {
            sent: Vec::new(),
            fail_sends: true,
        };
        let outcome =
            compose_and_send(&mut session, &join_in("C1"), &ChannelId::new("C1"), "{user}").await;
        assert_eq!(outcome, SendOutcome::Failed);
    }
}
