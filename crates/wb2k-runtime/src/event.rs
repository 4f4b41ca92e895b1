//! Inbound event classification.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

/// Resolved stable identifier for a channel or group, distinct from its
/// human-readable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A join event qualified for welcoming. Carries the event's own channel id
/// rather than the configured one; the welcome handler applies the gate.
#[derive(Debug, Clone)]
pub struct JoinEvent {
    pub channel_id: ChannelId,
    pub user_id: String,
    pub display_name: Option<String>,
    pub raw: Value,
}

#[derive(Debug)]
pub enum Classification {
    Join(JoinEvent),
    Ignored,
}

const JOIN_SUBTYPES: &[&str] = &["channel_join", "group_join"];

#[derive(Debug, Deserialize)]
struct EventFields {
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    user_profile: Option<UserProfile>,
}

#[derive(Debug, Deserialize)]
struct UserProfile {
    #[serde(default)]
    display_name: Option<String>,
}

/// Classifies one raw event. `Join` requires a recognized join subtype and a
/// non-empty actor id; everything else is `Ignored`. Extra fields on the
/// payload never affect the outcome.
///
/// A join without a `channel` field is also `Ignored`: the JoinEvent exists
/// to be matched against the resolved channel id and replied into, and a
/// channel-less join can do neither. This is deliberately stricter than the
/// subtype-and-actor rule alone.
pub fn classify(raw: &Value) -> Classification {
    let Ok(fields) = serde_json::from_value::<EventFields>(raw.clone()) else {
        return Classification::Ignored;
    };

    let is_join = fields
        .subtype
        .as_deref()
        .is_some_and(|subtype| JOIN_SUBTYPES.contains(&subtype));
    if !is_join {
        return Classification::Ignored;
    }

    let Some(user_id) = fields.user.filter(|user| !user.trim().is_empty()) else {
        return Classification::Ignored;
    };
    let Some(channel) = fields.channel.filter(|channel| !channel.trim().is_empty()) else {
        return Classification::Ignored;
    };

    Classification::Join(JoinEvent {
        channel_id: ChannelId::new(channel),
        user_id,
        display_name: fields
            .user_profile
            .and_then(|profile| profile.display_name)
            .filter(|name| !name.trim().is_empty()),
        raw: raw.clone(),
    })
}
