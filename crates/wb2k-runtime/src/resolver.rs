//! One-time channel name resolution.

use crate::error::ResolutionError;
use crate::event::ChannelId;
use crate::session::ChatSession;

/// Resolves a channel name to its identifier by scanning the public-channel
/// listing, then the private-group listing. First exact match wins, channels
/// before groups. A listing that errors is treated the same as an empty one;
/// both empty means the session is degraded (`Unavailable`), as opposed to
/// an operator typo (`NotFound`). Callers cache the result for the process
/// lifetime; the directories are never re-polled.
pub async fn resolve<S>(name: &str, session: &mut S) -> Result<ChannelId, ResolutionError>
where
    S: ChatSession + ?Sized,
{
    let channels = session.list_channels().await.unwrap_or_else(|error| {
        tracing::warn!(%error, "public channel listing failed");
        Vec::new()
    });
    let groups = session.list_groups().await.unwrap_or_else(|error| {
        tracing::warn!(%error, "private group listing failed");
        Vec::new()
    });

    if channels.is_empty() && groups.is_empty() {
        return Err(ResolutionError::Unavailable);
    }

    channels
        .into_iter()
        .chain(groups)
        .find(|entry| entry.name == name)
        .map(|entry| ChannelId::new(entry.id))
        .ok_or_else(|| ResolutionError::NotFound {
            channel: name.to_string(),
        })
}
