use super::hub::Subscription;
use super::messages::StartOverrides;
use crate::assistant::AssistantConfig;
use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

/// Bidirectional real-time voice connection to the AI voice provider
///
/// Implementations:
/// - NATS: commands and events relayed through a voice gateway
/// - Fakes in tests, driven by hand through an [`EventHub`](super::EventHub)
///
/// Commands are fire-and-forget: a successful return means the command was
/// issued, not that the provider acted on it. Outcomes arrive as events.
#[async_trait::async_trait]
pub trait VoiceChannel: Send + Sync {
    /// Register an event listener for the lifetime of the returned handle
    fn subscribe(&self) -> Subscription;

    /// Begin a call with the given assistant
    async fn start(&self, assistant: &AssistantConfig, overrides: &StartOverrides) -> Result<()>;

    /// Hang up
    async fn stop(&self) -> Result<()>;

    /// Current microphone mute state
    async fn is_muted(&self) -> Result<bool>;

    /// Mute or unmute the microphone
    async fn set_muted(&self, muted: bool) -> Result<()>;

    /// Channel name for logging
    fn name(&self) -> &str;
}

/// Opens one voice channel per lesson
#[async_trait::async_trait]
pub trait ChannelFactory: Send + Sync {
    async fn open(&self, lesson_id: Uuid) -> Result<Arc<dyn VoiceChannel>>;
}
