use super::backend::{ChannelFactory, VoiceChannel};
use super::hub::{EventHub, Subscription};
use super::messages::{ChannelCommand, ChannelEvent, StartOverrides};
use crate::assistant::AssistantConfig;
use anyhow::{Context, Result};
use async_nats::Client;
use futures::stream::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

/// Subject the voice gateway listens on for a lesson's commands
pub fn command_subject(lesson_id: &str) -> String {
    format!("voice.command.{}", lesson_id)
}

/// Subject the voice gateway publishes a lesson's events on
pub fn event_subject(lesson_id: &str) -> String {
    format!("voice.event.{}", lesson_id)
}

/// Voice channel relayed through a gateway over NATS
pub struct NatsVoiceChannel {
    client: Client,
    lesson_id: String,
    hub: Arc<EventHub>,
    muted: AtomicBool,
    event_task: JoinHandle<()>,
}

impl NatsVoiceChannel {
    /// Subscribe to the lesson's event subject and start relaying events
    pub async fn connect(client: Client, lesson_id: String) -> Result<Self> {
        let subject = event_subject(&lesson_id);

        info!("Subscribing to voice events on {}", subject);

        let mut subscriber = client
            .subscribe(subject.clone())
            .await
            .context("Failed to subscribe to voice events")?;

        let hub = Arc::new(EventHub::new());
        let relay_hub = Arc::clone(&hub);

        let event_task = tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                match serde_json::from_slice::<ChannelEvent>(&msg.payload) {
                    Ok(event) => {
                        relay_hub.emit(event);
                    }
                    Err(e) => {
                        warn!("Failed to parse voice event on {}: {}", subject, e);
                    }
                }
            }

            info!("Voice event relay for {} stopped", subject);
            relay_hub.close();
        });

        Ok(Self {
            client,
            lesson_id,
            hub,
            muted: AtomicBool::new(false),
            event_task,
        })
    }

    async fn send(&self, command: &ChannelCommand) -> Result<()> {
        let subject = command_subject(&self.lesson_id);
        let payload = serde_json::to_vec(command)?;

        self.client
            .publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish voice command")?;

        info!("Published {} command to {}", command_name(command), subject);

        Ok(())
    }
}

fn command_name(command: &ChannelCommand) -> &'static str {
    match command {
        ChannelCommand::Start { .. } => "start",
        ChannelCommand::Stop => "stop",
        ChannelCommand::SetMuted { .. } => "set-muted",
    }
}

#[async_trait::async_trait]
impl VoiceChannel for NatsVoiceChannel {
    fn subscribe(&self) -> Subscription {
        self.hub.subscribe()
    }

    async fn start(&self, assistant: &AssistantConfig, overrides: &StartOverrides) -> Result<()> {
        self.send(&ChannelCommand::Start {
            assistant: assistant.clone(),
            overrides: overrides.clone(),
        })
        .await
    }

    async fn stop(&self) -> Result<()> {
        self.send(&ChannelCommand::Stop).await
    }

    async fn is_muted(&self) -> Result<bool> {
        Ok(self.muted.load(Ordering::SeqCst))
    }

    async fn set_muted(&self, muted: bool) -> Result<()> {
        self.send(&ChannelCommand::SetMuted { muted }).await?;
        self.muted.store(muted, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "nats"
    }
}

impl Drop for NatsVoiceChannel {
    fn drop(&mut self) {
        self.event_task.abort();
    }
}

/// Opens a [`NatsVoiceChannel`] per lesson on a shared connection
#[derive(Clone)]
pub struct NatsChannelFactory {
    client: Client,
}

impl NatsChannelFactory {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ChannelFactory for NatsChannelFactory {
    async fn open(&self, lesson_id: Uuid) -> Result<Arc<dyn VoiceChannel>> {
        let channel = NatsVoiceChannel::connect(self.client.clone(), lesson_id.to_string()).await?;
        Ok(Arc::new(channel))
    }
}
