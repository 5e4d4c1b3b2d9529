// Shared fakes for integration tests: a hand-driven voice channel and a
// notifier that counts history recordings.
#![allow(dead_code)]

use anyhow::{bail, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tutor_voice::assistant::AssistantConfig;
use tutor_voice::channel::{
    ChannelCommand, ChannelEvent, ChannelFactory, ChannelMessage, EventHub, StartOverrides,
    Subscription, TranscriptType, VoiceChannel,
};
use tutor_voice::session::{
    CompletionNotifier, Role, SessionContext, SessionSnapshot, TutorSession,
};
use uuid::Uuid;

pub fn test_context() -> SessionContext {
    SessionContext {
        companion_id: "companion-42".to_string(),
        subject: "maths".to_string(),
        topic: "derivatives".to_string(),
        style: "formal".to_string(),
        voice_id: "female".to_string(),
        user_display_name: "Ada".to_string(),
        user_avatar_url: None,
    }
}

pub fn final_transcript(role: Role, text: &str) -> ChannelEvent {
    ChannelEvent::Message(ChannelMessage::Transcript {
        role,
        transcript_type: TranscriptType::Final,
        transcript: text.to_string(),
    })
}

pub fn partial_transcript(role: Role, text: &str) -> ChannelEvent {
    ChannelEvent::Message(ChannelMessage::Transcript {
        role,
        transcript_type: TranscriptType::Partial,
        transcript: text.to_string(),
    })
}

/// Voice channel driven by hand: tests emit events, commands are recorded
#[derive(Default)]
pub struct FakeChannel {
    pub hub: EventHub,
    commands: Mutex<Vec<ChannelCommand>>,
    muted: AtomicBool,
    fail_start: bool,
    mute_delay: Option<Duration>,
}

impl FakeChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A channel whose start command fails
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_start: true,
            ..Self::default()
        })
    }

    /// A channel whose `set_muted` takes `delay` to complete
    pub fn slow_mute(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            mute_delay: Some(delay),
            ..Self::default()
        })
    }

    pub fn emit(&self, event: ChannelEvent) {
        self.hub.emit(event);
    }

    pub fn commands(&self) -> Vec<ChannelCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn stop_count(&self) -> usize {
        self.commands()
            .iter()
            .filter(|c| matches!(c, ChannelCommand::Stop))
            .count()
    }

    fn record(&self, command: ChannelCommand) {
        self.commands.lock().unwrap().push(command);
    }
}

#[async_trait::async_trait]
impl VoiceChannel for FakeChannel {
    fn subscribe(&self) -> Subscription {
        self.hub.subscribe()
    }

    async fn start(&self, assistant: &AssistantConfig, overrides: &StartOverrides) -> Result<()> {
        if self.fail_start {
            bail!("provider rejected the call");
        }
        self.record(ChannelCommand::Start {
            assistant: assistant.clone(),
            overrides: overrides.clone(),
        });
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.record(ChannelCommand::Stop);
        Ok(())
    }

    async fn is_muted(&self) -> Result<bool> {
        Ok(self.muted.load(Ordering::SeqCst))
    }

    async fn set_muted(&self, muted: bool) -> Result<()> {
        if let Some(delay) = self.mute_delay {
            tokio::time::sleep(delay).await;
        }
        self.record(ChannelCommand::SetMuted { muted });
        self.muted.store(muted, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Hands out [`FakeChannel`]s and keeps them for the test to drive
#[derive(Default)]
pub struct FakeChannelFactory {
    channels: Mutex<HashMap<Uuid, Arc<FakeChannel>>>,
    fail_start: bool,
}

impl FakeChannelFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_start: true,
            ..Self::default()
        })
    }

    pub fn channel(&self, lesson_id: &Uuid) -> Arc<FakeChannel> {
        Arc::clone(&self.channels.lock().unwrap()[lesson_id])
    }
}

#[async_trait::async_trait]
impl ChannelFactory for FakeChannelFactory {
    async fn open(&self, lesson_id: Uuid) -> Result<Arc<dyn VoiceChannel>> {
        let channel = if self.fail_start {
            FakeChannel::failing()
        } else {
            FakeChannel::new()
        };
        self.channels
            .lock()
            .unwrap()
            .insert(lesson_id, Arc::clone(&channel));
        Ok(channel)
    }
}

/// Counts history recordings; optionally fails each one
pub struct CountingNotifier {
    calls: AtomicUsize,
    fail: bool,
    tx: mpsc::UnboundedSender<String>,
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<String>>,
}

impl CountingNotifier {
    pub fn new() -> Arc<Self> {
        Self::build(false)
    }

    pub fn failing() -> Arc<Self> {
        Self::build(true)
    }

    fn build(fail: bool) -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail,
            tx,
            rx: tokio::sync::Mutex::new(rx),
        })
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Wait for the next recording and return its companion ID
    pub async fn next_call(&self) -> String {
        let mut rx = self.rx.lock().await;
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for session history")
            .expect("notifier channel closed")
    }
}

#[async_trait::async_trait]
impl CompletionNotifier for CountingNotifier {
    async fn record_session(&self, companion_id: &str, _lesson_id: Uuid) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _ = self.tx.send(companion_id.to_string());
        if self.fail {
            bail!("history service unavailable");
        }
        Ok(())
    }
}

/// Wait until the session's published state satisfies `pred`
pub async fn wait_for_state<F>(session: &TutorSession, pred: F) -> SessionSnapshot
where
    F: FnMut(&SessionSnapshot) -> bool,
{
    let mut rx = session.watch();
    let snapshot = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
        .await
        .expect("timed out waiting for session state")
        .expect("session state channel closed");
    snapshot.clone()
}
