use super::context::SessionContext;
use super::error::SessionError;
use super::machine::{Applied, SessionStateMachine};
use super::notifier::CompletionNotifier;
use super::status::{CallStatus, FinishReason, SessionSnapshot};
use super::transcript::TranscriptEntry;
use crate::assistant::AssistantConfigBuilder;
use crate::channel::{ChannelEvent, StartOverrides, Subscription, VoiceChannel};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Per-lesson controller options
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Builds the assistant config handed to the channel on start
    pub assistant: AssistantConfigBuilder,

    /// Client-side message types requested from the provider
    pub client_messages: Vec<String>,

    /// Finish the lesson if no `call-end` follows a channel error within
    /// this window. `None` waits on the channel indefinitely.
    pub error_watchdog: Option<Duration>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            assistant: AssistantConfigBuilder::default(),
            client_messages: vec!["transcript".to_string()],
            error_watchdog: None,
        }
    }
}

/// State shared between the controller and its event task
struct Shared {
    lesson_id: Uuid,
    context: SessionContext,
    channel: Arc<dyn VoiceChannel>,
    notifier: Arc<dyn CompletionNotifier>,
    machine: Mutex<SessionStateMachine>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl Shared {
    /// Publish the new state and run the completion side effect if the
    /// machine just entered `Finished`. Every mutation goes through here.
    fn commit(&self, machine: &mut SessionStateMachine) {
        self.snapshot_tx.send_replace(machine.snapshot());

        if machine.take_completion() {
            info!(
                "Lesson {} finished ({:?})",
                self.lesson_id,
                machine.end_reason()
            );
            self.dispatch_completion();
        }
    }

    fn dispatch_completion(&self) {
        let notifier = Arc::clone(&self.notifier);
        let companion_id = self.context.companion_id.clone();
        let lesson_id = self.lesson_id;

        tokio::spawn(async move {
            if let Err(e) = notifier.record_session(&companion_id, lesson_id).await {
                error!("Failed to record session history for lesson {}: {:#}", lesson_id, e);
            }
        });
    }

    /// Enter `Finished`; returns whether this call caused the transition
    async fn finish(&self, reason: FinishReason) -> bool {
        let mut machine = self.machine.lock().await;
        let entered = machine.finish(reason);
        self.commit(&mut machine);
        entered
    }

    async fn stop_channel(&self) {
        if let Err(e) = self.channel.stop().await {
            error!("Failed to stop voice channel for lesson {}: {:#}", self.lesson_id, e);
        }
    }

    async fn handle(&self, event: ChannelEvent) {
        if let ChannelEvent::Error(fault) = &event {
            error!("Voice channel error in lesson {}: {}", self.lesson_id, fault);
        }

        let mut machine = self.machine.lock().await;
        match machine.apply(&event) {
            Applied::Updated => self.commit(&mut machine),
            Applied::Ignored => {
                debug!(
                    "Ignored {:?} in lesson {} ({})",
                    event,
                    self.lesson_id,
                    machine.status()
                );
            }
        }
    }
}

/// Controller for one voice lesson with an AI tutor.
///
/// Owns the call status, speaking/mute flags and transcript; only its own
/// event task mutates them in response to channel events. A lesson runs
/// `Inactive → Connecting → Active → Finished` once; a new lesson needs a
/// new instance.
pub struct TutorSession {
    shared: Arc<Shared>,
    options: SessionOptions,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
    event_task: Mutex<Option<JoinHandle<()>>>,
}

impl TutorSession {
    pub fn new(
        context: SessionContext,
        channel: Arc<dyn VoiceChannel>,
        notifier: Arc<dyn CompletionNotifier>,
        options: SessionOptions,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), context, channel, notifier, options)
    }

    pub fn with_id(
        lesson_id: Uuid,
        context: SessionContext,
        channel: Arc<dyn VoiceChannel>,
        notifier: Arc<dyn CompletionNotifier>,
        options: SessionOptions,
    ) -> Self {
        info!(
            "Creating lesson {} with companion {} on {} channel",
            lesson_id,
            context.companion_id,
            channel.name()
        );

        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::default());

        Self {
            shared: Arc::new(Shared {
                lesson_id,
                context,
                channel,
                notifier,
                machine: Mutex::new(SessionStateMachine::new()),
                snapshot_tx,
            }),
            options,
            snapshot_rx,
            event_task: Mutex::new(None),
        }
    }

    pub fn lesson_id(&self) -> Uuid {
        self.shared.lesson_id
    }

    pub fn context(&self) -> &SessionContext {
        &self.shared.context
    }

    /// Start the lesson.
    ///
    /// Returns once the start command is issued; the lesson becomes `Active`
    /// later, when the channel reports `call-start`.
    pub async fn start(&self) -> Result<(), SessionError> {
        {
            let mut machine = self.shared.machine.lock().await;
            machine.begin_connecting()?;
            self.shared.commit(&mut machine);
        }

        let context = &self.shared.context;
        info!(
            "Starting lesson {}: {} / {} ({} {})",
            self.shared.lesson_id, context.subject, context.topic, context.voice_id, context.style
        );

        let assistant = self.options.assistant.build(&context.voice_id, &context.style);
        let overrides = StartOverrides {
            variable_values: context.variable_values(),
            client_messages: self.options.client_messages.clone(),
            server_messages: Vec::new(),
        };

        // Listen before the start command so no early event is missed
        let subscription = self.shared.channel.subscribe();
        let event_task = tokio::spawn(run_events(
            Arc::clone(&self.shared),
            subscription,
            self.options.error_watchdog,
        ));
        {
            let mut handle = self.event_task.lock().await;
            *handle = Some(event_task);
        }

        if let Err(e) = self.shared.channel.start(&assistant, &overrides).await {
            error!("Failed to start lesson {}: {:#}", self.shared.lesson_id, e);
            self.shared.finish(FinishReason::StartFailed).await;
            return Err(SessionError::Channel(e));
        }

        Ok(())
    }

    /// End the lesson from the learner's side. No-op once finished.
    pub async fn end(&self) {
        let previous = {
            let mut machine = self.shared.machine.lock().await;
            let previous = machine.status();
            if !machine.finish(FinishReason::UserEnded) {
                debug!("Lesson {} already finished", self.shared.lesson_id);
                return;
            }
            self.shared.commit(&mut machine);
            previous
        };

        if matches!(previous, CallStatus::Connecting | CallStatus::Active) {
            self.shared.stop_channel().await;
        }
    }

    /// Flip the microphone mute state. Only meaningful while `Active`;
    /// otherwise a no-op returning the current state.
    ///
    /// Channel calls run without the state lock held, so events keep being
    /// applied while the mute command is in flight.
    pub async fn toggle_microphone(&self) -> Result<bool, SessionError> {
        if let Some(current) = self.toggle_refused().await {
            return Ok(current);
        }

        let muted = !self.shared.channel.is_muted().await?;

        // The call may have ended while the channel was queried
        if let Some(current) = self.toggle_refused().await {
            return Ok(current);
        }

        self.shared.channel.set_muted(muted).await?;

        {
            let mut machine = self.shared.machine.lock().await;
            machine.set_muted(muted);
            self.shared.commit(&mut machine);
        }

        info!(
            "Microphone {} in lesson {}",
            if muted { "muted" } else { "unmuted" },
            self.shared.lesson_id
        );

        Ok(muted)
    }

    /// `Some(current mute state)` when the microphone cannot be toggled now
    async fn toggle_refused(&self) -> Option<bool> {
        let machine = self.shared.machine.lock().await;
        if machine.can_toggle_microphone() {
            return None;
        }

        debug!(
            "Ignoring microphone toggle in lesson {} ({})",
            self.shared.lesson_id,
            machine.status()
        );
        Some(machine.is_muted())
    }

    /// Current state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn status(&self) -> CallStatus {
        self.snapshot_rx.borrow().status
    }

    /// Receiver notified on every state change
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Transcript, most recent turn first
    pub async fn transcript(&self) -> Vec<TranscriptEntry> {
        let machine = self.shared.machine.lock().await;
        machine.transcript().to_display_list()
    }

    /// Tear down: release the channel listener and stop handling events.
    /// Once this returns, no event handler of this instance runs again.
    pub async fn dispose(&self) {
        let task = {
            let mut handle = self.event_task.lock().await;
            handle.take()
        };

        if let Some(task) = task {
            task.abort();
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    error!("Event task for lesson {} panicked: {}", self.shared.lesson_id, e);
                }
            }
        }

        info!("Disposed lesson {}", self.shared.lesson_id);
    }
}

impl Drop for TutorSession {
    fn drop(&mut self) {
        if let Some(task) = self.event_task.get_mut().take() {
            task.abort();
        }
    }
}

/// Apply channel events in receipt order until the subscription closes
async fn run_events(shared: Arc<Shared>, mut subscription: Subscription, watchdog: Option<Duration>) {
    let mut deadline: Option<Instant> = None;

    loop {
        let next = match deadline {
            Some(at) => {
                tokio::select! {
                    event = subscription.next() => event,
                    _ = tokio::time::sleep_until(at) => {
                        warn!(
                            "No call-end after channel error in lesson {}, finishing",
                            shared.lesson_id
                        );
                        deadline = None;
                        if shared.finish(FinishReason::ErrorWatchdog).await {
                            shared.stop_channel().await;
                        }
                        continue;
                    }
                }
            }
            None => subscription.next().await,
        };

        let Some(event) = next else {
            if shared.finish(FinishReason::Disconnected).await {
                warn!("Voice channel closed before lesson {} ended", shared.lesson_id);
            }
            break;
        };

        // Armed by the first error, disarmed by any other event
        deadline = match (&event, watchdog) {
            (ChannelEvent::Error(_), Some(after)) => deadline.or(Some(Instant::now() + after)),
            _ => None,
        };

        shared.handle(event).await;
    }

    debug!("Event task for lesson {} stopped", shared.lesson_id);
}
