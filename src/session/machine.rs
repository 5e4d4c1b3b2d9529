use super::error::SessionError;
use super::status::{CallStatus, FinishReason, SessionSnapshot};
use super::transcript::{TranscriptAccumulator, TranscriptEntry};
use crate::channel::ChannelEvent;
use chrono::{DateTime, Utc};

/// Result of applying a channel event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// State is unchanged
    Ignored,
    /// State changed
    Updated,
}

/// Transition core of a lesson: call status, speaking and mute flags, and
/// the transcript.
///
/// Status only moves forward. `Finished` is terminal and is entered through
/// [`finish`](Self::finish) alone, which queues the completion side effect
/// exactly once; callers drain it with
/// [`take_completion`](Self::take_completion).
#[derive(Debug, Default)]
pub struct SessionStateMachine {
    status: CallStatus,
    is_speaking: bool,
    is_muted: bool,
    transcript: TranscriptAccumulator,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    end_reason: Option<FinishReason>,
    completion_pending: bool,
}

impl SessionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> CallStatus {
        self.status
    }

    pub fn is_speaking(&self) -> bool {
        self.is_speaking
    }

    pub fn is_muted(&self) -> bool {
        self.is_muted
    }

    pub fn transcript(&self) -> &TranscriptAccumulator {
        &self.transcript
    }

    pub fn end_reason(&self) -> Option<FinishReason> {
        self.end_reason
    }

    /// `Inactive → Connecting`
    pub fn begin_connecting(&mut self) -> Result<(), SessionError> {
        if self.status != CallStatus::Inactive {
            return Err(SessionError::InvalidState {
                action: "start",
                status: self.status,
            });
        }

        self.status = CallStatus::Connecting;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Apply an inbound channel event
    pub fn apply(&mut self, event: &ChannelEvent) -> Applied {
        match event {
            ChannelEvent::CallStart => {
                if self.status != CallStatus::Connecting {
                    return Applied::Ignored;
                }
                self.status = CallStatus::Active;
                Applied::Updated
            }
            ChannelEvent::CallEnd => {
                if self.finish(FinishReason::RemoteHangup) {
                    Applied::Updated
                } else {
                    Applied::Ignored
                }
            }
            ChannelEvent::SpeechStart => self.set_speaking(true),
            ChannelEvent::SpeechEnd => self.set_speaking(false),
            ChannelEvent::Message(message) => match message.final_transcript() {
                Some(entry) => {
                    self.append(entry);
                    Applied::Updated
                }
                None => Applied::Ignored,
            },
            // Fatal errors are followed by call-end from the channel itself
            ChannelEvent::Error(_) => Applied::Ignored,
        }
    }

    /// Enter `Finished`. Returns `false` if the lesson had already finished.
    pub fn finish(&mut self, reason: FinishReason) -> bool {
        if self.status.is_terminal() {
            return false;
        }

        self.status = CallStatus::Finished;
        self.ended_at = Some(Utc::now());
        self.end_reason = Some(reason);
        self.completion_pending = true;
        true
    }

    /// Whether the completion side effect is due. Returns `true` at most once
    /// per instance.
    pub fn take_completion(&mut self) -> bool {
        std::mem::take(&mut self.completion_pending)
    }

    pub fn can_toggle_microphone(&self) -> bool {
        self.status == CallStatus::Active
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.is_muted = muted;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            is_speaking: self.is_speaking,
            is_muted: self.is_muted,
            transcript_turns: self.transcript.len(),
            started_at: self.started_at,
            ended_at: self.ended_at,
            end_reason: self.end_reason,
        }
    }

    fn set_speaking(&mut self, speaking: bool) -> Applied {
        if self.is_speaking == speaking {
            return Applied::Ignored;
        }
        self.is_speaking = speaking;
        Applied::Updated
    }

    fn append(&mut self, entry: TranscriptEntry) {
        self.transcript.append(entry);
    }
}
