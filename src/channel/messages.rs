use crate::assistant::AssistantConfig;
use crate::session::{Role, TranscriptEntry};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Event emitted by the voice channel
///
/// Wire form: `{"event": "call-start"}`, `{"event": "message", "payload": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum ChannelEvent {
    CallStart,
    CallEnd,
    SpeechStart,
    SpeechEnd,
    Error(ChannelFault),
    Message(ChannelMessage),
}

/// Error reported by the voice provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelFault {
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ChannelFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }
}

impl fmt::Display for ChannelFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

/// Content message carried by a `message` event. Only transcripts are
/// interpreted; every other `type` decodes to `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ChannelMessage {
    #[serde(rename_all = "camelCase")]
    Transcript {
        role: Role,
        transcript_type: TranscriptType,
        transcript: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptType {
    Partial,
    Final,
}

impl ChannelMessage {
    /// The transcript turn carried by this message, if it is a finalized one.
    /// Interim transcripts yield `None`.
    pub fn final_transcript(&self) -> Option<TranscriptEntry> {
        match self {
            ChannelMessage::Transcript {
                role,
                transcript_type: TranscriptType::Final,
                transcript,
            } => Some(TranscriptEntry::new(*role, transcript.clone())),
            _ => None,
        }
    }
}

/// Prompt variable bindings interpolated by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableValues {
    pub subject: String,
    pub topic: String,
    pub style: String,
}

/// Per-call overrides sent alongside the assistant config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOverrides {
    pub variable_values: VariableValues,
    pub client_messages: Vec<String>,
    pub server_messages: Vec<String>,
}

/// Command sent to a remote voice gateway
///
/// Wire form: `{"command": "set-muted", "muted": true}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum ChannelCommand {
    Start {
        assistant: AssistantConfig,
        overrides: StartOverrides,
    },
    Stop,
    SetMuted {
        muted: bool,
    },
}
