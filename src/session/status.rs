use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Call lifecycle of a lesson. Only ever moves forward:
/// `Inactive → Connecting → Active → Finished`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    #[default]
    Inactive,
    Connecting,
    Active,
    Finished,
}

impl CallStatus {
    pub fn is_terminal(self) -> bool {
        self == CallStatus::Finished
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CallStatus::Inactive => "inactive",
            CallStatus::Connecting => "connecting",
            CallStatus::Active => "active",
            CallStatus::Finished => "finished",
        };
        f.write_str(label)
    }
}

/// What moved a lesson into `Finished`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The learner ended the lesson
    UserEnded,
    /// The channel reported `call-end`
    RemoteHangup,
    /// No `call-end` followed a channel error within the watchdog window
    ErrorWatchdog,
    /// The start command was rejected
    StartFailed,
    /// The channel's event stream closed
    Disconnected,
}

/// Observable state of a lesson, published on every change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Current call status
    pub status: CallStatus,

    /// Whether the assistant's speech is playing
    pub is_speaking: bool,

    /// Whether the learner's microphone is suppressed
    pub is_muted: bool,

    /// Number of finalized transcript turns
    pub transcript_turns: usize,

    /// When the lesson started connecting
    pub started_at: Option<DateTime<Utc>>,

    /// When the lesson entered `Finished`
    pub ended_at: Option<DateTime<Utc>>,

    pub end_reason: Option<FinishReason>,
}
