//! Voice lesson lifecycle
//!
//! This module provides the `TutorSession` controller that manages:
//! - Call status transitions (`Inactive → Connecting → Active → Finished`)
//! - Speaking and microphone mute flags
//! - Finalized transcript turns from the channel's event stream
//! - Exactly-once session history recording when the lesson finishes

mod context;
mod error;
mod machine;
mod notifier;
mod session;
mod status;
mod transcript;

pub use context::SessionContext;
pub use error::SessionError;
pub use machine::{Applied, SessionStateMachine};
pub use notifier::{CompletionNotifier, HistoryRecord, NatsHistoryRecorder};
pub use session::{SessionOptions, TutorSession};
pub use status::{CallStatus, FinishReason, SessionSnapshot};
pub use transcript::{Role, TranscriptAccumulator, TranscriptEntry};
