pub mod assistant;
pub mod channel;
pub mod config;
pub mod http;
pub mod session;

pub use assistant::{build_assistant, AssistantConfig, AssistantConfigBuilder, VoiceTable};
pub use channel::{
    ChannelEvent, ChannelFactory, ChannelMessage, EventHub, NatsChannelFactory, NatsVoiceChannel,
    Subscription, VoiceChannel,
};
pub use config::Config;
pub use http::{create_router, AppState};
pub use session::{
    CallStatus, CompletionNotifier, NatsHistoryRecorder, SessionContext, SessionError,
    SessionOptions, SessionSnapshot, TranscriptEntry, TutorSession,
};
