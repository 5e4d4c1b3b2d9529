//! Voice channel boundary
//!
//! The voice channel is the real-time connection to the AI voice provider.
//! It accepts start/stop/mute commands and emits lifecycle and content
//! events asynchronously. Listeners are registered through scoped
//! [`Subscription`]s so a torn-down lesson never sees stale events.

mod backend;
mod hub;
pub mod messages;
mod nats;

pub use backend::{ChannelFactory, VoiceChannel};
pub use hub::{EventHub, Subscription};
pub use messages::{
    ChannelCommand, ChannelEvent, ChannelFault, ChannelMessage, StartOverrides, TranscriptType,
    VariableValues,
};
pub use nats::{command_subject, event_subject, NatsChannelFactory, NatsVoiceChannel};
