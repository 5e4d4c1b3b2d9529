//! Assistant configuration
//!
//! Produces the immutable configuration handed to the voice channel at
//! lesson start: transcription, speech-synthesis and language-model
//! parameters, with the synthesized voice resolved from a category/style
//! table.

mod config;
mod voices;

pub use config::{
    build_assistant, AssistantConfig, AssistantConfigBuilder, ModelConfig, PromptMessage,
    TranscriberConfig, VoiceConfig,
};
pub use voices::{VoiceTable, FALLBACK_VOICE_ID};
