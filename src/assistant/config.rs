use super::voices::VoiceTable;
use serde::{Deserialize, Serialize};

const ASSISTANT_NAME: &str = "Companion";

/// Opening line; `{{topic}}` is interpolated by the voice provider
const FIRST_MESSAGE: &str =
    "Hello, let's start the session. Today we'll be talking about {{topic}}.";

const SYSTEM_PROMPT: &str = "You are a highly knowledgeable tutor teaching a real-time voice session with a student. Your goal is to teach the student about the topic and subject.

Tutor Guidelines:
Stick to the given topic - {{ topic }} and subject - {{ subject }} and teach the student about it.
Keep the conversation flowing smoothly while maintaining control.
From time to time make sure that the student is following you and understands you.
Break down the topic into smaller parts and teach the student one part at a time.
Keep your style of conversation {{ style }}.
Keep your responses short, like in a real voice conversation.
Do not include any special characters in your response - this is a voice conversation.";

/// Configuration handed to the voice channel when a lesson starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantConfig {
    pub name: String,
    pub first_message: String,
    pub transcriber: TranscriberConfig,
    pub voice: VoiceConfig,
    pub model: ModelConfig,
    pub client_messages: Vec<String>,
    pub server_messages: Vec<String>,
}

/// Speech-to-text parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriberConfig {
    pub provider: String,
    pub model: String,
    pub language: String,
}

/// Speech-synthesis parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub provider: String,
    pub voice_id: String,
    pub stability: f32,
    pub similarity_boost: f32,
    pub speed: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

/// Language-model parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    pub provider: String,
    pub model: String,
    pub messages: Vec<PromptMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: String,
}

impl AssistantConfig {
    /// The system prompt template, if present
    pub fn system_prompt(&self) -> Option<&str> {
        self.model
            .messages
            .iter()
            .find(|m| m.role == "system")
            .map(|m| m.content.as_str())
    }
}

/// Builds [`AssistantConfig`] values from a voice category and style.
///
/// Pure: no I/O, and unknown combinations fall back to the table's default
/// voice instead of failing.
#[derive(Debug, Clone, Default)]
pub struct AssistantConfigBuilder {
    voices: VoiceTable,
}

impl AssistantConfigBuilder {
    pub fn new(voices: VoiceTable) -> Self {
        Self { voices }
    }

    pub fn voices(&self) -> &VoiceTable {
        &self.voices
    }

    pub fn build(&self, voice: &str, style: &str) -> AssistantConfig {
        let voice_id = self.voices.resolve(voice, style).to_string();

        AssistantConfig {
            name: ASSISTANT_NAME.to_string(),
            first_message: FIRST_MESSAGE.to_string(),
            transcriber: TranscriberConfig {
                provider: "deepgram".to_string(),
                model: "nova-3".to_string(),
                language: "en".to_string(),
            },
            voice: VoiceConfig {
                provider: "11labs".to_string(),
                voice_id,
                stability: 0.4,
                similarity_boost: 0.8,
                speed: 1.0,
                style: 0.5,
                use_speaker_boost: true,
            },
            model: ModelConfig {
                provider: "openai".to_string(),
                model: "gpt-4".to_string(),
                messages: vec![PromptMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                }],
            },
            client_messages: Vec::new(),
            server_messages: Vec::new(),
        }
    }
}

/// Build with the built-in voice table
pub fn build_assistant(voice: &str, style: &str) -> AssistantConfig {
    AssistantConfigBuilder::default().build(voice, style)
}
