use crate::channel::VariableValues;
use serde::{Deserialize, Serialize};

/// Immutable inputs for one lesson, supplied at creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Companion (tutor) the lesson is held with; used for history
    pub companion_id: String,

    pub subject: String,

    pub topic: String,

    /// Conversational style, e.g. "casual" or "formal"
    pub style: String,

    /// Voice category, e.g. "male" or "female"
    pub voice_id: String,

    pub user_display_name: String,

    #[serde(default)]
    pub user_avatar_url: Option<String>,
}

impl SessionContext {
    /// Prompt variable bindings sent with the start command
    pub fn variable_values(&self) -> VariableValues {
        VariableValues {
            subject: self.subject.clone(),
            topic: self.topic.clone(),
            style: self.style.clone(),
        }
    }
}
