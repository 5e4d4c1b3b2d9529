use serde::{Deserialize, Serialize};

/// Who spoke a transcript turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single finalized turn of the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub content: String,
}

impl TranscriptEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Append-only log of transcript turns, kept in arrival order.
///
/// Display order (newest first) is a view over the log; entries are never
/// reordered, mutated or removed.
#[derive(Debug, Clone, Default)]
pub struct TranscriptAccumulator {
    entries: Vec<TranscriptEntry>,
}

impl TranscriptAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in arrival order
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Entries most recent first. The iterator is lazy and can be cloned to
    /// restart from the newest entry.
    pub fn display(&self) -> impl DoubleEndedIterator<Item = &TranscriptEntry> + Clone + '_ {
        self.entries.iter().rev()
    }

    /// Owned copy of the display list
    pub fn to_display_list(&self) -> Vec<TranscriptEntry> {
        self.display().cloned().collect()
    }
}
