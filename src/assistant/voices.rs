use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Voice ID used when a (category, style) pair has no entry
pub const FALLBACK_VOICE_ID: &str = "sarah";

/// Two-level lookup from voice category ("male", "female") to
/// conversational style ("casual", "formal") to a synthesized-voice ID
///
/// Category and style keys are stored lowercase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "VoiceTableFile")]
pub struct VoiceTable {
    /// Voice ID returned on any lookup miss
    pub fallback: String,

    /// category → style → voice ID
    table: HashMap<String, HashMap<String, String>>,
}

/// Voice table as written in the config file. Keys may use any case.
#[derive(Deserialize)]
#[serde(default)]
struct VoiceTableFile {
    fallback: String,
    table: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for VoiceTableFile {
    fn default() -> Self {
        let voices = VoiceTable::default();
        Self {
            fallback: voices.fallback,
            table: voices
                .table
                .into_iter()
                .map(|(category, styles)| (category, styles.into_iter().collect()))
                .collect(),
        }
    }
}

// Sorted iteration makes case collisions ("Male" vs "male") resolve the same
// way on every load: the lexicographically last spelling wins.
impl From<VoiceTableFile> for VoiceTable {
    fn from(file: VoiceTableFile) -> Self {
        let mut voices = VoiceTable::with_fallback(file.fallback);
        for (category, styles) in file.table {
            for (style, voice_id) in styles {
                voices.insert(&category, &style, voice_id);
            }
        }
        voices
    }
}

impl Default for VoiceTable {
    fn default() -> Self {
        let mut voices = VoiceTable::with_fallback(FALLBACK_VOICE_ID);

        voices.insert("male", "casual", "2BJW5coyhAzSr8STdHbE");
        voices.insert("male", "formal", "c6SfcYrb2t09NHXiT80T");
        voices.insert("female", "casual", "ZIlrSGI4jZqobxRKprJz");
        voices.insert("female", "formal", "sa2z6gEuOalzawBHvrCV");

        voices
    }
}

impl VoiceTable {
    /// Empty table that resolves every pair to `fallback`
    pub fn with_fallback(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
            table: HashMap::new(),
        }
    }

    /// Add or replace the voice for a (category, style) pair
    pub fn insert(&mut self, category: &str, style: &str, voice_id: impl Into<String>) {
        self.table
            .entry(normalize(category))
            .or_default()
            .insert(normalize(style), voice_id.into());
    }

    /// Resolve a voice ID, degrading to the fallback when either key is absent.
    ///
    /// Keys are matched case-insensitively.
    pub fn resolve(&self, category: &str, style: &str) -> &str {
        self.table
            .get(&normalize(category))
            .and_then(|styles| styles.get(&normalize(style)))
            .map(String::as_str)
            .unwrap_or(self.fallback.as_str())
    }
}

fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}
