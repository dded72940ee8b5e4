/*!
 * Working subtitle model.
 *
 * A subtitle set is an ordered `Vec<SubtitleItem>`; presentation order is
 * array order. Identifiers are short tokens that only need to be unique
 * within one set.
 */

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use uuid::Uuid;

/// Free-text editor comments keyed by subtitle identifier
pub type CommentMap = HashMap<String, String>;

/// Length of minted subtitle identifiers
const SHORT_ID_LEN: usize = 8;

/// Mint a short, collision-tolerant identifier
pub fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..SHORT_ID_LEN].to_string()
}

/// A single timed subtitle with its translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleItem {
    /// Identifier, unique within its set
    pub id: String,

    /// Start time in seconds
    pub start_time: f64,

    /// End time in seconds
    pub end_time: f64,

    /// Source-language text
    pub original: String,

    /// Target-language text (empty until translated)
    #[serde(default)]
    pub translated: String,

    /// Speaker tag, if diarization produced one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

impl SubtitleItem {
    /// Create an untranslated item with a freshly minted id
    pub fn new(start_time: f64, end_time: f64, original: impl Into<String>) -> Self {
        Self {
            id: short_id(),
            start_time,
            end_time,
            original: original.into(),
            translated: String::new(),
            speaker: None,
        }
    }

    /// Set the translated text
    pub fn with_translation(mut self, translated: impl Into<String>) -> Self {
        self.translated = translated.into();
        self
    }

    /// Set the speaker tag
    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Whether the timing is usable (non-negative start, start < end)
    pub fn has_valid_timing(&self) -> bool {
        self.start_time >= 0.0 && self.start_time < self.end_time
    }

    /// Move both timestamps by `offset` seconds
    pub fn shifted(mut self, offset: f64) -> Self {
        self.start_time += offset;
        self.end_time += offset;
        self
    }
}

/// Re-mint identifiers that collide with an earlier item in the same set.
///
/// Returns the number of identifiers replaced.
pub fn ensure_unique_ids(items: &mut [SubtitleItem]) -> usize {
    let mut seen = HashSet::with_capacity(items.len());
    let mut replaced = 0;

    for item in items.iter_mut() {
        if item.id.is_empty() || !seen.insert(item.id.clone()) {
            let mut fresh = short_id();
            while seen.contains(&fresh) {
                fresh = short_id();
            }
            seen.insert(fresh.clone());
            item.id = fresh;
            replaced += 1;
        }
    }

    replaced
}

/// A named speaker shown by the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerProfile {
    /// Speaker tag as it appears on subtitles
    pub id: String,

    /// Display name
    pub name: String,

    /// Optional display color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl SpeakerProfile {
    /// Minimal profile whose name is the tag itself
    pub fn from_tag(tag: &str) -> Self {
        Self {
            id: tag.to_string(),
            name: tag.to_string(),
            color: None,
        }
    }
}

/// Distinct non-empty speaker tags, in order of first appearance
pub fn profiles_from_subtitles(items: &[SubtitleItem]) -> Vec<SpeakerProfile> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(|item| item.speaker.as_deref())
        .map(str::trim)
        .filter(|tag| !tag.is_empty() && seen.insert(tag.to_string()))
        .map(SpeakerProfile::from_tag)
        .collect()
}

/// Stable identifier for an originating media file
pub fn file_id_for(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    let digest = hasher.finalize();
    digest.iter().take(8).map(|b| format!("{:02x}", b)).collect()
}
