/*!
 * User glossaries: named, ordered term → translation lists.
 *
 * - `manager`: create, rename, duplicate, JSON export/import
 * - `csv`: CSV import/export
 * - `migrate`: one-time target-language upgrade for stored glossaries
 *
 * Glossaries feed the translation stage (as hints) and the terminology
 * checker.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub mod csv;
pub mod manager;
pub mod migrate;

pub use manager::{
    create_glossary, duplicate_glossary, export_glossary, import_glossary, rename_glossary,
    DEFAULT_GLOSSARY_NAME,
};
pub use self::csv::{export_glossary_csv, import_glossary_from_csv};
pub use migrate::{migrate_all_glossaries, migrate_glossary_language};

/// A single term and its expected translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryItem {
    /// Source-language term
    pub term: String,

    /// Expected target-language translation
    pub translation: String,

    /// Optional usage notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl GlossaryItem {
    /// Build a validated item: term and translation must be non-empty after
    /// trimming, empty notes become `None`.
    pub fn validated(term: &str, translation: &str, notes: Option<&str>) -> Option<Self> {
        let term = term.trim();
        let translation = translation.trim();
        if term.is_empty() || translation.is_empty() {
            return None;
        }

        Some(Self {
            term: term.to_string(),
            translation: translation.to_string(),
            notes: notes.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string),
        })
    }
}

/// A named term list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Glossary {
    /// Unique identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Terms in user order
    #[serde(default)]
    pub terms: Vec<GlossaryItem>,

    /// Language of the translations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,

    /// Creation time (Unix milliseconds)
    #[serde(default = "now_millis", deserialize_with = "deserialize_timestamp")]
    pub created_at: i64,

    /// Last modification time (Unix milliseconds)
    #[serde(default = "now_millis", deserialize_with = "deserialize_timestamp")]
    pub updated_at: i64,
}

impl Glossary {
    /// Look up a term case-insensitively
    pub fn find_term(&self, term: &str) -> Option<&GlossaryItem> {
        let needle = term.trim().to_lowercase();
        self.terms.iter().find(|item| item.term.to_lowercase() == needle)
    }

    /// (term, translation) pairs for translation prompts
    pub fn hints(&self) -> Vec<(String, String)> {
        self.terms
            .iter()
            .map(|item| (item.term.clone(), item.translation.clone()))
            .collect()
    }

    /// Refresh `updated_at`
    pub fn touch(&mut self) {
        self.updated_at = now_millis();
    }
}

/// Current time as Unix milliseconds
pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Read a timestamp stored as Unix milliseconds (integer or float) or as
/// an RFC 3339 string
pub(crate) fn timestamp_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|ms| ms.is_finite()).map(|ms| ms.round() as i64)),
        Value::String(text) => {
            let text = text.trim();
            DateTime::parse_from_rfc3339(text)
                .map(|at| at.timestamp_millis())
                .ok()
                .or_else(|| text.parse::<f64>().ok().filter(|ms| ms.is_finite()).map(|ms| ms.round() as i64))
        }
        _ => None,
    }
}

/// Unreadable timestamps become "now" instead of failing the whole settings file
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(timestamp_millis(&value).unwrap_or_else(now_millis))
}

/// Mint a glossary identifier
pub(crate) fn new_glossary_id() -> String {
    format!("glossary-{}", uuid::Uuid::new_v4().simple())
}

/// Look up a glossary by id
pub fn find_glossary<'a>(library: &'a [Glossary], id: &str) -> Option<&'a Glossary> {
    library.iter().find(|g| g.id == id)
}

/// Replace the glossary with the same id, or append it
pub fn upsert_glossary(library: &mut Vec<Glossary>, glossary: Glossary) {
    match library.iter_mut().find(|g| g.id == glossary.id) {
        Some(existing) => *existing = glossary,
        None => library.push(glossary),
    }
}

/// Remove a glossary by id, returning it if it existed
pub fn remove_glossary(library: &mut Vec<Glossary>, id: &str) -> Option<Glossary> {
    let position = library.iter().position(|g| g.id == id)?;
    Some(library.remove(position))
}
