/*!
 * Glossary lifecycle and JSON exchange format.
 *
 * All operations are pure: they return a new `Glossary` and never mutate
 * their input. Import never trusts an external identifier.
 */

use log::debug;
use serde_json::Value;

use crate::errors::GlossaryError;

use super::{new_glossary_id, now_millis, timestamp_millis, Glossary, GlossaryItem};

/// Name used when the user leaves the name blank
pub const DEFAULT_GLOSSARY_NAME: &str = "Untitled Glossary";

/// Create an empty glossary
pub fn create_glossary(name: &str, target_language: Option<&str>) -> Glossary {
    let name = name.trim();
    let now = now_millis();

    Glossary {
        id: new_glossary_id(),
        name: if name.is_empty() { DEFAULT_GLOSSARY_NAME.to_string() } else { name.to_string() },
        terms: Vec::new(),
        target_language: target_language
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .map(str::to_string),
        created_at: now,
        updated_at: now,
    }
}

/// Rename; a blank name keeps the old one
pub fn rename_glossary(glossary: &Glossary, new_name: &str) -> Glossary {
    let mut renamed = glossary.clone();
    let new_name = new_name.trim();
    if !new_name.is_empty() {
        renamed.name = new_name.to_string();
    }
    renamed.touch();
    renamed
}

/// Copy with a new id and "name (suffix)"
pub fn duplicate_glossary(glossary: &Glossary, suffix_label: &str) -> Glossary {
    let now = now_millis();
    Glossary {
        id: new_glossary_id(),
        name: format!("{} ({})", glossary.name, suffix_label),
        terms: glossary.terms.clone(),
        target_language: glossary.target_language.clone(),
        created_at: now,
        updated_at: now,
    }
}

/// Serialize to indented JSON with a stable field order
pub fn export_glossary(glossary: &Glossary) -> String {
    // Field order follows the struct declaration; a glossary has no map keys
    serde_json::to_string_pretty(glossary).unwrap_or_else(|_| String::from("{}"))
}

/// Parse an exported glossary.
///
/// The document must have a string `name` and an array `terms`. Terms
/// that fail validation are dropped one by one. A fresh id is always
/// minted; `createdAt` is kept when present.
pub fn import_glossary(text: &str) -> Result<Glossary, GlossaryError> {
    let document: Value =
        serde_json::from_str(text).map_err(|e| GlossaryError::InvalidJson(e.to_string()))?;

    let name = document
        .get("name")
        .and_then(Value::as_str)
        .ok_or(GlossaryError::MissingName)?;
    let raw_terms = document
        .get("terms")
        .and_then(Value::as_array)
        .ok_or(GlossaryError::MissingTerms)?;

    let terms: Vec<GlossaryItem> = raw_terms.iter().filter_map(validate_term_value).collect();
    if terms.len() < raw_terms.len() {
        debug!("Dropped {} invalid glossary terms during import", raw_terms.len() - terms.len());
    }

    let now = now_millis();
    let name = name.trim();

    Ok(Glossary {
        id: new_glossary_id(),
        name: if name.is_empty() { DEFAULT_GLOSSARY_NAME.to_string() } else { name.to_string() },
        terms,
        target_language: document
            .get("targetLanguage")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .map(str::to_string),
        created_at: document.get("createdAt").and_then(timestamp_millis).unwrap_or(now),
        updated_at: now,
    })
}

fn validate_term_value(value: &Value) -> Option<GlossaryItem> {
    let term = value.get("term")?.as_str()?;
    let translation = value.get("translation")?.as_str()?;
    let notes = value.get("notes").and_then(Value::as_str);
    GlossaryItem::validated(term, translation, notes)
}
