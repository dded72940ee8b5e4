/*!
 * One-time upgrade of stored glossaries that predate the target-language
 * field. The language is detected from each glossary's translations.
 */

use log::debug;

use crate::language_utils::LanguageDetector;

use super::Glossary;

/// Target language assumed when nothing better is known
pub const DEFAULT_MIGRATION_LANGUAGE: &str = "en";

/// Fill in a missing target language.
///
/// Glossaries that already carry a language are returned unchanged. For
/// the rest, the language is detected from the joined translations; an
/// empty glossary (or undetectable text) falls back to `fallback_language`
/// and then to [`DEFAULT_MIGRATION_LANGUAGE`].
pub fn migrate_glossary_language(
    glossary: &Glossary,
    detector: &dyn LanguageDetector,
    fallback_language: Option<&str>,
) -> Glossary {
    if glossary.target_language.is_some() {
        return glossary.clone();
    }

    let fallback = fallback_language
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .unwrap_or(DEFAULT_MIGRATION_LANGUAGE);

    let detected = if glossary.terms.is_empty() {
        None
    } else {
        let sample = glossary
            .terms
            .iter()
            .map(|item| item.translation.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        detector.detect(&sample)
    };

    let language = detected.unwrap_or_else(|| fallback.to_string());
    debug!("Glossary '{}' tagged with target language {}", glossary.name, language);

    let mut migrated = glossary.clone();
    migrated.target_language = Some(language);
    migrated
}

/// Migrate a whole library, reporting whether any glossary changed
pub fn migrate_all_glossaries(
    glossaries: &[Glossary],
    detector: &dyn LanguageDetector,
    fallback_language: Option<&str>,
) -> (Vec<Glossary>, bool) {
    let mut changed = false;
    let migrated = glossaries
        .iter()
        .map(|glossary| {
            let updated = migrate_glossary_language(glossary, detector, fallback_language);
            changed |= updated != *glossary;
            updated
        })
        .collect();

    (migrated, changed)
}
