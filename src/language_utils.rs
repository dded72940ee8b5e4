/*!
 * Language utilities for ISO language code handling.
 *
 * Validates and normalizes ISO 639-1 (2-letter) and ISO 639-2/T
 * (3-letter) codes, and provides the language-detection capability used
 * when upgrading old glossaries.
 */

use anyhow::{anyhow, Result};
use isolang::Language;

/// ISO 639-2/B codes that differ from their 639-2/T form
const PART2B_TO_PART2T: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

fn lookup(code: &str) -> Option<Language> {
    let normalized = code.trim().to_lowercase();
    match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => {
            let part2t = PART2B_TO_PART2T
                .iter()
                .find(|(b, _)| *b == normalized)
                .map(|(_, t)| *t)
                .unwrap_or(normalized.as_str());
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Normalize a language code to ISO 639-1 if one exists, else ISO 639-2/T
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let lang = lookup(code).ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))?;
    Ok(lang
        .to_639_1()
        .map(str::to_string)
        .unwrap_or_else(|| lang.to_639_3().to_string()))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (lookup(code1), lookup(code2)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let lang = lookup(code).ok_or_else(|| anyhow!("Invalid language code: {}", code))?;
    Ok(lang.to_name().to_string())
}

/// Language-detection capability
pub trait LanguageDetector: Send + Sync {
    /// Best-guess ISO 639-1 tag for `text`, `None` if undecidable
    fn detect(&self, text: &str) -> Option<String>;
}

/// Detects the language family from the dominant Unicode script.
///
/// Latin text is reported as English; telling Latin-script languages
/// apart needs a statistical model.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptDetector;

#[derive(Debug, Default)]
struct ScriptCounts {
    han: usize,
    kana: usize,
    hangul: usize,
    cyrillic: usize,
    arabic: usize,
    thai: usize,
    greek: usize,
    hebrew: usize,
    devanagari: usize,
    latin: usize,
}

impl ScriptCounts {
    fn tally(text: &str) -> Self {
        let mut counts = Self::default();
        for c in text.chars() {
            match c {
                '\u{3040}'..='\u{30FF}' | '\u{31F0}'..='\u{31FF}' => counts.kana += 1,
                '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' | '\u{F900}'..='\u{FAFF}' => counts.han += 1,
                '\u{AC00}'..='\u{D7AF}' | '\u{1100}'..='\u{11FF}' | '\u{3130}'..='\u{318F}' => counts.hangul += 1,
                '\u{0400}'..='\u{04FF}' => counts.cyrillic += 1,
                '\u{0600}'..='\u{06FF}' => counts.arabic += 1,
                '\u{0E00}'..='\u{0E7F}' => counts.thai += 1,
                '\u{0370}'..='\u{03FF}' => counts.greek += 1,
                '\u{0590}'..='\u{05FF}' => counts.hebrew += 1,
                '\u{0900}'..='\u{097F}' => counts.devanagari += 1,
                c if c.is_ascii_alphabetic() || ('\u{00C0}'..='\u{024F}').contains(&c) => counts.latin += 1,
                _ => {}
            }
        }
        counts
    }
}

impl LanguageDetector for ScriptDetector {
    fn detect(&self, text: &str) -> Option<String> {
        let counts = ScriptCounts::tally(text);

        // Japanese mixes kanji with kana; any kana decides it
        if counts.kana > 0 {
            return Some("ja".to_string());
        }

        let candidates = [
            (counts.han, "zh"),
            (counts.hangul, "ko"),
            (counts.cyrillic, "ru"),
            (counts.arabic, "ar"),
            (counts.thai, "th"),
            (counts.greek, "el"),
            (counts.hebrew, "he"),
            (counts.devanagari, "hi"),
            (counts.latin, "en"),
        ];

        candidates
            .iter()
            .filter(|(count, _)| *count > 0)
            .max_by_key(|(count, _)| *count)
            .map(|(_, tag)| tag.to_string())
    }
}
