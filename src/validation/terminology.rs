/*!
 * Glossary-driven terminology checks.
 *
 * For every glossary term found (case-insensitively) in a subtitle's
 * original text, the translation must contain the expected translation
 * verbatim. Subtitles where the term never appears are ignored, and terms
 * without misses produce no entry.
 *
 * Containment is a plain substring test: paraphrases are reported as
 * misses and coincidental substrings count as hits.
 */

use log::{debug, warn};
use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::glossary::GlossaryItem;
use crate::subtitle::SubtitleItem;

/// A subtitle where the expected translation is missing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermOccurrence {
    pub subtitle_id: String,
    pub original: String,
    pub translated: String,
}

/// All misses for one glossary term
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminologyIssue {
    pub term: String,
    pub expected: String,
    pub occurrences: Vec<TermOccurrence>,
}

impl std::fmt::Display for TerminologyIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "'{}' should be translated as '{}' ({} occurrences)",
            self.term,
            self.expected,
            self.occurrences.len()
        )
    }
}

fn term_matcher(term: &str) -> Option<Regex> {
    match RegexBuilder::new(&regex::escape(term)).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!("Skipping glossary term '{}': {}", term, e);
            None
        }
    }
}

/// Check `subtitles` against an explicit term list
pub fn check_terminology(terms: &[GlossaryItem], subtitles: &[SubtitleItem]) -> Vec<TerminologyIssue> {
    let issues: Vec<TerminologyIssue> = terms
        .iter()
        .filter_map(|item| {
            let matcher = term_matcher(&item.term)?;
            let occurrences: Vec<TermOccurrence> = subtitles
                .iter()
                .filter(|sub| matcher.is_match(&sub.original))
                .filter(|sub| !sub.translated.contains(item.translation.as_str()))
                .map(|sub| TermOccurrence {
                    subtitle_id: sub.id.clone(),
                    original: sub.original.clone(),
                    translated: sub.translated.clone(),
                })
                .collect();

            (!occurrences.is_empty()).then(|| TerminologyIssue {
                term: item.term.clone(),
                expected: item.translation.clone(),
                occurrences,
            })
        })
        .collect();

    debug!("Terminology check: {} terms with misses", issues.len());
    issues
}

/// Terminology checker bound to an editable term list
#[derive(Debug, Default, Clone)]
pub struct TerminologyChecker {
    glossary: Vec<GlossaryItem>,
}

impl TerminologyChecker {
    /// Create a checker over `glossary`
    pub fn new(glossary: Vec<GlossaryItem>) -> Self {
        Self { glossary }
    }

    /// Replace the term list
    pub fn set_glossary(&mut self, glossary: Vec<GlossaryItem>) {
        self.glossary = glossary;
    }

    /// Current term list
    pub fn glossary(&self) -> &[GlossaryItem] {
        &self.glossary
    }

    /// Add a term, replacing any existing entry with the same term
    pub fn add_term(&mut self, item: GlossaryItem) {
        self.remove_term(&item.term);
        self.glossary.push(item);
    }

    /// Remove a term case-insensitively; returns whether it existed
    pub fn remove_term(&mut self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        let before = self.glossary.len();
        self.glossary.retain(|item| item.term.to_lowercase() != needle);
        self.glossary.len() != before
    }

    /// Check `subtitles` against the current term list
    pub fn check(&self, subtitles: &[SubtitleItem]) -> Vec<TerminologyIssue> {
        check_terminology(&self.glossary, subtitles)
    }
}
