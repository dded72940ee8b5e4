/*!
 * Rule-based consistency checks for translated subtitles.
 *
 * Each translated item runs through four independent checks:
 * - Punctuation: ASCII `,` or `.` inside ideographic text
 * - Spacing: an ideograph directly touching a Latin letter or digit
 * - Length: translations long enough to need splitting
 * - Brackets: unbalanced East-Asian brackets
 *
 * A check reports at most one issue per item.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::subtitle::SubtitleItem;

use super::Severity;

/// Translations longer than this many characters should be split
pub const MAX_LINE_CHARS: usize = 35;

/// Open/close pairs checked for balance
const BRACKET_PAIRS: &[(char, char)] = &[
    ('（', '）'),
    ('【', '】'),
    ('「', '」'),
    ('『', '』'),
    ('《', '》'),
    ('〈', '〉'),
    ('〔', '〕'),
];

/// Ideograph immediately before or after a Latin letter or digit
static MISSING_SPACE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[\p{Han}\p{Hiragana}\p{Katakana}][A-Za-z0-9]|[A-Za-z0-9][\p{Han}\p{Hiragana}\p{Katakana}]",
    )
    .expect("Invalid spacing regex")
});

static IDEOGRAPH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{Han}\p{Hiragana}\p{Katakana}]").expect("Invalid ideograph regex"));

/// Kind of consistency problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsistencyIssueKind {
    Punctuation,
    Spacing,
    Length,
    Brackets,
}

impl ConsistencyIssueKind {
    /// Fixed severity for each kind
    pub fn severity(self) -> Severity {
        match self {
            Self::Punctuation => Severity::Low,
            Self::Spacing => Severity::Low,
            Self::Length => Severity::Medium,
            Self::Brackets => Severity::High,
        }
    }
}

/// One problem found in one subtitle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyIssue {
    pub kind: ConsistencyIssueKind,
    pub subtitle_id: String,
    pub description: String,
    pub severity: Severity,
}

impl ConsistencyIssue {
    fn new(kind: ConsistencyIssueKind, subtitle_id: &str, description: String) -> Self {
        Self {
            kind,
            subtitle_id: subtitle_id.to_string(),
            description,
            severity: kind.severity(),
        }
    }
}

impl std::fmt::Display for ConsistencyIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.subtitle_id, self.description)
    }
}

/// Stateless validator over a finished subtitle list
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsistencyValidator;

impl ConsistencyValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self
    }

    /// Check every translated subtitle
    pub fn validate(&self, subtitles: &[SubtitleItem]) -> Vec<ConsistencyIssue> {
        let issues: Vec<ConsistencyIssue> = subtitles
            .iter()
            .filter(|item| !item.translated.trim().is_empty())
            .flat_map(|item| self.validate_item(item))
            .collect();

        debug!(
            "Consistency check: {} issues across {} subtitles",
            issues.len(),
            subtitles.len()
        );
        issues
    }

    /// All issues for a single subtitle
    pub fn validate_item(&self, item: &SubtitleItem) -> Vec<ConsistencyIssue> {
        let text = item.translated.as_str();
        [
            Self::check_punctuation(text),
            Self::check_spacing(text),
            Self::check_length(text),
            Self::check_brackets(text),
        ]
        .into_iter()
        .flatten()
        .map(|(kind, description)| ConsistencyIssue::new(kind, &item.id, description))
        .collect()
    }

    fn check_punctuation(text: &str) -> Option<(ConsistencyIssueKind, String)> {
        if !IDEOGRAPH_REGEX.is_match(text) {
            return None;
        }

        let chars: Vec<char> = text.chars().collect();
        let offending = chars.iter().enumerate().find(|&(i, &c)| {
            if c != ',' && c != '.' {
                return false;
            }
            let next = chars.get(i + 1).copied();
            let prev = i.checked_sub(1).map(|p| chars[p]);
            if next.is_some_and(|n| n.is_ascii_digit()) {
                return false;
            }
            // Part of "..." or similar
            !(c == '.' && (next == Some('.') || prev == Some('.')))
        });

        offending.map(|(_, &c)| {
            let replacement = if c == ',' { '，' } else { '。' };
            (
                ConsistencyIssueKind::Punctuation,
                format!("ASCII '{}' in ideographic text, expected '{}'", c, replacement),
            )
        })
    }

    fn check_spacing(text: &str) -> Option<(ConsistencyIssueKind, String)> {
        MISSING_SPACE_REGEX.find(text).map(|m| {
            (
                ConsistencyIssueKind::Spacing,
                format!("Missing space between ideograph and Latin text in '{}'", m.as_str()),
            )
        })
    }

    fn check_length(text: &str) -> Option<(ConsistencyIssueKind, String)> {
        let len = text.chars().count();
        (len > MAX_LINE_CHARS).then(|| {
            (
                ConsistencyIssueKind::Length,
                format!("{} characters exceeds {}, consider splitting", len, MAX_LINE_CHARS),
            )
        })
    }

    fn check_brackets(text: &str) -> Option<(ConsistencyIssueKind, String)> {
        let open = text
            .chars()
            .filter(|c| BRACKET_PAIRS.iter().any(|(o, _)| o == c))
            .count();
        let close = text
            .chars()
            .filter(|c| BRACKET_PAIRS.iter().any(|(_, cl)| cl == c))
            .count();

        (open != close).then(|| {
            (
                ConsistencyIssueKind::Brackets,
                format!("Unbalanced brackets: {} open, {} close", open, close),
            )
        })
    }
}
