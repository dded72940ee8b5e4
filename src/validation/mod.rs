/*!
 * Translation quality checks over a finished subtitle set.
 *
 * # Architecture
 *
 * - `consistency`: rule-based punctuation, spacing, length and bracket checks
 * - `terminology`: glossary-driven checks that expected translations are used
 *
 * Validators never fail: no findings is an empty list. Reports are derived
 * on demand and never stored.
 */

use serde::Serialize;

pub mod consistency;
pub mod terminology;

// Re-export main types
pub use consistency::{ConsistencyIssue, ConsistencyIssueKind, ConsistencyValidator};
pub use terminology::{check_terminology, TermOccurrence, TerminologyChecker, TerminologyIssue};

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}
