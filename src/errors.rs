/*!
 * Error types for the subweave library.
 *
 * Capability failures carry a category so callers can decide between
 * showing the error to the user, retrying it quietly, or reporting it
 * as a defect. Messages are stable codes, never localized text.
 */

use thiserror::Error;

/// How a failure should be handled by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caused by user configuration (credentials, quota, permissions); shown directly
    UserActionable,
    /// Expected to resolve on retry, or user-initiated cancellation
    Transient,
    /// Anything else; surfaced as a generic failure and reported
    Unexpected,
}

/// Errors returned by the external transcription, translation and alignment capabilities
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CapabilityError {
    /// The capability is not configured or not installed
    #[error("Capability not available: {0}")]
    NotAvailable(String),

    /// Transcription of a chunk failed
    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    /// Translation of a batch failed
    #[error("Translation failed: {0}")]
    TranslationFailed(String),

    /// The operation was cancelled by the caller
    #[error("Operation cancelled")]
    Cancelled,

    /// The call did not finish before its deadline
    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    /// Upstream rate limiting or exhausted quota
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Invalid credentials, billing or permission problem
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Region restriction or a missing remote resource
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// Connection-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream responded with an error status or a non-API error page
    #[error("Upstream error {status}: {message}")]
    Upstream {
        /// HTTP-like status code
        status: u16,
        /// Response summary
        message: String,
    },

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl CapabilityError {
    /// Classify the error for retry and reporting decisions
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) | Self::RateLimited(_) | Self::ResourceUnavailable(_) | Self::NotAvailable(_) => {
                ErrorCategory::UserActionable
            }
            Self::Cancelled | Self::Timeout(_) | Self::Network(_) => ErrorCategory::Transient,
            Self::Upstream { status, message } => {
                if *status >= 500 || looks_like_html(message) {
                    ErrorCategory::Transient
                } else {
                    ErrorCategory::Unexpected
                }
            }
            Self::TranscriptionFailed(_) | Self::TranslationFailed(_) | Self::Unknown(_) => {
                ErrorCategory::Unexpected
            }
        }
    }

    /// Whether a retry may succeed. Cancellation is transient but never retried.
    pub fn is_retryable(&self) -> bool {
        !self.is_cancellation() && self.category() == ErrorCategory::Transient
    }

    /// Whether the error represents caller-side cancellation or a deadline
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Timeout(_))
    }

    /// Whether the error should be escalated to crash reporting
    pub fn should_report(&self) -> bool {
        self.category() == ErrorCategory::Unexpected
    }

    /// Stable message key for the presentation layer
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAvailable(_) => "capability.not_available",
            Self::TranscriptionFailed(_) => "capability.transcription_failed",
            Self::TranslationFailed(_) => "capability.translation_failed",
            Self::Cancelled => "capability.cancelled",
            Self::Timeout(_) => "capability.timeout",
            Self::RateLimited(_) => "capability.rate_limited",
            Self::Authentication(_) => "capability.authentication",
            Self::ResourceUnavailable(_) => "capability.resource_unavailable",
            Self::Network(_) => "capability.network",
            Self::Upstream { .. } => "capability.upstream",
            Self::Unknown(_) => "capability.unknown",
        }
    }
}

/// A misbehaving proxy tends to answer with an HTML page instead of an API error.
fn looks_like_html(message: &str) -> bool {
    let head = message.trim_start().to_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

/// Whole-document failures while importing a glossary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GlossaryError {
    /// The payload is not valid JSON
    #[error("Invalid glossary JSON: {0}")]
    InvalidJson(String),

    /// The payload has no name
    #[error("Invalid glossary format: missing name")]
    MissingName,

    /// The payload has no term list
    #[error("Invalid glossary format: missing terms")]
    MissingTerms,

    /// A CSV file without any data rows
    #[error("Glossary file is empty")]
    EmptyFile,

    /// Every candidate row failed validation
    #[error("Glossary file contains no valid terms")]
    NoValidTerms,
}

impl GlossaryError {
    /// Stable message key for the presentation layer
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidJson(_) | Self::MissingName | Self::MissingTerms => "glossary.invalid_format",
            Self::EmptyFile => "glossary.empty_file",
            Self::NoValidTerms => "glossary.no_valid_terms",
        }
    }
}

/// Errors raised by the snapshot history
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// No snapshot with the requested identifier
    #[error("Snapshot not found: {0}")]
    NotFound(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error in the configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from an external capability
    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    /// Error from glossary import
    #[error("Glossary error: {0}")]
    Glossary(#[from] GlossaryError),

    /// Error from the snapshot history
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::Config(error.to_string())
    }
}
