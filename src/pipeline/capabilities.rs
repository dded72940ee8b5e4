/*!
 * External capabilities consumed by the pipeline.
 *
 * Transcription, translation and forced alignment are provided by
 * collaborators outside this crate (model servers, vendor APIs, helper
 * binaries). The pipeline only sees these traits.
 */

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

use crate::errors::CapabilityError;
use crate::pipeline::chunks::ChunkSpec;
use crate::subtitle::SubtitleItem;

/// The media file being processed
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSource {
    /// Path to the audio or video file
    pub path: PathBuf,
    /// Total duration in seconds
    pub duration_secs: f64,
}

impl MediaSource {
    /// Describe a media file of known duration
    pub fn new(path: impl Into<PathBuf>, duration_secs: f64) -> Self {
        Self {
            path: path.into(),
            duration_secs,
        }
    }

    /// File name shown to the user
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }
}

/// Everything a transcriber needs for one chunk
#[derive(Debug, Clone)]
pub struct TranscriptionRequest<'a> {
    /// Source media
    pub media: &'a MediaSource,
    /// The time slice to transcribe
    pub chunk: ChunkSpec,
    /// Spoken language hint, if known
    pub language: Option<&'a str>,
    /// Model identifier
    pub model: &'a str,
}

/// Speech-to-text capability.
///
/// Returned items use chunk-local timestamps (0 = chunk start).
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe one chunk of the media
    async fn transcribe(
        &self,
        request: TranscriptionRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Vec<SubtitleItem>, CapabilityError>;
}

/// Everything a translator needs for one batch
#[derive(Debug, Clone)]
pub struct TranslationRequest<'a> {
    /// Source language code
    pub source_language: &'a str,
    /// Target language code
    pub target_language: &'a str,
    /// Glossary hints as (term, translation) pairs
    pub glossary_hints: &'a [(String, String)],
}

/// Text-in/text-out translation or refinement capability
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate a batch; the result holds one string per input item, in order
    async fn translate(
        &self,
        batch: &[SubtitleItem],
        request: TranslationRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, CapabilityError>;
}

/// Per-call alignment context
#[derive(Debug, Clone, Copy)]
pub struct AlignmentContext {
    /// The chunk the segments came from; timestamps are relative to its start
    pub chunk: ChunkSpec,
}

/// Forced-alignment capability bound to a model and a helper binary
#[async_trait]
pub trait ForcedAligner: Send + Sync {
    /// Refine segment timestamps against the audio
    async fn align(
        &self,
        segments: &[SubtitleItem],
        audio: &Path,
        language: &str,
        context: AlignmentContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<SubtitleItem>, CapabilityError>;
}
