/*!
 * Timestamp alignment strategies.
 *
 * A transcriber's timestamps are only as good as the model that produced
 * them. A forced aligner re-times each segment against the audio. Which
 * strategy runs is decided by configuration alone:
 *
 * - `none` (and any unrecognised mode): pass-through
 * - `ctc`: forced alignment through an external helper binary and model
 *
 * Missing model or binary paths never fail the pipeline; the factory
 * falls back to pass-through with a warning.
 */

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::app_config::AlignmentSettings;
use crate::errors::CapabilityError;
use crate::subtitle::SubtitleItem;

use super::capabilities::{AlignmentContext, ForcedAligner};

/// Alignment backend selected by the `mode` setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentMode {
    /// No alignment
    None,
    /// CTC forced alignment
    Ctc,
}

impl AlignmentMode {
    /// Parse a mode string; anything unrecognised means `None`
    pub fn from_setting(mode: &str) -> Self {
        match mode.trim().to_lowercase().as_str() {
            "ctc" => Self::Ctc,
            "none" | "" => Self::None,
            other => {
                debug!("Unknown alignment mode '{}', using none", other);
                Self::None
            }
        }
    }
}

/// The selected alignment step
#[derive(Clone)]
pub enum AlignmentStrategy {
    /// Identity transform
    None,
    /// Model-driven forced alignment
    Ctc(CtcAligner),
}

impl fmt::Debug for AlignmentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "AlignmentStrategy::None"),
            Self::Ctc(aligner) => f
                .debug_struct("AlignmentStrategy::Ctc")
                .field("model_path", &aligner.model_path)
                .field("aligner_path", &aligner.aligner_path)
                .finish(),
        }
    }
}

impl AlignmentStrategy {
    /// Short name used in logs and settings
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Ctc(_) => "ctc",
        }
    }

    /// Align `segments` (chunk-local timestamps) against `audio`.
    ///
    /// Cancellation and deadlines propagate. Any other backend failure
    /// keeps the transcriber's timestamps and logs a warning.
    pub async fn align(
        &self,
        segments: Vec<SubtitleItem>,
        audio: &Path,
        language: &str,
        context: AlignmentContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<SubtitleItem>, CapabilityError> {
        match self {
            Self::None => Ok(segments),
            Self::Ctc(aligner) => {
                if segments.is_empty() {
                    return Ok(segments);
                }
                match aligner.backend.align(&segments, audio, language, context, cancel).await {
                    Ok(aligned) => Ok(merge_timings(segments, aligned)),
                    Err(e) if e.is_cancellation() => Err(e),
                    Err(e) => {
                        warn!(
                            "Forced alignment failed for chunk {} ({}), keeping model timestamps",
                            context.chunk.index, e
                        );
                        Ok(segments)
                    }
                }
            }
        }
    }
}

/// Forced aligner bound to a model file and helper binary
#[derive(Clone)]
pub struct CtcAligner {
    /// Alignment model
    pub model_path: PathBuf,
    /// Helper binary
    pub aligner_path: PathBuf,
    backend: Arc<dyn ForcedAligner>,
}

/// Build the strategy for the given settings using the helper-binary backend
pub fn create_aligner(settings: &AlignmentSettings) -> AlignmentStrategy {
    create_aligner_with(settings, |model, binary| -> Arc<dyn ForcedAligner> {
        Arc::new(ProcessAligner::new(model, binary))
    })
}

/// Build the strategy with a custom backend constructor
pub fn create_aligner_with<F>(settings: &AlignmentSettings, backend: F) -> AlignmentStrategy
where
    F: FnOnce(&Path, &Path) -> Arc<dyn ForcedAligner>,
{
    match AlignmentMode::from_setting(&settings.mode) {
        AlignmentMode::None => AlignmentStrategy::None,
        AlignmentMode::Ctc => {
            let model_path = non_empty_path(settings.model_path.as_deref());
            let aligner_path = non_empty_path(settings.aligner_path.as_deref());
            match (model_path, aligner_path) {
                (Some(model_path), Some(aligner_path)) => {
                    let backend = backend(model_path, aligner_path);
                    AlignmentStrategy::Ctc(CtcAligner {
                        model_path: model_path.to_path_buf(),
                        aligner_path: aligner_path.to_path_buf(),
                        backend,
                    })
                }
                (model, binary) => {
                    warn!(
                        "CTC alignment requested but {} not configured, alignment disabled",
                        match (model, binary) {
                            (None, None) => "model and aligner paths are",
                            (None, Some(_)) => "model path is",
                            _ => "aligner path is",
                        }
                    );
                    AlignmentStrategy::None
                }
            }
        }
    }
}

fn non_empty_path(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

/// Copy aligned timings back onto the original segments by id.
///
/// Segments the aligner dropped, or returned with unusable timing, keep
/// their original timestamps.
fn merge_timings(segments: Vec<SubtitleItem>, aligned: Vec<SubtitleItem>) -> Vec<SubtitleItem> {
    let timings: HashMap<String, (f64, f64)> = aligned
        .into_iter()
        .filter(|s| s.has_valid_timing())
        .map(|s| (s.id, (s.start_time, s.end_time)))
        .collect();

    segments
        .into_iter()
        .map(|mut segment| {
            if let Some(&(start, end)) = timings.get(&segment.id) {
                segment.start_time = start;
                segment.end_time = end;
            }
            segment
        })
        .collect()
}

#[derive(Debug, Serialize, Deserialize)]
struct AlignerSegment {
    id: String,
    start: f64,
    end: f64,
    #[serde(default)]
    text: String,
}

/// Runs the configured helper binary: segments go in as JSON on stdin,
/// re-timed segments come back as JSON on stdout.
#[derive(Debug, Clone)]
pub struct ProcessAligner {
    model_path: PathBuf,
    aligner_path: PathBuf,
}

impl ProcessAligner {
    /// Bind to a model and helper binary
    pub fn new(model_path: &Path, aligner_path: &Path) -> Self {
        Self {
            model_path: model_path.to_path_buf(),
            aligner_path: aligner_path.to_path_buf(),
        }
    }
}

#[async_trait]
impl ForcedAligner for ProcessAligner {
    async fn align(
        &self,
        segments: &[SubtitleItem],
        audio: &Path,
        language: &str,
        context: AlignmentContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<SubtitleItem>, CapabilityError> {
        let payload: Vec<AlignerSegment> = segments
            .iter()
            .map(|s| AlignerSegment {
                id: s.id.clone(),
                start: s.start_time,
                end: s.end_time,
                text: s.original.clone(),
            })
            .collect();
        let input = serde_json::to_vec(&payload)
            .map_err(|e| CapabilityError::Unknown(format!("Failed to encode segments: {}", e)))?;

        let mut child = Command::new(&self.aligner_path)
            .arg("--model")
            .arg(&self.model_path)
            .arg("--audio")
            .arg(audio)
            .arg("--language")
            .arg(language)
            .arg("--offset")
            .arg(context.chunk.start.to_string())
            .arg("--duration")
            .arg(context.chunk.duration().to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CapabilityError::NotAvailable(format!("Failed to start aligner: {}", e)))?;

        // Feed stdin while draining stdout so a streaming helper cannot
        // stall on a full pipe
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&input).await?;
            }
            Ok::<(), std::io::Error>(())
        };
        let (fed, output) = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CapabilityError::Cancelled),
            done = async { tokio::join!(feed, child.wait_with_output()) } => done,
        };
        let output = output.map_err(|e| CapabilityError::Unknown(format!("Aligner did not finish: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CapabilityError::Unknown(format!(
                "Aligner exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        if let Err(e) = fed {
            return Err(CapabilityError::Unknown(format!("Failed to write to aligner: {}", e)));
        }

        let aligned: Vec<AlignerSegment> = serde_json::from_slice(&output.stdout)
            .map_err(|e| CapabilityError::Unknown(format!("Invalid aligner output: {}", e)))?;

        Ok(aligned
            .into_iter()
            .map(|s| SubtitleItem {
                id: s.id,
                start_time: s.start,
                end_time: s.end,
                original: s.text,
                translated: String::new(),
                speaker: None,
            })
            .collect())
    }
}
