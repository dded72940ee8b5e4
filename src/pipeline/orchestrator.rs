/*!
 * End-to-end subtitle pipeline.
 *
 * plan chunks -> apply duration budget -> transcribe each chunk in
 * parallel -> shift to absolute time -> align -> merge in chunk order ->
 * translate in batches -> consistency and terminology reports.
 *
 * Every external call holds a permit from the pipeline's semaphore, runs
 * under its own deadline and is retried on transient failures. A single
 * chunk or batch failure aborts the run.
 */

use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::app_config::Config;
use crate::errors::{AppError, CapabilityError};
use crate::glossary::Glossary;
use crate::history::SnapshotStore;
use crate::subtitle::{ensure_unique_ids, file_id_for, profiles_from_subtitles, CommentMap, SubtitleItem};
use crate::validation::{check_terminology, ConsistencyIssue, ConsistencyValidator, TerminologyIssue};

use super::alignment::AlignmentStrategy;
use super::capabilities::{
    AlignmentContext, MediaSource, Transcriber, TranscriptionRequest, TranslationRequest, Translator,
};
use super::chunks::{plan_chunks, select_chunks_by_duration, ChunkSpec};
use super::concurrency::{map_in_parallel, retry_transient, with_timeout, RetryPolicy, Semaphore};

/// Description of the snapshot taken after a run
pub const INITIAL_SNAPSHOT_LABEL: &str = "Initial transcription";

/// Result of a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    /// Merged, translated subtitles in presentation order
    pub subtitles: Vec<SubtitleItem>,
    pub consistency_issues: Vec<ConsistencyIssue>,
    pub terminology_issues: Vec<TerminologyIssue>,
    /// Chunks transcribed after the duration budget was applied
    pub chunks_processed: usize,
}

impl PipelineOutput {
    /// Record the result as the first snapshot of `media`'s history
    pub fn checkpoint(&self, store: &mut SnapshotStore, media: &MediaSource) -> String {
        store.create_snapshot(
            INITIAL_SNAPSHOT_LABEL,
            &self.subtitles,
            &CommentMap::new(),
            Some(&file_id_for(&media.path)),
            Some(&media.display_name()),
            &profiles_from_subtitles(&self.subtitles),
        )
    }
}

/// Transcription, alignment and translation wired to one configuration
pub struct Pipeline {
    config: Config,
    transcriber: Arc<dyn Transcriber>,
    translator: Arc<dyn Translator>,
    aligner: AlignmentStrategy,
    limiter: Semaphore,
    retry: RetryPolicy,
    timeout: Duration,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("aligner", &self.aligner.name())
            .field("concurrency", &self.limiter.capacity())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Pipeline {
    /// Build a pipeline; fails if `config` does not validate
    pub fn new(
        config: Config,
        transcriber: Arc<dyn Transcriber>,
        translator: Arc<dyn Translator>,
        aligner: AlignmentStrategy,
    ) -> Result<Self, AppError> {
        config.validate().map_err(|e| AppError::Config(e.to_string()))?;

        let pipeline_config = &config.pipeline;
        Ok(Self {
            limiter: Semaphore::new(pipeline_config.concurrency),
            retry: RetryPolicy {
                max_retries: pipeline_config.retry_count,
                backoff: Duration::from_millis(pipeline_config.retry_backoff_ms),
            },
            timeout: Duration::from_secs(pipeline_config.timeout_secs),
            config,
            transcriber,
            translator,
            aligner,
        })
    }

    /// The configuration this pipeline runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process `media` end to end.
    ///
    /// `glossary` supplies translation hints and the terminology check.
    /// Firing `cancel` aborts the run with `CapabilityError::Cancelled`.
    pub async fn run(
        &self,
        media: &MediaSource,
        glossary: Option<&Glossary>,
        cancel: &CancellationToken,
    ) -> Result<PipelineOutput, AppError> {
        let settings = &self.config.pipeline;
        let planned = plan_chunks(media.duration_secs, settings.chunk_duration_secs)?;
        let chunks = select_chunks_by_duration(&planned, settings.duration_budget, settings.chunk_duration_secs);
        info!(
            "Processing {}: {} of {} chunks, alignment {}",
            media.display_name(),
            chunks.len(),
            planned.len(),
            self.aligner.name()
        );

        if chunks.is_empty() {
            return Ok(PipelineOutput::default());
        }
        let chunks_processed = chunks.len();

        let per_chunk: Vec<Vec<SubtitleItem>> =
            map_in_parallel(chunks, settings.concurrency, cancel, |chunk, _| {
                self.process_chunk(media, chunk, cancel)
            })
            .await?;

        let mut subtitles: Vec<SubtitleItem> = per_chunk.into_iter().flatten().collect();
        let remapped = ensure_unique_ids(&mut subtitles);
        if remapped > 0 {
            debug!("Re-minted {} colliding subtitle ids", remapped);
        }
        info!("Transcription complete: {} subtitles", subtitles.len());

        let hints = glossary.map(Glossary::hints).unwrap_or_default();
        self.translate_all(&mut subtitles, &hints, cancel).await?;
        info!("Translation complete");

        let consistency_issues = ConsistencyValidator::new().validate(&subtitles);
        let terminology_issues = glossary
            .map(|g| check_terminology(&g.terms, &subtitles))
            .unwrap_or_default();
        info!(
            "Checks complete: {} consistency issues, {} terminology issues",
            consistency_issues.len(),
            terminology_issues.len()
        );

        Ok(PipelineOutput {
            subtitles,
            consistency_issues,
            terminology_issues,
            chunks_processed,
        })
    }

    /// Transcribe and align one chunk; timestamps come back absolute
    async fn process_chunk(
        &self,
        media: &MediaSource,
        chunk: ChunkSpec,
        cancel: &CancellationToken,
    ) -> Result<Vec<SubtitleItem>, CapabilityError> {
        debug!("Dispatching chunk {} ({:.1}s-{:.1}s)", chunk.index, chunk.start, chunk.end);
        let settings = &self.config.pipeline;

        let segments = retry_transient(&self.retry, cancel, |_attempt| async move {
            let _permit = self.limiter.acquire_cancellable(cancel).await?;
            let request = TranscriptionRequest {
                media,
                chunk,
                language: Some(self.config.source_language.as_str()),
                model: settings.transcription_model.as_str(),
            };
            with_timeout(self.timeout, cancel, self.transcriber.transcribe(request, cancel)).await
        })
        .await?;

        let aligned = {
            let _permit = self.limiter.acquire_cancellable(cancel).await?;
            with_timeout(
                self.timeout,
                cancel,
                self.aligner.align(
                    segments,
                    &media.path,
                    &self.config.source_language,
                    AlignmentContext { chunk },
                    cancel,
                ),
            )
            .await?
        };

        debug!("Chunk {} produced {} segments", chunk.index, aligned.len());
        Ok(aligned.into_iter().map(|item| item.shifted(chunk.start)).collect())
    }

    /// Fill `translated` on every subtitle, one batch per capability call
    async fn translate_all(
        &self,
        subtitles: &mut [SubtitleItem],
        hints: &[(String, String)],
        cancel: &CancellationToken,
    ) -> Result<(), AppError> {
        let settings = &self.config.pipeline;
        let batches: Vec<Vec<SubtitleItem>> = subtitles
            .chunks(settings.translation_batch_size.max(1))
            .map(<[SubtitleItem]>::to_vec)
            .collect();

        let translated: Vec<Vec<String>> =
            map_in_parallel(batches, settings.concurrency, cancel, |batch, index| async move {
                debug!("Dispatching translation batch {} ({} subtitles)", index, batch.len());
                let lines = retry_transient(&self.retry, cancel, |_attempt| {
                    let batch = &batch;
                    async move {
                        let _permit = self.limiter.acquire_cancellable(cancel).await?;
                        let request = TranslationRequest {
                            source_language: &self.config.source_language,
                            target_language: &self.config.target_language,
                            glossary_hints: hints,
                        };
                        with_timeout(self.timeout, cancel, self.translator.translate(batch, request, cancel)).await
                    }
                })
                .await?;

                if lines.len() != batch.len() {
                    return Err(CapabilityError::TranslationFailed(format!(
                        "Batch {} expected {} lines, got {}",
                        index,
                        batch.len(),
                        lines.len()
                    )));
                }
                Ok(lines)
            })
            .await?;

        for (item, text) in subtitles.iter_mut().zip(translated.into_iter().flatten()) {
            item.translated = text;
        }
        Ok(())
    }
}
