/*!
 * End-to-end pipeline tests with mock capabilities
 */

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use subweave::app_config::{AlignmentSettings, Config};
use subweave::errors::{AppError, CapabilityError};
use subweave::history::{restore_snapshot, SnapshotStore, WorkingSet};
use subweave::pipeline::alignment::create_aligner_with;
use subweave::pipeline::capabilities::AlignmentContext;
use subweave::pipeline::{create_aligner, AlignmentStrategy, ForcedAligner, MediaSource, Pipeline};
use subweave::providers::{MockBehavior, MockTranscriber, MockTranslator};
use subweave::subtitle::SubtitleItem;

use crate::common;

/// Aligner that snaps every segment to whole seconds inside its chunk
struct SnappingAligner;

#[async_trait]
impl ForcedAligner for SnappingAligner {
    async fn align(
        &self,
        segments: &[SubtitleItem],
        _audio: &Path,
        _language: &str,
        context: AlignmentContext,
        _cancel: &CancellationToken,
    ) -> Result<Vec<SubtitleItem>, CapabilityError> {
        Ok(segments
            .iter()
            .cloned()
            .map(|mut s| {
                s.start_time = s.start_time.floor();
                s.end_time = s.end_time.ceil().min(context.chunk.duration());
                s
            })
            .collect())
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.pipeline.concurrency = 2;
    config.pipeline.chunk_duration_secs = 60.0;
    config.pipeline.retry_backoff_ms = 1;
    config
}

fn ctc_settings() -> AlignmentSettings {
    AlignmentSettings {
        mode: "ctc".to_string(),
        model_path: Some(PathBuf::from("/models/ctc.onnx")),
        aligner_path: Some(PathBuf::from("/usr/local/bin/ctc-align")),
    }
}

#[tokio::test]
async fn test_pipeline_withCtcAligner_shouldUseAlignedTimesInAbsoluteTime() -> Result<()> {
    common::init_test_logging();
    let aligner = create_aligner_with(&ctc_settings(), |_, _| -> Arc<dyn ForcedAligner> { Arc::new(SnappingAligner) });
    assert_eq!(aligner.name(), "ctc");

    let transcriber = MockTranscriber::working().with_segments_per_chunk(3);
    let pipeline = Pipeline::new(test_config(), Arc::new(transcriber), Arc::new(MockTranslator::working()), aligner)?;

    let output = pipeline
        .run(&MediaSource::new("lecture.mp4", 150.0), None, &CancellationToken::new())
        .await?;

    assert_eq!(output.chunks_processed, 3);
    assert_eq!(output.subtitles.len(), 9);
    // Third chunk is 30s long: segments of 10s starting at 120s
    let last = &output.subtitles[8];
    assert_eq!(last.start_time, 140.0);
    assert_eq!(last.end_time, 150.0);
    assert!(output.subtitles.iter().all(|s| s.has_valid_timing()));
    Ok(())
}

#[tokio::test]
async fn test_pipeline_ctcWithoutPaths_shouldFallBackToPassThrough() -> Result<()> {
    common::init_test_logging();
    let mut settings = ctc_settings();
    settings.aligner_path = None;
    let aligner = create_aligner(&settings);
    assert!(matches!(aligner, AlignmentStrategy::None));

    let pipeline = Pipeline::new(
        test_config(),
        Arc::new(MockTranscriber::working()),
        Arc::new(MockTranslator::working()),
        aligner,
    )?;
    let output = pipeline
        .run(&MediaSource::new("clip.wav", 60.0), None, &CancellationToken::new())
        .await?;

    assert_eq!(output.subtitles[1].start_time, 30.0);
    Ok(())
}

#[tokio::test]
async fn test_pipeline_translatorFailure_shouldAbortRun() -> Result<()> {
    common::init_test_logging();
    let pipeline = Pipeline::new(
        test_config(),
        Arc::new(MockTranscriber::working()),
        Arc::new(MockTranslator::new(MockBehavior::NotAvailable)),
        AlignmentStrategy::None,
    )?;

    let result = pipeline
        .run(&MediaSource::new("clip.wav", 120.0), None, &CancellationToken::new())
        .await;

    match result {
        Err(AppError::Capability(error)) => {
            assert_eq!(error.code(), "capability.not_available");
            assert!(!error.should_report());
        }
        other => panic!("expected capability error, got {:?}", other.map(|o| o.chunks_processed)),
    }
    Ok(())
}

#[tokio::test]
async fn test_pipeline_smallBatches_shouldTranslateEverything() -> Result<()> {
    let mut config = test_config();
    config.pipeline.translation_batch_size = 1;
    let translator = MockTranslator::working();
    let counters = translator.counters();

    let pipeline = Pipeline::new(
        config,
        Arc::new(MockTranscriber::working()),
        Arc::new(translator),
        AlignmentStrategy::None,
    )?;
    let output = pipeline
        .run(&MediaSource::new("clip.wav", 180.0), Some(&common::sample_glossary()), &CancellationToken::new())
        .await?;

    assert_eq!(counters.calls(), 6);
    assert!(counters.peak_in_flight() <= 2);
    assert!(output.subtitles.iter().all(|s| s.translated.starts_with("[zh] ")));
    Ok(())
}

#[test]
fn test_pipeline_invalidConfig_shouldBeRejected() {
    let mut config = test_config();
    config.pipeline.concurrency = 0;

    let result = Pipeline::new(
        config,
        Arc::new(MockTranscriber::working()),
        Arc::new(MockTranslator::working()),
        AlignmentStrategy::None,
    );

    assert!(matches!(result, Err(AppError::Config(_))));
}

#[tokio::test]
async fn test_pipeline_checkpointThenRestore_shouldRoundTripWorkingSet() -> Result<()> {
    let pipeline = Pipeline::new(
        test_config(),
        Arc::new(MockTranscriber::working()),
        Arc::new(MockTranslator::working()),
        AlignmentStrategy::None,
    )?;
    let media = MediaSource::new("/videos/ep1.mkv", 120.0);
    let output = pipeline.run(&media, None, &CancellationToken::new()).await?;

    let mut store = SnapshotStore::new();
    let initial = output.checkpoint(&mut store, &media);

    let mut working = WorkingSet {
        subtitles: output.subtitles.clone(),
        file_id: store.get(&initial).and_then(|s| s.file_id.clone()),
        file_name: Some(media.display_name()),
        ..WorkingSet::default()
    };
    working.subtitles[0].translated = "edited".to_string();

    let outcome = restore_snapshot(&mut store, &mut working, &initial)?;

    assert!(!outcome.cross_file);
    assert!(outcome.backup_id.is_some());
    assert_eq!(working.subtitles, output.subtitles);
    assert_eq!(store.len(), 2);
    Ok(())
}

#[test]
fn test_pipeline_onCurrentThreadRuntime_shouldComplete() {
    common::init_test_logging();
    let pipeline = Pipeline::new(
        test_config(),
        Arc::new(MockTranscriber::slow(5)),
        Arc::new(MockTranslator::working()),
        AlignmentStrategy::None,
    )
    .unwrap();

    let result = tokio_test::block_on(async {
        pipeline
            .run(&MediaSource::new("clip.wav", 90.0), None, &CancellationToken::new())
            .await
    });

    let output = result.unwrap();
    assert_eq!(output.chunks_processed, 2);
    assert_eq!(output.subtitles.len(), 4);
}
