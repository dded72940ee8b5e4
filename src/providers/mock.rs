/*!
 * Mock capability implementations for testing.
 *
 * Both mocks share a `MockBehavior`:
 * - `Working`: always succeeds
 * - `Intermittent`: every Nth call fails with a transient network error
 * - `Failing`: always fails with a non-retryable error
 * - `FailOn`: fails only for one chunk (transcriber) or call (translator)
 * - `Slow`: succeeds after a delay, honoring cancellation
 * - `NotAvailable`: reports the capability as not installed
 *
 * Every mock counts calls and tracks how many calls are in flight, so
 * tests can assert concurrency bounds.
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::errors::CapabilityError;
use crate::pipeline::capabilities::{Transcriber, TranscriptionRequest, TranslationRequest, Translator};
use crate::subtitle::SubtitleItem;

/// Behavior mode for the mock capabilities
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails every Nth call with a retryable error
    Intermittent { fail_every: usize },
    /// Always fails with a non-retryable error
    Failing,
    /// Fails for one chunk index (transcriber) or call number (translator)
    FailOn { index: usize },
    /// Succeeds after a delay (for timeout and concurrency testing)
    Slow { delay_ms: u64 },
    /// Capability is not installed
    NotAvailable,
}

/// Call accounting shared between clones of a mock
#[derive(Debug, Default)]
pub struct MockCounters {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockCounters {
    /// Total calls started
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Calls currently running
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous calls observed
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn enter(self: &Arc<Self>) -> (usize, InFlightGuard) {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        (call, InFlightGuard(Arc::clone(self)))
    }
}

/// Decrements the in-flight counter even when the call is dropped mid-way
struct InFlightGuard(Arc<MockCounters>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn simulate(
    behavior: MockBehavior,
    call: usize,
    index: usize,
    cancel: &CancellationToken,
    failure: impl Fn(String) -> CapabilityError,
) -> Result<(), CapabilityError> {
    match behavior {
        MockBehavior::Working => Ok(()),
        MockBehavior::Intermittent { fail_every } => {
            if fail_every > 0 && call % fail_every == fail_every - 1 {
                Err(CapabilityError::Network(format!("Simulated connection reset on call {}", call)))
            } else {
                Ok(())
            }
        }
        MockBehavior::Failing => Err(failure("Simulated failure".to_string())),
        MockBehavior::FailOn { index: failing } => {
            if index == failing {
                Err(failure(format!("Simulated failure at {}", index)))
            } else {
                Ok(())
            }
        }
        MockBehavior::Slow { delay_ms } => {
            tokio::select! {
                _ = cancel.cancelled() => Err(CapabilityError::Cancelled),
                _ = tokio::time::sleep(Duration::from_millis(delay_ms)) => Ok(()),
            }
        }
        MockBehavior::NotAvailable => Err(CapabilityError::NotAvailable("mock".to_string())),
    }
}

/// Mock transcriber producing evenly spaced segments per chunk
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    behavior: MockBehavior,
    segments_per_chunk: usize,
    counters: Arc<MockCounters>,
}

impl MockTranscriber {
    /// Create a mock with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            segments_per_chunk: 2,
            counters: Arc::new(MockCounters::default()),
        }
    }

    /// Create a transcriber that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a transcriber that always fails
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a transcriber that fails every Nth call
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a transcriber that answers after `delay_ms`
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set how many segments each chunk yields
    pub fn with_segments_per_chunk(mut self, count: usize) -> Self {
        self.segments_per_chunk = count.max(1);
        self
    }

    /// Shared call counters
    pub fn counters(&self) -> Arc<MockCounters> {
        Arc::clone(&self.counters)
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(
        &self,
        request: TranscriptionRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Vec<SubtitleItem>, CapabilityError> {
        let (call, _guard) = self.counters.enter();
        let chunk = request.chunk;
        simulate(self.behavior, call, chunk.index, cancel, CapabilityError::TranscriptionFailed).await?;

        let step = chunk.duration() / self.segments_per_chunk as f64;
        Ok((0..self.segments_per_chunk)
            .map(|i| {
                let start = step * i as f64;
                SubtitleItem::new(start, start + step, format!("chunk {} line {}", chunk.index, i))
            })
            .collect())
    }
}

/// Mock translator tagging each line with the target language.
///
/// Glossary translations are appended for every hinted term found in the
/// original, so its output passes terminology checks.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    behavior: MockBehavior,
    counters: Arc<MockCounters>,
}

impl MockTranslator {
    /// Create a mock with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            counters: Arc::new(MockCounters::default()),
        }
    }

    /// Create a translator that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a translator that always fails
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Shared call counters
    pub fn counters(&self) -> Arc<MockCounters> {
        Arc::clone(&self.counters)
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(
        &self,
        batch: &[SubtitleItem],
        request: TranslationRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, CapabilityError> {
        let (call, _guard) = self.counters.enter();
        simulate(self.behavior, call, call, cancel, CapabilityError::TranslationFailed).await?;

        Ok(batch
            .iter()
            .map(|item| {
                let lowered = item.original.to_lowercase();
                let mut text = format!("[{}] {}", request.target_language, item.original);
                for (term, translation) in request.glossary_hints {
                    if lowered.contains(&term.to_lowercase()) {
                        text.push(' ');
                        text.push_str(translation);
                    }
                }
                text
            })
            .collect())
    }
}
