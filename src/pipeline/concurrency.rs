/*!
 * Concurrency primitives shared by every pipeline stage.
 *
 * - `map_in_parallel`: bounded, order-preserving, fail-fast parallel map
 * - `Semaphore`: counting permits released on drop
 * - `with_timeout`: deadline + cancellation around one external call
 * - `retry_transient`: exponential backoff for retryable failures
 */

use futures::stream::{self, StreamExt};
use log::debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OwnedSemaphorePermit;
use tokio_util::sync::CancellationToken;

use crate::errors::CapabilityError;

/// Apply `f` to every item with at most `concurrency` calls in flight.
///
/// Results line up with the input order. The first failure aborts the
/// whole operation and drops the calls still in flight. Firing `cancel`
/// stops dispatching and resolves to `CapabilityError::Cancelled`.
pub async fn map_in_parallel<T, R, E, F, Fut>(
    items: Vec<T>,
    concurrency: usize,
    cancel: &CancellationToken,
    f: F,
) -> Result<Vec<R>, E>
where
    F: Fn(T, usize) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: From<CapabilityError>,
{
    if cancel.is_cancelled() {
        return Err(CapabilityError::Cancelled.into());
    }

    let total = items.len();
    let mut slots: Vec<Option<R>> = (0..total).map(|_| None).collect();

    let mut in_flight = std::pin::pin!(
        stream::iter(items.into_iter().enumerate())
            .map(|(index, item)| {
                let call = f(item, index);
                async move { (index, call.await) }
            })
            .buffer_unordered(concurrency.max(1))
    );

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Parallel map cancelled with {} of {} items pending", slots.iter().filter(|s| s.is_none()).count(), total);
                return Err(CapabilityError::Cancelled.into());
            }
            next = in_flight.next() => match next {
                Some((index, Ok(value))) => slots[index] = Some(value),
                Some((_, Err(e))) => return Err(e),
                None => break,
            }
        }
    }

    Ok(slots.into_iter().flatten().collect())
}

/// Counting semaphore bounding simultaneous external calls
#[derive(Debug, Clone)]
pub struct Semaphore {
    inner: Arc<tokio::sync::Semaphore>,
    max: usize,
}

/// A held permit; dropping it returns the slot
#[derive(Debug)]
pub struct Permit {
    _permit: OwnedSemaphorePermit,
}

impl Permit {
    /// Return the slot explicitly
    pub fn release(self) {}
}

impl Semaphore {
    /// Create a semaphore with `max` permits (at least one)
    pub fn new(max: usize) -> Self {
        let max = max.max(1);
        Self {
            inner: Arc::new(tokio::sync::Semaphore::new(max)),
            max,
        }
    }

    /// Suspend until a permit is available
    pub async fn acquire(&self) -> Result<Permit, CapabilityError> {
        self.inner
            .clone()
            .acquire_owned()
            .await
            .map(|permit| Permit { _permit: permit })
            .map_err(|_| CapabilityError::Cancelled)
    }

    /// Like `acquire`, but gives up when `cancel` fires
    pub async fn acquire_cancellable(&self, cancel: &CancellationToken) -> Result<Permit, CapabilityError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CapabilityError::Cancelled),
            permit = self.acquire() => permit,
        }
    }

    /// Permits currently free
    pub fn available(&self) -> usize {
        self.inner.available_permits()
    }

    /// Total capacity
    pub fn capacity(&self) -> usize {
        self.max
    }
}

/// Race `call` against a deadline and the cancellation token.
///
/// A deadline resolves exactly like cancellation: the call future is
/// dropped and nothing it would have produced is observed.
pub async fn with_timeout<T, F>(
    limit: Duration,
    cancel: &CancellationToken,
    call: F,
) -> Result<T, CapabilityError>
where
    F: Future<Output = Result<T, CapabilityError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CapabilityError::Cancelled),
        outcome = tokio::time::timeout(limit, call) => match outcome {
            Ok(result) => result,
            Err(_) => Err(CapabilityError::Timeout(limit.as_secs())),
        },
    }
}

/// Retry settings for transient capability failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Base delay, doubled on each retry
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Never retry
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff * 2u32.saturating_pow(attempt)
    }
}

/// Run `op` and retry it while it fails with a retryable error.
///
/// `op` receives the 0-based attempt number. Cancellation during a
/// backoff sleep ends the loop immediately.
pub async fn retry_transient<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, CapabilityError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, CapabilityError>>,
{
    let mut attempt = 0;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                debug!("Attempt {} failed ({}), retrying in {:?}", attempt + 1, e.code(), delay);
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(CapabilityError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
