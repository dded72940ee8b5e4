/*!
 * Media-to-subtitles pipeline.
 *
 * # Architecture
 *
 * - `capabilities`: traits for the external transcriber, translator and aligner
 * - `concurrency`: bounded parallel map, semaphore, timeouts and retries
 * - `chunks`: chunk planning and duration-budget selection
 * - `alignment`: timestamp-correction strategies and their factory
 * - `orchestrator`: the `Pipeline` that sequences all stages
 */

pub mod alignment;
pub mod capabilities;
pub mod chunks;
pub mod concurrency;
pub mod orchestrator;

// Re-export main types
pub use alignment::{create_aligner, AlignmentStrategy};
pub use capabilities::{ForcedAligner, MediaSource, Transcriber, Translator};
pub use chunks::{plan_chunks, select_chunks_by_duration, ChunkSpec, DurationBudget};
pub use concurrency::{map_in_parallel, retry_transient, with_timeout, Permit, RetryPolicy, Semaphore};
pub use orchestrator::{Pipeline, PipelineOutput};
