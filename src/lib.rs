/*!
 * # subweave - chunked transcription, alignment and translation for subtitles
 *
 * A Rust library that turns long media into translated, checked subtitles.
 *
 * ## Features
 *
 * - Split media into fixed-length chunks and optionally process only the
 *   first N minutes
 * - Transcribe chunks in parallel with bounded concurrency, per-call
 *   deadlines, retries and cooperative cancellation
 * - Optional forced alignment through an external CTC aligner
 * - Batched translation with glossary hints
 * - Consistency and terminology reports for CJK subtitle text
 * - Glossary management with JSON/CSV exchange
 * - Bounded snapshot history with restore-with-backup
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration and the settings store
 * - `subtitle`: The working subtitle model
 * - `pipeline`: Chunking, concurrency, alignment and the orchestrator:
 *   - `pipeline::capabilities`: Traits for external transcribers, translators and aligners
 *   - `pipeline::concurrency`: Parallel map, semaphore, timeouts and retries
 *   - `pipeline::chunks`: Chunk planning and duration budgets
 *   - `pipeline::alignment`: Alignment strategies
 *   - `pipeline::orchestrator`: The end-to-end `Pipeline`
 * - `validation`: Consistency and terminology checks
 * - `glossary`: Glossary lifecycle, import/export and migration
 * - `history`: Snapshot store and restore
 * - `language_utils`: ISO language codes and language detection
 * - `providers`: Mock capabilities for tests and dry runs
 * - `errors`: Error types and their categories
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod glossary;
pub mod history;
pub mod language_utils;
pub mod pipeline;
pub mod providers;
pub mod subtitle;
pub mod validation;

// Re-export main types for easier usage
pub use app_config::{Config, JsonFileSettingsStore, MemorySettingsStore, SettingsStore};
pub use errors::{AppError, CapabilityError, ErrorCategory, GlossaryError, SnapshotError};
pub use glossary::{Glossary, GlossaryItem};
pub use history::{SnapshotStore, SubtitleSnapshot, WorkingSet};
pub use language_utils::{get_language_name, language_codes_match, LanguageDetector, ScriptDetector};
pub use pipeline::{MediaSource, Pipeline, PipelineOutput};
pub use subtitle::{SpeakerProfile, SubtitleItem};
pub use validation::{ConsistencyValidator, TerminologyChecker};
