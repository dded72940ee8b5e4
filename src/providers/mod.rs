/*!
 * Capability implementations that ship with the crate.
 *
 * Real transcription and translation backends live outside this crate and
 * plug in through the traits in `pipeline::capabilities`. This module
 * holds the mocks used by tests, benches and dry runs:
 * - `mock`: configurable transcriber and translator with call accounting
 */

pub mod mock;

pub use mock::{MockBehavior, MockCounters, MockTranscriber, MockTranslator};
