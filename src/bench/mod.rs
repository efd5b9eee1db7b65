//! Benchmark and regression helpers shared by the CLI, the Criterion benches
//! and the integration tests.
//!
//! - [`stats`]: wall-clock timing of repeated traversals and their summary
//! - [`verify`](mod@verify): level histogram check against a known answer, with a deadline

pub mod stats;
pub mod verify;

pub use stats::{measure, TimingStats};
pub use verify::{expected_histogram, verify, VerifyError, REFERENCE_DATASET, REFERENCE_HISTOGRAM, REFERENCE_SOURCE};
