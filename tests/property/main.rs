//! Property-based tests for queue coverage, verdicts and log merging.
//!
//! Run with: `cargo test --test property`

mod log_merge;
mod queue_coverage;
mod verdict_invariance;
