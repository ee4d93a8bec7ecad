//! Parallel Sudoku-style grid validation over a lock-protected work queue.
//!
//! ## Scope
//! A grid of side `N` (a perfect square) is valid when every row, column and
//! `sqrt(N) x sqrt(N)` subgroup holds each value `1..=N` exactly once. The
//! `3N` units are handed out by a shared countdown queue to a fixed pool of
//! worker threads, in slices of at most `batch` units.
//!
//! ## Key invariants
//! - Every unit is granted to exactly one worker, in row, column, subgroup
//!   priority order, while the grid is not known to be invalid.
//! - The first invalid unit sets a run-wide flag. Workers poll it before each
//!   acquisition and before each unit, so the run winds down quickly.
//! - Each worker logs into its own buffer; buffers are merged by timestamp
//!   only after every worker has joined.
//! - Critical-section timing is kept per worker and aggregated after the
//!   join, never shared during the run.
//!
//! ## Flow
//! `Input -> WorkQueue -> Workers (validate + log + time) -> join -> merge -> Report`
//!
//! ## Notable entry points
//! - [`Input`]: parse the `K N taskInc` input format.
//! - [`validate_parallel`] / [`RunConfig`]: the threaded run.
//! - [`validate_sequential`]: single-threaded baseline.
//! - [`report`]: text and JSONL report writers.

pub mod error;
pub mod events;
pub mod grid;
pub mod report;
pub mod scheduler;
pub mod stdx;
pub mod validate;

pub use error::{HeaderField, LoadError};
pub use events::{merge_events, merge_text_buffers, EventKind, LogEvent, RunClock};
pub use grid::{GenerateConfig, Grid, Input, UnitKind};
pub use report::ReportFormat;
pub use scheduler::{
    validate_parallel, ContentionSummary, InvalidFlag, LockStrategy, RunConfig, RunReport,
    TaskAssignment, WorkQueue,
};
pub use validate::{validate_sequential, SequentialReport, Verdict};
