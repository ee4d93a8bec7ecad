//! Parallel validation scheduler.
//!
//! # Architecture
//!
//! ```text
//!   +------------------- WorkQueue --------------------+
//!   |  lock -> { rows, cols, subs remaining }          |
//!   +-------^-----------------^-----------------^------+
//!           | try_acquire     |                 |
//!     +-----+-----+     +-----+-----+     +-----+-----+
//!     | Worker 0  |     | Worker 1  | ... | Worker K-1|
//!     | stats,log |     | stats,log |     | stats,log |
//!     +-----+-----+     +-----+-----+     +-----+-----+
//!           |                 |                 |
//!           +------ InvalidFlag (atomic, read without the lock)
//! ```
//!
//! - [`queue`]: the lock-protected countdown queue and the invalid flag
//! - [`worker`]: acquire/validate loop with the two cancellation points
//! - [`metrics`]: per-worker critical-section timing and its aggregation
//! - [`run`]: fixed pool spawn, join barrier, report assembly
//! - [`tas_lock`]: the test-and-set spin lock option for the queue

pub mod metrics;
pub mod queue;
pub mod run;
pub mod tas_lock;
pub mod worker;

pub use metrics::{ContentionSummary, Log2Hist, WorkerStats};
pub use queue::{InvalidFlag, LockStrategy, TaskAssignment, UnitCounts, WorkQueue};
pub use run::{validate_parallel, RunConfig, RunReport, WorkerOutcome};
pub use tas_lock::{TasGuard, TasLock};
pub use worker::{run_worker, WorkerExit, WorkerState};
