//! Run orchestration: spawn the fixed worker pool, join, aggregate.
//!
//! ```text
//!   validate_parallel(grid, config)
//!     ├─ InvalidFlag, WorkQueue, RunClock        (owned here)
//!     ├─ Vec<WorkerState>                        (one per worker, owned here)
//!     ├─ thread::scope ── worker i borrows &mut states[i], &queue, &grid
//!     │                  ... join barrier ...
//!     ├─ ContentionSummary::aggregate(stats)
//!     └─ merge_events(logs)                      → RunReport
//! ```
//!
//! Threads are created once and joined once per run. Worker panics propagate
//! out of `validate_parallel` when the scope ends.

use super::metrics::ContentionSummary;
use super::queue::{InvalidFlag, LockStrategy, TaskAssignment, UnitCounts, WorkQueue};
use super::worker::{run_worker, WorkerExit, WorkerState};
use crate::events::{merge_events, LogEvent, RunClock};
use crate::grid::Grid;
use crate::validate::Verdict;
use std::thread;
use std::time::Duration;

/// Run configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Worker thread count `K`.
    pub workers: usize,
    /// Max units granted per acquisition.
    pub batch: usize,
    pub lock: LockStrategy,
}

impl RunConfig {
    /// Validate configuration. Panics on invalid values.
    pub fn validate(&self) {
        assert!(self.workers > 0, "workers must be > 0");
        assert!(self.batch > 0, "batch must be > 0");
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().max(1),
            batch: 1,
            lock: LockStrategy::Mutex,
        }
    }
}

/// Per-worker outcome kept for auditing.
#[derive(Clone, Debug)]
pub struct WorkerOutcome {
    pub id: usize,
    pub exit: WorkerExit,
    pub grants: Vec<TaskAssignment>,
    pub units_validated: usize,
    pub cs_count: u64,
}

/// Everything a run produced.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub verdict: Verdict,
    /// All events, stably sorted by timestamp.
    pub events: Vec<LogEvent>,
    pub contention: ContentionSummary,
    /// Wall time from clock start to the join barrier.
    pub total: Duration,
    pub workers: Vec<WorkerOutcome>,
    /// Counters left in the queue at the end; all zero on a valid grid.
    pub remaining: UnitCounts,
    pub config: RunConfig,
}

impl RunReport {
    /// Units granted across all workers.
    pub fn units_granted(&self) -> usize {
        self.workers
            .iter()
            .flat_map(|w| &w.grants)
            .map(|a| a.count)
            .sum()
    }

    pub fn error_events(&self) -> impl Iterator<Item = &LogEvent> {
        self.events.iter().filter(|e| e.is_error())
    }

    #[inline]
    pub fn total_ns(&self) -> u64 {
        u64::try_from(self.total.as_nanos()).unwrap_or(u64::MAX)
    }
}

/// Validate `grid` with a fixed pool of `config.workers` threads.
///
/// # Panics
/// Panics if `config` is invalid or a worker thread panics.
pub fn validate_parallel(grid: &Grid, config: &RunConfig) -> RunReport {
    config.validate();

    let flag = InvalidFlag::new();
    let queue = WorkQueue::for_grid(grid, config.batch, config.lock, &flag);
    let clock = RunClock::start();
    let mut states: Vec<WorkerState> = (0..config.workers)
        .map(|id| WorkerState::new(id, clock))
        .collect();

    thread::scope(|s| {
        for state in states.iter_mut() {
            let queue = &queue;
            thread::Builder::new()
                .name(format!("gridcheck-worker-{}", state.id))
                .spawn_scoped(s, move || run_worker(state, queue, grid))
                .expect("failed to spawn worker thread");
        }
    });
    let total = clock.started_at().elapsed();

    let contention = ContentionSummary::aggregate(states.iter().map(|w| &w.stats));
    let remaining = queue.remaining();
    let verdict = if flag.is_set() {
        Verdict::Invalid
    } else {
        Verdict::Valid
    };

    let mut logs = Vec::with_capacity(states.len());
    let mut workers = Vec::with_capacity(states.len());
    for mut state in states {
        logs.push(state.log.drain());
        workers.push(WorkerOutcome {
            id: state.id,
            exit: state.exit,
            grants: state.grants,
            units_validated: state.units_validated,
            cs_count: state.stats.cs_count,
        });
    }

    RunReport {
        verdict,
        events: merge_events(logs),
        contention,
        total,
        workers,
        remaining,
        config: *config,
    }
}
