//! Worker loop.
//!
//! Each worker repeatedly enters the queue's critical section, takes a slice
//! of units, validates them and logs what it did. It stops when the queue is
//! empty or closed, or when it (or anyone else) finds an invalid unit.
//!
//! # Cancellation points
//!
//! The [`InvalidFlag`](super::InvalidFlag) is polled before every acquire and
//! before every unit inside a granted slice. A worker midway through a slice
//! therefore checks at most one more unit after the flag is set.
//!
//! # Ownership
//!
//! A [`WorkerState`] is borrowed mutably by exactly one worker thread for the
//! run and read by the orchestrator after the join barrier.

use super::metrics::WorkerStats;
use super::queue::{TaskAssignment, WorkQueue};
use crate::events::{EventKind, EventLog, RunClock};
use crate::grid::Grid;
use crate::validate::Validator;

/// Why a worker stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerExit {
    /// Never ran.
    Idle,
    /// The queue had nothing left.
    Exhausted,
    /// This worker found an invalid unit.
    FoundInvalid,
    /// Another worker found an invalid unit first.
    Cancelled,
}

/// Everything one worker owns during a run.
#[derive(Debug)]
pub struct WorkerState {
    pub id: usize,
    pub stats: WorkerStats,
    pub log: EventLog,
    /// Every slice this worker was granted, in order.
    pub grants: Vec<TaskAssignment>,
    pub units_validated: usize,
    pub exit: WorkerExit,
}

impl WorkerState {
    pub fn new(id: usize, clock: RunClock) -> Self {
        Self {
            id,
            stats: WorkerStats::new(),
            log: EventLog::new(id, clock),
            grants: Vec::new(),
            units_validated: 0,
            exit: WorkerExit::Idle,
        }
    }
}

/// Run one worker to completion.
pub fn run_worker(state: &mut WorkerState, queue: &WorkQueue<'_>, grid: &Grid) {
    let flag = queue.flag();
    let clock = state.log.clock();
    let mut validator = Validator::new(grid);

    state.exit = loop {
        if flag.is_set() {
            break WorkerExit::Cancelled;
        }

        let entry_ns = clock.now_ns();
        let grant = queue.try_acquire(&mut state.log);
        let exit_ns = clock.now_ns();
        state.stats.record_cs(entry_ns, exit_ns);
        state.log.record_at(exit_ns, EventKind::CsWindow { entry_ns });

        let Some(assignment) = grant else {
            break if flag.is_set() {
                WorkerExit::Cancelled
            } else {
                WorkerExit::Exhausted
            };
        };
        state.grants.push(assignment);

        if let Some(exit) = validate_slice(state, &mut validator, assignment, queue) {
            break exit;
        }
    };
}

/// Validate every unit of `assignment`. `Some(exit)` means stop the worker.
fn validate_slice(
    state: &mut WorkerState,
    validator: &mut Validator<'_>,
    assignment: TaskAssignment,
    queue: &WorkQueue<'_>,
) -> Option<WorkerExit> {
    let flag = queue.flag();
    let kind = assignment.kind;
    for index in assignment.range() {
        if flag.is_set() {
            return Some(WorkerExit::Cancelled);
        }
        if validator.check(kind, index) {
            state.units_validated += 1;
            state.log.record(EventKind::Validated { kind, index });
        } else {
            state.log.record(EventKind::FoundError { kind, index });
            flag.set();
            return Some(WorkerExit::FoundInvalid);
        }
    }
    None
}
