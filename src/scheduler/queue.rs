//! Shared Work Queue
//!
//! # Model
//!
//! Three countdown counters (rows, columns, subgroups remaining) behind one
//! lock. A worker calls [`WorkQueue::try_acquire`] and receives a contiguous
//! slice of at most `batch` units of a single kind, or `None` once the queue
//! is exhausted or closed by the [`InvalidFlag`].
//!
//! ```text
//!   rows  [ granted | granted | remaining........ ]
//!           0                 ^ start = total - remaining
//! ```
//!
//! # Correctness Invariants
//!
//! - **Fixed priority**: rows drain before columns, columns before subgroups.
//! - **Exact coverage**: while the flag is clear, grants of each kind tile
//!   `0..total` with no gaps and no overlap. Start offsets derive from the
//!   counter itself, read and written under the same lock hold.
//! - **Closed on invalidity**: once the flag is set no further grants are
//!   made; the remaining counters stay where they were.
//! - **Encapsulation**: counters are private and only reachable through
//!   `try_acquire`, so nothing can touch them outside the critical section.
//!
//! # Locking
//!
//! One coarse lock for the whole queue. The batch size amortizes its cost.
//! [`LockStrategy`] picks a blocking `std::sync::Mutex` or a test-and-set
//! spin lock; the observable contract is the same for both.

use super::tas_lock::TasLock;
use crate::events::{EventKind, EventLog};
use crate::grid::{Grid, UnitKind};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

// ============================================================================
// Invalid flag
// ============================================================================

/// Run-wide "grid is invalid" signal.
///
/// Starts clear, is set at most once in spirit (later sets are no-ops) and is
/// never cleared. Readable without the queue lock.
#[derive(Debug, Default)]
pub struct InvalidFlag(AtomicBool);

impl InvalidFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Set the flag. Returns `true` if this call was the one that set it.
    #[inline]
    pub fn set(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }
}

// ============================================================================
// Assignment types
// ============================================================================

/// Units handed to one worker by one `try_acquire` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskAssignment {
    pub kind: UnitKind,
    pub start: usize,
    pub count: usize,
}

impl TaskAssignment {
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.count
    }
}

/// Unit totals per kind. For a grid of side `N` all three are `N`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnitCounts {
    pub rows: usize,
    pub cols: usize,
    pub subs: usize,
}

impl UnitCounts {
    pub fn uniform(n: usize) -> Self {
        Self {
            rows: n,
            cols: n,
            subs: n,
        }
    }

    #[inline]
    pub fn get(&self, kind: UnitKind) -> usize {
        match kind {
            UnitKind::Row => self.rows,
            UnitKind::Column => self.cols,
            UnitKind::Subgroup => self.subs,
        }
    }

    #[inline]
    fn get_mut(&mut self, kind: UnitKind) -> &mut usize {
        match kind {
            UnitKind::Row => &mut self.rows,
            UnitKind::Column => &mut self.cols,
            UnitKind::Subgroup => &mut self.subs,
        }
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.rows + self.cols + self.subs
    }
}

// ============================================================================
// Lock selection
// ============================================================================

/// Primitive guarding the queue counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LockStrategy {
    /// `std::sync::Mutex`: waiters block in the kernel.
    #[default]
    Mutex,
    /// Test-and-set spin lock: waiters spin with backoff.
    TestAndSet,
}

impl LockStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mutex => "mutex",
            Self::TestAndSet => "tas",
        }
    }
}

impl fmt::Display for LockStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LockStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mutex" => Ok(Self::Mutex),
            "tas" | "test-and-set" => Ok(Self::TestAndSet),
            other => Err(format!("unknown lock strategy: {other} (expected mutex|tas)")),
        }
    }
}

#[derive(Debug)]
enum CounterLock {
    Blocking(Mutex<UnitCounts>),
    TestAndSet(TasLock<UnitCounts>),
}

impl CounterLock {
    fn new(strategy: LockStrategy, counts: UnitCounts) -> Self {
        match strategy {
            LockStrategy::Mutex => Self::Blocking(Mutex::new(counts)),
            LockStrategy::TestAndSet => Self::TestAndSet(TasLock::new(counts)),
        }
    }

    /// Run `f` inside the critical section.
    #[inline]
    fn with<R>(&self, f: impl FnOnce(&mut UnitCounts) -> R) -> R {
        match self {
            Self::Blocking(m) => f(&mut lock_or_recover(m)),
            Self::TestAndSet(l) => f(&mut l.lock()),
        }
    }
}

/// Counters are plain integers updated atomically with respect to the lock,
/// so a poisoned mutex still holds consistent state.
#[inline]
fn lock_or_recover(m: &Mutex<UnitCounts>) -> MutexGuard<'_, UnitCounts> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poison) => poison.into_inner(),
    }
}

// ============================================================================
// WorkQueue
// ============================================================================

/// Lock-protected countdown queue of validation units.
#[derive(Debug)]
pub struct WorkQueue<'f> {
    totals: UnitCounts,
    batch: usize,
    strategy: LockStrategy,
    remaining: CounterLock,
    flag: &'f InvalidFlag,
}

impl<'f> WorkQueue<'f> {
    /// # Panics
    /// Panics if `batch` is 0.
    pub fn new(
        totals: UnitCounts,
        batch: usize,
        strategy: LockStrategy,
        flag: &'f InvalidFlag,
    ) -> Self {
        assert!(batch > 0, "batch must be > 0");
        Self {
            totals,
            batch,
            strategy,
            remaining: CounterLock::new(strategy, totals),
            flag,
        }
    }

    /// Queue over every unit of `grid`.
    pub fn for_grid(
        grid: &Grid,
        batch: usize,
        strategy: LockStrategy,
        flag: &'f InvalidFlag,
    ) -> Self {
        Self::new(UnitCounts::uniform(grid.units_per_kind()), batch, strategy, flag)
    }

    #[inline]
    pub fn batch(&self) -> usize {
        self.batch
    }

    #[inline]
    pub fn strategy(&self) -> LockStrategy {
        self.strategy
    }

    #[inline]
    pub fn totals(&self) -> UnitCounts {
        self.totals
    }

    #[inline]
    pub fn flag(&self) -> &'f InvalidFlag {
        self.flag
    }

    /// Grab the next slice of work.
    ///
    /// Returns `None` when the flag is set or every counter is zero. On a
    /// grant, a `Grabbed` event stamped inside the critical section is
    /// appended to `log` after the lock is released.
    pub fn try_acquire(&self, log: &mut EventLog) -> Option<TaskAssignment> {
        let clock = log.clock();
        let (assignment, before, stamp) = self.remaining.with(|remaining| {
            if self.flag.is_set() {
                return None;
            }
            let stamp = clock.now_ns();
            let kind = UnitKind::ALL
                .into_iter()
                .find(|&k| remaining.get(k) > 0)?;
            let left = remaining.get_mut(kind);
            let before = *left;
            let count = self.batch.min(before);
            *left -= count;
            let assignment = TaskAssignment {
                kind,
                start: self.totals.get(kind) - before,
                count,
            };
            Some((assignment, before, stamp))
        })?;

        log.record_at(
            stamp,
            EventKind::Grabbed {
                kind: assignment.kind,
                count: assignment.count,
                before,
                after: before - assignment.count,
            },
        );
        Some(assignment)
    }

    /// Snapshot of the remaining counters. Takes the lock.
    pub fn remaining(&self) -> UnitCounts {
        self.remaining.with(|r| *r)
    }
}
