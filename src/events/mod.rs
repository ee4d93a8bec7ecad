//! Timestamped per-worker event logs.
//!
//! # Model
//!
//! Every worker appends [`LogEvent`]s to its own [`EventLog`] during the run.
//! Nothing else touches a log until the join barrier, so appends are plain
//! `Vec::push` with no synchronization. After the barrier the logs are handed
//! to [`merge_events`] which produces one globally ordered stream.
//!
//! # Timestamps
//!
//! Timestamps are nanoseconds since the run started, read from a shared
//! [`RunClock`] backed by `Instant`. `Instant` is monotonic, so timestamps
//! within one worker's log never decrease.
//!
//! # Summary data
//!
//! Totals and averages are not events and never enter a log. The report
//! writer appends them after the merged stream, so they cannot perturb the
//! merge.

pub mod merge;

pub use merge::{merge_events, merge_text_buffers, TextLine};

use crate::grid::UnitKind;
use std::fmt;
use std::time::Instant;

/// Run-relative monotonic clock. `Copy`, so every worker holds its own.
#[derive(Clone, Copy, Debug)]
pub struct RunClock {
    start: Instant,
}

impl RunClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Nanoseconds since [`RunClock::start`]. Saturates after ~584 years.
    #[inline]
    pub fn now_ns(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    #[inline]
    pub fn started_at(&self) -> Instant {
        self.start
    }
}

/// What happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// Units granted by the work queue; stamped inside the critical section.
    Grabbed {
        kind: UnitKind,
        count: usize,
        before: usize,
        after: usize,
    },
    /// One trip through the critical section, granted or not. The event
    /// timestamp is the exit time.
    CsWindow { entry_ns: u64 },
    Validated { kind: UnitKind, index: usize },
    FoundError { kind: UnitKind, index: usize },
}

/// One logged event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogEvent {
    pub timestamp_ns: u64,
    pub worker: usize,
    pub kind: EventKind,
}

impl LogEvent {
    /// Human-readable message, without the timestamp.
    pub fn message(&self) -> Message<'_> {
        Message(self)
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self.kind, EventKind::FoundError { .. })
    }
}

/// `Display` adapter returned by [`LogEvent::message`].
pub struct Message<'a>(&'a LogEvent);

impl fmt::Display for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = self.0.worker;
        match self.0.kind {
            EventKind::Grabbed {
                kind,
                count,
                before,
                after,
            } => write!(
                f,
                "Thread {w} grabbed {count} {kind} tasks (counter: {before} -> {after})"
            ),
            // Rendered lines end with the timestamp, which is the exit time.
            EventKind::CsWindow { entry_ns } => {
                write!(f, "Thread {w} entered CS at {entry_ns} and exited at")
            }
            EventKind::Validated { kind, index } => {
                write!(f, "Thread {w} validated {kind} {index}")
            }
            EventKind::FoundError { kind, index } => {
                write!(f, "Thread {w} found error in {kind} {index}")
            }
        }
    }
}

/// Renders as a log line: `<message> <timestamp_ns>`.
impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.message(), self.timestamp_ns)
    }
}

/// Append-only event buffer owned by one worker.
#[derive(Debug)]
pub struct EventLog {
    worker: usize,
    clock: RunClock,
    events: Vec<LogEvent>,
}

impl EventLog {
    pub fn new(worker: usize, clock: RunClock) -> Self {
        Self {
            worker,
            clock,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn worker(&self) -> usize {
        self.worker
    }

    #[inline]
    pub fn clock(&self) -> RunClock {
        self.clock
    }

    /// Record `kind` stamped with the current time.
    #[inline]
    pub fn record(&mut self, kind: EventKind) {
        let now = self.clock.now_ns();
        self.record_at(now, kind);
    }

    /// Record `kind` with a timestamp taken earlier (e.g. inside a critical
    /// section). Timestamps must not go backwards within one log.
    #[inline]
    pub fn record_at(&mut self, timestamp_ns: u64, kind: EventKind) {
        debug_assert!(
            self.events
                .last()
                .map_or(true, |last| last.timestamp_ns <= timestamp_ns),
            "event log timestamps must be non-decreasing"
        );
        self.events.push(LogEvent {
            timestamp_ns,
            worker: self.worker,
            kind,
        });
    }

    #[inline]
    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take the buffered events, leaving the log empty.
    pub fn drain(&mut self) -> Vec<LogEvent> {
        std::mem::take(&mut self.events)
    }

    /// Render as a flat text buffer, one `<message> <timestamp>` line per event.
    pub fn render_text(&self) -> String {
        use std::fmt::Write as _;
        let mut out = String::with_capacity(self.events.len() * 48);
        for ev in &self.events {
            let _ = writeln!(out, "{ev}");
        }
        out
    }
}
