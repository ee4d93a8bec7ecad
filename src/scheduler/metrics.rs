//! # Contention Metrics
//!
//! Per-worker critical-section timing, aggregated after the join barrier.
//!
//! ## Design
//!
//! - **Per-worker local stats**: every update is plain integer arithmetic on
//!   memory the worker owns exclusively. No atomics.
//! - **Cache-line aligned**: workers' stats live side by side in one `Vec`;
//!   alignment keeps their hot counters off each other's cache lines.
//! - **Post-run aggregation**: [`ContentionSummary::aggregate`] runs on the
//!   orchestrating thread once every worker has been joined.
//!
//! ## What is measured
//!
//! Around every `try_acquire` the worker reads the run clock twice: the
//! *entry* timestamp right before asking for the lock and the *exit*
//! timestamp right after the queue returned. Both are nanoseconds since run
//! start. Their sums, maxima and count give the mean/worst entry and exit
//! times reported for the run. The difference `exit - entry` (the round trip
//! through the critical section, including the wait for the lock) goes into
//! a log2 histogram for tail percentiles.

/// Log2 histogram of nanosecond observations.
///
/// Bucket 0 covers `[0, 2)`, bucket `k` covers `[2^k, 2^(k+1))`. Precision is
/// an order of magnitude, which is what lock-contention tails need.
#[derive(Clone, Debug)]
pub struct Log2Hist {
    pub buckets: [u64; 64],
    pub count: u64,
    /// Wrapping sum of recorded values.
    pub sum: u64,
}

impl Default for Log2Hist {
    fn default() -> Self {
        Self::new()
    }
}

impl Log2Hist {
    pub const fn new() -> Self {
        Self {
            buckets: [0; 64],
            count: 0,
            sum: 0,
        }
    }

    #[inline]
    pub fn record(&mut self, v: u64) {
        let b = bucket_index(v);
        self.buckets[b] = self.buckets[b].wrapping_add(1);
        self.count = self.count.wrapping_add(1);
        self.sum = self.sum.wrapping_add(v);
    }

    /// Lower bound of the bucket holding percentile `p` in `[0.0, 1.0]`.
    /// `None` when empty.
    pub fn percentile_lower_bound(&self, p: f64) -> Option<u64> {
        if self.count == 0 {
            return None;
        }
        debug_assert!((0.0..=1.0).contains(&p), "percentile must be in [0.0, 1.0]");
        let target = (((self.count as f64) * p).ceil() as u64).max(1);
        let mut seen = 0u64;
        for (i, &c) in self.buckets.iter().enumerate() {
            seen = seen.wrapping_add(c);
            if seen >= target {
                return Some(bucket_lower_bound(i));
            }
        }
        Some(1u64 << 63)
    }

    #[inline]
    pub fn p50(&self) -> Option<u64> {
        self.percentile_lower_bound(0.50)
    }

    #[inline]
    pub fn p99(&self) -> Option<u64> {
        self.percentile_lower_bound(0.99)
    }

    /// Mean, or 0 when empty.
    #[inline]
    pub fn mean(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            self.sum / self.count
        }
    }

    pub fn merge(&mut self, other: &Log2Hist) {
        for (dst, src) in self.buckets.iter_mut().zip(other.buckets.iter()) {
            *dst = dst.wrapping_add(*src);
        }
        self.count = self.count.wrapping_add(other.count);
        self.sum = self.sum.wrapping_add(other.sum);
    }
}

#[inline]
fn bucket_index(v: u64) -> usize {
    if v == 0 {
        0
    } else {
        (63 - v.leading_zeros()) as usize
    }
}

#[inline]
fn bucket_lower_bound(bucket: usize) -> u64 {
    if bucket == 0 {
        0
    } else {
        1u64 << bucket
    }
}

/// Critical-section timing owned by one worker.
///
/// NOT thread-safe. Read only after the owning worker has been joined.
#[derive(Clone, Debug, Default)]
#[repr(align(64))]
pub struct WorkerStats {
    /// Sum of entry timestamps (ns since run start).
    pub entry_sum: u64,
    /// Sum of exit timestamps (ns since run start).
    pub exit_sum: u64,
    pub worst_entry: u64,
    pub worst_exit: u64,
    /// Trips through the critical section, granted or not.
    pub cs_count: u64,
    /// `exit - entry` per trip.
    pub round_trip_ns: Log2Hist,
}

const _: () = {
    assert!(std::mem::align_of::<WorkerStats>() >= 64);
};

impl WorkerStats {
    pub const fn new() -> Self {
        Self {
            entry_sum: 0,
            exit_sum: 0,
            worst_entry: 0,
            worst_exit: 0,
            cs_count: 0,
            round_trip_ns: Log2Hist::new(),
        }
    }

    /// Record one trip through the critical section.
    #[inline]
    pub fn record_cs(&mut self, entry_ns: u64, exit_ns: u64) {
        debug_assert!(entry_ns <= exit_ns, "exit before entry");
        self.entry_sum = self.entry_sum.wrapping_add(entry_ns);
        self.exit_sum = self.exit_sum.wrapping_add(exit_ns);
        self.worst_entry = self.worst_entry.max(entry_ns);
        self.worst_exit = self.worst_exit.max(exit_ns);
        self.cs_count += 1;
        self.round_trip_ns.record(exit_ns.saturating_sub(entry_ns));
    }
}

/// Run-wide critical-section statistics.
#[derive(Clone, Debug, Default)]
pub struct ContentionSummary {
    pub cs_count: u64,
    pub entry_sum: u64,
    pub exit_sum: u64,
    pub mean_entry_ns: u64,
    pub mean_exit_ns: u64,
    pub worst_entry_ns: u64,
    pub worst_exit_ns: u64,
    pub round_trip_ns: Log2Hist,
    pub worker_count: usize,
}

impl ContentionSummary {
    /// Fold finished per-worker stats. Means are `sum / count`, 0 when no
    /// worker entered the critical section.
    pub fn aggregate<'a, I>(workers: I) -> Self
    where
        I: IntoIterator<Item = &'a WorkerStats>,
    {
        let mut out = Self::default();
        for w in workers {
            out.cs_count += w.cs_count;
            out.entry_sum = out.entry_sum.wrapping_add(w.entry_sum);
            out.exit_sum = out.exit_sum.wrapping_add(w.exit_sum);
            out.worst_entry_ns = out.worst_entry_ns.max(w.worst_entry);
            out.worst_exit_ns = out.worst_exit_ns.max(w.worst_exit);
            out.round_trip_ns.merge(&w.round_trip_ns);
            out.worker_count += 1;
        }
        if out.cs_count > 0 {
            out.mean_entry_ns = out.entry_sum / out.cs_count;
            out.mean_exit_ns = out.exit_sum / out.cs_count;
        }
        out
    }
}
