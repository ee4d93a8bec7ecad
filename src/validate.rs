//! Unit validation and the sequential baseline.
//!
//! A unit is valid when its `N` cells hold each of `1..=N` exactly once.
//! [`Validator`] keeps a reusable seen-set so each worker allocates it once
//! per run instead of once per unit.

use crate::grid::{Grid, UnitKind};
use std::fmt;
use std::time::{Duration, Instant};

/// Final determination for a whole grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid,
}

impl Verdict {
    pub fn is_valid(self) -> bool {
        self == Verdict::Valid
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit checker over one grid with per-instance scratch.
///
/// Not shared: each worker owns one.
#[derive(Debug)]
pub struct Validator<'g> {
    grid: &'g Grid,
    seen: Vec<bool>,
}

impl<'g> Validator<'g> {
    pub fn new(grid: &'g Grid) -> Self {
        Self {
            grid,
            seen: vec![false; grid.side()],
        }
    }

    #[inline]
    pub fn grid(&self) -> &'g Grid {
        self.grid
    }

    /// Check unit `index` of `kind`.
    ///
    /// # Panics
    /// Panics if `index >= N`.
    pub fn check(&mut self, kind: UnitKind, index: usize) -> bool {
        let grid = self.grid();
        let n = grid.side();
        assert!(index < n, "unit index {index} out of range for side {n}");
        self.seen.fill(false);

        match kind {
            UnitKind::Row => (0..n).all(|c| mark(&mut self.seen, grid.get(index, c))),
            UnitKind::Column => (0..n).all(|r| mark(&mut self.seen, grid.get(r, index))),
            UnitKind::Subgroup => {
                let b = grid.box_size();
                let (r0, c0) = ((index / b) * b, (index % b) * b);
                (r0..r0 + b).all(|r| (c0..c0 + b).all(|c| mark(&mut self.seen, grid.get(r, c))))
            }
        }
    }
}

/// Record `value` in `seen`. False when out of `1..=N` or already present.
#[inline]
fn mark(seen: &mut [bool], value: i64) -> bool {
    if value < 1 || value as u64 > seen.len() as u64 {
        return false;
    }
    let slot = &mut seen[(value - 1) as usize];
    if *slot {
        return false;
    }
    *slot = true;
    true
}

/// One-shot unit check. Prefer [`Validator`] in loops.
pub fn check_unit(grid: &Grid, kind: UnitKind, index: usize) -> bool {
    Validator::new(grid).check(kind, index)
}

/// Result of [`validate_sequential`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequentialReport {
    pub verdict: Verdict,
    /// First failing unit in check order, if any.
    pub first_error: Option<(UnitKind, usize)>,
    pub units_checked: usize,
    pub elapsed: Duration,
}

/// Single-threaded baseline: for each `i`, row `i`, column `i`, subgroup `i`;
/// stops at the first failure.
pub fn validate_sequential(grid: &Grid) -> SequentialReport {
    let start = Instant::now();
    let mut validator = Validator::new(grid);
    let mut units_checked = 0;
    let mut first_error = None;

    'outer: for i in 0..grid.units_per_kind() {
        for kind in UnitKind::ALL {
            units_checked += 1;
            if !validator.check(kind, i) {
                first_error = Some((kind, i));
                break 'outer;
            }
        }
    }

    SequentialReport {
        verdict: if first_error.is_some() {
            Verdict::Invalid
        } else {
            Verdict::Valid
        },
        first_error,
        units_checked,
        elapsed: start.elapsed(),
    }
}
