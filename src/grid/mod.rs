//! Square Sudoku grids and the units they are checked by.
//!
//! A grid of side `N` has `N` rows, `N` columns and `N` subgroups, each a
//! block of `b x b` cells where `b * b == N`. Construction enforces the
//! perfect-square precondition once so unit checks never have to.
//!
//! Grids are immutable once built and are shared read-only by every worker.

pub mod generate;
pub mod load;

pub use generate::{generate_solved, GenerateConfig};
pub use load::Input;

use crate::error::LoadError;
use std::fmt;

/// One of the three unit families checked by the validator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnitKind {
    Row,
    Column,
    Subgroup,
}

impl UnitKind {
    /// Fixed priority order in which the work queue hands units out.
    pub const ALL: [UnitKind; 3] = [UnitKind::Row, UnitKind::Column, UnitKind::Subgroup];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::Column => "column",
            Self::Subgroup => "subgrid",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable `N x N` grid, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    side: usize,
    box_size: usize,
    cells: Box<[i64]>,
}

impl Grid {
    /// Build a grid from row-major cells.
    ///
    /// # Errors
    /// - [`LoadError::NotPerfectSquare`] if `side` is not a perfect square
    ///   (zero included).
    /// - [`LoadError::GridTooLarge`] if `side * side` overflows.
    /// - [`LoadError::TruncatedGrid`] if `cells.len() != side * side`.
    pub fn from_cells(side: usize, cells: Vec<i64>) -> Result<Self, LoadError> {
        let box_size = exact_sqrt(side).ok_or(LoadError::NotPerfectSquare { side })?;
        let expected = side
            .checked_mul(side)
            .ok_or(LoadError::GridTooLarge { side })?;
        if cells.len() != expected {
            return Err(LoadError::TruncatedGrid {
                expected,
                got: cells.len(),
            });
        }
        Ok(Self {
            side,
            box_size,
            cells: cells.into_boxed_slice(),
        })
    }

    /// Build a grid from a list of rows. Every row must have `rows.len()` cells.
    pub fn from_rows<R: AsRef<[i64]>>(rows: &[R]) -> Result<Self, LoadError> {
        let side = rows.len();
        let mut cells = Vec::with_capacity(side * side);
        for (row, r) in rows.iter().enumerate() {
            let r = r.as_ref();
            if r.len() != side {
                return Err(LoadError::RaggedRow {
                    row,
                    len: r.len(),
                    side,
                });
            }
            cells.extend_from_slice(r);
        }
        Self::from_cells(side, cells)
    }

    /// Grid side `N`.
    #[inline]
    pub fn side(&self) -> usize {
        self.side
    }

    /// Subgroup side `b`, where `b * b == N`.
    #[inline]
    pub fn box_size(&self) -> usize {
        self.box_size
    }

    /// Cell at `(row, col)`.
    ///
    /// # Panics
    /// Panics if either coordinate is `>= N`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> i64 {
        assert!(row < self.side && col < self.side, "cell out of bounds");
        self.cells[row * self.side + col]
    }

    /// Number of units of each kind. Always `N`.
    #[inline]
    pub fn units_per_kind(&self) -> usize {
        self.side
    }

    /// Copy of this grid with one cell replaced.
    pub fn with_cell(&self, row: usize, col: usize, value: i64) -> Self {
        assert!(row < self.side && col < self.side, "cell out of bounds");
        let mut cells = self.cells.clone();
        cells[row * self.side + col] = value;
        Self {
            side: self.side,
            box_size: self.box_size,
            cells,
        }
    }

    /// Iterate rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[i64]> {
        self.cells.chunks_exact(self.side.max(1))
    }
}

/// Integer square root when `n` is a non-zero perfect square.
pub fn exact_sqrt(n: usize) -> Option<usize> {
    if n == 0 {
        return None;
    }
    // Float estimate, then correct for rounding on large inputs.
    let mut r = (n as f64).sqrt() as usize;
    while r.saturating_mul(r) > n {
        r -= 1;
    }
    while (r + 1).saturating_mul(r + 1) <= n {
        r += 1;
    }
    (r * r == n).then_some(r)
}
