//! Solved-grid generator.
//!
//! Starts from the canonical pattern `(b * (r % b) + r / b + c) % N`, then
//! shuffles row bands, rows within a band, column stacks, columns within a
//! stack, and the digit labels. Every one of those moves preserves row,
//! column and subgroup uniqueness, so the result is always a solution.

use super::Grid;
use crate::stdx::XorShift64;

/// Parameters for [`GenerateConfig::generate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerateConfig {
    /// Subgroup side `b`; the grid side is `b * b`.
    pub box_size: usize,
    pub seed: u64,
    /// Plant exactly one duplicate so the grid fails validation.
    pub corrupt: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            box_size: 3,
            seed: 0x5eed,
            corrupt: false,
        }
    }
}

impl GenerateConfig {
    pub fn generate(&self) -> Grid {
        let mut rng = XorShift64::new(self.seed);
        let grid = generate_solved(self.box_size, &mut rng);
        if self.corrupt {
            corrupt_one_cell(&grid, &mut rng)
        } else {
            grid
        }
    }
}

/// Generate a shuffled solved grid of side `box_size * box_size`.
///
/// # Panics
/// Panics if `box_size` is 0 or the cell count `box_size^4` overflows `usize`.
pub fn generate_solved(box_size: usize, rng: &mut XorShift64) -> Grid {
    assert!(box_size > 0, "box_size must be > 0");
    let Some(side) = box_size
        .checked_mul(box_size)
        .filter(|side| side.checked_mul(*side).is_some())
    else {
        panic!("box_size {box_size} too large: cell count overflows usize");
    };

    let rows = shuffled_axis(box_size, rng);
    let cols = shuffled_axis(box_size, rng);
    let mut labels: Vec<i64> = (1..=side as i64).collect();
    rng.shuffle(&mut labels);

    let mut cells = Vec::with_capacity(side * side);
    for &r in &rows {
        for &c in &cols {
            let base = (box_size * (r % box_size) + r / box_size + c) % side;
            cells.push(labels[base]);
        }
    }
    match Grid::from_cells(side, cells) {
        Ok(grid) => grid,
        // side is b*b and cells has side*side entries by construction.
        Err(err) => unreachable!("generated grid rejected: {err}"),
    }
}

/// Band order shuffled, then order within each band.
fn shuffled_axis(box_size: usize, rng: &mut XorShift64) -> Vec<usize> {
    let mut bands: Vec<usize> = (0..box_size).collect();
    rng.shuffle(&mut bands);
    let mut out = Vec::with_capacity(box_size * box_size);
    for band in bands {
        let start = out.len();
        out.extend(band * box_size..(band + 1) * box_size);
        rng.shuffle(&mut out[start..]);
    }
    out
}

/// Copy a value from elsewhere in the same row, duplicating it.
///
/// A 1x1 grid has no second cell, so its only cell goes out of range instead.
fn corrupt_one_cell(grid: &Grid, rng: &mut XorShift64) -> Grid {
    let side = grid.side();
    if side == 1 {
        return grid.with_cell(0, 0, 0);
    }
    let row = rng.next_usize(side);
    let col = rng.next_usize(side);
    let other = (col + 1 + rng.next_usize(side - 1)) % side;
    grid.with_cell(row, col, grid.get(row, other))
}
