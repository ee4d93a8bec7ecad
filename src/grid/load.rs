//! Input file parsing.
//!
//! Format: whitespace-separated `K N taskInc` followed by `N * N` integers,
//! row-major. Line breaks carry no meaning. A batch size larger than `N` is
//! capped to `N`.

use super::Grid;
use crate::error::{HeaderField, LoadError};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// A parsed validation input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Input {
    /// Worker count `K`.
    pub workers: usize,
    /// Units granted per acquisition (`taskInc`), already capped to `N`.
    pub batch: usize,
    pub grid: Grid,
}

impl Input {
    /// Read and parse an input file.
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse an input from text.
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let mut tokens = text.split_whitespace().enumerate();

        let mut header = |field: HeaderField| -> Result<usize, LoadError> {
            let (position, token) = tokens.next().ok_or(LoadError::MissingHeader { field })?;
            let value = parse_int(position, token)?;
            if value < 1 {
                return Err(LoadError::NonPositive { field, value });
            }
            usize::try_from(value).map_err(|_| LoadError::NotAnInteger {
                position,
                token: token.to_string(),
            })
        };

        let workers = header(HeaderField::Workers)?;
        let side = header(HeaderField::Side)?;
        let batch = header(HeaderField::Batch)?;

        if super::exact_sqrt(side).is_none() {
            return Err(LoadError::NotPerfectSquare { side });
        }

        let expected = side
            .checked_mul(side)
            .ok_or(LoadError::GridTooLarge { side })?;
        // Each cell takes at least two bytes of text, so a short file cannot
        // reserve memory for the grid its header claims.
        let mut cells = Vec::with_capacity(expected.min(text.len() / 2 + 1));
        for (position, token) in tokens.by_ref() {
            if cells.len() == expected {
                return Err(LoadError::TrailingData { position });
            }
            cells.push(parse_int(position, token)?);
        }
        if cells.len() != expected {
            return Err(LoadError::TruncatedGrid {
                expected,
                got: cells.len(),
            });
        }

        Ok(Self {
            workers,
            batch: batch.min(side),
            grid: Grid::from_cells(side, cells)?,
        })
    }

    /// Render back into the input file format, one grid row per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} {} {}", self.workers, self.grid.side(), self.batch);
        for row in self.grid.rows() {
            let mut first = true;
            for v in row {
                if !first {
                    out.push(' ');
                }
                first = false;
                let _ = write!(out, "{v}");
            }
            out.push('\n');
        }
        out
    }
}

fn parse_int(position: usize, token: &str) -> Result<i64, LoadError> {
    token.parse::<i64>().map_err(|_| LoadError::NotAnInteger {
        position,
        token: token.to_string(),
    })
}
