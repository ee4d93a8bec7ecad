//! Error types for loading validation inputs.
//!
//! Only input loading can fail. Grid invalidity is an outcome reported through
//! [`Verdict`](crate::Verdict), and malformed log lines seen while merging
//! textual buffers are skipped rather than surfaced.
//!
//! The enum is `#[non_exhaustive]`; consumers should include a fallback arm.

use std::fmt;
use std::io;

/// Which header field a [`LoadError`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderField {
    /// Worker count `K`.
    Workers,
    /// Grid side `N`.
    Side,
    /// Task batch size `taskInc`.
    Batch,
}

impl HeaderField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Workers => "worker count",
            Self::Side => "grid side",
            Self::Batch => "batch size",
        }
    }
}

/// Errors from reading and parsing a validation input.
#[derive(Debug)]
#[non_exhaustive]
pub enum LoadError {
    /// The input could not be read.
    Io(io::Error),
    /// A header value is missing.
    MissingHeader { field: HeaderField },
    /// A token is not an integer.
    NotAnInteger { position: usize, token: String },
    /// A header value must be at least 1.
    NonPositive { field: HeaderField, value: i64 },
    /// Grid side is not a perfect square, so subgroups are undefined.
    NotPerfectSquare { side: usize },
    /// `N*N` does not fit in `usize`.
    GridTooLarge { side: usize },
    /// Fewer than `N*N` cells follow the header.
    TruncatedGrid { expected: usize, got: usize },
    /// Extra tokens after the last cell.
    TrailingData { position: usize },
    /// Row lengths disagree when building a grid from rows.
    RaggedRow { row: usize, len: usize, side: usize },
}

impl LoadError {
    /// Creates an I/O error variant.
    #[inline]
    pub fn io(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::MissingHeader { field } => write!(f, "missing {}", field.as_str()),
            Self::NotAnInteger { position, token } => {
                write!(f, "token {position} is not an integer: {token:?}")
            }
            Self::NonPositive { field, value } => {
                write!(f, "{} must be >= 1 (got {value})", field.as_str())
            }
            Self::NotPerfectSquare { side } => {
                write!(f, "N must be a perfect square (got {side})")
            }
            Self::GridTooLarge { side } => {
                write!(f, "grid side {side} is too large (N*N overflows)")
            }
            Self::TruncatedGrid { expected, got } => {
                write!(f, "grid truncated: expected {expected} cells, got {got}")
            }
            Self::TrailingData { position } => {
                write!(f, "unexpected trailing data at token {position}")
            }
            Self::RaggedRow { row, len, side } => {
                write!(f, "row {row} has {len} cells (expected {side})")
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(err: io::Error) -> Self {
        Self::io(err)
    }
}
