use thiserror::Error;

/// A grid that violates the board invariants.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("tile value {value} at ({x}, {y}) is not a power of two between 2 and 2^27")]
    InvalidValue { value: u32, x: usize, y: usize },
    #[error("position ({x}, {y}) lies outside the 4x4 board")]
    OutOfBounds { x: usize, y: usize },
    #[error("more than one tile at ({x}, {y})")]
    DuplicatePosition { x: usize, y: usize },
    #[error("expected 4 rows, found {found}")]
    RowCount { found: usize },
    #[error("row {row} has {found} cells, expected 4")]
    RowLength { row: usize, found: usize },
    #[error("cannot parse cell {token:?}")]
    BadCell { token: String },
}
