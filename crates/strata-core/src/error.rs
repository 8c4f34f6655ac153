use thiserror::Error;

/// Grid construction failures. Raised before the first tick ever runs.
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("Grid side length must be at least 3, got {0}")]
    SideTooSmall(usize),

    #[error("{layer} heightmap has {actual} cells, expected {expected} ({side}x{side})")]
    SideMismatch {
        layer: &'static str,
        actual: usize,
        expected: usize,
        side: usize,
    },

    #[error("{layer} heightmap has {actual} cells but the stone heightmap has {expected}")]
    LengthMismatch {
        layer: &'static str,
        actual: usize,
        expected: usize,
    },
}
