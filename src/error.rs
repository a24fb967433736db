use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KDIndexError {
    #[error("General error: {0}")]
    General(String),

    #[error("A KDTree must have at least one dimension.")]
    ZeroDimensions,

    #[error("Expected a point with {expected} dimensions, got {actual}.")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Coordinate on axis {axis} is not a finite number.")]
    InvalidCoordinate { axis: usize },

    #[error("The number of requested neighbors must be at least 1.")]
    InvalidNeighborCount,

    #[error("Cannot index {0} items, ids are limited to u32.")]
    TooManyItems(usize),

    #[error("Added {actual} items when expected {expected}.")]
    ItemCountMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, KDIndexError>;
