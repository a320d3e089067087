use thiserror::Error;

/// Failures of the bounds computation and range filter.
///
/// These are structural (schema or data problems), never transient, so
/// nothing in the crate retries on them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FenceError {
    /// The requested column is not part of the table schema.
    #[error("column '{column}' does not exist")]
    InvalidColumn { column: String },

    /// The column has no usable values, so quartiles are undefined.
    #[error("column '{column}' has no non-missing values; bounds are undefined")]
    EmptyColumn { column: String },

    /// Values exist but the fences come out NaN, e.g. both quartiles are
    /// the same infinity.
    #[error("column '{column}': bounds are undefined for its values")]
    UndefinedBounds { column: String },

    /// A non-missing cell could not be read as a number.
    #[error("column '{column}', row {row}: '{value}' is not numeric")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("fence multiplier must be finite and non-negative, got {0}")]
    InvalidMultiplier(f64),
}

pub type Result<T> = std::result::Result<T, FenceError>;
