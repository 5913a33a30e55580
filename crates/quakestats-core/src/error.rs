// =============================================================================
// Error Types
// =============================================================================
//
// One error enum for the whole library. Fitting problems are reported with
// enough text to act on (which dimension disagreed, why the linear algebra
// gave up) because callers of a statistics library usually cannot recover
// programmatically - they fix their inputs.
//
// =============================================================================

use thiserror::Error;

/// Errors produced while building or fitting a model.
#[derive(Debug, Error)]
pub enum StatsError {
    /// Shapes of the inputs disagree (e.g. X has more rows than y).
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// An input had no rows or no columns.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// An input value is outside the valid domain (negative weight,
    /// non-finite response, ...).
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// The weighted least squares step could not be solved.
    #[error("linear algebra failure: {0}")]
    LinearAlgebra(String),

    /// A model formula could not be parsed.
    #[error("formula error: {0}")]
    Formula(String),
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, StatsError>;
