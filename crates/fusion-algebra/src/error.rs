use thiserror::Error;

/// Errors raised while building algebraic types from raw data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlgebraError {
    /// The number of scalars does not match the dimension of the target type.
    #[error("Shape mismatch: expected {expected} scalars, got {actual}")]
    ShapeMismatch {
        /// Number of scalars the type holds.
        expected: usize,
        /// Number of scalars provided.
        actual: usize,
    },
}
