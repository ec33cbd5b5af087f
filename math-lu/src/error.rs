//! Error type shared by factorization and solves

use thiserror::Error;

/// Errors that can occur during LU factorization or a subsequent solve
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LuError {
    #[error("Matrix is empty")]
    Empty,
    #[error("Matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },
    #[error("Matrix dimensions mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("Non-finite entry at ({row}, {col})")]
    NonFinite { row: usize, col: usize },
    #[error("Index sequence of length {len} is not a permutation")]
    InvalidPermutation { len: usize },
    /// Zero pivot with no pivoting, or a zero scaling factor.
    #[error("Zero pivot at elimination step {step}")]
    SingularPivot { step: usize },
    /// No candidate pivot above the tolerance at `step`.
    #[error("Matrix is singular or nearly singular at step {step} (pivot magnitude {magnitude:e})")]
    SingularMatrix { step: usize, magnitude: f64 },
    /// An entry computed at `step` left the finite range.
    #[error("Overflow to a non-finite value at step {step}")]
    Overflow { step: usize },
}

impl LuError {
    /// True for errors raised by input validation, before any arithmetic
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            LuError::Empty
                | LuError::NotSquare { .. }
                | LuError::DimensionMismatch { .. }
                | LuError::NonFinite { .. }
                | LuError::InvalidPermutation { .. }
        )
    }

    /// True when the failure is numerical rather than a malformed input
    pub fn is_singular(&self) -> bool {
        matches!(
            self,
            LuError::SingularPivot { .. } | LuError::SingularMatrix { .. }
        )
    }
}
