//! Dense LU factorization and direct solvers
//!
//! This crate solves dense square systems `Ax = b` by Gaussian elimination and
//! keeps the factorization around so further right-hand sides only cost two
//! triangular solves.
//!
//! # Features
//!
//! - **Pivoting**: none, partial (row) and full (row + column), selected with
//!   [`PivotStrategy`]
//! - **Factorization**: `P A Q = L U` in packed storage, with the pivot trace,
//!   permutation parity and reconstruction
//! - **Solves**: single and batched right-hand sides, forward/back substitution
//!   on the packed factors
//! - **Generic Scalar Types**: Works with f64, f32, Complex64, Complex32
//! - **Parallelism**: trailing updates and batched solves use rayon (`rayon`
//!   feature, on by default)
//!
//! # Example
//!
//! ```
//! use math_audio_lu::{LuConfig, factorize};
//! use ndarray::array;
//!
//! let a = array![[2.0_f64, 1.0, 1.0], [4.0, 3.0, 3.0], [8.0, 7.0, 9.0]];
//! let lu = factorize(&a, &LuConfig::partial_pivoting())?;
//!
//! let x = lu.solve(&array![4.0, 10.0, 24.0])?;
//! assert!((x[0] - 1.0).abs() < 1e-12);
//!
//! // Reuse the factorization for another right-hand side
//! let y = lu.solve(&array![8.0, 20.0, 48.0])?;
//! assert!((y[2] - 2.0).abs() < 1e-12);
//! # Ok::<(), math_audio_lu::LuError>(())
//! ```

pub mod blas_helpers;
pub mod config;
pub mod direct;
pub mod error;
pub mod operators;
pub mod parallel;
pub mod permutation;
pub mod pivot;
pub mod traits;
pub mod triangular;

// Re-export main types
pub use config::{LuConfig, PivotScaling, PivotTolerance};
pub use error::LuError;
pub use permutation::Permutation;
pub use pivot::{Pivot, PivotStrategy, select_pivot};
pub use traits::ComplexField;
pub use triangular::Diagonal;

// Re-export solvers
pub use direct::{
    LuFactorization, PivotRecord, factorize, lu_solve, relative_residual, solve, solve_many,
    solve_many_with, solve_with,
};
