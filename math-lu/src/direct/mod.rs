//! Direct solvers for dense linear systems
//!
//! This module provides:
//! - [`factorize`]: LU factorization with none, partial or full pivoting
//! - [`solve`] / [`solve_many`]: factorize and solve in one call
//! - [`solve_with`] / [`solve_many_with`]: reuse a factorization across
//!   right-hand sides

mod factorize;
mod solve;

pub use factorize::{LuFactorization, PivotRecord, factorize};
pub use solve::{
    lu_solve, relative_residual, solve, solve_many, solve_many_with, solve_with,
};
