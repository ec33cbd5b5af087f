//! Solving linear systems with an LU factorization
//!
//! A factorization costs `O(n^3)` once; every right-hand side after that is two
//! triangular solves at `O(n^2)`. `r` right-hand sides bundled as the columns
//! of a matrix therefore cost `O(n^3 + r n^2)` in total.

use super::factorize::{LuFactorization, factorize};
use crate::blas_helpers::{dot, vector_norm};
use crate::config::LuConfig;
use crate::error::LuError;
use crate::traits::ComplexField;
use crate::triangular::{
    back_substitute, back_substitute_many, forward_substitute, forward_substitute_many,
};
use ndarray::{Array1, Array2};
use num_traits::Zero;

impl<T: ComplexField> LuFactorization<T> {
    /// Solve Ax = b using the pre-computed LU factorization
    pub fn solve(&self, b: &Array1<T>) -> Result<Array1<T>, LuError> {
        self.check_rhs(b.len())?;
        if let Some((row, _)) = b.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(LuError::NonFinite { row, col: 0 });
        }

        // Ly = Pb
        let mut x = self.row_perm.permute_vec(b)?;
        forward_substitute(self.lu.view(), self.lower_diagonal(), x.view_mut())?;

        // Ux' = y
        back_substitute(self.lu.view(), self.upper_diagonal(), x.view_mut())?;

        // x = Q x'
        if self.strategy().pivots_columns() {
            x = self.col_perm.scatter_vec(&x)?;
        }
        Ok(x)
    }

    /// Solve AX = B for every column of `b`
    pub fn solve_many(&self, b: &Array2<T>) -> Result<Array2<T>, LuError> {
        self.check_rhs(b.nrows())?;
        if let Some(((row, col), _)) = b.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(LuError::NonFinite { row, col });
        }
        log::debug!(
            "LU batched solve: n = {}, {} right-hand sides",
            self.dim(),
            b.ncols()
        );

        let mut x = self.row_perm.permute_rows(b)?;
        forward_substitute_many(
            self.lu.view(),
            self.lower_diagonal(),
            &mut x,
            self.parallel_threshold,
        )?;
        back_substitute_many(
            self.lu.view(),
            self.upper_diagonal(),
            &mut x,
            self.parallel_threshold,
        )?;

        if self.strategy().pivots_columns() {
            x = self.col_perm.inverse().permute_rows(&x)?;
        }
        Ok(x)
    }

    /// Inverse of the factorized matrix
    pub fn inverse(&self) -> Result<Array2<T>, LuError> {
        self.solve_many(&Array2::eye(self.dim()))
    }

    fn check_rhs(&self, got: usize) -> Result<(), LuError> {
        if got != self.dim() {
            return Err(LuError::DimensionMismatch {
                expected: self.dim(),
                got,
            });
        }
        Ok(())
    }
}

/// Solve Ax = b, factorizing `a` with `config`
pub fn solve<T: ComplexField>(
    a: &Array2<T>,
    b: &Array1<T>,
    config: &LuConfig<T::Real>,
) -> Result<Array1<T>, LuError> {
    if b.len() != a.nrows() {
        return Err(LuError::DimensionMismatch {
            expected: a.nrows(),
            got: b.len(),
        });
    }
    factorize(a, config)?.solve(b)
}

/// Solve Ax = b reusing an existing factorization of `A`
pub fn solve_with<T: ComplexField>(
    factorization: &LuFactorization<T>,
    b: &Array1<T>,
) -> Result<Array1<T>, LuError> {
    factorization.solve(b)
}

/// Solve AX = B with a single factorization of `a`
pub fn solve_many<T: ComplexField>(
    a: &Array2<T>,
    b: &Array2<T>,
    config: &LuConfig<T::Real>,
) -> Result<Array2<T>, LuError> {
    if b.nrows() != a.nrows() {
        return Err(LuError::DimensionMismatch {
            expected: a.nrows(),
            got: b.nrows(),
        });
    }
    factorize(a, config)?.solve_many(b)
}

/// Solve AX = B reusing an existing factorization of `A`
pub fn solve_many_with<T: ComplexField>(
    factorization: &LuFactorization<T>,
    b: &Array2<T>,
) -> Result<Array2<T>, LuError> {
    factorization.solve_many(b)
}

/// Solve Ax = b using LU decomposition with partial pivoting
///
/// This is a convenience function that combines factorization and solve.
pub fn lu_solve<T>(a: &Array2<T>, b: &Array1<T>) -> Result<Array1<T>, LuError>
where
    T: ComplexField,
    LuConfig<T::Real>: Default,
{
    solve(a, b, &LuConfig::default())
}

/// Relative residual ||Ax - b|| / ||b|| (plain ||Ax - b|| when b = 0)
pub fn relative_residual<T: ComplexField>(
    a: &Array2<T>,
    x: &Array1<T>,
    b: &Array1<T>,
) -> Result<T::Real, LuError> {
    if a.ncols() != x.len() {
        return Err(LuError::DimensionMismatch {
            expected: a.ncols(),
            got: x.len(),
        });
    }
    if a.nrows() != b.len() {
        return Err(LuError::DimensionMismatch {
            expected: a.nrows(),
            got: b.len(),
        });
    }

    let residual: Array1<T> = a
        .rows()
        .into_iter()
        .zip(b.iter())
        .map(|(row, &bi)| dot(row, x.view()) - bi)
        .collect();

    let b_norm = vector_norm(b);
    let r_norm = vector_norm(&residual);
    if b_norm == T::Real::zero() {
        Ok(r_norm)
    } else {
        Ok(r_norm / b_norm)
    }
}
