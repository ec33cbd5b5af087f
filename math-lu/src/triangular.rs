//! Forward and back substitution
//!
//! The solvers only read the triangle they need (plus the diagonal when it is
//! not implicitly one), so they run directly on the packed LU storage.
//! Batched variants treat every column of the right-hand side as an
//! independent system; the columns go to the rayon pool when there are enough
//! of them.

use crate::blas_helpers::dot;
use crate::error::LuError;
use crate::parallel::try_for_each_lane;
use crate::traits::ComplexField;
use ndarray::{Array2, ArrayView2, ArrayViewMut1, Axis, s};
use num_traits::{ToPrimitive, Zero};

/// Whether the triangular factor has an implicit unit diagonal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagonal {
    /// Diagonal entries are 1 and never read
    Unit,
    /// Diagonal entries are stored and divided by
    NonUnit,
}

/// Solve `L y = b` in place, overwriting `b` with `y`
///
/// `l` is read below the diagonal (and on it for [`Diagonal::NonUnit`]).
pub fn forward_substitute<T: ComplexField>(
    l: ArrayView2<'_, T>,
    diag: Diagonal,
    mut b: ArrayViewMut1<'_, T>,
) -> Result<(), LuError> {
    let n = check_dims(l, b.len())?;

    for i in 0..n {
        let sum = dot(l.slice(s![i, ..i]), b.slice(s![..i]));
        let mut yi = b[i] - sum;
        if diag == Diagonal::NonUnit {
            yi = divide_by_diagonal(yi, l[[i, i]], i)?;
        }
        b[i] = finite(yi, i)?;
    }
    Ok(())
}

/// Solve `U x = y` in place, overwriting `b` with `x`
///
/// `u` is read above the diagonal (and on it for [`Diagonal::NonUnit`]).
pub fn back_substitute<T: ComplexField>(
    u: ArrayView2<'_, T>,
    diag: Diagonal,
    mut b: ArrayViewMut1<'_, T>,
) -> Result<(), LuError> {
    let n = check_dims(u, b.len())?;

    for i in (0..n).rev() {
        let sum = dot(u.slice(s![i, i + 1..]), b.slice(s![i + 1..]));
        let mut xi = b[i] - sum;
        if diag == Diagonal::NonUnit {
            xi = divide_by_diagonal(xi, u[[i, i]], i)?;
        }
        b[i] = finite(xi, i)?;
    }
    Ok(())
}

/// Forward substitution for every column of `b`, in place
pub fn forward_substitute_many<T: ComplexField>(
    l: ArrayView2<'_, T>,
    diag: Diagonal,
    b: &mut Array2<T>,
    parallel_threshold: usize,
) -> Result<(), LuError> {
    check_dims(l, b.nrows())?;
    try_for_each_lane(b.view_mut(), Axis(1), parallel_threshold, |_, col| {
        forward_substitute(l, diag, col)
    })
}

/// Back substitution for every column of `b`, in place
pub fn back_substitute_many<T: ComplexField>(
    u: ArrayView2<'_, T>,
    diag: Diagonal,
    b: &mut Array2<T>,
    parallel_threshold: usize,
) -> Result<(), LuError> {
    check_dims(u, b.nrows())?;
    try_for_each_lane(b.view_mut(), Axis(1), parallel_threshold, |_, col| {
        back_substitute(u, diag, col)
    })
}

fn check_dims<T>(t: ArrayView2<'_, T>, rhs_len: usize) -> Result<usize, LuError> {
    let n = t.nrows();
    if t.ncols() != n {
        return Err(LuError::NotSquare {
            rows: n,
            cols: t.ncols(),
        });
    }
    if rhs_len != n {
        return Err(LuError::DimensionMismatch {
            expected: n,
            got: rhs_len,
        });
    }
    Ok(n)
}

#[inline]
fn divide_by_diagonal<T: ComplexField>(value: T, d: T, i: usize) -> Result<T, LuError> {
    let magnitude = d.norm();
    if magnitude == T::Real::zero() {
        return Err(LuError::SingularMatrix {
            step: i,
            magnitude: magnitude.to_f64().unwrap_or(0.0),
        });
    }
    Ok(value.scaled_div(&d))
}

#[inline]
fn finite<T: ComplexField>(value: T, i: usize) -> Result<T, LuError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(LuError::Overflow { step: i })
    }
}
