//! Elementary row and column operations
//!
//! Permutation, scaling and elimination are applied directly to the working
//! matrix instead of being multiplied in as dense `n x n` operators.

use crate::error::LuError;
use crate::traits::ComplexField;
use ndarray::{ArrayView1, ArrayViewMut1, ArrayViewMut2, Zip, s};

/// Exchange rows `i` and `j` in place
pub fn swap_rows<T>(mut a: ArrayViewMut2<'_, T>, i: usize, j: usize) {
    if i == j {
        return;
    }
    let (mut row_i, mut row_j) = a.multi_slice_mut((s![i, ..], s![j, ..]));
    Zip::from(&mut row_i)
        .and(&mut row_j)
        .for_each(|x, y| std::mem::swap(x, y));
}

/// Exchange columns `i` and `j` in place
pub fn swap_cols<T>(mut a: ArrayViewMut2<'_, T>, i: usize, j: usize) {
    if i == j {
        return;
    }
    let (mut col_i, mut col_j) = a.multi_slice_mut((s![.., i], s![.., j]));
    Zip::from(&mut col_i)
        .and(&mut col_j)
        .for_each(|x, y| std::mem::swap(x, y));
}

/// Multiply a row (segment) by `factor`
///
/// A zero factor would destroy the row, so it is reported as a zero pivot at
/// elimination step `step`.
pub fn scale_row<T: ComplexField>(
    mut row: ArrayViewMut1<'_, T>,
    factor: T,
    step: usize,
) -> Result<(), LuError> {
    if factor.is_zero() {
        return Err(LuError::SingularPivot { step });
    }
    row.map_inplace(|x| *x *= factor);
    Ok(())
}

/// `target <- target - multiplier * pivot` over equally long row segments
#[inline]
pub fn eliminate<T: ComplexField>(
    mut target: ArrayViewMut1<'_, T>,
    pivot: ArrayView1<'_, T>,
    multiplier: T,
) {
    Zip::from(&mut target)
        .and(&pivot)
        .for_each(|t, &p| *t -= multiplier * p);
}
