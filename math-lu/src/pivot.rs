//! Pivot selection strategies
//!
//! Each strategy is a plain function with the same signature, picked at call
//! time through [`PivotStrategy`]:
//! - [`no_pivot`]: always the diagonal entry; no recovery from a zero
//! - [`partial_pivot`]: largest modulus in the current column, `O(n - k)`
//! - [`full_pivot`]: largest modulus in the trailing submatrix, `O((n - k)^2)`
//!
//! Full pivoting adds `O(n^3)` comparisons over a whole factorization, so it is
//! only worth it when partial pivoting is not stable enough.

use crate::error::LuError;
use crate::traits::ComplexField;
use ndarray::ArrayView2;
use num_traits::ToPrimitive;

/// Pivoting strategy used by the elimination engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PivotStrategy {
    /// Pivot on `A[k][k]`
    None,
    /// Row interchanges only
    #[default]
    Partial,
    /// Row and column interchanges
    Full,
}

/// Chosen pivot location in the working matrix at one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pivot<R> {
    /// Row of the chosen entry
    pub row: usize,
    /// Column of the chosen entry
    pub col: usize,
    /// Modulus of the chosen entry
    pub magnitude: R,
}

/// Common signature of the selection functions
pub type PivotFn<T> = fn(
    ArrayView2<'_, T>,
    usize,
    <T as ComplexField>::Real,
) -> Result<Pivot<<T as ComplexField>::Real>, LuError>;

impl PivotStrategy {
    /// The selection function implementing this strategy
    pub fn selector<T: ComplexField>(self) -> PivotFn<T> {
        match self {
            PivotStrategy::None => no_pivot::<T>,
            PivotStrategy::Partial => partial_pivot::<T>,
            PivotStrategy::Full => full_pivot::<T>,
        }
    }

    /// True when the strategy may permute columns
    pub fn pivots_columns(self) -> bool {
        matches!(self, PivotStrategy::Full)
    }
}

/// Select the pivot for step `k` of `a` using `strategy`
pub fn select_pivot<T: ComplexField>(
    strategy: PivotStrategy,
    a: ArrayView2<'_, T>,
    k: usize,
    tolerance: T::Real,
) -> Result<Pivot<T::Real>, LuError> {
    (strategy.selector::<T>())(a, k, tolerance)
}

/// Diagonal pivot; a modulus at or below `tolerance` is a zero pivot
pub fn no_pivot<T: ComplexField>(
    a: ArrayView2<'_, T>,
    k: usize,
    tolerance: T::Real,
) -> Result<Pivot<T::Real>, LuError> {
    let magnitude = candidate(a, k, k)?;
    if magnitude <= tolerance {
        return Err(LuError::SingularPivot { step: k });
    }
    Ok(Pivot {
        row: k,
        col: k,
        magnitude,
    })
}

/// Largest modulus among rows `k..n` of column `k`, ties to the smallest row
pub fn partial_pivot<T: ComplexField>(
    a: ArrayView2<'_, T>,
    k: usize,
    tolerance: T::Real,
) -> Result<Pivot<T::Real>, LuError> {
    let n = a.nrows();
    let mut max_val = candidate(a, k, k)?;
    let mut max_row = k;

    for i in (k + 1)..n {
        let val = candidate(a, i, k)?;
        if val > max_val {
            max_val = val;
            max_row = i;
        }
    }

    check_magnitude(k, max_val, tolerance)?;
    Ok(Pivot {
        row: max_row,
        col: k,
        magnitude: max_val,
    })
}

/// Largest modulus in the trailing submatrix `k..n x k..n`, ties to the
/// smallest row and then the smallest column
pub fn full_pivot<T: ComplexField>(
    a: ArrayView2<'_, T>,
    k: usize,
    tolerance: T::Real,
) -> Result<Pivot<T::Real>, LuError> {
    let n = a.nrows();
    let mut best = Pivot {
        row: k,
        col: k,
        magnitude: candidate(a, k, k)?,
    };

    for i in k..n {
        for j in k..a.ncols() {
            let val = candidate(a, i, j)?;
            if val > best.magnitude {
                best = Pivot {
                    row: i,
                    col: j,
                    magnitude: val,
                };
            }
        }
    }

    check_magnitude(k, best.magnitude, tolerance)?;
    Ok(best)
}

/// Modulus of `a[i][j]`, which must be finite to be compared
#[inline]
fn candidate<T: ComplexField>(
    a: ArrayView2<'_, T>,
    i: usize,
    j: usize,
) -> Result<T::Real, LuError> {
    let value = a[[i, j]];
    if !value.is_finite() {
        return Err(LuError::NonFinite { row: i, col: j });
    }
    Ok(value.norm())
}

fn check_magnitude<R: ToPrimitive + PartialOrd>(
    step: usize,
    magnitude: R,
    tolerance: R,
) -> Result<(), LuError> {
    if magnitude <= tolerance {
        return Err(LuError::SingularMatrix {
            step,
            magnitude: magnitude.to_f64().unwrap_or(0.0),
        });
    }
    Ok(())
}
