//! Gaussian elimination with none, partial or full pivoting
//!
//! The working copy of `A` is reduced in place over `n` steps. At step `k` the
//! pivot selector picks a location in the trailing submatrix, whole rows and
//! columns are swapped to bring it to `(k, k)`, and every row below is updated
//! with its multiplier, which is stored where the eliminated entry was. The
//! result is packed storage with `L` below the diagonal and `U` on and above
//! it, satisfying `P A Q = L U`.

use crate::blas_helpers::{dot, max_norm};
use crate::config::{LuConfig, PivotScaling};
use crate::error::LuError;
use crate::operators::{eliminate, scale_row, swap_cols, swap_rows};
use crate::parallel::{try_for_each_lane, worker_count};
use crate::permutation::Permutation;
use crate::pivot::PivotStrategy;
use crate::traits::ComplexField;
use crate::triangular::Diagonal;
use ndarray::{Array1, Array2, ArrayView1, ArrayViewMut2, Axis, s};
use num_traits::{Float, ToPrimitive, Zero};

#[cfg(test)]
thread_local! {
    static FACTORIZE_CALLS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Number of factorizations run on the current thread
#[cfg(test)]
pub(crate) fn factorize_calls() -> usize {
    FACTORIZE_CALLS.with(|c| c.get())
}

/// One elimination step as recorded in the pivot trace
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotRecord<T> {
    /// Elimination step `k`
    pub step: usize,
    /// Row of the working matrix the pivot was taken from (before the swap)
    pub row: usize,
    /// Column of the working matrix the pivot was taken from (before the swap)
    pub col: usize,
    /// Raw pivot value
    pub value: T,
}

/// LU factorization result
///
/// Stores the packed L and U factors, the row permutation `P`, the column
/// permutation `Q` (identity unless full pivoting was used) and the pivot
/// trace, such that `P A Q = L U`.
#[derive(Debug, Clone)]
pub struct LuFactorization<T: ComplexField> {
    /// Packed factors: L strictly below the diagonal, U strictly above it,
    /// and the pivots on it
    pub(crate) lu: Array2<T>,
    pub(crate) row_perm: Permutation,
    pub(crate) col_perm: Permutation,
    pivots: Vec<PivotRecord<T>>,
    strategy: PivotStrategy,
    scaling: PivotScaling,
    /// max |a_ij| of the input
    norm: T::Real,
    pub(crate) parallel_threshold: usize,
}

impl<T: ComplexField> LuFactorization<T> {
    /// Matrix dimension
    pub fn dim(&self) -> usize {
        self.lu.nrows()
    }

    /// Packed L/U storage
    pub fn packed(&self) -> &Array2<T> {
        &self.lu
    }

    /// Row permutation `P`
    pub fn row_permutation(&self) -> &Permutation {
        &self.row_perm
    }

    /// Column permutation `Q` (identity without full pivoting)
    pub fn col_permutation(&self) -> &Permutation {
        &self.col_perm
    }

    /// Pivot trace, one record per elimination step
    pub fn pivots(&self) -> &[PivotRecord<T>] {
        &self.pivots
    }

    /// Pivoting strategy the factorization was computed with
    pub fn strategy(&self) -> PivotStrategy {
        self.strategy
    }

    /// Whether the pivots sit on `U`'s diagonal or on `L`'s
    pub fn scaling(&self) -> PivotScaling {
        self.scaling
    }

    /// Lower triangular factor as a dense matrix
    pub fn l(&self) -> Array2<T> {
        let n = self.dim();
        Array2::from_shape_fn((n, n), |(i, j)| match (i.cmp(&j), self.scaling) {
            (std::cmp::Ordering::Greater, _) => self.lu[[i, j]],
            (std::cmp::Ordering::Equal, PivotScaling::Retain) => T::one(),
            (std::cmp::Ordering::Equal, PivotScaling::Normalize) => self.lu[[i, j]],
            (std::cmp::Ordering::Less, _) => T::zero(),
        })
    }

    /// Upper triangular factor as a dense matrix, with exact zeros below the
    /// diagonal
    pub fn u(&self) -> Array2<T> {
        let n = self.dim();
        Array2::from_shape_fn((n, n), |(i, j)| match (i.cmp(&j), self.scaling) {
            (std::cmp::Ordering::Less, _) => self.lu[[i, j]],
            (std::cmp::Ordering::Equal, PivotScaling::Retain) => self.lu[[i, j]],
            (std::cmp::Ordering::Equal, PivotScaling::Normalize) => T::one(),
            (std::cmp::Ordering::Greater, _) => T::zero(),
        })
    }

    /// The pivots, i.e. the diagonal of whichever factor is not unit
    /// triangular
    ///
    /// `sign() * product(diagonal())` is the determinant of `A`.
    pub fn diagonal(&self) -> Array1<T> {
        self.lu.diag().to_owned()
    }

    /// `+1` or `-1` according to the combined parity of `P` and `Q`
    pub fn sign(&self) -> T {
        if self.row_perm.is_even() == self.col_perm.is_even() {
            T::one()
        } else {
            -T::one()
        }
    }

    /// Smallest `|pivot| / max|A|` over the trace
    ///
    /// Values near machine epsilon flag an ill-conditioned input.
    pub fn min_pivot_ratio(&self) -> T::Real {
        if self.norm == T::Real::zero() {
            return T::Real::zero();
        }
        self.pivots
            .iter()
            .map(|p| p.value.norm() / self.norm)
            .fold(T::Real::infinity(), |acc, r| acc.min(r))
    }

    /// Rebuild `A = P^T L U Q^T` from the factors
    pub fn reconstruct(&self) -> Array2<T> {
        let n = self.dim();
        let l = self.l();
        let u = self.u();
        let p = self.row_perm.indices();
        let q = self.col_perm.indices();

        let mut a = Array2::zeros((n, n));
        for i in 0..n {
            for j in 0..n {
                a[[p[i], q[j]]] = dot(l.row(i), u.column(j));
            }
        }
        a
    }

    pub(crate) fn lower_diagonal(&self) -> Diagonal {
        match self.scaling {
            PivotScaling::Retain => Diagonal::Unit,
            PivotScaling::Normalize => Diagonal::NonUnit,
        }
    }

    pub(crate) fn upper_diagonal(&self) -> Diagonal {
        match self.scaling {
            PivotScaling::Retain => Diagonal::NonUnit,
            PivotScaling::Normalize => Diagonal::Unit,
        }
    }
}

/// Compute the LU factorization of a square matrix
///
/// Fails with an invalid-input error before any arithmetic if `a` is empty,
/// not square or holds a non-finite entry, and with
/// [`LuError::SingularMatrix`] (or [`LuError::SingularPivot`] without
/// pivoting) at the first step whose best pivot is at or below the configured
/// tolerance. No partial factorization is returned.
pub fn factorize<T: ComplexField>(
    a: &Array2<T>,
    config: &LuConfig<T::Real>,
) -> Result<LuFactorization<T>, LuError> {
    let n = validate(a)?;

    #[cfg(test)]
    FACTORIZE_CALLS.with(|c| c.set(c.get() + 1));

    let norm = max_norm(a);
    let tolerance = config.tolerance.threshold(n, norm);
    let select = config.strategy.selector::<T>();

    log::debug!(
        "LU factorization: n = {}, strategy = {:?}, scaling = {:?}, tolerance = {:.3e}, {} worker(s)",
        n,
        config.strategy,
        config.scaling,
        tolerance.to_f64().unwrap_or(0.0),
        worker_count()
    );

    let mut lu = a.clone();
    let mut row_perm = Permutation::identity(n);
    let mut col_perm = Permutation::identity(n);
    let mut pivots = Vec::with_capacity(n);

    for k in 0..n {
        let pivot = select(lu.view(), k, tolerance)
            .inspect_err(|err| log::warn!("LU factorization stopped: {}", err))?;

        if pivot.row != k {
            swap_rows(lu.view_mut(), k, pivot.row);
            row_perm.swap(k, pivot.row);
        }
        if pivot.col != k {
            swap_cols(lu.view_mut(), k, pivot.col);
            col_perm.swap(k, pivot.col);
        }

        let value = lu[[k, k]];
        pivots.push(PivotRecord {
            step: k,
            row: pivot.row,
            col: pivot.col,
            value,
        });

        if config.print_interval > 0 && k % config.print_interval == 0 {
            log::info!(
                "LU step {} of {}: pivot ({}, {}) magnitude {:.6e}",
                k,
                n,
                pivot.row,
                pivot.col,
                pivot.magnitude.to_f64().unwrap_or(0.0)
            );
        }

        eliminate_below(
            lu.view_mut(),
            k,
            value,
            config.scaling,
            config.parallel_threshold,
        )
        .inspect_err(|err| log::warn!("LU factorization stopped: {}", err))?;
    }

    let factorization = LuFactorization {
        lu,
        row_perm,
        col_perm,
        pivots,
        strategy: config.strategy,
        scaling: config.scaling,
        norm,
        parallel_threshold: config.parallel_threshold,
    };

    log::debug!(
        "LU factorization done: {} row swaps, {} column swaps, min pivot ratio {:.3e}",
        factorization.pivots.iter().filter(|p| p.row != p.step).count(),
        factorization.pivots.iter().filter(|p| p.col != p.step).count(),
        factorization.min_pivot_ratio().to_f64().unwrap_or(0.0)
    );

    Ok(factorization)
}

fn validate<T: ComplexField>(a: &Array2<T>) -> Result<usize, LuError> {
    let (rows, cols) = a.dim();
    if rows == 0 || cols == 0 {
        return Err(LuError::Empty);
    }
    if rows != cols {
        return Err(LuError::NotSquare { rows, cols });
    }
    if let Some(((row, col), _)) = a.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(LuError::NonFinite { row, col });
    }
    Ok(rows)
}

/// Step `k` of the elimination, with the pivot already at `(k, k)`
///
/// Rows `k+1..n` only read the pivot row, so they are updated independently.
/// Every entry written is checked: finite input can still overflow once
/// multiplied through, and the packed factors must stay finite.
fn eliminate_below<T: ComplexField>(
    lu: ArrayViewMut2<'_, T>,
    k: usize,
    pivot: T,
    scaling: PivotScaling,
    parallel_threshold: usize,
) -> Result<(), LuError> {
    let (mut head, tail) = lu.split_at(Axis(0), k + 1);

    if scaling == PivotScaling::Normalize {
        let mut segment = head.slice_mut(s![k, k + 1..]);
        scale_row(segment.view_mut(), pivot.inv(), k)?;
        check_finite(segment.view(), k)?;
    }
    let pivot_row = head.slice(s![k, k + 1..]);

    try_for_each_lane(tail, Axis(0), parallel_threshold, |_, mut row| {
        let multiplier = match scaling {
            PivotScaling::Retain => row[k].scaled_div(&pivot),
            PivotScaling::Normalize => row[k],
        };
        row[k] = multiplier;
        if !multiplier.is_zero() {
            eliminate(row.slice_mut(s![k + 1..]), pivot_row, multiplier);
        }
        check_finite(row.slice(s![k..]), k)
    })
}

#[inline]
fn check_finite<T: ComplexField>(values: ArrayView1<'_, T>, step: usize) -> Result<(), LuError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(LuError::Overflow { step })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PivotTolerance;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn assert_matrix_eq(actual: &Array2<f64>, expected: &Array2<f64>, epsilon: f64) {
        assert_eq!(actual.dim(), expected.dim());
        for ((i, j), v) in actual.indexed_iter() {
            assert!(
                (v - expected[[i, j]]).abs() < epsilon,
                "entry ({}, {}) = {}, expected {}",
                i,
                j,
                v,
                expected[[i, j]]
            );
        }
    }

    #[test]
    fn test_partial_pivoting_first_step_takes_largest_row() {
        let a = array![[2.0, 1.0, 1.0], [4.0, 3.0, 3.0], [8.0, 7.0, 9.0]];
        let f = factorize(&a, &LuConfig::default()).unwrap();

        assert_eq!(f.pivots()[0].row, 2);
        assert_relative_eq!(f.pivots()[0].value, 8.0);
        assert_eq!(f.row_permutation().indices()[0], 2);
        assert!(f.col_permutation().is_identity());
        assert_matrix_eq(&f.reconstruct(), &a, 1e-12);
    }

    #[test]
    fn test_factors_are_triangular() {
        let a = array![[2.0, 1.0, 1.0], [4.0, 3.0, 3.0], [8.0, 7.0, 9.0]];
        let f = factorize(&a, &LuConfig::default()).unwrap();
        let l = f.l();
        let u = f.u();

        for i in 0..3 {
            assert_eq!(l[[i, i]], 1.0);
            for j in (i + 1)..3 {
                assert_eq!(l[[i, j]], 0.0);
                assert_eq!(u[[j, i]], 0.0);
            }
        }
    }

    #[test]
    fn test_permuted_product_matches() {
        let a = array![[1.0, 2.0, 3.0], [0.0, 1.0, 4.0], [5.0, 6.0, 0.0]];
        for config in [
            LuConfig::no_pivoting(),
            LuConfig::partial_pivoting(),
            LuConfig::full_pivoting(),
        ] {
            let f = factorize(&a, &config).unwrap();
            let pa = f.row_permutation().permute_rows(&a).unwrap();
            let paq = f.col_permutation().permute_cols(&pa).unwrap();
            assert_matrix_eq(&f.l().dot(&f.u()), &paq, 1e-12);
        }
    }

    #[test]
    fn test_naive_zero_diagonal_fails() {
        let a = array![[0.0, 1.0], [1.0, 0.0]];
        let err = factorize(&a, &LuConfig::no_pivoting()).unwrap_err();
        assert_eq!(err, LuError::SingularPivot { step: 0 });
    }

    #[test]
    fn test_partial_recovers_zero_diagonal() {
        let a = array![[0.0, 1.0], [1.0, 0.0]];
        let f = factorize(&a, &LuConfig::default()).unwrap();
        assert_eq!(f.row_permutation().indices(), &[1, 0]);
        assert_relative_eq!(f.sign(), -1.0);
    }

    #[test]
    fn test_zero_row_is_singular() {
        let a = array![[1.0, 2.0, 3.0], [0.0, 0.0, 0.0], [4.0, 5.0, 6.0]];
        for config in [LuConfig::partial_pivoting(), LuConfig::full_pivoting()] {
            let err = factorize(&a, &config).unwrap_err();
            assert!(matches!(err, LuError::SingularMatrix { .. }), "{:?}", err);
        }
    }

    #[test]
    fn test_duplicate_rows_are_singular() {
        let a = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [1.0, 2.0, 3.0]];
        let err = factorize(&a, &LuConfig::default()).unwrap_err();
        assert!(matches!(err, LuError::SingularMatrix { step: 2, .. }), "{:?}", err);
    }

    #[test]
    fn test_all_zero_matrix_is_singular_at_step_zero() {
        let a = Array2::<f64>::zeros((3, 3));
        let config = LuConfig::default().with_tolerance(PivotTolerance::Absolute(0.0));
        assert_eq!(
            factorize(&a, &config).unwrap_err(),
            LuError::SingularMatrix {
                step: 0,
                magnitude: 0.0
            }
        );
    }

    #[test]
    fn test_tiny_but_well_scaled_matrix_factorizes() {
        let a = array![[1e-200, 2e-200], [3e-200, 4e-200]];
        let f = factorize(&a, &LuConfig::default()).unwrap();
        assert!(f.min_pivot_ratio() > 0.1);
    }

    #[test]
    fn test_absolute_tolerance_rejects_small_pivots() {
        let a = array![[1.0, 0.0], [0.0, 1e-9]];
        let config = LuConfig::default().with_tolerance(PivotTolerance::Absolute(1e-6));
        assert!(matches!(
            factorize(&a, &config),
            Err(LuError::SingularMatrix { step: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_input() {
        let empty = Array2::<f64>::zeros((0, 0));
        assert_eq!(
            factorize(&empty, &LuConfig::default()).unwrap_err(),
            LuError::Empty
        );

        let rect = Array2::<f64>::zeros((2, 3));
        assert_eq!(
            factorize(&rect, &LuConfig::default()).unwrap_err(),
            LuError::NotSquare { rows: 2, cols: 3 }
        );

        let nan = array![[1.0, 0.0], [f64::NAN, 1.0]];
        assert_eq!(
            factorize(&nan, &LuConfig::default()).unwrap_err(),
            LuError::NonFinite { row: 1, col: 0 }
        );
    }

    #[test]
    fn test_full_pivoting_moves_largest_entry_first() {
        let a = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 10.0]];
        let f = factorize(&a, &LuConfig::full_pivoting()).unwrap();

        assert_eq!((f.pivots()[0].row, f.pivots()[0].col), (2, 2));
        assert_eq!(f.col_permutation().indices()[0], 2);
        assert_matrix_eq(&f.reconstruct(), &a, 1e-12);
    }

    #[test]
    fn test_normalized_scaling_gives_unit_upper() {
        let a = array![[2.0, 1.0, 1.0], [4.0, 3.0, 3.0], [8.0, 7.0, 9.0]];
        let config = LuConfig::default().with_scaling(PivotScaling::Normalize);
        let f = factorize(&a, &config).unwrap();
        let u = f.u();
        let l = f.l();

        for i in 0..3 {
            assert_eq!(u[[i, i]], 1.0);
        }
        assert_relative_eq!(l[[0, 0]], 8.0);
        assert_matrix_eq(&f.reconstruct(), &a, 1e-12);
    }

    #[test]
    fn test_sign_and_diagonal_give_determinant() {
        let a = array![[6.0, 1.0, 1.0], [4.0, -2.0, 5.0], [2.0, 8.0, 7.0]];
        for config in [
            LuConfig::partial_pivoting(),
            LuConfig::full_pivoting(),
            LuConfig::full_pivoting().with_scaling(PivotScaling::Normalize),
        ] {
            let f = factorize(&a, &config).unwrap();
            let det = f.sign() * f.diagonal().iter().product::<f64>();
            assert_relative_eq!(det, -306.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_parallel_trailing_update_matches_sequential() {
        let n = 12;
        let a = Array2::from_shape_fn((n, n), |(i, j)| {
            if i == j {
                3.0 * n as f64
            } else {
                ((i * 7 + j * 3) % 5) as f64 - 2.0
            }
        });
        let sequential = factorize(&a, &LuConfig::default()).unwrap();
        let config = LuConfig {
            parallel_threshold: 1,
            ..LuConfig::default()
        };
        let parallel = factorize(&a, &config).unwrap();

        assert_eq!(sequential.row_permutation(), parallel.row_permutation());
        assert_matrix_eq(sequential.packed(), parallel.packed(), 1e-15);
    }

    #[test]
    fn test_overflow_in_trailing_update() {
        // Finite and well conditioned, but 1e308 + 1e308 leaves the f64 range
        let a = array![[1e308, 1e308], [-1e308, 1e308]];
        for config in [LuConfig::partial_pivoting(), LuConfig::full_pivoting()] {
            assert_eq!(
                factorize(&a, &config).unwrap_err(),
                LuError::Overflow { step: 0 }
            );
        }

        let b = array![1e308, 1e308];
        assert!(matches!(
            crate::direct::solve(&a, &b, &LuConfig::default()),
            Err(LuError::Overflow { step: 0 })
        ));
    }

    #[test]
    fn test_large_complex_pivots_stay_finite() {
        use num_complex::Complex64;
        let a = array![
            [Complex64::new(1e200, 0.0), Complex64::new(1e200, 0.0)],
            [Complex64::new(1e200, 0.0), Complex64::new(2e200, 0.0)],
        ];
        for scaling in [PivotScaling::Retain, PivotScaling::Normalize] {
            let f = factorize(&a, &LuConfig::partial_pivoting().with_scaling(scaling)).unwrap();
            assert!(f.packed().iter().all(|v| v.is_finite()));
            let rebuilt = f.reconstruct();
            for (v, w) in rebuilt.iter().zip(a.iter()) {
                assert!((v - w).norm() <= 1e-14 * w.norm());
            }
        }
    }
}
