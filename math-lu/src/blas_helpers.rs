//! Small dense kernels used by the solvers
//!
//! Plain Rust loops over ndarray views; the hot paths are the triangular
//! substitutions, which only ever need an unconjugated dot product.

use crate::traits::ComplexField;
use ndarray::{ArrayBase, ArrayView1, Data, Ix1, Ix2};
use num_traits::{Float, Zero};

/// Unconjugated dot product Σ x_i * y_i over the common length
#[inline]
pub fn dot<T: ComplexField>(x: ArrayView1<'_, T>, y: ArrayView1<'_, T>) -> T {
    debug_assert_eq!(x.len(), y.len(), "Vector lengths must match for dot");
    let mut sum = T::zero();
    for (xi, yi) in x.iter().zip(y.iter()) {
        sum += *xi * *yi;
    }
    sum
}

/// Compute vector 2-norm: ||x||_2 = sqrt(Σ |x_i|^2)
#[inline]
pub fn vector_norm<T, S>(x: &ArrayBase<S, Ix1>) -> T::Real
where
    T: ComplexField,
    S: Data<Elem = T>,
{
    let mut sum = T::Real::zero();
    for xi in x.iter() {
        sum += xi.norm_sqr();
    }
    sum.sqrt()
}

/// Max-norm of a matrix: max |a_ij| (zero for an empty matrix)
pub fn max_norm<T, S>(a: &ArrayBase<S, Ix2>) -> T::Real
where
    T: ComplexField,
    S: Data<Elem = T>,
{
    a.iter()
        .map(|v| v.norm())
        .fold(T::Real::zero(), |acc, v| acc.max(v))
}
