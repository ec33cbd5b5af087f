//! Parallel utilities with feature-gated implementations
//!
//! Rows of the trailing update and columns of a right-hand-side batch are
//! independent lanes of a 2-D view. With the `rayon` feature they are spread
//! over the rayon pool once there are at least `threshold` of them; otherwise
//! (or without the feature) they run sequentially in index order.

use ndarray::{ArrayViewMut1, ArrayViewMut2, Axis};

#[cfg(feature = "rayon")]
use ndarray::parallel::prelude::*;

/// Number of worker threads lane-parallel work can use
#[cfg(feature = "rayon")]
pub fn worker_count() -> usize {
    rayon::current_num_threads()
}

/// Number of worker threads lane-parallel work can use
#[cfg(not(feature = "rayon"))]
pub fn worker_count() -> usize {
    1
}

/// Run `f(index, lane)` over every lane of `view` along `axis`, stopping at the
/// first error
#[cfg(feature = "rayon")]
pub fn try_for_each_lane<T, E, F>(
    mut view: ArrayViewMut2<'_, T>,
    axis: Axis,
    threshold: usize,
    f: F,
) -> Result<(), E>
where
    T: Send + Sync,
    E: Send,
    F: Fn(usize, ArrayViewMut1<'_, T>) -> Result<(), E> + Sync + Send,
{
    if view.len_of(axis) >= threshold.max(2) {
        return view
            .axis_iter_mut(axis)
            .into_par_iter()
            .enumerate()
            .try_for_each(|(i, lane)| f(i, lane));
    }
    view.axis_iter_mut(axis)
        .enumerate()
        .try_for_each(|(i, lane)| f(i, lane))
}

/// Sequential lane iteration (fallback)
#[cfg(not(feature = "rayon"))]
pub fn try_for_each_lane<T, E, F>(
    mut view: ArrayViewMut2<'_, T>,
    axis: Axis,
    _threshold: usize,
    f: F,
) -> Result<(), E>
where
    F: Fn(usize, ArrayViewMut1<'_, T>) -> Result<(), E>,
{
    view.axis_iter_mut(axis)
        .enumerate()
        .try_for_each(|(i, lane)| f(i, lane))
}
