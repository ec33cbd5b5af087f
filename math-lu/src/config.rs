//! Factorization configuration

use crate::pivot::PivotStrategy;
use num_traits::{Float, FromPrimitive};

/// How the pivot row is treated once the pivot is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PivotScaling {
    /// Keep the raw pivot on `U`'s diagonal; `L` is unit lower triangular
    /// and stores the multipliers `A[i][k] / A[k][k]`.
    #[default]
    Retain,
    /// Scale the pivot row by `1/pivot` so `U` is unit upper triangular;
    /// the pivot moves to `L`'s diagonal (Crout form).
    Normalize,
}

/// Threshold below which a pivot candidate counts as zero
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PivotTolerance<R> {
    /// Fixed threshold on the pivot modulus
    Absolute(R),
    /// `factor * n * eps * max|A[i][j]|`
    Relative(R),
}

impl<R: Float + FromPrimitive> PivotTolerance<R> {
    /// Resolve to a concrete threshold for an `n x n` matrix with max-norm `max_norm`
    pub fn threshold(&self, n: usize, max_norm: R) -> R {
        match *self {
            PivotTolerance::Absolute(t) => t,
            PivotTolerance::Relative(factor) => {
                let n = R::from_usize(n).unwrap_or_else(R::one);
                factor * n * R::epsilon() * max_norm
            }
        }
    }
}

/// LU factorization configuration
#[derive(Debug, Clone)]
pub struct LuConfig<R> {
    /// Pivoting strategy
    pub strategy: PivotStrategy,
    /// Pivot row treatment
    pub scaling: PivotScaling,
    /// Singularity threshold policy
    pub tolerance: PivotTolerance<R>,
    /// Minimum number of trailing rows (or right-hand sides) before work is
    /// spread over the rayon pool
    pub parallel_threshold: usize,
    /// Print progress every N elimination steps (0 = no output)
    pub print_interval: usize,
}

impl Default for LuConfig<f64> {
    fn default() -> Self {
        Self {
            strategy: PivotStrategy::Partial,
            scaling: PivotScaling::Retain,
            tolerance: PivotTolerance::Relative(1.0),
            parallel_threshold: 256,
            print_interval: 0,
        }
    }
}

impl Default for LuConfig<f32> {
    fn default() -> Self {
        Self {
            strategy: PivotStrategy::Partial,
            scaling: PivotScaling::Retain,
            tolerance: PivotTolerance::Relative(1.0),
            parallel_threshold: 256,
            print_interval: 0,
        }
    }
}

impl<R: Float + FromPrimitive> LuConfig<R> {
    /// Create config with a specific pivoting strategy
    pub fn with_strategy(strategy: PivotStrategy) -> Self
    where
        Self: Default,
    {
        Self {
            strategy,
            ..Default::default()
        }
    }

    /// Naive elimination, pivot always on the diagonal
    pub fn no_pivoting() -> Self
    where
        Self: Default,
    {
        Self::with_strategy(PivotStrategy::None)
    }

    pub fn partial_pivoting() -> Self
    where
        Self: Default,
    {
        Self::with_strategy(PivotStrategy::Partial)
    }

    pub fn full_pivoting() -> Self
    where
        Self: Default,
    {
        Self::with_strategy(PivotStrategy::Full)
    }

    pub fn with_tolerance(mut self, tolerance: PivotTolerance<R>) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_scaling(mut self, scaling: PivotScaling) -> Self {
        self.scaling = scaling;
        self
    }
}
