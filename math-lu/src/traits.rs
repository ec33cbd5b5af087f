//! Scalar trait for the factorization
//!
//! [`ComplexField`] abstracts over the real and complex element types the
//! elimination engine and the triangular solvers operate on. Pivot selection
//! compares moduli, so every implementation exposes its magnitude as a
//! [`ComplexField::Real`] value.

use num_complex::{Complex32, Complex64};
use num_traits::{Float, FromPrimitive, NumAssign, One, ToPrimitive, Zero};
use std::fmt::{Debug, Display, LowerExp};
use std::ops::Neg;

/// Trait for scalar types that can be factorized.
///
/// # Implementations
///
/// Provided for:
/// - `f64` (default for most problems)
/// - `f32` (for memory-constrained problems)
/// - `Complex64`
/// - `Complex32`
pub trait ComplexField:
    NumAssign + Clone + Copy + Send + Sync + Debug + Zero + One + Neg<Output = Self> + 'static
{
    /// The real number type underlying this field
    type Real: Float
        + NumAssign
        + FromPrimitive
        + ToPrimitive
        + Send
        + Sync
        + Debug
        + Display
        + LowerExp
        + 'static;

    /// Squared magnitude |z|²
    fn norm_sqr(&self) -> Self::Real;

    /// Magnitude |z|
    fn norm(&self) -> Self::Real {
        self.norm_sqr().sqrt()
    }

    /// Create from a real value
    fn from_real(r: Self::Real) -> Self;

    /// Real part
    fn re(&self) -> Self::Real;

    /// Imaginary part
    fn im(&self) -> Self::Real;

    /// Multiplicative inverse (1/z)
    fn inv(&self) -> Self;

    /// Quotient `self / rhs` without overflow in intermediate terms
    ///
    /// Plain complex division forms `|rhs|^2`, which overflows for moduli
    /// above roughly `sqrt(MAX)` even when the quotient is representable.
    fn scaled_div(&self, rhs: &Self) -> Self {
        *self / *rhs
    }

    /// True when neither part is NaN or infinite
    fn is_finite(&self) -> bool {
        self.re().is_finite() && self.im().is_finite()
    }
}

/// Smith's algorithm for `(p + qi) / (r + si)`
#[inline]
fn smith_div<F: Float>(p: F, q: F, r: F, s: F) -> (F, F) {
    if r.abs() >= s.abs() {
        let t = s / r;
        let den = r + s * t;
        ((p + q * t) / den, (q - p * t) / den)
    } else {
        let t = r / s;
        let den = r * t + s;
        ((p * t + q) / den, (q * t - p) / den)
    }
}

impl ComplexField for Complex64 {
    type Real = f64;

    #[inline]
    fn norm_sqr(&self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    #[inline]
    fn norm(&self) -> f64 {
        self.re.hypot(self.im)
    }

    #[inline]
    fn from_real(r: f64) -> Self {
        Complex64::new(r, 0.0)
    }

    #[inline]
    fn re(&self) -> f64 {
        self.re
    }

    #[inline]
    fn im(&self) -> f64 {
        self.im
    }

    #[inline]
    fn inv(&self) -> Self {
        Complex64::new(1.0, 0.0).scaled_div(self)
    }

    #[inline]
    fn scaled_div(&self, rhs: &Self) -> Self {
        let (re, im) = smith_div(self.re, self.im, rhs.re, rhs.im);
        Complex64::new(re, im)
    }
}

impl ComplexField for Complex32 {
    type Real = f32;

    #[inline]
    fn norm_sqr(&self) -> f32 {
        self.re * self.re + self.im * self.im
    }

    #[inline]
    fn norm(&self) -> f32 {
        self.re.hypot(self.im)
    }

    #[inline]
    fn from_real(r: f32) -> Self {
        Complex32::new(r, 0.0)
    }

    #[inline]
    fn re(&self) -> f32 {
        self.re
    }

    #[inline]
    fn im(&self) -> f32 {
        self.im
    }

    #[inline]
    fn inv(&self) -> Self {
        Complex32::new(1.0, 0.0).scaled_div(self)
    }

    #[inline]
    fn scaled_div(&self, rhs: &Self) -> Self {
        let (re, im) = smith_div(self.re, self.im, rhs.re, rhs.im);
        Complex32::new(re, im)
    }
}

impl ComplexField for f64 {
    type Real = f64;

    #[inline]
    fn norm_sqr(&self) -> f64 {
        *self * *self
    }

    #[inline]
    fn norm(&self) -> f64 {
        self.abs()
    }

    #[inline]
    fn from_real(r: f64) -> Self {
        r
    }

    #[inline]
    fn re(&self) -> f64 {
        *self
    }

    #[inline]
    fn im(&self) -> f64 {
        0.0
    }

    #[inline]
    fn inv(&self) -> Self {
        1.0 / *self
    }
}

impl ComplexField for f32 {
    type Real = f32;

    #[inline]
    fn norm_sqr(&self) -> f32 {
        *self * *self
    }

    #[inline]
    fn norm(&self) -> f32 {
        self.abs()
    }

    #[inline]
    fn from_real(r: f32) -> Self {
        r
    }

    #[inline]
    fn re(&self) -> f32 {
        *self
    }

    #[inline]
    fn im(&self) -> f32 {
        0.0
    }

    #[inline]
    fn inv(&self) -> Self {
        1.0 / *self
    }
}
