use std::fmt::Debug;
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_complex::Complex64;
use rand::distributions::Standard;
use rand::prelude::Distribution;
use rand::Rng;

/// The scalar element type of a [`Tensor`](../nten_tensor/struct.Tensor.html)
/// or [`Sparse`](../nten_sparse/struct.Sparse.html) matrix: either `f64`
/// (real) or [`Complex64`] (complex).
///
/// This is the Rust analogue of the source library's `elt_t` template
/// parameter: every dense/sparse operation is generic over `T: Scalar`,
/// and mixed real/complex combinations go through [`ToComplex`].
pub trait Scalar:
    Copy
    + Clone
    + Debug
    + Default
    + PartialEq
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Sum
{
    /// `true` for `Complex64`, `false` for `f64`.
    const IS_COMPLEX: bool;

    fn zero() -> Self;
    fn one() -> Self;
    fn from_f64(x: f64) -> Self;

    /// Complex conjugate; identity on `f64`.
    fn conj(self) -> Self;
    /// Magnitude, always a real `f64` (matches `abs(CTensor) -> RTensor`).
    fn modulus(self) -> f64;
    fn is_zero(self) -> bool {
        self == Self::zero()
    }

    fn sqrt(self) -> Self;
    fn exp(self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn tan(self) -> Self;
    fn sinh(self) -> Self;
    fn cosh(self) -> Self;
    fn tanh(self) -> Self;
    fn powc(self, exponent: Self) -> Self;

    /// Draw a sample the way `rand<T>()` does in the source: real part(s)
    /// uniform in `[0, 1)`.
    fn sample_uniform<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

impl Scalar for f64 {
    const IS_COMPLEX: bool = false;

    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    fn from_f64(x: f64) -> Self {
        x
    }

    fn conj(self) -> Self {
        self
    }

    fn modulus(self) -> f64 {
        self.abs()
    }

    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }

    fn exp(self) -> Self {
        f64::exp(self)
    }

    fn sin(self) -> Self {
        f64::sin(self)
    }

    fn cos(self) -> Self {
        f64::cos(self)
    }

    fn tan(self) -> Self {
        f64::tan(self)
    }

    fn sinh(self) -> Self {
        f64::sinh(self)
    }

    fn cosh(self) -> Self {
        f64::cosh(self)
    }

    fn tanh(self) -> Self {
        f64::tanh(self)
    }

    fn powc(self, exponent: Self) -> Self {
        self.powf(exponent)
    }

    fn sample_uniform<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Standard.sample(rng)
    }
}

impl Scalar for Complex64 {
    const IS_COMPLEX: bool = true;

    fn zero() -> Self {
        Complex64::new(0.0, 0.0)
    }

    fn one() -> Self {
        Complex64::new(1.0, 0.0)
    }

    fn from_f64(x: f64) -> Self {
        Complex64::new(x, 0.0)
    }

    fn conj(self) -> Self {
        num_complex::Complex::conj(&self)
    }

    fn modulus(self) -> f64 {
        self.norm()
    }

    fn sqrt(self) -> Self {
        num_complex::Complex::sqrt(&self)
    }

    fn exp(self) -> Self {
        num_complex::Complex::exp(&self)
    }

    fn sin(self) -> Self {
        num_complex::Complex::sin(&self)
    }

    fn cos(self) -> Self {
        num_complex::Complex::cos(&self)
    }

    fn tan(self) -> Self {
        num_complex::Complex::tan(&self)
    }

    fn sinh(self) -> Self {
        num_complex::Complex::sinh(&self)
    }

    fn cosh(self) -> Self {
        num_complex::Complex::cosh(&self)
    }

    fn tanh(self) -> Self {
        num_complex::Complex::tanh(&self)
    }

    fn powc(self, exponent: Self) -> Self {
        // a^b = exp(b * ln(a)), the standard branch used for complex bases.
        if self.is_zero() {
            return Self::zero();
        }
        (exponent * self.ln()).exp()
    }

    fn sample_uniform<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Complex64::new(Standard.sample(rng), Standard.sample(rng))
    }
}
