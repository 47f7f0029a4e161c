//! Scalar abstraction shared by the dense and sparse tensor crates.
//!
//! The core is parametric on a scalar type `T` that is either a real
//! (`f64`) or complex (`Complex64`) number. This crate defines the
//! [`Scalar`] trait both types implement, and the small set of mixed
//! real/complex promotion helpers the tensor crate needs.

mod promote;
mod scalar;

pub use num_complex::Complex64;
pub use promote::ToComplex;
pub use scalar::Scalar;
