//! Dense N-dimensional tensors: column-major storage, copy-on-write
//! sharing via [`nten_alloc::Vector`], range-based views, elementwise
//! arithmetic, contraction, structural reshaping and LAPACK-backed
//! factorizations (spec.md §3-§4).

// Pulls in the OpenBLAS backend `lapack` links against. Never called
// directly; its presence in the dependency graph is what matters.
extern crate lapack_src;

mod booleans;
mod contract;
mod dimensions;
mod factor;
mod ops;
mod range;
mod structural;
mod tensor;
mod view;

pub use booleans::Booleans;
pub use contract::{fold, foldc, foldin, mmult, mmult_into};
pub use dimensions::{Dimensions, DimensionsError, Indices};
pub use factor::{cgs, eig, eig_power_left, eig_power_right, eig_sym, expm, solve, svd, EigPowerResult, EigResult, EigSymResult, SvdResult};
pub use ops::{abs, cos, cosh, exp, pow, sin, sinh, sqrt, tan, tanh, tensor_eq, tensor_le, tensor_lt, to_complex};
pub use range::{range, range_at, range_full, range_indices, range_step, Range, RangeIterator, ResolvedRange};
pub use structural::{
    adjoint, diag, kron, kron2, linspace, max, mean, min, permute, scale, sum, take_diag, trace, transpose,
};
pub use tensor::Tensor;
pub use view::{MutableTensorView, TensorView};

pub use nten_algebra::{Complex64, Scalar, ToComplex};
