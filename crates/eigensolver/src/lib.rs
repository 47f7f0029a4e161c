//! An ARPACK-backed iterative eigensolver for large sparse or
//! matrix-free operators (spec.md §5, "Arpack" / "eigs"). The
//! low-level reverse-communication state machine lives in
//! [`driver::Arpack`]/[`driver::ArpackNonSymmetric`]; [`eigs`] and
//! [`eigs_gen`] drive it to completion for callers that just want
//! eigenpairs.

mod arpack_sys;
mod driver;
mod eigs;

pub use driver::{Arpack, ArpackError, ArpackNonSymmetric, ArpackState, Which};
pub use eigs::{eigs, eigs_gen, eigs_sparse};
