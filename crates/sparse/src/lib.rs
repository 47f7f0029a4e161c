//! Compressed-sparse-row matrices: construction from triplets or a
//! dense tensor, structural elementwise and sparse/dense-mixed matrix
//! products, and a block-diagonal-aware SVD (spec.md §5).

mod blocks;
mod csr;
mod ops;

pub use blocks::{block_svd, find_blocks, HasSvd};
pub use csr::Sparse;
pub use ops::{add, hadamard_mul, kron, kron2, mmult_dense_sparse, mmult_sparse_dense, scalar_mul, sub};
