use nten_algebra::Scalar;
use nten_tensor::Tensor;

use crate::csr::Sparse;

/// Row-wise merge of two CSR matrices' nonzero structures, applying
/// `op` to matched/unmatched entries (treating a missing entry as
/// zero). Backs `add`/`sub`/`hadamard_mul` below.
fn merge<T: Scalar>(a: &Sparse<T>, b: &Sparse<T>, op: impl Fn(T, T) -> T) -> Sparse<T> {
    assert_eq!(a.rows(), b.rows(), "sparse op: row count mismatch");
    assert_eq!(a.cols(), b.cols(), "sparse op: column count mismatch");
    let mut triplets = Vec::new();
    for i in 0..a.rows() {
        let (mut pa, ea) = (a.row_range(i).start, a.row_range(i).end);
        let (mut pb, eb) = (b.row_range(i).start, b.row_range(i).end);
        while pa < ea && pb < eb {
            let (ca, cb) = (a.column_indices()[pa], b.column_indices()[pb]);
            match ca.cmp(&cb) {
                std::cmp::Ordering::Less => {
                    let v = op(a.values()[pa], T::zero());
                    if !v.is_zero() {
                        triplets.push((i, ca, v));
                    }
                    pa += 1;
                }
                std::cmp::Ordering::Greater => {
                    let v = op(T::zero(), b.values()[pb]);
                    if !v.is_zero() {
                        triplets.push((i, cb, v));
                    }
                    pb += 1;
                }
                std::cmp::Ordering::Equal => {
                    let v = op(a.values()[pa], b.values()[pb]);
                    if !v.is_zero() {
                        triplets.push((i, ca, v));
                    }
                    pa += 1;
                    pb += 1;
                }
            }
        }
        while pa < ea {
            let ca = a.column_indices()[pa];
            let v = op(a.values()[pa], T::zero());
            if !v.is_zero() {
                triplets.push((i, ca, v));
            }
            pa += 1;
        }
        while pb < eb {
            let cb = b.column_indices()[pb];
            let v = op(T::zero(), b.values()[pb]);
            if !v.is_zero() {
                triplets.push((i, cb, v));
            }
            pb += 1;
        }
    }
    Sparse::from_triplets(a.rows(), a.cols(), &triplets)
}

/// `a + b`, elementwise, structural union.
pub fn add<T: Scalar>(a: &Sparse<T>, b: &Sparse<T>) -> Sparse<T> {
    merge(a, b, |x, y| x + y)
}

/// `a - b`, elementwise, structural union.
pub fn sub<T: Scalar>(a: &Sparse<T>, b: &Sparse<T>) -> Sparse<T> {
    merge(a, b, |x, y| x - y)
}

/// `a .* b`, elementwise (Hadamard) product, structural intersection.
pub fn hadamard_mul<T: Scalar>(a: &Sparse<T>, b: &Sparse<T>) -> Sparse<T> {
    merge(a, b, |x, y| x * y)
}

/// `s * alpha`, a uniform scalar multiply.
pub fn scalar_mul<T: Scalar>(s: &Sparse<T>, alpha: T) -> Sparse<T> {
    let triplets: Vec<(usize, usize, T)> = (0..s.rows())
        .flat_map(|i| s.row_range(i).map(move |k| (i, k)))
        .map(|(i, k)| (i, s.column_indices()[k], s.values()[k] * alpha))
        .collect();
    Sparse::from_triplets(s.rows(), s.cols(), &triplets)
}

/// `mmult(s, d)`: sparse-matrix times dense-matrix.
#[track_caller]
pub fn mmult_sparse_dense<T: Scalar>(s: &Sparse<T>, d: &Tensor<T>) -> Tensor<T> {
    assert_eq!(d.rank(), 2, "mmult_sparse_dense: dense operand must be rank 2");
    assert_eq!(s.cols(), d.rows(), "mmult_sparse_dense: inner dimensions do not match");
    let out_cols = d.columns();
    let mut out = Tensor::zeros([s.rows(), out_cols]);
    for i in 0..s.rows() {
        for k in s.row_range(i) {
            let col = s.column_indices()[k];
            let v = s.values()[k];
            for j in 0..out_cols {
                let prev = out.get(&[i as isize, j as isize]);
                out.set(&[i as isize, j as isize], prev + v * d.get(&[col as isize, j as isize]));
            }
        }
    }
    out
}

/// `mmult(d, s)`: dense-matrix times sparse-matrix.
#[track_caller]
pub fn mmult_dense_sparse<T: Scalar>(d: &Tensor<T>, s: &Sparse<T>) -> Tensor<T> {
    assert_eq!(d.rank(), 2, "mmult_dense_sparse: dense operand must be rank 2");
    assert_eq!(d.columns(), s.rows(), "mmult_dense_sparse: inner dimensions do not match");
    let out_rows = d.rows();
    let mut out = Tensor::zeros([out_rows, s.cols()]);
    for k_row in 0..s.rows() {
        for k in s.row_range(k_row) {
            let col = s.column_indices()[k];
            let v = s.values()[k];
            for i in 0..out_rows {
                let prev = out.get(&[i as isize, col as isize]);
                out.set(&[i as isize, col as isize], prev + d.get(&[i as isize, k_row as isize]) * v);
            }
        }
    }
    out
}

/// `kron(a, b)`: the 2-D Kronecker product of two sparse matrices,
/// Matlab block order, computed directly on the nonzero structure
/// rather than densifying — spec.md §4.7.
pub fn kron<T: Scalar>(a: &Sparse<T>, b: &Sparse<T>) -> Sparse<T> {
    let (br, bc) = (b.rows(), b.cols());
    let mut triplets = Vec::with_capacity(a.nnz() * b.nnz().max(1));
    for i in 0..a.rows() {
        for ka in a.row_range(i) {
            let (j, aij) = (a.column_indices()[ka], a.values()[ka]);
            for p in 0..b.rows() {
                for kb in b.row_range(p) {
                    let (q, bpq) = (b.column_indices()[kb], b.values()[kb]);
                    triplets.push((i * br + p, j * bc + q, aij * bpq));
                }
            }
        }
    }
    Sparse::from_triplets(a.rows() * br, a.cols() * bc, &triplets)
}

/// `kron2(a, b) = kron(b, a)` — spec.md §4.7's reversed-order sibling
/// of [`kron`].
pub fn kron2<T: Scalar>(a: &Sparse<T>, b: &Sparse<T>) -> Sparse<T> {
    kron(b, a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_unions_structure() {
        let a = Sparse::from_triplets(2, 2, &[(0, 0, 1.0)]);
        let b = Sparse::from_triplets(2, 2, &[(1, 1, 2.0)]);
        let c = add(&a, &b);
        assert_eq!(c.get(0, 0), 1.0);
        assert_eq!(c.get(1, 1), 2.0);
        assert_eq!(c.nnz(), 2);
    }

    #[test]
    fn sub_cancels_to_empty() {
        let a = Sparse::from_triplets(2, 2, &[(0, 0, 1.0)]);
        let c = sub(&a, &a);
        assert_eq!(c.nnz(), 0);
    }

    #[test]
    fn mmult_sparse_dense_matches_dense_mmult() {
        let dense_a = Tensor::<f64>::from_rows(vec![vec![1.0, 0.0], vec![0.0, 2.0]]);
        let s = Sparse::from_dense(&dense_a);
        let d = Tensor::<f64>::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let via_sparse = mmult_sparse_dense(&s, &d);
        let via_dense = nten_tensor::mmult(&dense_a, &d);
        assert_eq!(via_sparse.to_vec(), via_dense.to_vec());
    }
}
