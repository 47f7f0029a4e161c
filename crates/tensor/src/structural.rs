use nten_algebra::Scalar;

use crate::dimensions::Dimensions;
use crate::tensor::Tensor;

/// Physically reorders axes: `out`'s axis `k` takes its extent and data
/// from `t`'s axis `order[k]`. Used directly by `permute`/`transpose`
/// and by the contraction machinery in `contract.rs`, which must bring
/// a contracted axis to a canonical position before reshaping into a
/// 2-D operand for `gemm`.
pub(crate) fn permute_axes<T: Scalar>(t: &Tensor<T>, order: &[usize]) -> Tensor<T> {
    assert_eq!(order.len(), t.rank(), "permute: order length must match rank");
    let old_sizes = t.dims().sizes();
    let new_sizes: Vec<usize> = order.iter().map(|&a| old_sizes[a]).collect();
    let mut out = Tensor::zeros(new_sizes);
    let mut idx = vec![0usize; t.rank()];
    walk_indices(&out.dims().sizes().to_vec(), &mut idx, 0, &mut |new_idx| {
        let old_idx: Vec<isize> = order.iter().map(|&a| new_idx[a] as isize).collect();
        let signed: Vec<isize> = new_idx.iter().map(|&x| x as isize).collect();
        out.set(&signed, t.get(&old_idx));
    });
    out
}

/// Recursively visits every index tuple of a tensor with the given
/// `sizes`, leftmost axis innermost to match nothing in particular —
/// order doesn't matter here since every tuple is visited exactly once.
fn walk_indices(sizes: &[usize], idx: &mut [usize], dim: usize, f: &mut impl FnMut(&[usize])) {
    if dim == sizes.len() {
        f(idx);
        return;
    }
    for i in 0..sizes[dim] {
        idx[dim] = i;
        walk_indices(sizes, idx, dim + 1, f);
    }
}

/// `transpose(m)`: rank-2 only, swaps rows and columns.
#[track_caller]
pub fn transpose<T: Scalar>(m: &Tensor<T>) -> Tensor<T> {
    assert_eq!(m.rank(), 2, "transpose: tensor must be rank 2");
    permute_axes(m, &[1, 0])
}

/// `adjoint(m)`: conjugate transpose.
#[track_caller]
pub fn adjoint<T: Scalar>(m: &Tensor<T>) -> Tensor<T> {
    let t = transpose(m);
    let data: Vec<T> = t.as_slice().iter().map(|&x| x.conj()).collect();
    Tensor::from_vec(data).reshape(t.dims().clone())
}

/// `permute(t, i, j)`: swaps two axes, leaving the rest in place.
#[track_caller]
pub fn permute<T: Scalar>(t: &Tensor<T>, i: isize, j: isize) -> Tensor<T> {
    let i = t.dims().resolve_axis(i);
    let j = t.dims().resolve_axis(j);
    let mut order: Vec<usize> = (0..t.rank()).collect();
    order.swap(i, j);
    permute_axes(t, &order)
}

fn resolve_diag_offset(k: isize, rows: usize, cols: usize) -> (usize, usize, usize) {
    let len = if k >= 0 {
        rows.min(cols.saturating_sub(k as usize))
    } else {
        cols.min(rows.saturating_sub((-k) as usize))
    };
    let row0 = if k < 0 { (-k) as usize } else { 0 };
    let col0 = if k >= 0 { k as usize } else { 0 };
    (row0, col0, len)
}

/// `diag(v, k, rows, cols)`: builds a matrix with `v` placed on the
/// `k`-th diagonal (`k > 0` above the main diagonal, `k < 0` below),
/// zero elsewhere.
#[track_caller]
pub fn diag<T: Scalar>(v: &Tensor<T>, k: isize, rows: usize, cols: usize) -> Tensor<T> {
    let (row0, col0, len) = resolve_diag_offset(k, rows, cols);
    assert_eq!(v.size(), len, "diag: vector length {} does not match diagonal length {}", v.size(), len);
    let mut out = Tensor::zeros([rows, cols]);
    for n in 0..len {
        out.set(&[(row0 + n) as isize, (col0 + n) as isize], v.get_flat(n as isize));
    }
    out
}

/// `take_diag(m, k)`: extracts the `k`-th diagonal of a matrix.
#[track_caller]
pub fn take_diag<T: Scalar>(m: &Tensor<T>, k: isize) -> Tensor<T> {
    assert_eq!(m.rank(), 2, "take_diag: tensor must be rank 2");
    let (row0, col0, len) = resolve_diag_offset(k, m.rows(), m.columns());
    let data: Vec<T> = (0..len).map(|n| m.get(&[(row0 + n) as isize, (col0 + n) as isize])).collect();
    Tensor::from_vec(data)
}

/// `trace(m)`: sum of the main diagonal.
#[track_caller]
pub fn trace<T: Scalar>(m: &Tensor<T>) -> T {
    take_diag(m, 0).as_slice().iter().copied().sum()
}

/// `kron(a, b)`: the 2-D Kronecker product, Matlab block order:
/// `out[i*br+p, j*bc+q] = a[i,j] * b[p,q]` — spec.md §4.7.
#[track_caller]
pub fn kron<T: Scalar>(a: &Tensor<T>, b: &Tensor<T>) -> Tensor<T> {
    assert_eq!(a.rank(), 2, "kron: first operand must be rank 2");
    assert_eq!(b.rank(), 2, "kron: second operand must be rank 2");
    let (ar, ac) = (a.rows(), a.columns());
    let (br, bc) = (b.rows(), b.columns());
    let mut out = Tensor::zeros([ar * br, ac * bc]);
    for i in 0..ar {
        for j in 0..ac {
            let aij = a.get(&[i as isize, j as isize]);
            for p in 0..br {
                for q in 0..bc {
                    let v = aij * b.get(&[p as isize, q as isize]);
                    out.set(&[(i * br + p) as isize, (j * bc + q) as isize], v);
                }
            }
        }
    }
    out
}

/// `kron2(a, b) = kron(b, a)` — spec.md §4.7's reversed-order sibling
/// of [`kron`].
#[track_caller]
pub fn kron2<T: Scalar>(a: &Tensor<T>, b: &Tensor<T>) -> Tensor<T> {
    kron(b, a)
}

/// `scale(t, axis, v)`: multiplies every slice along `axis` by the
/// matching entry of the 1-D tensor `v`, broadcasting along the other
/// axes.
#[track_caller]
pub fn scale<T: Scalar>(t: &Tensor<T>, axis: isize, v: &Tensor<T>) -> Tensor<T> {
    let axis = t.dims().resolve_axis(axis);
    assert_eq!(
        v.size(),
        t.dims().dimension(axis as isize),
        "scale: vector length {} does not match axis size {}",
        v.size(),
        t.dims().dimension(axis as isize)
    );
    let mut out = t.clone();
    let sizes = t.dims().sizes().to_vec();
    let mut idx = vec![0usize; t.rank()];
    walk_indices(&sizes, &mut idx, 0, &mut |ix| {
        let signed: Vec<isize> = ix.iter().map(|&x| x as isize).collect();
        let factor = v.get_flat(ix[axis] as isize);
        out.set(&signed, t.get(&signed) * factor);
    });
    out
}

/// `linspace(a, b, n)`: `n` equally spaced points from `a` to `b`
/// inclusive.
#[track_caller]
pub fn linspace<T: Scalar>(a: T, b: T, n: usize) -> Tensor<T> {
    assert!(n >= 1, "linspace: n must be at least 1");
    if n == 1 {
        return Tensor::from_vec(vec![a]);
    }
    let step_count = T::from_f64((n - 1) as f64);
    let delta = (b - a) / step_count;
    let data: Vec<T> = (0..n).map(|i| a + delta * T::from_f64(i as f64)).collect();
    Tensor::from_vec(data)
}

fn free_sizes(sizes: &[usize], axis: usize) -> Vec<usize> {
    sizes.iter().enumerate().filter(|&(i, _)| i != axis).map(|(_, &s)| s).collect()
}

/// Reduces `t` along `axis` (or the whole flattened tensor if `axis`
/// is `None`) via `fold`, which must be associative/commutative on the
/// values it is given (sum, or the comparisons behind max/min).
fn reduce_axis<T: Scalar>(
    t: &Tensor<T>,
    axis: Option<isize>,
    init: T,
    fold: impl Fn(T, T) -> T,
) -> Tensor<T> {
    let Some(axis) = axis else {
        let acc = t.as_slice().iter().fold(init, |acc, &x| fold(acc, x));
        return Tensor::from_vec(vec![acc]);
    };
    let axis = t.dims().resolve_axis(axis);
    let sizes = t.dims().sizes().to_vec();
    let out_sizes = free_sizes(&sizes, axis);
    let out_dims: Dimensions = if out_sizes.is_empty() { vec![1] } else { out_sizes.clone() }.into();
    let mut out = Tensor::from_vec(vec![init; out_dims.total_size()]).reshape(out_dims);
    let mut idx = vec![0usize; t.rank()];
    walk_indices(&sizes, &mut idx, 0, &mut |ix| {
        let out_idx: Vec<isize> =
            ix.iter().enumerate().filter(|&(i, _)| i != axis).map(|(_, &x)| x as isize).collect();
        let out_idx = if out_idx.is_empty() { vec![0] } else { out_idx };
        let signed: Vec<isize> = ix.iter().map(|&x| x as isize).collect();
        let prev = out.get(&out_idx);
        out.set(&out_idx, fold(prev, t.get(&signed)));
    });
    out
}

/// `sum(t[, axis])`: reduces by addition.
pub fn sum<T: Scalar>(t: &Tensor<T>, axis: Option<isize>) -> Tensor<T> {
    reduce_axis(t, axis, T::zero(), |a, b| a + b)
}

/// `mean(t[, axis])`: `sum(t, axis) / n`, where `n` is the reduced
/// axis's extent (or the total size, when reducing the whole tensor).
pub fn mean<T: Scalar>(t: &Tensor<T>, axis: Option<isize>) -> Tensor<T> {
    let n = match axis {
        Some(a) => t.dims().dimension(a),
        None => t.size(),
    };
    let summed = sum(t, axis);
    let n = T::from_f64(n as f64);
    let data: Vec<T> = summed.as_slice().iter().map(|&x| x / n).collect();
    Tensor::from_vec(data).reshape(summed.dims().clone())
}

/// `max(t[, axis])`: real-valued only, since complex numbers have no
/// total order.
pub fn max(t: &Tensor<f64>, axis: Option<isize>) -> Tensor<f64> {
    reduce_axis(t, axis, f64::NEG_INFINITY, f64::max)
}

/// `min(t[, axis])`.
pub fn min(t: &Tensor<f64>, axis: Option<isize>) -> Tensor<f64> {
    reduce_axis(t, axis, f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transpose_swaps_rows_and_columns() {
        let m = Tensor::<f64>::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let t = transpose(&m);
        assert_eq!(t.dims().sizes(), &[3, 2]);
        assert_eq!(t.get(&[2, 1]), m.get(&[1, 2]));
    }

    #[test]
    fn diag_then_take_diag_round_trips() {
        let v = Tensor::<f64>::from_vec(vec![1.0, 2.0, 3.0]);
        let m = diag(&v, 0, 3, 3);
        assert_eq!(take_diag(&m, 0).to_vec(), v.to_vec());
        assert_eq!(trace(&m), 6.0);
    }

    #[test]
    fn kron_matches_matlab_block_order() {
        let a = Tensor::<f64>::from_rows(vec![vec![1.0, 2.0]]);
        let b = Tensor::<f64>::eye(2, 2);
        let k = kron(&a, &b);
        assert_eq!(k.dims().sizes(), &[2, 4]);
        assert_eq!(k.get(&[0, 0]), 1.0);
        assert_eq!(k.get(&[1, 1]), 1.0);
        assert_eq!(k.get(&[0, 2]), 2.0);
    }

    #[test]
    fn kron2_is_kron_with_operands_reversed() {
        let a = Tensor::<f64>::from_rows(vec![vec![1.0, 2.0]]);
        let b = Tensor::<f64>::eye(2, 2);
        assert_eq!(kron2(&a, &b).to_vec(), kron(&b, &a).to_vec());
    }

    #[test]
    fn sum_over_axis_reduces_correctly() {
        let m = Tensor::<f64>::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let col_sums = sum(&m, Some(0));
        assert_eq!(col_sums.to_vec(), vec![4.0, 6.0]);
        let total = sum(&m, None);
        assert_eq!(total.to_vec(), vec![10.0]);
    }

    #[test]
    fn linspace_produces_evenly_spaced_points() {
        let l = linspace(0.0_f64, 1.0, 5);
        assert_eq!(l.to_vec(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }
}
