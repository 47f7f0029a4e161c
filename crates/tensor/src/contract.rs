use nten_algebra::Scalar;

use crate::structural::permute_axes;
use crate::tensor::Tensor;

/// Dense 2-D matrix multiply. `fold`/`mmult` reduce every contraction
/// to this single kernel after permuting the contracted axis into
/// canonical position, which keeps the general N-D case out of the
/// inner loop. A generic `T: Scalar` can't be dispatched to `dgemm`/
/// `zgemm` without per-type specialization, so this stays a plain
/// triple loop; `factor.rs` is where the LAPACK/BLAS bindings live,
/// on concrete `f64`/`Complex64` entry points.
fn matmul2d<T: Scalar>(a: &Tensor<T>, b: &Tensor<T>) -> Tensor<T> {
    assert_eq!(a.rank(), 2, "matmul2d: left operand must be rank 2");
    assert_eq!(b.rank(), 2, "matmul2d: right operand must be rank 2");
    let (m, k) = (a.rows(), a.columns());
    let (k2, n) = (b.rows(), b.columns());
    assert_eq!(k, k2, "matmul2d: inner dimensions {} and {} do not match", k, k2);
    let mut out = Tensor::zeros([m, n]);
    for j in 0..n {
        for p in 0..k {
            let bpj = b.get(&[p as isize, j as isize]);
            if bpj.is_zero() {
                continue;
            }
            for i in 0..m {
                let prev = out.get(&[i as isize, j as isize]);
                out.set(&[i as isize, j as isize], prev + a.get(&[i as isize, p as isize]) * bpj);
            }
        }
    }
    out
}

fn free_axes(rank: usize, axis: usize) -> Vec<usize> {
    (0..rank).filter(|&a| a != axis).collect()
}

/// `fold(a, i, b, j)`: contracts axis `i` of `a` against axis `j` of
/// `b`, producing a tensor whose axes are `a`'s remaining axes (in
/// order) followed by `b`'s remaining axes (in order) — spec.md §4.6.
#[track_caller]
pub fn fold<T: Scalar>(a: &Tensor<T>, i: isize, b: &Tensor<T>, j: isize) -> Tensor<T> {
    let i = a.dims().resolve_axis(i);
    let j = b.dims().resolve_axis(j);
    assert_eq!(
        a.dims().dimension(i as isize),
        b.dims().dimension(j as isize),
        "fold: contracted axes have sizes {} and {}",
        a.dims().dimension(i as isize),
        b.dims().dimension(j as isize)
    );

    let a_free = free_axes(a.rank(), i);
    let b_free = free_axes(b.rank(), j);

    let mut order_a = a_free.clone();
    order_a.push(i);
    let mut order_b = vec![j];
    order_b.extend(b_free.iter().copied());

    let permuted_a = permute_axes(a, &order_a);
    let permuted_b = permute_axes(b, &order_b);

    let a_free_sizes: Vec<usize> = a_free.iter().map(|&ax| a.dims().dimension(ax as isize)).collect();
    let b_free_sizes: Vec<usize> = b_free.iter().map(|&ax| b.dims().dimension(ax as isize)).collect();
    let contract_dim = a.dims().dimension(i as isize);
    let m: usize = a_free_sizes.iter().product();
    let n: usize = b_free_sizes.iter().product();

    let a2d = permuted_a.reshape([m.max(1), contract_dim]);
    let b2d = permuted_b.reshape([contract_dim, n.max(1)]);
    let result2d = matmul2d(&a2d, &b2d);

    let mut final_sizes = a_free_sizes;
    final_sizes.extend(b_free_sizes);
    if final_sizes.is_empty() {
        final_sizes.push(1);
    }
    result2d.reshape(final_sizes)
}

/// `foldc(a, i, b, j)`: like [`fold`], but conjugates `a` first — the
/// contraction behind Hermitian inner products.
#[track_caller]
pub fn foldc<T: Scalar>(a: &Tensor<T>, i: isize, b: &Tensor<T>, j: isize) -> Tensor<T> {
    let conj_data: Vec<T> = a.as_slice().iter().map(|&x| x.conj()).collect();
    let conj_a = Tensor::from_vec(conj_data).reshape(a.dims().clone());
    fold(&conj_a, i, b, j)
}

/// `foldin(a, i, b, j)`: contracts axis `i` of `a` against axis `j` of
/// `b`, treating `a` as an operator acting on that one axis of `b` in
/// place. `b`'s other axes stay where they were; `a`'s free axes are
/// spliced in where axis `j` used to be, giving `(b-pre, a-free,
/// b-post)` — spec.md §4.6, the original's `do_foldin_into`
/// (`a(i,l,j) * b(k,l,m) -> c(k,i,j,m)`).
#[track_caller]
pub fn foldin<T: Scalar>(a: &Tensor<T>, i: isize, b: &Tensor<T>, j: isize) -> Tensor<T> {
    let i = a.dims().resolve_axis(i);
    let j = b.dims().resolve_axis(j);
    assert_eq!(
        a.dims().dimension(i as isize),
        b.dims().dimension(j as isize),
        "foldin: contracted axes have sizes {} and {}",
        a.dims().dimension(i as isize),
        b.dims().dimension(j as isize)
    );

    let a_free = free_axes(a.rank(), i);
    let b_free = free_axes(b.rank(), j);
    let n_pre = j.min(b_free.len());

    let mut order_a = a_free.clone();
    order_a.push(i);
    let mut order_b = vec![j];
    order_b.extend(b_free.iter().copied());

    let permuted_a = permute_axes(a, &order_a);
    let permuted_b = permute_axes(b, &order_b);

    let a_free_sizes: Vec<usize> = a_free.iter().map(|&ax| a.dims().dimension(ax as isize)).collect();
    let b_free_sizes: Vec<usize> = b_free.iter().map(|&ax| b.dims().dimension(ax as isize)).collect();
    let contract_dim = a.dims().dimension(i as isize);
    let m: usize = a_free_sizes.iter().product();
    let n: usize = b_free_sizes.iter().product();

    let a2d = permuted_a.reshape([m.max(1), contract_dim]);
    let b2d = permuted_b.reshape([contract_dim, n.max(1)]);
    let result2d = matmul2d(&a2d, &b2d);

    let na = a_free.len();
    let nb = b_free.len();

    let mut interleaved_sizes = a_free_sizes;
    interleaved_sizes.extend(b_free_sizes);
    if interleaved_sizes.is_empty() {
        return result2d.reshape([1]);
    }
    let interleaved = result2d.reshape(interleaved_sizes);

    // interleaved's axes are currently (a-free, b-free) = (a-free, b-pre, b-post);
    // move b-pre in front of a-free to get (b-pre, a-free, b-post).
    let mut order: Vec<usize> = Vec::with_capacity(na + nb);
    order.extend(na..na + n_pre);
    order.extend(0..na);
    order.extend(na + n_pre..na + nb);
    permute_axes(&interleaved, &order)
}

/// `mmult(a, b) = fold(a, -1, b, 0)`: ordinary matrix multiply when
/// both operands are rank 2.
#[track_caller]
pub fn mmult<T: Scalar>(a: &Tensor<T>, b: &Tensor<T>) -> Tensor<T> {
    fold(a, -1, b, 0)
}

/// `mmult_into(c, a, b)`: overwrites `c` with `mmult(a, b)`.
#[track_caller]
pub fn mmult_into<T: Scalar>(c: &mut Tensor<T>, a: &Tensor<T>, b: &Tensor<T>) {
    *c = mmult(a, b);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mmult_matches_hand_computed_product() {
        let a = Tensor::<f64>::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = Tensor::<f64>::from_rows(vec![vec![5.0, 6.0], vec![7.0, 8.0]]);
        let c = mmult(&a, &b);
        assert_eq!(c.to_vec(), vec![19.0, 43.0, 22.0, 50.0]);
    }

    #[test]
    fn fold_contracts_named_axes() {
        // a: 2x3, b: 3x2 contracted on a's axis 1 against b's axis 0 == mmult
        let a = Tensor::<f64>::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let b = Tensor::<f64>::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]]);
        let direct = mmult(&a, &b);
        let via_fold = fold(&a, 1, &b, 0);
        assert_eq!(direct.to_vec(), via_fold.to_vec());
    }

    #[test]
    fn foldin_wraps_bs_free_axes_around_as_contraction() {
        // a(i, l): i is a's free axis, l is contracted.
        let a = Tensor::<f64>::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        // b(k, l): k is b's free axis, l is contracted (j = 1).
        let b = Tensor::<f64>::from_rows(vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]);

        let result = foldin(&a, 1, &b, 1);
        // foldin's axis order is (b-pre, a-free, b-post) = (k, i), the
        // mirror image of fold's (a-free, b-free) = (i, k).
        assert_eq!(result.dims().sizes(), vec![2, 2]);
        assert_eq!(result.to_vec(), vec![1.0, 2.0, 4.0, 5.0]);

        let via_fold = fold(&a, 1, &b, 1);
        assert_eq!(via_fold.dims().sizes(), vec![2, 2]);
        assert_eq!(via_fold.to_vec(), vec![1.0, 4.0, 2.0, 5.0]);
    }
}
