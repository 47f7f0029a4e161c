//! LAPACK-backed factorizations: `svd`, `eig`, `eig_sym`, `solve`, plus
//! the power-iteration and matrix-free solvers the dense LAPACK path
//! doesn't cover (`eig_power_right`/`eig_power_left`, `expm`, `cgs`) —
//! spec.md §4.7.
//!
//! Storage here is column-major, LAPACK's native layout, so operands
//! go to Fortran unchanged; no row/column transposition is needed at
//! the FFI boundary (see DESIGN.md).

use nten_algebra::{Complex64, Scalar};

use crate::contract::mmult;
use crate::tensor::Tensor;

/// Dispatches the concrete LAPACK routine per scalar type. Grounded in
/// the `nalgebra-lapack` pattern of a small per-scalar trait whose
/// methods wrap `unsafe { lapack::dXXXX(..) }` calls one-to-one.
trait LapackOps: Scalar {
    /// `jobu`/`jobvt` are raw LAPACK job characters (`b'A'` full,
    /// `b'S'` economic, `b'N'` not computed); `u`/`vt` come back empty
    /// when their job character is `b'N'`.
    fn lapack_gesvd(a: &mut [Self], m: usize, n: usize, jobu: u8, jobvt: u8) -> (Vec<f64>, Vec<Self>, Vec<Self>);
    fn lapack_geev(a: &mut [Self], n: usize) -> (Vec<Complex64>, Vec<Complex64>);
    fn lapack_syev(a: &mut [Self], n: usize) -> (Vec<f64>, Vec<Self>);
    fn lapack_gesv(a: &mut [Self], b: &mut [Self], n: usize, nrhs: usize);
}

impl LapackOps for f64 {
    fn lapack_gesvd(a: &mut [f64], m: usize, n: usize, jobu: u8, jobvt: u8) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let k = m.min(n);
        let (m32, n32) = (m as i32, n as i32);
        let mut s = vec![0.0f64; k];
        let u_cols = match jobu {
            b'A' => m,
            b'S' => k,
            _ => 0,
        };
        let ldu = if jobu == b'N' { 1 } else { m };
        let mut u = vec![0.0f64; ldu * u_cols.max(1)];
        let vt_rows = match jobvt {
            b'A' => n,
            b'S' => k,
            _ => 0,
        };
        let ldvt = if jobvt == b'N' { 1 } else { vt_rows.max(1) };
        let mut vt = vec![0.0f64; ldvt * n.max(1)];
        let mut info = 0;
        let mut work = [0.0f64; 1];
        unsafe {
            lapack::dgesvd(
                jobu, jobvt, m32, n32, a, m32, &mut s, &mut u, ldu as i32, &mut vt, ldvt as i32,
                &mut work, -1, &mut info,
            );
        }
        let lwork = work[0].max(1.0) as i32;
        let mut work = vec![0.0f64; lwork as usize];
        unsafe {
            lapack::dgesvd(
                jobu, jobvt, m32, n32, a, m32, &mut s, &mut u, ldu as i32, &mut vt, ldvt as i32,
                &mut work, lwork, &mut info,
            );
        }
        assert_eq!(info, 0, "dgesvd failed with info={}", info);
        let u = if jobu == b'N' { Vec::new() } else { u };
        let vt = if jobvt == b'N' { Vec::new() } else { vt };
        (s, u, vt)
    }

    fn lapack_geev(a: &mut [f64], n: usize) -> (Vec<Complex64>, Vec<Complex64>) {
        let n32 = n as i32;
        let mut wr = vec![0.0f64; n];
        let mut wi = vec![0.0f64; n];
        let mut vr = vec![0.0f64; n * n];
        let mut info = 0;
        let mut work = [0.0f64; 1];
        unsafe {
            lapack::dgeev(
                b'N', b'V', n32, a, n32, &mut wr, &mut wi, &mut [], 1, &mut vr, n32, &mut work,
                -1, &mut info,
            );
        }
        let lwork = work[0].max(1.0) as i32;
        let mut work = vec![0.0f64; lwork as usize];
        unsafe {
            lapack::dgeev(
                b'N', b'V', n32, a, n32, &mut wr, &mut wi, &mut [], 1, &mut vr, n32, &mut work,
                lwork, &mut info,
            );
        }
        assert_eq!(info, 0, "dgeev failed with info={}", info);

        let values: Vec<Complex64> = wr.iter().zip(&wi).map(|(&re, &im)| Complex64::new(re, im)).collect();
        let mut vectors = vec![Complex64::new(0.0, 0.0); n * n];
        let mut j = 0;
        while j < n {
            if wi[j] == 0.0 {
                for i in 0..n {
                    vectors[i + n * j] = Complex64::new(vr[i + n * j], 0.0);
                }
                j += 1;
            } else {
                for i in 0..n {
                    let re = vr[i + n * j];
                    let im = vr[i + n * (j + 1)];
                    vectors[i + n * j] = Complex64::new(re, im);
                    vectors[i + n * (j + 1)] = Complex64::new(re, -im);
                }
                j += 2;
            }
        }
        (values, vectors)
    }

    fn lapack_syev(a: &mut [f64], n: usize) -> (Vec<f64>, Vec<f64>) {
        let n32 = n as i32;
        let mut w = vec![0.0f64; n];
        let mut info = 0;
        let mut work = [0.0f64; 1];
        unsafe {
            lapack::dsyev(b'V', b'U', n32, a, n32, &mut w, &mut work, -1, &mut info);
        }
        let lwork = work[0].max(1.0) as i32;
        let mut work = vec![0.0f64; lwork as usize];
        unsafe {
            lapack::dsyev(b'V', b'U', n32, a, n32, &mut w, &mut work, lwork, &mut info);
        }
        assert_eq!(info, 0, "dsyev failed with info={}", info);
        (w, a.to_vec())
    }

    fn lapack_gesv(a: &mut [f64], b: &mut [f64], n: usize, nrhs: usize) {
        let n32 = n as i32;
        let mut ipiv = vec![0i32; n];
        let mut info = 0;
        unsafe {
            lapack::dgesv(n32, nrhs as i32, a, n32, &mut ipiv, b, n32, &mut info);
        }
        assert_eq!(info, 0, "dgesv failed with info={}", info);
    }
}

impl LapackOps for Complex64 {
    fn lapack_gesvd(
        a: &mut [Complex64],
        m: usize,
        n: usize,
        jobu: u8,
        jobvt: u8,
    ) -> (Vec<f64>, Vec<Complex64>, Vec<Complex64>) {
        let k = m.min(n);
        let (m32, n32) = (m as i32, n as i32);
        let mut s = vec![0.0f64; k];
        let u_cols = match jobu {
            b'A' => m,
            b'S' => k,
            _ => 0,
        };
        let ldu = if jobu == b'N' { 1 } else { m };
        let mut u = vec![Complex64::new(0.0, 0.0); ldu * u_cols.max(1)];
        let vt_rows = match jobvt {
            b'A' => n,
            b'S' => k,
            _ => 0,
        };
        let ldvt = if jobvt == b'N' { 1 } else { vt_rows.max(1) };
        let mut vt = vec![Complex64::new(0.0, 0.0); ldvt * n.max(1)];
        let mut rwork = vec![0.0f64; 5 * k.max(1)];
        let mut info = 0;
        let mut work = [Complex64::new(0.0, 0.0); 1];
        unsafe {
            lapack::zgesvd(
                jobu, jobvt, m32, n32, a, m32, &mut s, &mut u, ldu as i32, &mut vt, ldvt as i32,
                &mut work, -1, &mut rwork, &mut info,
            );
        }
        let lwork = work[0].re.max(1.0) as i32;
        let mut work = vec![Complex64::new(0.0, 0.0); lwork as usize];
        unsafe {
            lapack::zgesvd(
                jobu, jobvt, m32, n32, a, m32, &mut s, &mut u, ldu as i32, &mut vt, ldvt as i32,
                &mut work, lwork, &mut rwork, &mut info,
            );
        }
        assert_eq!(info, 0, "zgesvd failed with info={}", info);
        let u = if jobu == b'N' { Vec::new() } else { u };
        let vt = if jobvt == b'N' { Vec::new() } else { vt };
        (s, u, vt)
    }

    fn lapack_geev(a: &mut [Complex64], n: usize) -> (Vec<Complex64>, Vec<Complex64>) {
        let n32 = n as i32;
        let mut w = vec![Complex64::new(0.0, 0.0); n];
        let mut vr = vec![Complex64::new(0.0, 0.0); n * n];
        let mut rwork = vec![0.0f64; 2 * n];
        let mut info = 0;
        let mut work = [Complex64::new(0.0, 0.0); 1];
        unsafe {
            lapack::zgeev(
                b'N', b'V', n32, a, n32, &mut w, &mut [], 1, &mut vr, n32, &mut work, -1,
                &mut rwork, &mut info,
            );
        }
        let lwork = work[0].re.max(1.0) as i32;
        let mut work = vec![Complex64::new(0.0, 0.0); lwork as usize];
        unsafe {
            lapack::zgeev(
                b'N', b'V', n32, a, n32, &mut w, &mut [], 1, &mut vr, n32, &mut work, lwork,
                &mut rwork, &mut info,
            );
        }
        assert_eq!(info, 0, "zgeev failed with info={}", info);
        (w, vr)
    }

    fn lapack_syev(a: &mut [Complex64], n: usize) -> (Vec<f64>, Vec<Complex64>) {
        let n32 = n as i32;
        let mut w = vec![0.0f64; n];
        let mut rwork = vec![0.0f64; (3 * n).saturating_sub(2).max(1)];
        let mut info = 0;
        let mut work = [Complex64::new(0.0, 0.0); 1];
        unsafe {
            lapack::zheev(b'V', b'U', n32, a, n32, &mut w, &mut work, -1, &mut rwork, &mut info);
        }
        let lwork = work[0].re.max(1.0) as i32;
        let mut work = vec![Complex64::new(0.0, 0.0); lwork as usize];
        unsafe {
            lapack::zheev(b'V', b'U', n32, a, n32, &mut w, &mut work, lwork, &mut rwork, &mut info);
        }
        assert_eq!(info, 0, "zheev failed with info={}", info);
        (w, a.to_vec())
    }

    fn lapack_gesv(a: &mut [Complex64], b: &mut [Complex64], n: usize, nrhs: usize) {
        let n32 = n as i32;
        let mut ipiv = vec![0i32; n];
        let mut info = 0;
        unsafe {
            lapack::zgesv(n32, nrhs as i32, a, n32, &mut ipiv, b, n32, &mut info);
        }
        assert_eq!(info, 0, "zgesv failed with info={}", info);
    }
}

/// `U`/`Vᵀ` are only populated when requested; in economic mode
/// (`k = min(m, n)`) `U` is `m x k` and `Vᵀ` is `k x n`, else `U` is
/// `m x m` and `Vᵀ` is `n x n` — spec.md §4.10.
pub struct SvdResult<T> {
    pub u: Option<Tensor<T>>,
    pub s: Tensor<f64>,
    pub vt: Option<Tensor<T>>,
}

/// `svd(m, want_u, want_vt, economic)`: `m == u * diag(s) * vt` up to
/// numerical error when both are requested.
#[track_caller]
pub fn svd<T: Scalar + LapackOps>(m: &Tensor<T>, want_u: bool, want_vt: bool, economic: bool) -> SvdResult<T> {
    assert_eq!(m.rank(), 2, "svd: tensor must be rank 2");
    let (rows, cols) = (m.rows(), m.columns());
    let k = rows.min(cols);
    let mut a = m.to_vec();
    let jobu = if !want_u {
        b'N'
    } else if economic {
        b'S'
    } else {
        b'A'
    };
    let jobvt = if !want_vt {
        b'N'
    } else if economic {
        b'S'
    } else {
        b'A'
    };
    let (s, u, vt) = T::lapack_gesvd(&mut a, rows, cols, jobu, jobvt);
    let u = want_u.then(|| Tensor::from_vec(u).reshape([rows, if economic { k } else { rows }]));
    let vt = want_vt.then(|| Tensor::from_vec(vt).reshape([if economic { k } else { cols }, cols]));
    SvdResult { u, s: Tensor::from_vec(s), vt }
}

/// General (non-symmetric) eigendecomposition; eigenvalues and
/// eigenvectors are always complex, even for a real input matrix.
pub struct EigResult {
    pub values: Tensor<Complex64>,
    pub vectors: Tensor<Complex64>,
}

/// `eig(m)`: right eigenvectors of a general square matrix.
#[track_caller]
pub fn eig<T: Scalar + LapackOps>(m: &Tensor<T>) -> EigResult {
    assert_eq!(m.rank(), 2, "eig: tensor must be rank 2");
    assert_eq!(m.rows(), m.columns(), "eig: matrix must be square");
    let n = m.rows();
    let mut a = m.to_vec();
    let (values, vectors) = T::lapack_geev(&mut a, n);
    EigResult { values: Tensor::from_vec(values), vectors: Tensor::from_vec(vectors).reshape([n, n]) }
}

/// Symmetric/Hermitian eigendecomposition: eigenvalues are always
/// real; eigenvectors keep the input's scalar type.
pub struct EigSymResult<T> {
    pub values: Tensor<f64>,
    pub vectors: Tensor<T>,
}

/// `eig_sym(m)`: assumes `m` is symmetric (or Hermitian, for complex
/// `T`) and only reads its upper triangle, per LAPACK `*syev`/`*heev`
/// convention.
#[track_caller]
pub fn eig_sym<T: Scalar + LapackOps>(m: &Tensor<T>) -> EigSymResult<T> {
    assert_eq!(m.rank(), 2, "eig_sym: tensor must be rank 2");
    assert_eq!(m.rows(), m.columns(), "eig_sym: matrix must be square");
    let n = m.rows();
    let mut a = m.to_vec();
    let (values, vectors) = T::lapack_syev(&mut a, n);
    EigSymResult { values: Tensor::from_vec(values), vectors: Tensor::from_vec(vectors).reshape([n, n]) }
}

/// `solve(a, b)`: solves `a * x = b` via LU factorization with partial
/// pivoting (LAPACK `*gesv`). `a` is overwritten in LAPACK but this
/// function takes it by reference and copies, matching the rest of
/// this crate's non-destructive call convention.
#[track_caller]
pub fn solve<T: Scalar + LapackOps>(a: &Tensor<T>, b: &Tensor<T>) -> Tensor<T> {
    assert_eq!(a.rank(), 2, "solve: a must be rank 2");
    assert_eq!(a.rows(), a.columns(), "solve: a must be square");
    assert_eq!(b.rows(), a.rows(), "solve: b must have as many rows as a");
    let n = a.rows();
    let nrhs = if b.rank() == 1 { 1 } else { b.columns() };
    let mut a_buf = a.to_vec();
    let mut b_buf = b.to_vec();
    T::lapack_gesv(&mut a_buf, &mut b_buf, n, nrhs);
    if b.rank() == 1 {
        Tensor::from_vec(b_buf)
    } else {
        Tensor::from_vec(b_buf).reshape([n, nrhs])
    }
}

/// Power iteration toward the eigenvalue of largest modulus (spec.md
/// §9, "Supplemented features": `eig_power_right`/`eig_power_left`
/// round out the sparse-friendly half of the eigendecomposition
/// surface that `eigs` (in `nten-eigensolver`) otherwise covers via
/// ARPACK's reverse-communication interface).
pub struct EigPowerResult<T> {
    pub value: T,
    pub vector: Tensor<T>,
}

fn power_iterate<T: Scalar>(
    apply: impl Fn(&Tensor<T>) -> Tensor<T>,
    n: usize,
    max_iter: usize,
    tol: f64,
) -> EigPowerResult<T> {
    let mut v = Tensor::from_vec(vec![T::one(); n]);
    let mut eigenvalue = T::zero();
    for _ in 0..max_iter {
        let mut av = apply(&v);
        let norm = av.as_slice().iter().map(|x| x.modulus() * x.modulus()).sum::<f64>().sqrt();
        assert!(norm > 0.0, "power_iterate: encountered a zero vector");
        for x in av.as_mut_slice() {
            *x = *x / T::from_f64(norm);
        }
        let new_eigenvalue: T =
            av.as_slice().iter().zip(v.as_slice()).map(|(&a, &b)| a.conj() * b).sum();
        let delta = (new_eigenvalue - eigenvalue).modulus();
        eigenvalue = new_eigenvalue;
        v = av;
        if delta < tol {
            break;
        }
    }
    EigPowerResult { value: eigenvalue, vector: v }
}

/// `eig_power_right(a)`: the dominant right eigenpair `(lambda, v)`
/// with `a * v ~= lambda * v`, via power iteration.
pub fn eig_power_right<T: Scalar>(a: &Tensor<T>) -> EigPowerResult<T> {
    assert_eq!(a.rank(), 2, "eig_power_right: tensor must be rank 2");
    assert_eq!(a.rows(), a.columns(), "eig_power_right: matrix must be square");
    let n = a.rows();
    power_iterate(|v| mmult(a, &v.reshape([n, 1])).reshape([n]), n, 500, 1e-12)
}

/// `eig_power_left(a)`: the dominant left eigenpair, i.e.
/// `eig_power_right` applied to `a`'s adjoint.
pub fn eig_power_left<T: Scalar>(a: &Tensor<T>) -> EigPowerResult<T> {
    let at = crate::structural::adjoint(a);
    eig_power_right(&at)
}

/// `expm(a)`: matrix exponential via scaling-and-squaring with a
/// diagonal [6/6] Pade approximant, the classic Moler-Van Loan
/// scheme.
#[track_caller]
pub fn expm<T: Scalar + LapackOps>(a: &Tensor<T>) -> Tensor<T> {
    assert_eq!(a.rank(), 2, "expm: tensor must be rank 2");
    assert_eq!(a.rows(), a.columns(), "expm: matrix must be square");
    let n = a.rows();

    let norm = a.as_slice().iter().map(|x| x.modulus()).fold(0.0, f64::max) * n as f64;
    let scale_exp = if norm <= 0.0 { 0 } else { (norm.log2().ceil() as i64 + 1).max(0) as u32 };
    let scale = T::from_f64(2f64.powi(-(scale_exp as i32)));

    let a_scaled: Tensor<T> = crate::ops::to_owned_scaled(a, scale);

    // Coefficients of the diagonal [6/6] Pade numerator/denominator of
    // e^A (Moler & Van Loan, "Nineteen Dubious Ways", table III).
    let c = [1.0, 0.5, 1.0 / 10.0, 1.0 / 120.0, 1.0 / 1680.0, 1.0 / 30240.0, 1.0 / 665280.0];

    let identity = Tensor::<T>::eye(n, n);
    let a2 = mmult(&a_scaled, &a_scaled);
    let a4 = mmult(&a2, &a2);
    let a6 = mmult(&a4, &a2);

    let mut u = crate::ops::to_owned_scaled(&identity, T::from_f64(c[1]));
    u = crate::ops::add_owned(&u, &crate::ops::to_owned_scaled(&a2, T::from_f64(c[3])));
    u = crate::ops::add_owned(&u, &crate::ops::to_owned_scaled(&a4, T::from_f64(c[5])));
    let u = mmult(&a_scaled, &u);

    let mut v = crate::ops::to_owned_scaled(&identity, T::from_f64(c[0]));
    v = crate::ops::add_owned(&v, &crate::ops::to_owned_scaled(&a2, T::from_f64(c[2])));
    v = crate::ops::add_owned(&v, &crate::ops::to_owned_scaled(&a4, T::from_f64(c[4])));
    v = crate::ops::add_owned(&v, &crate::ops::to_owned_scaled(&a6, T::from_f64(c[6])));

    let numerator = crate::ops::add_owned(&v, &u);
    let denominator = crate::ops::sub_owned(&v, &u);
    let mut result = solve(&denominator, &numerator);

    for _ in 0..scale_exp {
        result = mmult(&result, &result);
    }
    result
}

/// Matrix-free conjugate-gradient-squared solver for `a * x = b` where
/// `a` is supplied only through a matrix-vector product (spec.md §9,
/// "Supplemented features"; grounded on `original_source`'s CGS
/// driver, which exists precisely so large sparse systems never need
/// a materialised matrix).
pub fn cgs<T: Scalar>(
    apply: impl Fn(&Tensor<T>) -> Tensor<T>,
    b: &Tensor<T>,
    max_iter: usize,
    tol: f64,
) -> Tensor<T> {
    let n = b.size();
    let mut x = Tensor::<T>::zeros([n]);
    let mut r = crate::ops::sub_owned(b, &apply(&x));
    let r0 = r.clone();
    let mut rho_prev = T::one();
    let mut p = Tensor::<T>::zeros([n]);
    let mut q = Tensor::<T>::zeros([n]);
    let mut u = Tensor::<T>::zeros([n]);
    let b_norm = b.as_slice().iter().map(|x| x.modulus() * x.modulus()).sum::<f64>().sqrt().max(1e-300);

    for _ in 0..max_iter {
        let res_norm = r.as_slice().iter().map(|x| x.modulus() * x.modulus()).sum::<f64>().sqrt();
        if res_norm / b_norm < tol {
            break;
        }
        let rho: T = r0.as_slice().iter().zip(r.as_slice()).map(|(&a, &b)| a.conj() * b).sum();
        if rho.is_zero() {
            break;
        }
        if rho_prev.is_zero() {
            u = r.clone();
            p = r.clone();
        } else {
            let beta = rho / rho_prev;
            u = crate::ops::add_owned(&r, &crate::ops::to_owned_scaled(&q, beta));
            let beta_p_plus_q = crate::ops::add_owned(&crate::ops::to_owned_scaled(&p, beta), &q);
            p = crate::ops::add_owned(&u, &crate::ops::to_owned_scaled(&beta_p_plus_q, beta));
        }
        let v = apply(&p);
        let sigma: T = r0.as_slice().iter().zip(v.as_slice()).map(|(&a, &b)| a.conj() * b).sum();
        let alpha = rho / sigma;
        q = crate::ops::sub_owned(&u, &crate::ops::to_owned_scaled(&v, alpha));
        let uq = crate::ops::add_owned(&u, &q);
        x = crate::ops::add_owned(&x, &crate::ops::to_owned_scaled(&uq, alpha));
        let applied_uq = apply(&uq);
        r = crate::ops::sub_owned(&r, &crate::ops::to_owned_scaled(&applied_uq, alpha));
        rho_prev = rho;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svd_economic_shapes_u_mxk_and_vt_kxn() {
        let m = Tensor::<f64>::from_rows(vec![vec![1.0, 0.0, 0.0], vec![0.0, 2.0, 0.0]]);
        let result = svd(&m, true, true, true);
        assert_eq!(result.u.as_ref().unwrap().dims().sizes(), vec![2, 2]);
        assert_eq!(result.vt.as_ref().unwrap().dims().sizes(), vec![2, 3]);
        let values = result.s.to_vec();
        assert!(values[0] >= values[1]);
    }

    #[test]
    fn svd_full_shapes_u_mxm_and_vt_nxn() {
        let m = Tensor::<f64>::from_rows(vec![vec![1.0, 0.0, 0.0], vec![0.0, 2.0, 0.0]]);
        let result = svd(&m, true, true, false);
        assert_eq!(result.u.as_ref().unwrap().dims().sizes(), vec![2, 2]);
        assert_eq!(result.vt.as_ref().unwrap().dims().sizes(), vec![3, 3]);
    }

    #[test]
    fn svd_skips_unwanted_factors() {
        let m = Tensor::<f64>::eye(2, 2);
        let result = svd(&m, false, false, true);
        assert!(result.u.is_none());
        assert!(result.vt.is_none());
        assert_eq!(result.s.to_vec(), vec![1.0, 1.0]);
    }
}
