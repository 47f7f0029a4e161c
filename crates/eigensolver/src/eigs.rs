use nten_algebra::Complex64;
use nten_sparse::{mmult_sparse_dense, Sparse};
use nten_tensor::Tensor;

use crate::driver::{Arpack, ArpackError, ArpackNonSymmetric, ArpackState, Which};

/// `eigs(matvec, n, nev, which)`: the `nev` eigenpairs of a symmetric
/// `n x n` operator nearest `which`, supplied only as a
/// matrix-vector product — ARPACK's whole reason for existing is that
/// `A` itself never needs to be materialised (spec.md §5).
pub fn eigs(
    mut matvec: impl FnMut(&[f64]) -> Vec<f64>,
    n: usize,
    nev: usize,
    which: Which,
) -> Result<(Vec<f64>, Tensor<f64>), ArpackError> {
    let mut solver = Arpack::new(n, nev, which, 0.0);
    loop {
        solver.update();
        match solver.state {
            ArpackState::Running => {
                let y = matvec(solver.get_x());
                solver.set_y(&y);
            }
            ArpackState::Finished => break,
            ArpackState::NoConvergence => return Err(ArpackError::NoConvergence),
            ArpackState::TooManyIterations => return Err(ArpackError::TooManyIterations),
            ArpackState::Error | ArpackState::Initialized => {
                return Err(ArpackError::Lapack(-1));
            }
        }
    }
    let (values, vectors) = solver.get_data()?;
    let nev = values.len();
    Ok((values, Tensor::from_vec(vectors).reshape([n, nev])))
}

/// `eigs_gen(matvec, n, nev, which)`: the nonsymmetric counterpart of
/// [`eigs`]. Eigenvalues/vectors are always returned as complex since
/// a real nonsymmetric operator can have complex-conjugate pairs.
pub fn eigs_gen(
    mut matvec: impl FnMut(&[f64]) -> Vec<f64>,
    n: usize,
    nev: usize,
    which: Which,
) -> Result<(Vec<Complex64>, Tensor<Complex64>), ArpackError> {
    let mut solver = ArpackNonSymmetric::new(n, nev, which, 0.0);
    loop {
        solver.update();
        match solver.state {
            ArpackState::Running => {
                let y = matvec(solver.get_x());
                solver.set_y(&y);
            }
            ArpackState::Finished => break,
            ArpackState::NoConvergence => return Err(ArpackError::NoConvergence),
            ArpackState::TooManyIterations => return Err(ArpackError::TooManyIterations),
            ArpackState::Error | ArpackState::Initialized => {
                return Err(ArpackError::Lapack(-1));
            }
        }
    }
    let (dr, di, z_real) = solver.get_data()?;
    let values: Vec<Complex64> = dr.iter().zip(&di).map(|(&re, &im)| Complex64::new(re, im)).collect();

    // Unpack dneupd_'s real-valued eigenvector storage: a real column
    // for a real eigenvalue, or a real/imaginary column pair for a
    // complex-conjugate pair, matching `lapack_geev`'s reconstruction
    // in `nten-tensor`.
    let mut vectors = vec![Complex64::new(0.0, 0.0); n * values.len()];
    let mut j = 0;
    while j < values.len() {
        if di[j] == 0.0 {
            for i in 0..n {
                vectors[i + n * j] = Complex64::new(z_real[i + n * j], 0.0);
            }
            j += 1;
        } else {
            for i in 0..n {
                let re = z_real[i + n * j];
                let im = z_real[i + n * (j + 1)];
                vectors[i + n * j] = Complex64::new(re, im);
                vectors[i + n * (j + 1)] = Complex64::new(re, -im);
            }
            j += 2;
        }
    }
    Ok((values, Tensor::from_vec(vectors).reshape([n, dr.len()])))
}

/// Convenience entry point: eigenpairs of a symmetric [`Sparse`]
/// matrix, via `eigs` with the matvec closure bound to sparse-dense
/// multiplication.
pub fn eigs_sparse(s: &Sparse<f64>, nev: usize, which: Which) -> Result<(Vec<f64>, Tensor<f64>), ArpackError> {
    assert_eq!(s.rows(), s.cols(), "eigs_sparse: matrix must be square");
    let n = s.rows();
    eigs(
        |x| mmult_sparse_dense(s, &Tensor::from_vec(x.to_vec()).reshape([n, 1])).reshape([n]).to_vec(),
        n,
        nev,
        which,
    )
}
