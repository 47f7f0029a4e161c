use thiserror::Error;

use crate::arpack_sys::{dnaupd_, dneupd_, dsaupd_, dseupd_};

/// Which end of the spectrum to converge to — ARPACK's `which`
/// parameter. The symmetric and nonsymmetric drivers accept different
/// string sets (`dsaupd_`: `LM/SM/LA/SA/BE`; `dnaupd_`: `LM/SM/LR/SR/LI/SI`),
/// so a single selector here covers both and each driver maps it to its
/// own code, rejecting variants the driver has no meaning for —
/// spec.md §4.11.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Which {
    LargestMagnitude,
    SmallestMagnitude,
    /// `LA` on the symmetric driver, `LR` on the nonsymmetric driver —
    /// both mean "largest real part"; a real symmetric operator's
    /// eigenvalues are already all real, so the symmetric driver calls
    /// the same thing "algebraically largest".
    LargestReal,
    SmallestReal,
    /// Only meaningful for the nonsymmetric driver: a real nonsymmetric
    /// operator can have complex-conjugate eigenpairs.
    LargestImaginary,
    SmallestImaginary,
    /// Symmetric driver only: `nev/2` from each end of the spectrum.
    BothEnds,
}

impl Which {
    #[track_caller]
    fn symmetric_code(self) -> [u8; 2] {
        match self {
            Which::LargestMagnitude => *b"LM",
            Which::SmallestMagnitude => *b"SM",
            Which::LargestReal => *b"LA",
            Which::SmallestReal => *b"SA",
            Which::BothEnds => *b"BE",
            Which::LargestImaginary | Which::SmallestImaginary => {
                panic!("{:?} has no imaginary part to select on a symmetric operator", self)
            }
        }
    }

    #[track_caller]
    fn nonsymmetric_code(self) -> [u8; 2] {
        match self {
            Which::LargestMagnitude => *b"LM",
            Which::SmallestMagnitude => *b"SM",
            Which::LargestReal => *b"LR",
            Which::SmallestReal => *b"SR",
            Which::LargestImaginary => *b"LI",
            Which::SmallestImaginary => *b"SI",
            Which::BothEnds => panic!("Which::BothEnds is only valid for the symmetric driver"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ArpackError {
    #[error("ARPACK reported info={0}")]
    Lapack(i32),
    #[error("ARPACK did not converge within the iteration budget")]
    NoConvergence,
    #[error("ARPACK exceeded the maximum number of Arnoldi update iterations")]
    TooManyIterations,
}

/// The reverse-communication loop's current demand on the caller
/// (spec.md §5's `Arpack` state machine: the caller supplies `OP*x`
/// and gets told what to compute next, rather than handing ARPACK a
/// matrix it can call directly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpackState {
    Initialized,
    /// The caller must read `get_x()`, compute `y = OP * x`, write it
    /// back with `set_y`, then call `update()` again.
    Running,
    Finished,
    Error,
    NoConvergence,
    TooManyIterations,
}

/// Drives ARPACK's `d{s,n}aupd_`/`d{s,n}eupd_` reverse-communication
/// protocol for the symmetric case (`dsaupd_`/`dseupd_`).
pub struct Arpack {
    n: usize,
    nev: usize,
    ncv: usize,
    which: [u8; 2],
    tol: f64,
    ido: i32,
    resid: Vec<f64>,
    v: Vec<f64>,
    iparam: [i32; 11],
    ipntr: [i32; 11],
    workd: Vec<f64>,
    workl: Vec<f64>,
    info: i32,
    pub state: ArpackState,
}

impl Arpack {
    /// `nev` eigenvalues of an `n x n` symmetric operator, converging
    /// toward `which`. `ncv` (the Lanczos basis size) follows ARPACK's
    /// own rule of thumb: at least `2*nev + 1`, capped at `n`.
    pub fn new(n: usize, nev: usize, which: Which, tol: f64) -> Self {
        assert!(nev < n, "Arpack::new: nev must be smaller than n");
        let ncv = (2 * nev + 1).max(20).min(n);
        let lworkl = ncv * ncv + 8 * ncv;
        let mut iparam = [0i32; 11];
        iparam[0] = 1; // exact shifts
        iparam[2] = 300; // max iterations
        iparam[3] = 1;
        iparam[6] = 1; // mode 1: standard eigenproblem
        Self {
            n,
            nev,
            ncv,
            which: which.symmetric_code(),
            tol,
            ido: 0,
            resid: vec![0.0; n],
            v: vec![0.0; n * ncv],
            iparam,
            ipntr: [0; 11],
            workd: vec![0.0; 3 * n],
            workl: vec![0.0; lworkl],
            info: 0,
            state: ArpackState::Initialized,
        }
    }

    /// Advances the reverse-communication loop by one ARPACK call.
    /// Transitions `state` to `Running` (caller must supply `OP*x`
    /// next), `Finished`, or one of the terminal error states.
    pub fn update(&mut self) {
        let n = self.n as i32;
        let nev = self.nev as i32;
        let ncv = self.ncv as i32;
        let lworkl = self.workl.len() as i32;
        unsafe {
            dsaupd_(
                &mut self.ido,
                b"I\0".as_ptr().cast(),
                &n,
                self.which.as_ptr().cast(),
                &nev,
                &self.tol,
                self.resid.as_mut_ptr(),
                &ncv,
                self.v.as_mut_ptr(),
                &n,
                self.iparam.as_mut_ptr(),
                self.ipntr.as_mut_ptr(),
                self.workd.as_mut_ptr(),
                self.workl.as_mut_ptr(),
                &lworkl,
                &mut self.info,
                1,
                2,
            );
        }
        self.state = match self.ido {
            -1 | 1 => ArpackState::Running,
            99 => {
                if self.info == 0 {
                    ArpackState::Finished
                } else if self.info == 1 {
                    ArpackState::TooManyIterations
                } else if self.info == 3 {
                    ArpackState::NoConvergence
                } else {
                    ArpackState::Error
                }
            }
            _ => ArpackState::Error,
        };
    }

    /// The vector `x` the caller must apply `OP` to next.
    pub fn get_x(&self) -> &[f64] {
        let start = self.ipntr[0] as usize - 1;
        &self.workd[start..start + self.n]
    }

    /// Writes `OP * x` back for ARPACK to consume on the next
    /// `update()`.
    pub fn set_y(&mut self, y: &[f64]) {
        let start = self.ipntr[1] as usize - 1;
        self.workd[start..start + self.n].copy_from_slice(y);
    }

    /// Once `state == Finished`, extracts converged Ritz values and
    /// vectors via `dseupd_`.
    pub fn get_data(&mut self) -> Result<(Vec<f64>, Vec<f64>), ArpackError> {
        match self.state {
            ArpackState::Finished => {}
            ArpackState::NoConvergence => return Err(ArpackError::NoConvergence),
            ArpackState::TooManyIterations => return Err(ArpackError::TooManyIterations),
            _ => return Err(ArpackError::Lapack(self.info)),
        }
        let n = self.n as i32;
        let nev = self.nev as i32;
        let ncv = self.ncv as i32;
        let lworkl = self.workl.len() as i32;
        let mut select = vec![0i32; self.ncv];
        let mut d = vec![0.0f64; self.nev];
        let mut z = vec![0.0f64; self.n * self.nev];
        let rvec = 1i32;
        let sigma = 0.0f64;
        let mut info = 0;
        unsafe {
            dseupd_(
                &rvec,
                b"A\0".as_ptr().cast(),
                select.as_mut_ptr(),
                d.as_mut_ptr(),
                z.as_mut_ptr(),
                &n,
                &sigma,
                b"I\0".as_ptr().cast(),
                &n,
                self.which.as_ptr().cast(),
                &nev,
                &self.tol,
                self.resid.as_mut_ptr(),
                &ncv,
                self.v.as_mut_ptr(),
                &n,
                self.iparam.as_mut_ptr(),
                self.ipntr.as_mut_ptr(),
                self.workd.as_mut_ptr(),
                self.workl.as_mut_ptr(),
                &lworkl,
                &mut info,
                1,
                1,
                2,
            );
        }
        if info != 0 {
            return Err(ArpackError::Lapack(info));
        }
        Ok((d, z))
    }
}

/// Nonsymmetric counterpart of [`Arpack`], driving `dnaupd_`/`dneupd_`.
/// Eigenvalues/vectors are returned as real/imaginary pairs since a
/// real nonsymmetric operator can have complex-conjugate eigenpairs.
pub struct ArpackNonSymmetric {
    n: usize,
    nev: usize,
    ncv: usize,
    which: [u8; 2],
    tol: f64,
    ido: i32,
    resid: Vec<f64>,
    v: Vec<f64>,
    iparam: [i32; 11],
    ipntr: [i32; 11],
    workd: Vec<f64>,
    workl: Vec<f64>,
    info: i32,
    pub state: ArpackState,
}

impl ArpackNonSymmetric {
    pub fn new(n: usize, nev: usize, which: Which, tol: f64) -> Self {
        assert!(nev + 2 < n, "ArpackNonSymmetric::new: nev must leave room for 2 extra Arnoldi vectors");
        let ncv = (2 * nev + 2).max(20).min(n);
        let lworkl = 3 * ncv * ncv + 6 * ncv;
        let mut iparam = [0i32; 11];
        iparam[0] = 1;
        iparam[2] = 300;
        iparam[3] = 1;
        iparam[6] = 1;
        Self {
            n,
            nev,
            ncv,
            which: which.nonsymmetric_code(),
            tol,
            ido: 0,
            resid: vec![0.0; n],
            v: vec![0.0; n * ncv],
            iparam,
            ipntr: [0; 11],
            workd: vec![0.0; 3 * n],
            workl: vec![0.0; lworkl],
            info: 0,
            state: ArpackState::Initialized,
        }
    }

    pub fn update(&mut self) {
        let n = self.n as i32;
        let nev = self.nev as i32;
        let ncv = self.ncv as i32;
        let lworkl = self.workl.len() as i32;
        unsafe {
            dnaupd_(
                &mut self.ido,
                b"I\0".as_ptr().cast(),
                &n,
                self.which.as_ptr().cast(),
                &nev,
                &self.tol,
                self.resid.as_mut_ptr(),
                &ncv,
                self.v.as_mut_ptr(),
                &n,
                self.iparam.as_mut_ptr(),
                self.ipntr.as_mut_ptr(),
                self.workd.as_mut_ptr(),
                self.workl.as_mut_ptr(),
                &lworkl,
                &mut self.info,
                1,
                2,
            );
        }
        self.state = match self.ido {
            -1 | 1 => ArpackState::Running,
            99 => {
                if self.info == 0 {
                    ArpackState::Finished
                } else if self.info == 1 {
                    ArpackState::TooManyIterations
                } else if self.info == 3 {
                    ArpackState::NoConvergence
                } else {
                    ArpackState::Error
                }
            }
            _ => ArpackState::Error,
        };
    }

    pub fn get_x(&self) -> &[f64] {
        let start = self.ipntr[0] as usize - 1;
        &self.workd[start..start + self.n]
    }

    pub fn set_y(&mut self, y: &[f64]) {
        let start = self.ipntr[1] as usize - 1;
        self.workd[start..start + self.n].copy_from_slice(y);
    }

    /// Returns `(real parts, imaginary parts, eigenvectors)`; a
    /// complex-conjugate eigenpair's vectors are packed the way
    /// `dneupd_` packs them (real/imaginary interleaved across two
    /// adjacent columns).
    pub fn get_data(&mut self) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>), ArpackError> {
        match self.state {
            ArpackState::Finished => {}
            ArpackState::NoConvergence => return Err(ArpackError::NoConvergence),
            ArpackState::TooManyIterations => return Err(ArpackError::TooManyIterations),
            _ => return Err(ArpackError::Lapack(self.info)),
        }
        let n = self.n as i32;
        let nev = self.nev as i32;
        let ncv = self.ncv as i32;
        let lworkl = self.workl.len() as i32;
        let mut select = vec![0i32; self.ncv];
        let mut dr = vec![0.0f64; self.nev + 1];
        let mut di = vec![0.0f64; self.nev + 1];
        let mut z = vec![0.0f64; self.n * (self.nev + 1)];
        let mut workev = vec![0.0f64; 3 * self.ncv];
        let rvec = 1i32;
        let (sigmar, sigmai) = (0.0f64, 0.0f64);
        let mut info = 0;
        unsafe {
            dneupd_(
                &rvec,
                b"A\0".as_ptr().cast(),
                select.as_mut_ptr(),
                dr.as_mut_ptr(),
                di.as_mut_ptr(),
                z.as_mut_ptr(),
                &n,
                &sigmar,
                &sigmai,
                workev.as_mut_ptr(),
                b"I\0".as_ptr().cast(),
                &n,
                self.which.as_ptr().cast(),
                &nev,
                &self.tol,
                self.resid.as_mut_ptr(),
                &ncv,
                self.v.as_mut_ptr(),
                &n,
                self.iparam.as_mut_ptr(),
                self.ipntr.as_mut_ptr(),
                self.workd.as_mut_ptr(),
                self.workl.as_mut_ptr(),
                &lworkl,
                &mut info,
                1,
                1,
                2,
            );
        }
        if info != 0 {
            return Err(ArpackError::Lapack(info));
        }
        dr.truncate(self.nev);
        di.truncate(self.nev);
        z.truncate(self.n * self.nev);
        Ok((dr, di, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_and_nonsymmetric_codes_diverge_on_the_real_part_selectors() {
        assert_eq!(&Which::LargestReal.symmetric_code(), b"LA");
        assert_eq!(&Which::SmallestReal.symmetric_code(), b"SA");
        assert_eq!(&Which::LargestReal.nonsymmetric_code(), b"LR");
        assert_eq!(&Which::SmallestReal.nonsymmetric_code(), b"SR");
        assert_eq!(&Which::LargestMagnitude.symmetric_code(), &Which::LargestMagnitude.nonsymmetric_code());
    }

    #[test]
    #[should_panic(expected = "no imaginary part")]
    fn symmetric_code_rejects_imaginary_selectors() {
        Which::LargestImaginary.symmetric_code();
    }

    #[test]
    #[should_panic(expected = "only valid for the symmetric driver")]
    fn nonsymmetric_code_rejects_both_ends() {
        Which::BothEnds.nonsymmetric_code();
    }
}
