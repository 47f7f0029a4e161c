//! Raw bindings to ARPACK's reverse-communication Fortran routines.
//!
//! No `arpack`-specific crate is in this workspace's dependency
//! stack, so these are declared the same way the `lapack` crate
//! declares its own raw entry points: `extern "C"` signatures matching
//! gfortran's calling convention, including the hidden trailing
//! string-length parameters gfortran appends for every `CHARACTER`
//! argument. Link against a system ARPACK (`libarpack`); `lapack-src`
//! supplies the BLAS/LAPACK kernels ARPACK itself calls into.

use std::os::raw::{c_char, c_int};

#[link(name = "arpack")]
extern "C" {
    /// Symmetric reverse-communication driver: implicitly restarted
    /// Lanczos iteration.
    #[link_name = "dsaupd_"]
    pub fn dsaupd_(
        ido: *mut c_int,
        bmat: *const c_char,
        n: *const c_int,
        which: *const c_char,
        nev: *const c_int,
        tol: *const f64,
        resid: *mut f64,
        ncv: *const c_int,
        v: *mut f64,
        ldv: *const c_int,
        iparam: *mut c_int,
        ipntr: *mut c_int,
        workd: *mut f64,
        workl: *mut f64,
        lworkl: *const c_int,
        info: *mut c_int,
        bmat_len: c_int,
        which_len: c_int,
    );

    /// Extracts Ritz values/vectors after `dsaupd_` reports convergence.
    #[link_name = "dseupd_"]
    pub fn dseupd_(
        rvec: *const c_int,
        howmny: *const c_char,
        select: *mut c_int,
        d: *mut f64,
        z: *mut f64,
        ldz: *const c_int,
        sigma: *const f64,
        bmat: *const c_char,
        n: *const c_int,
        which: *const c_char,
        nev: *const c_int,
        tol: *const f64,
        resid: *mut f64,
        ncv: *const c_int,
        v: *mut f64,
        ldv: *const c_int,
        iparam: *mut c_int,
        ipntr: *mut c_int,
        workd: *mut f64,
        workl: *mut f64,
        lworkl: *const c_int,
        info: *mut c_int,
        howmny_len: c_int,
        bmat_len: c_int,
        which_len: c_int,
    );

    /// Nonsymmetric reverse-communication driver: implicitly restarted
    /// Arnoldi iteration.
    #[link_name = "dnaupd_"]
    pub fn dnaupd_(
        ido: *mut c_int,
        bmat: *const c_char,
        n: *const c_int,
        which: *const c_char,
        nev: *const c_int,
        tol: *const f64,
        resid: *mut f64,
        ncv: *const c_int,
        v: *mut f64,
        ldv: *const c_int,
        iparam: *mut c_int,
        ipntr: *mut c_int,
        workd: *mut f64,
        workl: *mut f64,
        lworkl: *const c_int,
        info: *mut c_int,
        bmat_len: c_int,
        which_len: c_int,
    );

    /// Extracts Ritz values/vectors after `dnaupd_` reports convergence.
    #[link_name = "dneupd_"]
    pub fn dneupd_(
        rvec: *const c_int,
        howmny: *const c_char,
        select: *mut c_int,
        dr: *mut f64,
        di: *mut f64,
        z: *mut f64,
        ldz: *const c_int,
        sigmar: *const f64,
        sigmai: *const f64,
        workev: *mut f64,
        bmat: *const c_char,
        n: *const c_int,
        which: *const c_char,
        nev: *const c_int,
        tol: *const f64,
        resid: *mut f64,
        ncv: *const c_int,
        v: *mut f64,
        ldv: *const c_int,
        iparam: *mut c_int,
        ipntr: *mut c_int,
        workd: *mut f64,
        workl: *mut f64,
        lworkl: *const c_int,
        info: *mut c_int,
        howmny_len: c_int,
        bmat_len: c_int,
        which_len: c_int,
    );
}
