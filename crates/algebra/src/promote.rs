use num_complex::Complex64;

/// Promotes a real or complex scalar to `Complex64`.
///
/// Used at the tensor level to implement the "operations that mix real
/// and complex produce complex" rule of spec.md §3 without a full
/// generic-promotion type system: a `Tensor<f64>` combined with a
/// `Tensor<Complex64>` first promotes the real operand elementwise.
pub trait ToComplex {
    fn to_complex(self) -> Complex64;
}

impl ToComplex for f64 {
    fn to_complex(self) -> Complex64 {
        Complex64::new(self, 0.0)
    }
}

impl ToComplex for Complex64 {
    fn to_complex(self) -> Complex64 {
        self
    }
}
