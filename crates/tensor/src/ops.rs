use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use nten_algebra::{Complex64, Scalar};

use crate::booleans::Booleans;
use crate::tensor::Tensor;

/// `empty op empty == empty` plus same-shape elementwise application
/// (spec.md §4.5).
#[track_caller]
fn zip_elementwise<T: Scalar>(a: &Tensor<T>, b: &Tensor<T>, f: impl Fn(T, T) -> T) -> Tensor<T> {
    if a.size() == 0 && b.size() == 0 {
        return Tensor::empty(a.dims().clone());
    }
    assert_eq!(
        a.dims().sizes(),
        b.dims().sizes(),
        "elementwise op: shape mismatch {:?} vs {:?}",
        a.dims().sizes(),
        b.dims().sizes()
    );
    let data: Vec<T> =
        a.as_slice().iter().zip(b.as_slice()).map(|(&x, &y)| f(x, y)).collect();
    Tensor::from_vec(data).reshape(a.dims().clone())
}

fn map_scalar<T: Scalar>(a: &Tensor<T>, f: impl Fn(T) -> T) -> Tensor<T> {
    let data: Vec<T> = a.as_slice().iter().map(|&x| f(x)).collect();
    Tensor::from_vec(data).reshape(a.dims().clone())
}

/// Owned-reference elementwise helpers for `factor.rs`'s iterative
/// solvers, which accumulate linear combinations without wanting to
/// consume their operands.
pub(crate) fn to_owned_scaled<T: Scalar>(t: &Tensor<T>, factor: T) -> Tensor<T> {
    map_scalar(t, |x| x * factor)
}

pub(crate) fn add_owned<T: Scalar>(a: &Tensor<T>, b: &Tensor<T>) -> Tensor<T> {
    zip_elementwise(a, b, |x, y| x + y)
}

pub(crate) fn sub_owned<T: Scalar>(a: &Tensor<T>, b: &Tensor<T>) -> Tensor<T> {
    zip_elementwise(a, b, |x, y| x - y)
}

macro_rules! impl_binop {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<T: Scalar> $trait for Tensor<T> {
            type Output = Tensor<T>;
            fn $method(self, rhs: Tensor<T>) -> Tensor<T> {
                zip_elementwise(&self, &rhs, |a, b| a $op b)
            }
        }

        impl<T: Scalar> $trait<&Tensor<T>> for &Tensor<T> {
            type Output = Tensor<T>;
            fn $method(self, rhs: &Tensor<T>) -> Tensor<T> {
                zip_elementwise(self, rhs, |a, b| a $op b)
            }
        }

        impl<T: Scalar> $trait<T> for Tensor<T> {
            type Output = Tensor<T>;
            fn $method(self, rhs: T) -> Tensor<T> {
                map_scalar(&self, |a| a $op rhs)
            }
        }
    };
}

impl_binop!(Add, add, +);
impl_binop!(Sub, sub, -);
impl_binop!(Mul, mul, *);
impl_binop!(Div, div, /);

macro_rules! impl_scalar_lhs {
    ($scalar:ty, $trait:ident, $method:ident, $op:tt) => {
        impl $trait<Tensor<$scalar>> for $scalar {
            type Output = Tensor<$scalar>;
            fn $method(self, rhs: Tensor<$scalar>) -> Tensor<$scalar> {
                map_scalar(&rhs, |a| self $op a)
            }
        }
    };
}

impl_scalar_lhs!(f64, Add, add, +);
impl_scalar_lhs!(f64, Sub, sub, -);
impl_scalar_lhs!(f64, Mul, mul, *);
impl_scalar_lhs!(Complex64, Add, add, +);
impl_scalar_lhs!(Complex64, Sub, sub, -);
impl_scalar_lhs!(Complex64, Mul, mul, *);

macro_rules! impl_assign_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<T: Scalar> $trait<Tensor<T>> for Tensor<T> {
            fn $method(&mut self, rhs: Tensor<T>) {
                let result = zip_elementwise(self, &rhs, |a, b| a $op b);
                *self = result;
            }
        }

        impl<T: Scalar> $trait<T> for Tensor<T> {
            fn $method(&mut self, rhs: T) {
                let result = map_scalar(self, |a| a $op rhs);
                *self = result;
            }
        }
    };
}

impl_assign_op!(AddAssign, add_assign, +);
impl_assign_op!(SubAssign, sub_assign, -);
impl_assign_op!(MulAssign, mul_assign, *);
impl_assign_op!(DivAssign, div_assign, /);

impl<T: Scalar> Neg for Tensor<T> {
    type Output = Tensor<T>;
    fn neg(self) -> Tensor<T> {
        map_scalar(&self, |a| -a)
    }
}

// Mixed real/complex promotion: "operations that mix real and complex
// produce complex" (spec.md §4.5).
macro_rules! impl_mixed {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<Tensor<Complex64>> for Tensor<f64> {
            type Output = Tensor<Complex64>;
            fn $method(self, rhs: Tensor<Complex64>) -> Tensor<Complex64> {
                let lhs = to_complex(&self);
                zip_elementwise(&lhs, &rhs, |a, b| a $op b)
            }
        }

        impl $trait<Tensor<f64>> for Tensor<Complex64> {
            type Output = Tensor<Complex64>;
            fn $method(self, rhs: Tensor<f64>) -> Tensor<Complex64> {
                let rhs = to_complex(&rhs);
                zip_elementwise(&self, &rhs, |a, b| a $op b)
            }
        }
    };
}

impl_mixed!(Add, add, +);
impl_mixed!(Sub, sub, -);
impl_mixed!(Mul, mul, *);
impl_mixed!(Div, div, /);

/// Promotes a real tensor to complex, elementwise.
pub fn to_complex(t: &Tensor<f64>) -> Tensor<Complex64> {
    let data: Vec<Complex64> = t.as_slice().iter().map(|&x| Complex64::new(x, 0.0)).collect();
    Tensor::from_vec(data).reshape(t.dims().clone())
}

/// `pow(a, b)`, elementwise; complex-base handling goes through
/// `Scalar::powc` (spec.md §4.5).
pub fn pow<T: Scalar>(a: &Tensor<T>, b: &Tensor<T>) -> Tensor<T> {
    zip_elementwise(a, b, |x, y| x.powc(y))
}

macro_rules! unary_math_fn {
    ($name:ident) => {
        pub fn $name<T: Scalar>(t: &Tensor<T>) -> Tensor<T> {
            map_scalar(t, |x| x.$name())
        }
    };
}

unary_math_fn!(exp);
unary_math_fn!(sin);
unary_math_fn!(cos);
unary_math_fn!(tan);
unary_math_fn!(sinh);
unary_math_fn!(cosh);
unary_math_fn!(tanh);
unary_math_fn!(sqrt);

/// `abs`: always returns a real tensor, even for a complex input
/// (spec.md §4.5).
pub fn abs<T: Scalar>(t: &Tensor<T>) -> Tensor<f64> {
    let data: Vec<f64> = t.as_slice().iter().map(|&x| x.modulus()).collect();
    Tensor::from_vec(data).reshape(t.dims().clone())
}

#[track_caller]
pub fn tensor_eq<T: Scalar>(a: &Tensor<T>, b: &Tensor<T>) -> Booleans {
    assert_eq!(a.size(), b.size(), "comparison: size mismatch");
    Booleans::new(a.as_slice().iter().zip(b.as_slice()).map(|(x, y)| x == y).collect())
}

#[track_caller]
pub fn tensor_lt(a: &Tensor<f64>, b: &Tensor<f64>) -> Booleans {
    assert_eq!(a.size(), b.size(), "comparison: size mismatch");
    Booleans::new(a.as_slice().iter().zip(b.as_slice()).map(|(x, y)| x < y).collect())
}

#[track_caller]
pub fn tensor_le(a: &Tensor<f64>, b: &Tensor<f64>) -> Booleans {
    assert_eq!(a.size(), b.size(), "comparison: size mismatch");
    Booleans::new(a.as_slice().iter().zip(b.as_slice()).map(|(x, y)| x <= y).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elementwise_add_and_in_place() {
        let a = Tensor::<f64>::from_vec(vec![1.0, 2.0, 3.0]);
        let b = Tensor::<f64>::from_vec(vec![10.0, 20.0, 30.0]);
        let c = a.clone() + b.clone();
        assert_eq!(c.to_vec(), vec![11.0, 22.0, 33.0]);

        let mut d = a;
        d += b;
        assert_eq!(d.to_vec(), vec![11.0, 22.0, 33.0]);
    }

    #[test]
    fn empty_plus_empty_is_empty() {
        let a = Tensor::<f64>::empty(vec![0]);
        let b = Tensor::<f64>::empty(vec![0]);
        let c = a + b;
        assert_eq!(c.size(), 0);
    }

    #[test]
    fn mixed_real_complex_promotes() {
        let r = Tensor::<f64>::from_vec(vec![1.0, 2.0]);
        let c = Tensor::<Complex64>::from_vec(vec![Complex64::new(0.0, 1.0), Complex64::new(1.0, 1.0)]);
        let sum = r + c;
        assert_eq!(sum.get_flat(0), Complex64::new(1.0, 1.0));
    }

    #[test]
    fn abs_of_complex_is_real() {
        let c = Tensor::<Complex64>::from_vec(vec![Complex64::new(3.0, 4.0)]);
        let a = abs(&c);
        assert_eq!(a.get_flat(0), 5.0);
    }
}
