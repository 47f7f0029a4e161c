use nten_algebra::Scalar;

use crate::dimensions::Dimensions;
use crate::range::{Range, RangeIterator, ResolvedRange};
use crate::tensor::Tensor;

fn resolve_all(dims: &Dimensions, ranges: &[Range]) -> Vec<ResolvedRange> {
    assert_eq!(
        ranges.len(),
        dims.rank(),
        "{} ranges given for a rank-{} tensor",
        ranges.len(),
        dims.rank()
    );
    ranges
        .iter()
        .enumerate()
        .map(|(axis, r)| r.resolve(dims.dimension(axis as isize)))
        .collect()
}

/// The dimensions of a view: one entry per resolved range, with
/// single-index ranges squeezed away (spec.md §4.4, §9 Open Question 2).
fn view_dims(resolved: &[ResolvedRange]) -> Dimensions {
    Dimensions::new(resolved.iter().filter(|r| !r.squeeze).map(ResolvedRange::size).collect())
}

/// A read-only view of a tensor over a list of [`Range`]s: `t(range,
/// ..)` in the spec's notation (spec.md §4.4).
pub struct TensorView<'a, T> {
    tensor: &'a Tensor<T>,
    resolved: Vec<ResolvedRange>,
}

impl<'a, T: Scalar> TensorView<'a, T> {
    pub fn new(tensor: &'a Tensor<T>, ranges: &[Range]) -> Self {
        let resolved = resolve_all(&tensor.dims, ranges);
        Self { tensor, resolved }
    }

    pub fn dims(&self) -> Dimensions {
        view_dims(&self.resolved)
    }

    /// Materialises the view into an owned [`Tensor`] (the spec's "a
    /// view yields the Tensor<T> obtained by reading the selected
    /// offsets").
    pub fn to_tensor(&self) -> Tensor<T> {
        let it = RangeIterator::new(&self.resolved, self.tensor.dims.strides());
        let data: Vec<T> = it.map(|offset| self.tensor.as_slice()[offset]).collect();
        Tensor::from_vec_with_dims(self.dims(), data)
    }
}

/// A mutable, assignable view of a tensor over a list of [`Range`]s:
/// `t.at(range, ..)` in the spec's notation.
pub struct MutableTensorView<'a, T> {
    tensor: &'a mut Tensor<T>,
    resolved: Vec<ResolvedRange>,
}

impl<'a, T: Scalar> MutableTensorView<'a, T> {
    pub fn new(tensor: &'a mut Tensor<T>, ranges: &[Range]) -> Self {
        let resolved = resolve_all(&tensor.dims, ranges);
        Self { tensor, resolved }
    }

    pub fn dims(&self) -> Dimensions {
        view_dims(&self.resolved)
    }

    pub fn to_tensor(&self) -> Tensor<T> {
        let it = RangeIterator::new(&self.resolved, self.tensor.dims.strides());
        let data: Vec<T> = it.map(|offset| self.tensor.as_slice()[offset]).collect();
        Tensor::from_vec_with_dims(self.dims(), data)
    }

    /// Assigns `rhs` into the selected offsets. Accepts (i) a tensor
    /// whose dimensions equal the view's (squeeze rule applied), (ii)
    /// a tensor whose flat size equals the view's size (broadcast in
    /// flattened order), or (iii) via [`Self::assign_scalar`] a single
    /// scalar broadcast to every offset (spec.md §4.4).
    #[track_caller]
    pub fn assign(&mut self, rhs: &Tensor<T>) {
        let view_size = self.resolved.iter().map(ResolvedRange::size).product::<usize>();
        assert_eq!(
            rhs.size(),
            view_size,
            "view assignment: right-hand side has {} elements, view selects {}",
            rhs.size(),
            view_size
        );
        let strides = self.tensor.dims.strides().to_vec();
        let it = RangeIterator::new(&self.resolved, &strides);
        let rhs_flat = rhs.as_slice();
        let data = self.tensor.as_mut_slice();
        for (k, offset) in it.enumerate() {
            data[offset] = rhs_flat[k];
        }
    }

    pub fn assign_scalar(&mut self, value: T) {
        let strides = self.tensor.dims.strides().to_vec();
        let it = RangeIterator::new(&self.resolved, &strides);
        let data = self.tensor.as_mut_slice();
        for offset in it {
            data[offset] = value;
        }
    }
}

impl<T: Scalar> Tensor<T> {
    pub(crate) fn from_vec_with_dims(dims: Dimensions, data: Vec<T>) -> Self {
        Tensor::from_vec(data).reshape(dims)
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        self.data.as_mut()
    }

    /// `t(r_0, .., r_{k-1})`: a read-only view.
    pub fn slice(&self, ranges: &[Range]) -> TensorView<'_, T> {
        TensorView::new(self, ranges)
    }

    /// `t.at(r_0, .., r_{k-1})`: an assignable view.
    pub fn slice_mut(&mut self, ranges: &[Range]) -> MutableTensorView<'_, T> {
        MutableTensorView::new(self, ranges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::{range, range_at, range_full};

    #[test]
    fn view_round_trip_leaves_tensor_unchanged() {
        let mut t = Tensor::<f64>::from_vec((0..12).map(|x| x as f64).collect()).reshape([3, 4]);
        let original = t.clone();
        let ranges = vec![range(0, 1), range_full()];
        let u = t.slice(&ranges).to_tensor();
        t.slice_mut(&ranges).assign(&u);
        assert_eq!(t, original);
    }

    #[test]
    fn single_index_range_squeezes() {
        let t = Tensor::<f64>::from_vec((0..12).map(|x| x as f64).collect()).reshape([3, 4]);
        let view = t.slice(&[range_at(1), range_full()]);
        assert_eq!(view.dims().sizes(), &[4]);
    }

    #[test]
    fn explicit_single_index_list_does_not_squeeze() {
        let t = Tensor::<f64>::from_vec((0..12).map(|x| x as f64).collect()).reshape([3, 4]);
        let view = t.slice(&[crate::range::range_indices(vec![1]), range_full()]);
        assert_eq!(view.dims().sizes(), &[1, 4]);
    }

    #[test]
    fn scalar_broadcast_assignment() {
        let mut t = Tensor::<f64>::zeros([2, 2]);
        t.slice_mut(&[range_full(), range_full()]).assign_scalar(5.0);
        assert_eq!(t.to_vec(), vec![5.0, 5.0, 5.0, 5.0]);
    }
}
