use nten_alloc::Vector;
use nten_algebra::Scalar;
use rand::Rng;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dimensions::Dimensions;

/// A dense, column-major, copy-on-write N-dimensional array
/// (spec.md §3, "Tensor<T>").
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T> {
    pub(crate) dims: Dimensions,
    pub(crate) data: Vector<T>,
}

impl<T: Scalar> Tensor<T> {
    /// `dims.total_size() == data.size()` is an invariant of every
    /// constructor below, not a checked precondition on every call
    /// (spec.md §4.2).
    fn from_parts(dims: Dimensions, data: Vector<T>) -> Self {
        debug_assert_eq!(dims.total_size(), data.size());
        Self { dims, data }
    }

    /// `empty(dims)`. The source leaves this uninitialised; Rust has
    /// no safe generic uninitialised buffer, so this is zero-filled
    /// (see DESIGN.md) — behaviourally indistinguishable since no
    /// spec operation observes "uninitialised" data.
    pub fn empty(dims: impl Into<Dimensions>) -> Self {
        let dims = dims.into();
        Self::from_parts(dims.clone(), Vector::with_len(dims.total_size()))
    }

    pub fn zeros(dims: impl Into<Dimensions>) -> Self {
        Self::empty(dims)
    }

    pub fn ones(dims: impl Into<Dimensions>) -> Self {
        let dims = dims.into();
        Self::from_parts(dims.clone(), Vector::filled(dims.total_size(), T::one()))
    }

    /// `eye(r, c)`: 1 on the diagonal, 0 elsewhere.
    pub fn eye(rows: usize, cols: usize) -> Self {
        let mut t = Self::zeros([rows, cols]);
        for i in 0..rows.min(cols) {
            t.set(&[i as isize, i as isize], T::one());
        }
        t
    }

    /// `random(dims)`: each element drawn from `rand<T>()` (spec.md §6).
    pub fn random<R: Rng + ?Sized>(dims: impl Into<Dimensions>, rng: &mut R) -> Self {
        let dims = dims.into();
        let n = dims.total_size();
        let data: Vec<T> = (0..n).map(|_| T::sample_uniform(rng)).collect();
        Self::from_parts(dims, Vector::from(data))
    }

    /// Flat vector of elements in a 1-D tensor, or any tensor read as
    /// a flat sequence (`t.flat` in the spec's invariants).
    pub fn from_vec(values: Vec<T>) -> Self {
        let n = values.len();
        Self::from_parts(Dimensions::new(vec![n]), Vector::from(values))
    }

    /// Builds a 2-D tensor from row-major nested literals, e.g.
    /// `Tensor::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]])`
    /// (spec.md §4.3, `from_initializer`). Panics if rows are ragged.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Self {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, |r| r.len());
        assert!(
            rows.iter().all(|r| r.len() == ncols),
            "from_rows: all rows must have the same length"
        );
        let mut data = vec![T::zero(); nrows * ncols];
        for (i, row) in rows.into_iter().enumerate() {
            for (j, v) in row.into_iter().enumerate() {
                data[i + nrows * j] = v;
            }
        }
        Self::from_parts(Dimensions::new(vec![nrows, ncols]), Vector::from(data))
    }

    #[inline]
    pub fn dims(&self) -> &Dimensions {
        &self.dims
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.rank()
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.data.size()
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.dims.dimension(0)
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.dims.dimension(1)
    }

    pub fn as_slice(&self) -> &[T] {
        self.data.as_slice()
    }

    /// Copy-on-write sharing count of the backing buffer.
    pub fn ref_count(&self) -> usize {
        self.data.ref_count()
    }

    /// `t[flat_i]` / `t.at_seq(flat_i)` read, negative indices wrap.
    pub fn get_flat(&self, i: isize) -> T {
        let idx = Dimensions::resolve_index(i, self.data.size());
        self.data.as_slice()[idx]
    }

    /// `t.at_seq(flat_i) = v`, the unchecked flat write.
    pub fn set_flat(&mut self, i: isize, v: T) {
        let idx = Dimensions::resolve_index(i, self.data.size());
        self.data.as_mut()[idx] = v;
    }

    /// `t(i_0, .., i_{r-1})` read, negative indices wrap.
    pub fn get(&self, indices: &[isize]) -> T {
        let resolved: Vec<usize> = indices
            .iter()
            .enumerate()
            .map(|(axis, &i)| Dimensions::resolve_index(i, self.dims.dimension(axis as isize)))
            .collect();
        self.data.as_slice()[self.dims.column_major_position(&resolved)]
    }

    /// `t.at(i_0, .., i_{r-1}) = v`: ensures uniqueness of the backing
    /// buffer, then writes.
    pub fn set(&mut self, indices: &[isize], v: T) {
        let resolved: Vec<usize> = indices
            .iter()
            .enumerate()
            .map(|(axis, &i)| Dimensions::resolve_index(i, self.dims.dimension(axis as isize)))
            .collect();
        let offset = self.dims.column_major_position(&resolved);
        self.data.as_mut()[offset] = v;
    }

    /// `reshape(t, dims)`: shares `data`, free, never allocates.
    #[track_caller]
    pub fn reshape(&self, dims: impl Into<Dimensions>) -> Self {
        let dims = dims.into();
        assert_eq!(
            dims.total_size(),
            self.size(),
            "reshape: {} elements does not match {} elements",
            dims.total_size(),
            self.size()
        );
        Self::from_parts(dims, self.data.clone())
    }

    /// `change_dimension(t, axis, new_size)`: shrinks truncate,
    /// extensions zero-pad along `axis` (spec.md §9, Open Question 3).
    pub fn change_dimension(&self, axis: isize, new_size: usize) -> Self {
        let axis = self.dims.resolve_axis(axis);
        let mut new_sizes = self.dims.sizes().to_vec();
        let old_size = new_sizes[axis];
        if new_size == old_size {
            return self.clone();
        }
        new_sizes[axis] = new_size;
        let new_dims = Dimensions::new(new_sizes);
        let mut out = Self::zeros(new_dims);
        let copy_size = old_size.min(new_size);
        let mut idx = vec![0usize; self.rank()];
        copy_axis_prefix(self, &mut out, axis, copy_size, &mut idx, self.rank());
        out
    }

    /// Flattens to a `Vec<T>` copy (the spec's `t.flat`).
    pub fn to_vec(&self) -> Vec<T> {
        self.data.as_slice().to_vec()
    }
}

/// Recursively walks every index tuple whose `axis`-th coordinate is
/// `< copy_size`, copying `self[idx] -> out[idx]`. Used by
/// `change_dimension` to copy the overlapping prefix along one axis.
fn copy_axis_prefix<T: Scalar>(
    src: &Tensor<T>,
    dst: &mut Tensor<T>,
    axis: usize,
    copy_size: usize,
    idx: &mut [usize],
    rank: usize,
) {
    fn go<T: Scalar>(
        src: &Tensor<T>,
        dst: &mut Tensor<T>,
        axis: usize,
        copy_size: usize,
        idx: &mut [usize],
        dim: usize,
        rank: usize,
    ) {
        if dim == rank {
            let signed: Vec<isize> = idx.iter().map(|&x| x as isize).collect();
            dst.set(&signed, src.get(&signed));
            return;
        }
        let limit = if dim == axis { copy_size } else { src.dims.dimension(dim as isize) };
        for i in 0..limit {
            idx[dim] = i;
            go(src, dst, axis, copy_size, idx, dim + 1, rank);
        }
    }
    go(src, dst, axis, copy_size, idx, 0, rank);
}

impl<T: Scalar + Serialize> Serialize for Tensor<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Tensor", 2)?;
        state.serialize_field("dims", &self.dims)?;
        state.serialize_field("data", self.data.as_slice())?;
        state.end()
    }
}

impl<'de, T: Scalar + Deserialize<'de>> Deserialize<'de> for Tensor<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(bound(deserialize = "T: Deserialize<'de>"))]
        struct Raw<T> {
            dims: Dimensions,
            data: Vec<T>,
        }
        let raw = Raw::<T>::deserialize(deserializer)?;
        Ok(Tensor::from_parts(raw.dims, Vector::from(raw.data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_on_write_semantics() {
        let a = Tensor::<f64>::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = a.clone();
        assert_eq!(a.ref_count(), 2);

        let mut b = b;
        b.set(&[0, 0], 99.0);
        assert_eq!(a.get(&[0, 0]), 1.0);
        assert_eq!(b.get(&[0, 0]), 99.0);
        assert_eq!(a.ref_count(), 1);
    }

    #[test]
    fn reshape_preserves_data_and_shares_storage() {
        let a = Tensor::<f64>::from_vec((0..6).map(|x| x as f64).collect());
        let b = a.reshape([2, 3]);
        assert_eq!(a.to_vec(), b.to_vec());
        assert_eq!(a.ref_count(), 2);
    }

    #[test]
    fn column_major_2d_access() {
        let t = Tensor::<f64>::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(t.get(&[i as isize, j as isize]), t.get_flat((i + 2 * j) as isize));
            }
        }
    }

    #[test]
    fn change_dimension_zero_pads_on_growth_and_truncates_on_shrink() {
        let t = Tensor::<f64>::from_vec(vec![1.0, 2.0, 3.0]);
        let grown = t.change_dimension(0, 5);
        assert_eq!(grown.to_vec(), vec![1.0, 2.0, 3.0, 0.0, 0.0]);
        let shrunk = t.change_dimension(0, 2);
        assert_eq!(shrunk.to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn eye_is_identity() {
        let e = Tensor::<f64>::eye(3, 3);
        assert_eq!(e.to_vec(), vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    }
}
