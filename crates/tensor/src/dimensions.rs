use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// An index list: row starts and columns of a CSR matrix, the
/// `Indexed` variant of a [`crate::range::Range`], and the flat
/// integer indices `which()` returns on a [`crate::booleans::Booleans`]
/// vector are all `Indices`.
pub type Indices = Vec<usize>;

#[derive(Debug, Clone, Copy, Error)]
pub enum DimensionsError {
    #[error("total number of elements overflowed while computing dimensions {0:?}")]
    Overflow(Vec<usize>),
}

/// An ordered sequence of non-negative axis sizes, with the
/// column-major strides needed to turn an index tuple into a flat
/// offset (spec.md §3, "Dimensions").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dimensions {
    sizes: Vec<usize>,
    strides: Vec<usize>,
}

// Strides are a pure function of sizes, so only sizes cross the wire
// (mirrors the teacher's hand-written `Dimensions` (de)serialization).
impl Serialize for Dimensions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.sizes.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Dimensions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let sizes = Vec::deserialize(deserializer)?;
        Ok(Self::new(sizes))
    }
}

impl Dimensions {
    pub fn new(sizes: Vec<usize>) -> Self {
        let strides = column_major_strides(&sizes);
        Self { sizes, strides }
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.sizes.len()
    }

    #[inline]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// `dimension(i)` with wraparound on negative `i` (spec.md §4.2).
    #[track_caller]
    pub fn dimension(&self, i: isize) -> usize {
        self.sizes[self.resolve_axis(i)]
    }

    /// Resolves a possibly-negative axis index against this rank.
    #[track_caller]
    pub fn resolve_axis(&self, i: isize) -> usize {
        let r = self.rank() as isize;
        let axis = if i < 0 { r + i } else { i };
        assert!(
            axis >= 0 && axis < r,
            "axis {} out of range for rank {} tensor",
            i,
            self.rank()
        );
        axis as usize
    }

    #[inline]
    pub fn total_size(&self) -> usize {
        self.sizes.iter().product()
    }

    /// Column-major flat offset of an index tuple (spec.md §3).
    #[track_caller]
    pub fn column_major_position(&self, indices: &[usize]) -> usize {
        assert_eq!(
            indices.len(),
            self.rank(),
            "index tuple of length {} does not match rank {}",
            indices.len(),
            self.rank()
        );
        indices
            .iter()
            .zip(self.strides.iter())
            .zip(self.sizes.iter())
            .map(|((&i, &s), &d)| {
                assert!(i < d, "index {} out of range for dimension of size {}", i, d);
                i * s
            })
            .sum()
    }

    /// Resolves a negative flat/dimension index `i` against extent `d`
    /// the way every accessor in the spec does it: `i < 0 => d + i`.
    pub fn resolve_index(i: isize, d: usize) -> usize {
        let r = if i < 0 { d as isize + i } else { i };
        assert!(r >= 0 && (r as usize) < d, "index {} out of range for size {}", i, d);
        r as usize
    }
}

fn column_major_strides(sizes: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; sizes.len()];
    let mut acc = 1usize;
    for (stride, &size) in strides.iter_mut().zip(sizes.iter()) {
        *stride = acc;
        acc = acc.saturating_mul(size);
    }
    strides
}

impl From<Vec<usize>> for Dimensions {
    fn from(sizes: Vec<usize>) -> Self {
        Self::new(sizes)
    }
}

impl From<&[usize]> for Dimensions {
    fn from(sizes: &[usize]) -> Self {
        Self::new(sizes.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Dimensions {
    fn from(sizes: [usize; N]) -> Self {
        Self::new(sizes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_major_2d_matches_spec_invariant() {
        // t(i, j) == t.flat[i + rows * j]
        let rows = 3;
        let cols = 4;
        let d = Dimensions::new(vec![rows, cols]);
        for j in 0..cols {
            for i in 0..rows {
                assert_eq!(d.column_major_position(&[i, j]), i + rows * j);
            }
        }
    }

    #[test]
    fn total_size_is_product() {
        let d = Dimensions::new(vec![2, 3, 5]);
        assert_eq!(d.total_size(), 30);
    }

    #[test]
    fn negative_axis_wraps() {
        let d = Dimensions::new(vec![2, 3, 5]);
        assert_eq!(d.resolve_axis(-1), 2);
        assert_eq!(d.resolve_axis(-3), 0);
    }
}
