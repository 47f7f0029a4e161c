use nten_algebra::Scalar;
use nten_tensor::Tensor;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A compressed-sparse-row matrix (spec.md §5, "Sparse<T>"). Row `i`'s
/// entries live at `column_indices[row_starts[i]..row_starts[i+1]]`,
/// sorted by column within the row; no explicit zeros are stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sparse<T> {
    rows: usize,
    cols: usize,
    row_starts: Vec<usize>,
    column_indices: Vec<usize>,
    values: Vec<T>,
}

impl<T: Scalar> Sparse<T> {
    /// The all-zero `rows x cols` matrix.
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self { rows, cols, row_starts: vec![0; rows + 1], column_indices: Vec::new(), values: Vec::new() }
    }

    /// Builds a matrix from `(row, col, value)` triplets. Duplicate
    /// `(row, col)` pairs are resolved by a stable sort followed by
    /// keeping the *last* occurrence in input order — spec.md §9, Open
    /// Question 1, following `original_source`'s `sparse_base.hpp`.
    /// Explicit zero values are dropped.
    pub fn from_triplets(rows: usize, cols: usize, triplets: &[(usize, usize, T)]) -> Self {
        let mut sorted = triplets.to_vec();
        // `sort_by_key` is a stable sort: equal-key elements keep their
        // relative input order, so within a (row, col) group the last
        // element here is also the last one seen in `triplets`.
        sorted.sort_by_key(|&(r, c, _)| (r, c));
        for &(r, c, _) in &sorted {
            assert!(r < rows && c < cols, "from_triplets: ({}, {}) out of bounds", r, c);
        }

        let mut row_starts = vec![0usize; rows + 1];
        let mut column_indices = Vec::new();
        let mut values = Vec::new();

        let mut i = 0;
        while i < sorted.len() {
            let (row, col, _) = sorted[i];
            let mut j = i;
            while j + 1 < sorted.len() && (sorted[j + 1].0, sorted[j + 1].1) == (row, col) {
                j += 1;
            }
            let value = sorted[j].2; // last occurrence in input order wins
            if !value.is_zero() {
                column_indices.push(col);
                values.push(value);
                row_starts[row + 1] += 1;
            }
            i = j + 1;
        }
        for r in 0..rows {
            row_starts[r + 1] += row_starts[r];
        }

        Self { rows, cols, row_starts, column_indices, values }
    }

    /// Converts a dense [`Tensor`] to CSR, dropping zero entries.
    #[track_caller]
    pub fn from_dense(m: &Tensor<T>) -> Self {
        assert_eq!(m.rank(), 2, "from_dense: tensor must be rank 2");
        let (rows, cols) = (m.rows(), m.columns());
        let mut triplets = Vec::new();
        for i in 0..rows {
            for j in 0..cols {
                let v = m.get(&[i as isize, j as isize]);
                if !v.is_zero() {
                    triplets.push((i, j, v));
                }
            }
        }
        Self::from_triplets(rows, cols, &triplets)
    }

    /// `eye(n)`: the sparse identity.
    pub fn eye(n: usize) -> Self {
        let triplets: Vec<(usize, usize, T)> = (0..n).map(|i| (i, i, T::one())).collect();
        Self::from_triplets(n, n, &triplets)
    }

    /// `diag(v, k, rows, cols)`: a sparse `rows x cols` matrix with `v`
    /// placed on the `k`-th diagonal (`k > 0` above the main diagonal,
    /// `k < 0` below), zero elsewhere — spec.md §4.8.
    #[track_caller]
    pub fn diag(v: &Tensor<T>, k: isize, rows: usize, cols: usize) -> Self {
        let len = if k >= 0 {
            rows.min(cols.saturating_sub(k as usize))
        } else {
            cols.min(rows.saturating_sub((-k) as usize))
        };
        assert_eq!(v.size(), len, "diag: vector length {} does not match diagonal length {}", v.size(), len);
        let row0 = if k < 0 { (-k) as usize } else { 0 };
        let col0 = if k >= 0 { k as usize } else { 0 };
        let triplets: Vec<(usize, usize, T)> = (0..len)
            .filter(|&n| !v.get_flat(n as isize).is_zero())
            .map(|n| (row0 + n, col0 + n, v.get_flat(n as isize)))
            .collect();
        Self::from_triplets(rows, cols, &triplets)
    }

    /// `random(rows, cols, density, rng)`: keeps each entry independently
    /// with probability `density`, scaling surviving values by
    /// `1 / density` so the expected row/column sums match a fully dense
    /// draw — spec.md §4.8.
    #[track_caller]
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, density: f64, rng: &mut R) -> Self {
        assert!(density > 0.0 && density <= 1.0, "random: density must be in (0, 1]");
        let scale = T::from_f64(1.0 / density);
        let mut triplets = Vec::new();
        for i in 0..rows {
            for j in 0..cols {
                if rng.gen::<f64>() < density {
                    triplets.push((i, j, T::sample_uniform(rng) * scale));
                }
            }
        }
        Self::from_triplets(rows, cols, &triplets)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn row_starts(&self) -> &[usize] {
        &self.row_starts
    }

    pub fn column_indices(&self) -> &[usize] {
        &self.column_indices
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// `row_range(i)`: the half-open slice of `column_indices`/`values`
    /// backing row `i`.
    pub fn row_range(&self, i: usize) -> std::ops::Range<usize> {
        self.row_starts[i]..self.row_starts[i + 1]
    }

    /// `get(i, j)`: `0` if `(i, j)` isn't stored.
    #[track_caller]
    pub fn get(&self, i: usize, j: usize) -> T {
        assert!(i < self.rows && j < self.cols, "get: ({}, {}) out of bounds", i, j);
        let range = self.row_range(i);
        self.column_indices[range.clone()]
            .binary_search(&j)
            .map(|k| self.values[range.start + k])
            .unwrap_or_else(|_| T::zero())
    }

    /// `full(s)`: materialises the matrix into a dense [`Tensor`].
    pub fn full(&self) -> Tensor<T> {
        let mut out = Tensor::zeros([self.rows, self.cols]);
        for i in 0..self.rows {
            for k in self.row_range(i) {
                out.set(&[i as isize, self.column_indices[k] as isize], self.values[k]);
            }
        }
        out
    }

    /// Entrywise equality up to structure: two matrices with the same
    /// logical entries but different internal ordering still compare
    /// equal.
    pub fn all_equal(&self, other: &Self) -> bool {
        if self.rows != other.rows || self.cols != other.cols {
            return false;
        }
        for i in 0..self.rows {
            for k in self.row_range(i) {
                if self.values[k] != other.get(i, self.column_indices[k]) {
                    return false;
                }
            }
            for k in other.row_range(i) {
                if other.values[k] != self.get(i, other.column_indices[k]) {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_triplets_keeps_last_duplicate() {
        let s = Sparse::from_triplets(2, 2, &[(0, 0, 1.0), (0, 0, 2.0), (1, 1, 3.0)]);
        assert_eq!(s.get(0, 0), 2.0);
        assert_eq!(s.get(1, 1), 3.0);
        assert_eq!(s.nnz(), 2);
    }

    #[test]
    fn from_triplets_drops_explicit_zeros() {
        let s = Sparse::from_triplets(2, 2, &[(0, 0, 0.0), (1, 1, 5.0)]);
        assert_eq!(s.nnz(), 1);
        assert_eq!(s.get(0, 0), 0.0);
    }

    #[test]
    fn dense_round_trip() {
        let m = Tensor::<f64>::from_rows(vec![vec![1.0, 0.0], vec![0.0, 2.0]]);
        let s = Sparse::from_dense(&m);
        assert_eq!(s.nnz(), 2);
        assert_eq!(s.full(), m);
    }

    #[test]
    fn eye_is_identity() {
        let e = Sparse::<f64>::eye(3);
        assert_eq!(e.full(), Tensor::<f64>::eye(3, 3));
    }

    #[test]
    fn diag_places_values_on_offset_diagonal() {
        let v = Tensor::<f64>::from_vec(vec![1.0, 2.0]);
        let s = Sparse::diag(&v, 1, 3, 3);
        assert_eq!(s.get(0, 1), 1.0);
        assert_eq!(s.get(1, 2), 2.0);
        assert_eq!(s.nnz(), 2);
    }

    #[test]
    fn random_scales_surviving_entries_by_inverse_density() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let density = 0.25;
        let s = Sparse::<f64>::random(20, 20, density, &mut rng);
        for &v in s.values() {
            assert!((0.0..(1.0 / density)).contains(&v));
        }
    }
}
