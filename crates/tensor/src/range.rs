use crate::dimensions::Indices;

/// A 1-D selector over one axis of a tensor (spec.md §3, "Range").
///
/// `Range` values are unresolved until [`Range::resolve`] binds them
/// against a concrete axis size; resolution is where out-of-range
/// indices are caught.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Range {
    /// The sentinel meaning "all of this axis".
    Full,
    /// A single (possibly negative) index. Squeezes its axis out of a
    /// view's dimensions (spec.md §9, Open Question 2).
    Single(isize),
    /// The arithmetic sequence `start, start+step, ..` up to and
    /// including the largest value `<= limit`.
    Stepped { start: isize, limit: isize, step: isize },
    /// An explicit list of indices. Never squeezes, even if it names
    /// exactly one element.
    Indexed(Indices),
}

/// Full axis, `_` in the spec's `range()` sugar.
pub fn range_full() -> Range {
    Range::Full
}

/// A single-index range; squeezes.
pub fn range_at(i: isize) -> Range {
    Range::Single(i)
}

/// A stepped range with an implicit step of 1.
pub fn range(lo: isize, hi: isize) -> Range {
    Range::Stepped { start: lo, limit: hi, step: 1 }
}

/// A stepped range with an explicit step.
pub fn range_step(lo: isize, hi: isize, step: isize) -> Range {
    Range::Stepped { start: lo, limit: hi, step }
}

/// An explicit-index range.
pub fn range_indices(indices: Indices) -> Range {
    Range::Indexed(indices)
}

/// A `Range` resolved against a concrete axis size: a validated,
/// in-bounds sequence of indices plus whether its axis squeezes away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRange {
    kind: ResolvedKind,
    pub squeeze: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ResolvedKind {
    Arithmetic { start: usize, count: usize, step: usize },
    Explicit(Indices),
}

impl Range {
    /// Binds this range against the size `d` of the axis it selects
    /// from, validating and clamping per spec.md §3: "`set_dimension`
    /// may not widen beyond `d`; any index `>= d` is a programming
    /// error."
    #[track_caller]
    pub fn resolve(&self, d: usize) -> ResolvedRange {
        match self {
            Range::Full => ResolvedRange {
                kind: ResolvedKind::Arithmetic { start: 0, count: d, step: 1 },
                squeeze: false,
            },
            Range::Single(i) => {
                let idx = resolve_signed(*i, d);
                ResolvedRange {
                    kind: ResolvedKind::Arithmetic { start: idx, count: 1, step: 1 },
                    squeeze: true,
                }
            }
            Range::Stepped { start, limit, step } => {
                assert!(*step != 0, "Range step must not be zero");
                let start = resolve_signed(*start, d);
                let limit_signed = if *limit < 0 { d as isize + *limit } else { *limit };
                let count = if *step > 0 {
                    if limit_signed < start as isize {
                        0
                    } else {
                        (limit_signed - start as isize) / step + 1
                    }
                } else if limit_signed > start as isize {
                    0
                } else {
                    (start as isize - limit_signed) / (-step) + 1
                };
                let count = count.max(0) as usize;
                if count > 0 {
                    let last = (start as isize) + (count as isize - 1) * step;
                    assert!(
                        last >= 0 && (last as usize) < d,
                        "stepped range reaches index {} out of bounds for size {}",
                        last,
                        d
                    );
                }
                ResolvedRange {
                    kind: ResolvedKind::Arithmetic {
                        start,
                        count,
                        step: step.unsigned_abs(),
                    },
                    squeeze: false,
                }
                .with_signed_step(*step)
            }
            Range::Indexed(indices) => {
                for &i in indices {
                    assert!(i < d, "index {} out of range for dimension of size {}", i, d);
                }
                ResolvedRange { kind: ResolvedKind::Explicit(indices.clone()), squeeze: false }
            }
        }
    }
}

impl ResolvedRange {
    // Stepped ranges keep their sign by materialising descending
    // sequences eagerly; simpler than threading a signed step through
    // the iterator, and ranges are small relative to tensor data.
    fn with_signed_step(self, step: isize) -> Self {
        if step >= 0 {
            return self;
        }
        match self.kind {
            ResolvedKind::Arithmetic { start, count, step: abs_step } => {
                let indices = (0..count).map(|k| start - k * abs_step).collect();
                ResolvedRange { kind: ResolvedKind::Explicit(indices), squeeze: self.squeeze }
            }
            other => ResolvedRange { kind: other, squeeze: self.squeeze },
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        match &self.kind {
            ResolvedKind::Arithmetic { count, .. } => *count,
            ResolvedKind::Explicit(v) => v.len(),
        }
    }

    #[inline]
    pub fn get(&self, k: usize) -> usize {
        match &self.kind {
            ResolvedKind::Arithmetic { start, step, .. } => start + k * step,
            ResolvedKind::Explicit(v) => v[k],
        }
    }
}

fn resolve_signed(i: isize, d: usize) -> usize {
    let r = if i < 0 { d as isize + i } else { i };
    assert!(r >= 0 && (r as usize) < d, "index {} out of range for size {}", i, d);
    r as usize
}

/// Walks the Cartesian product of a list of [`ResolvedRange`]s,
/// emitting linearised column-major offsets into a tensor whose
/// dimensions are `base_strides` (spec.md §3, "RangeIterator"). The
/// leftmost range varies fastest.
pub struct RangeIterator<'a> {
    ranges: &'a [ResolvedRange],
    base_strides: &'a [usize],
    counters: Vec<usize>,
    done: bool,
    total: usize,
    emitted: usize,
}

impl<'a> RangeIterator<'a> {
    pub fn new(ranges: &'a [ResolvedRange], base_strides: &'a [usize]) -> Self {
        let total: usize = ranges.iter().map(ResolvedRange::size).product();
        let done = ranges.iter().any(|r| r.size() == 0);
        RangeIterator {
            ranges,
            base_strides,
            counters: vec![0; ranges.len()],
            done: done || total == 0,
            total,
            emitted: 0,
        }
    }

    /// Total number of offsets this iterator will emit.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl<'a> Iterator for RangeIterator<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.done {
            return None;
        }
        let offset = self
            .counters
            .iter()
            .zip(self.ranges.iter())
            .zip(self.base_strides.iter())
            .map(|((&k, r), &stride)| r.get(k) * stride)
            .sum();
        self.emitted += 1;

        // Odometer increment, leftmost axis fastest.
        let mut axis = 0;
        loop {
            if axis == self.counters.len() {
                self.done = true;
                break;
            }
            self.counters[axis] += 1;
            if self.counters[axis] < self.ranges[axis].size() {
                break;
            }
            self.counters[axis] = 0;
            axis += 1;
        }
        Some(offset)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.emitted;
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for RangeIterator<'a> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_range_ends_immediately() {
        // `limit` wraps negative values against the axis size the same
        // way `start` does, so `-1` means `d - 1`, not "before the
        // start." An empty range is expressed the original's way:
        // `start > limit`.
        let resolved = vec![Range::Stepped { start: 2, limit: 1, step: 1 }.resolve(5)];
        assert_eq!(resolved[0].size(), 0);
        let it = RangeIterator::new(&resolved, &[1]);
        assert_eq!(it.len(), 0);
        assert_eq!(it.count(), 0);
    }

    #[test]
    fn length_equals_product_of_sizes_no_repeats() {
        let r0 = Range::Full.resolve(3);
        let r1 = Range::Stepped { start: 0, limit: 3, step: 2 }.resolve(4);
        let resolved = vec![r0, r1];
        // strides for a 3x4 column-major tensor: [1, 3]
        let it = RangeIterator::new(&resolved, &[1, 3]);
        let offsets: Vec<usize> = it.collect();
        assert_eq!(offsets.len(), 3 * 2);
        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), offsets.len());
        for &o in &offsets {
            assert!(o < 3 * 4);
        }
    }

    #[test]
    fn leftmost_range_varies_fastest() {
        let r0 = Range::Full.resolve(2);
        let r1 = Range::Full.resolve(2);
        let resolved = vec![r0, r1];
        let it = RangeIterator::new(&resolved, &[1, 2]);
        let offsets: Vec<usize> = it.collect();
        assert_eq!(offsets, vec![0, 1, 2, 3]);
    }
}
