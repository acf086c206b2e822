//! Dense vector representation: a fully materialized element array
//! (SPEC_FULL §3, §4.4).

use parking_lot::Mutex;

use super::{impl_meta_accessors, Meta};
use crate::vector::sparse::SparseVector;

struct DenseInner {
    meta: Meta,
    values: Vec<f32>,
    size: usize,
}

/// Element `i` of the logical vector is `values[i]` for `i < size()`.
/// Elements beyond `size` but within the backing capacity are unspecified
/// (SPEC_FULL §3).
pub struct DenseVector {
    inner: Mutex<DenseInner>,
}

impl_meta_accessors!(DenseVector, inner);

impl DenseVector {
    pub fn new(capacity: usize) -> Self {
        DenseVector {
            inner: Mutex::new(DenseInner {
                meta: Meta::default(),
                values: vec![0.0; capacity],
                size: 0,
            }),
        }
    }

    pub fn from_values(values: Vec<f32>) -> Self {
        let size = values.len();
        DenseVector {
            inner: Mutex::new(DenseInner {
                meta: Meta::default(),
                values,
                size,
            }),
        }
    }

    pub fn num_elements(&self) -> usize {
        self.inner.lock().size
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().values.len()
    }

    pub fn element(&self, i: usize) -> f32 {
        let inner = self.inner.lock();
        if i < inner.size {
            inner.values[i]
        } else {
            0.0
        }
    }

    /// Grows `inner.values` to at least `min_capacity` slots, preserving
    /// contents. Returns `false` without mutating anything if the
    /// allocation cannot be satisfied (SPEC_FULL §7). Takes an
    /// already-locked `inner` so [`Self::reserve`] and [`Self::set_element`]
    /// can share it without re-locking the mutex.
    fn grow_locked(inner: &mut DenseInner, min_capacity: usize) -> bool {
        if inner.values.len() >= min_capacity {
            return true;
        }
        let additional = min_capacity - inner.values.len();
        if inner.values.try_reserve(additional).is_err() {
            return false;
        }
        inner.meta.length = None;
        inner.values.resize(min_capacity, 0.0);
        true
    }

    /// Grows the backing store so at least `min_capacity` slots are
    /// available, preserving existing contents. Returns `false` without
    /// mutating anything if the allocation cannot be satisfied
    /// (SPEC_FULL §4.3, §7).
    pub fn reserve(&self, min_capacity: usize) -> bool {
        let mut inner = self.inner.lock();
        Self::grow_locked(&mut inner, min_capacity)
    }

    /// Auto-grows to fit `i` if necessary and updates `size` when `i` falls
    /// beyond the current logical length. Returns `false` without writing
    /// `v` if the required growth fails to allocate (SPEC_FULL §4.4, §7).
    pub fn set_element(&self, i: usize, v: f32) -> bool {
        let mut inner = self.inner.lock();
        if i >= inner.values.len() {
            let new_cap = (i + 1).max(2 * inner.values.len().max(1));
            if !Self::grow_locked(&mut inner, new_cap) {
                return false;
            }
        }
        inner.meta.length = None;
        inner.values[i] = v;
        if i >= inner.size {
            inner.size = i + 1;
        }
        true
    }

    pub fn snapshot(&self) -> Vec<f32> {
        let inner = self.inner.lock();
        inner.values[..inner.size].to_vec()
    }

    fn compute_length(&self) -> f64 {
        let inner = self.inner.lock();
        inner.values[..inner.size]
            .iter()
            .map(|&v| (v as f64) * (v as f64))
            .sum::<f64>()
            .sqrt()
    }

    pub fn length(&self) -> f64 {
        {
            let inner = self.inner.lock();
            if let Some(l) = inner.meta.length {
                return l;
            }
        }
        let l = self.compute_length();
        self.inner.lock().meta.length = Some(l);
        l
    }

    pub fn scale(&self, factor: f32) {
        let mut inner = self.inner.lock();
        inner.meta.length = None;
        for v in inner.values[..inner.size].iter_mut() {
            *v *= factor;
        }
    }

    /// Divides every element by `length()`; a no-op when the vector has no
    /// magnitude (SPEC_FULL §4.4).
    pub fn normalize(&self) {
        let len = self.length();
        if len > 0.0 {
            self.scale((1.0 / len) as f32);
        }
    }

    pub fn clone_vector(&self) -> DenseVector {
        let inner = self.inner.lock();
        DenseVector {
            inner: Mutex::new(DenseInner {
                meta: inner.meta.clone(),
                values: inner.values.clone(),
                size: inner.size,
            }),
        }
    }

    /// Pair-sums over the overlap, copies the tail from whichever operand
    /// is longer (SPEC_FULL §4.4).
    pub fn add_dense(&self, other: &DenseVector) -> DenseVector {
        let a = self.snapshot();
        let b = other.snapshot();
        let (longer, shorter) = if a.len() >= b.len() { (&a, &b) } else { (&b, &a) };
        let mut result = longer.clone();
        for (r, s) in result.iter_mut().zip(shorter.iter()) {
            *r += s;
        }
        DenseVector::from_values(result)
    }

    pub fn add_one_hot(&self, other: &super::one_hot::OneHotVector) -> DenseVector {
        let result = self.clone_vector();
        let idx = other.index() as usize;
        let existing = result.element(idx);
        result.set_element(idx, existing + other.value());
        result
    }

    /// In-place element-wise increment over `[0, min(n1, n2))`. Shape
    /// mismatches are a silent no-op beyond the shorter length: preserved
    /// exactly from the source rather than resized or treated as an error
    /// (SPEC_FULL §4.4, §4.7, §9).
    pub fn incr_dense(&self, other: &DenseVector, weight: f32) {
        let other_snapshot = other.snapshot();
        let mut inner = self.inner.lock();
        let n = inner.size.min(other_snapshot.len());
        inner.meta.length = None;
        for i in 0..n {
            inner.values[i] += weight * other_snapshot[i];
        }
    }

    /// Scatter-adds each stored pair whose index falls within this
    /// vector's length (SPEC_FULL §4.4, §4.7; see DESIGN.md Open Question 1
    /// for why this departs from the donor's `incr`-via-`add` delegation).
    pub fn incr_sparse(&self, other: &SparseVector, weight: f32) {
        let (indices, values) = other.snapshot();
        let mut inner = self.inner.lock();
        inner.meta.length = None;
        for (&idx, &val) in indices.iter().zip(values.iter()) {
            let idx = idx as usize;
            if idx < inner.size {
                inner.values[idx] += weight * val;
            }
        }
    }

    /// `add(sparse)` delegates to sparse `add(dense)` so the result is the
    /// same regardless of which operand's `add` is invoked (SPEC_FULL §4.4).
    pub fn add_sparse(&self, other: &SparseVector) -> DenseVector {
        other.add_dense(self)
    }

    /// Entry point used by [`SparseVector::add_dense`] so dense+sparse
    /// addition is commutative regardless of which operand the caller
    /// invokes it on (SPEC_FULL §4.4).
    pub(crate) fn add_sparse_via(&self, sparse: &SparseVector) -> DenseVector {
        let (indices, values) = sparse.snapshot();
        let result = self.clone_vector();
        for (&idx, &val) in indices.iter().zip(values.iter()) {
            let idx = idx as usize;
            let existing = result.element(idx);
            result.set_element(idx, existing + val);
        }
        result
    }

    pub fn to_sparse(&self) -> SparseVector {
        let values = self.snapshot();
        let sparse = SparseVector::new(values.len());
        for (i, &v) in values.iter().enumerate() {
            if v != 0.0 {
                sparse.new_element(i as u32, v);
            }
        }
        sparse
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_pads_shorter_operand() {
        let a = DenseVector::from_values(vec![1.0, 2.0, 3.0, 4.0]);
        let b = DenseVector::from_values(vec![10.0]);
        let c = a.add_dense(&b);
        assert_eq!(c.snapshot(), vec![11.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn incr_dense_stops_at_shorter_length() {
        let a = DenseVector::from_values(vec![1.0, 1.0, 1.0]);
        let b = DenseVector::from_values(vec![1.0, 1.0]);
        a.incr_dense(&b, 1.0);
        assert_eq!(a.snapshot(), vec![2.0, 2.0, 1.0]);
    }

    #[test]
    fn normalize_then_scale_round_trips() {
        let v = DenseVector::from_values(vec![3.0, 4.0]);
        let len = v.length();
        assert!((len - 5.0).abs() < 1e-6);
        v.normalize();
        let unit = v.snapshot();
        assert!((unit[0] - 0.6).abs() < 1e-6);
        assert!((unit[1] - 0.8).abs() < 1e-6);
        v.scale(5.0);
        let restored = v.snapshot();
        assert!((restored[0] - 3.0).abs() < 1e-5);
        assert!((restored[1] - 4.0).abs() < 1e-5);
    }

    #[test]
    fn mutation_invalidates_length_cache() {
        let v = DenseVector::from_values(vec![3.0, 4.0]);
        assert!((v.length() - 5.0).abs() < 1e-6);
        v.set_element(0, 0.0);
        assert!((v.length() - 4.0).abs() < 1e-6);
    }

    // ------------------------------------------------------------------------
    // PROPERTY-BASED TESTS - the §8 "scale/normalize round-trip" invariant
    // over arbitrary nonzero dense vectors.
    // ------------------------------------------------------------------------

    #[test]
    fn property_normalize_then_scale_restores_original() {
        use proptest::prelude::*;

        proptest!(|(values in prop::collection::vec(-500.0f32..500.0, 1..24))| {
            prop_assume!(values.iter().any(|&v| v != 0.0));
            let v = DenseVector::from_values(values.clone());
            let len = v.length();
            v.normalize();
            v.scale(len as f32);
            let restored = v.snapshot();
            for (original, back) in values.iter().zip(restored.iter()) {
                prop_assert!((original - back).abs() < 1e-2);
            }
        });
    }

    #[test]
    fn property_add_pads_to_longer_operand_length() {
        use proptest::prelude::*;

        proptest!(|(a in prop::collection::vec(-100.0f32..100.0, 0..16),
                    b in prop::collection::vec(-100.0f32..100.0, 0..16))| {
            let da = DenseVector::from_values(a.clone());
            let db = DenseVector::from_values(b.clone());
            let sum = da.add_dense(&db);
            prop_assert_eq!(sum.num_elements(), a.len().max(b.len()));
        });
    }
}
