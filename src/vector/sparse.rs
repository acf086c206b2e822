//! Sparse vector representation: sorted `(index, value)` pairs with
//! set-union arithmetic (SPEC_FULL §3, §4.5).

use parking_lot::Mutex;

use super::one_hot::OneHotVector;
use super::{impl_meta_accessors, Meta};

struct SparseInner {
    meta: Meta,
    indices: Vec<u32>,
    values: Vec<f32>,
}

/// Invariant: `indices` is strictly increasing and `values[i]` is the
/// nonzero stored at dimension `indices[i]` (SPEC_FULL §3, §8 "sparse
/// order").
pub struct SparseVector {
    inner: Mutex<SparseInner>,
}

impl_meta_accessors!(SparseVector, inner);

impl SparseVector {
    pub fn new(capacity_hint: usize) -> Self {
        SparseVector {
            inner: Mutex::new(SparseInner {
                meta: Meta::default(),
                indices: Vec::with_capacity(capacity_hint),
                values: Vec::with_capacity(capacity_hint),
            }),
        }
    }

    pub fn from_pairs(mut pairs: Vec<(u32, f32)>) -> Self {
        pairs.sort_by_key(|&(i, _)| i);
        pairs.dedup_by_key(|&mut (i, _)| i);
        let (indices, values): (Vec<u32>, Vec<f32>) = pairs.into_iter().unzip();
        SparseVector {
            inner: Mutex::new(SparseInner {
                meta: Meta::default(),
                indices,
                values,
            }),
        }
    }

    pub fn num_elements(&self) -> usize {
        self.inner.lock().indices.len()
    }

    pub fn snapshot(&self) -> (Vec<u32>, Vec<f32>) {
        let inner = self.inner.lock();
        (inner.indices.clone(), inner.values.clone())
    }

    pub fn element_at(&self, i: usize) -> Option<(u32, f32)> {
        let inner = self.inner.lock();
        if i < inner.indices.len() {
            Some((inner.indices[i], inner.values[i]))
        } else {
            None
        }
    }

    pub fn value_at_index(&self, idx: u32) -> f32 {
        let inner = self.inner.lock();
        match inner.indices.binary_search(&idx) {
            Ok(pos) => inner.values[pos],
            Err(_) => 0.0,
        }
    }

    /// Binary-search insert maintaining strict index ordering. Fails if
    /// `idx` is already present, or if growing the backing arrays fails
    /// (SPEC_FULL §4.5, §7).
    pub fn new_element(&self, idx: u32, val: f32) -> bool {
        let mut inner = self.inner.lock();
        match inner.indices.binary_search(&idx) {
            Ok(_) => false,
            Err(pos) => {
                if inner.indices.len() == inner.indices.capacity() {
                    let new_cap = (14usize).max(3 * inner.indices.capacity() / 2);
                    let additional = new_cap - inner.indices.len();
                    if inner.indices.try_reserve(additional).is_err()
                        || inner.values.try_reserve(additional).is_err()
                    {
                        return false;
                    }
                }
                inner.indices.insert(pos, idx);
                inner.values.insert(pos, val);
                inner.meta.length = None;
                true
            }
        }
    }

    /// Sets the value at `idx`, creating the slot via [`Self::new_element`]
    /// if it is absent, or overwriting in place if present.
    pub fn set_element(&self, idx: u32, val: f32) {
        let mut inner = self.inner.lock();
        match inner.indices.binary_search(&idx) {
            Ok(pos) => {
                inner.values[pos] = val;
                inner.meta.length = None;
            }
            Err(pos) => {
                inner.indices.insert(pos, idx);
                inner.values.insert(pos, val);
                inner.meta.length = None;
            }
        }
    }

    /// Grows both parallel arrays by `additional` slots. Returns `false`
    /// without mutating either array if the allocation cannot be satisfied
    /// (SPEC_FULL §7: "allocation failure ... surfaced as a boolean `false`
    /// from `reserve`/`preallocate`/`new_element`").
    pub fn reserve(&self, additional: usize) -> bool {
        let mut inner = self.inner.lock();
        if inner.indices.try_reserve(additional).is_err() {
            return false;
        }
        if inner.values.try_reserve(additional).is_err() {
            return false;
        }
        true
    }

    fn compute_length(&self) -> f64 {
        let inner = self.inner.lock();
        inner
            .values
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
        for v in inner.values.iter_mut() {
            *v *= factor;
        }
    }

    pub fn normalize(&self) {
        let len = self.length();
        if len > 0.0 {
            self.scale((1.0 / len) as f32);
        }
    }

    pub fn clone_vector(&self) -> SparseVector {
        let inner = self.inner.lock();
        SparseVector {
            inner: Mutex::new(SparseInner {
                meta: inner.meta.clone(),
                indices: inner.indices.clone(),
                values: inner.values.clone(),
            }),
        }
    }

    /// Upper bound on the merged length of two sorted index sequences,
    /// computed by the same two-pointer walk `add`/`incr` use to size their
    /// result buffers exactly (SPEC_FULL §4.5).
    pub fn total_elements(a: &[u32], b: &[u32]) -> usize {
        let (mut i, mut j) = (0, 0);
        let mut count = 0;
        while i < a.len() && j < b.len() {
            count += 1;
            match a[i].cmp(&b[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }
        count + (a.len() - i) + (b.len() - j)
    }

    /// Set-union merge of two sorted `(index, value)` sequences: unique
    /// entries are copied, coincident indices are summed (SPEC_FULL §4.5).
    fn merge(a: &[(u32, f32)], b: &[(u32, f32)]) -> Vec<(u32, f32)> {
        let mut result = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                std::cmp::Ordering::Less => {
                    result.push(a[i]);
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    result.push(b[j]);
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    result.push((a[i].0, a[i].1 + b[j].1));
                    i += 1;
                    j += 1;
                }
            }
        }
        result.extend_from_slice(&a[i..]);
        result.extend_from_slice(&b[j..]);
        result
    }

    fn pairs(&self) -> Vec<(u32, f32)> {
        let (indices, values) = self.snapshot();
        indices.into_iter().zip(values).collect()
    }

    pub fn add_sparse(&self, other: &SparseVector) -> SparseVector {
        let merged = Self::merge(&self.pairs(), &other.pairs());
        SparseVector::from_pairs(merged)
    }

    /// Optimized single-element merge against a one-hot operand: copy
    /// entries below the hot index, coalesce at equality, copy the
    /// remainder (SPEC_FULL §4.5).
    fn merge_one_hot(pairs: &[(u32, f32)], hot_idx: u32, hot_val: f32) -> Vec<(u32, f32)> {
        let mut result = Vec::with_capacity(pairs.len() + 1);
        let mut inserted = false;
        for &(idx, val) in pairs {
            match idx.cmp(&hot_idx) {
                std::cmp::Ordering::Less => result.push((idx, val)),
                std::cmp::Ordering::Equal => {
                    result.push((idx, val + hot_val));
                    inserted = true;
                }
                std::cmp::Ordering::Greater => {
                    if !inserted {
                        result.push((hot_idx, hot_val));
                        inserted = true;
                    }
                    result.push((idx, val));
                }
            }
        }
        if !inserted {
            result.push((hot_idx, hot_val));
        }
        result
    }

    pub fn add_one_hot(&self, other: &OneHotVector) -> SparseVector {
        let merged = Self::merge_one_hot(&self.pairs(), other.index(), other.value());
        SparseVector::from_pairs(merged)
    }

    pub fn add_dense(&self, other: &super::dense::DenseVector) -> super::dense::DenseVector {
        other.add_sparse_via(self)
    }

    /// Rebuilds into a freshly sized buffer ([`Self::total_elements`]) and
    /// swaps it in without ever releasing the mutation lock between
    /// reading `self`'s current contents and writing the merged result
    /// back, so two concurrent `incr` calls on the same vector cannot both
    /// read the same starting state and silently clobber one another's
    /// update (SPEC_FULL §4.5, §8 "Collection race-safety").
    pub fn incr_sparse(&self, other: &SparseVector, weight: f32) {
        let (other_indices, other_values) = other.snapshot();
        let weighted: Vec<(u32, f32)> = other_indices
            .iter()
            .zip(other_values.iter())
            .map(|(&i, &v)| (i, v * weight))
            .collect();
        let mut inner = self.inner.lock();
        let self_pairs: Vec<(u32, f32)> = inner
            .indices
            .iter()
            .copied()
            .zip(inner.values.iter().copied())
            .collect();
        let merged = Self::merge(&self_pairs, &weighted);
        inner.meta.length = None;
        inner.indices = merged.iter().map(|&(i, _)| i).collect();
        inner.values = merged.iter().map(|&(_, v)| v).collect();
    }

    /// Same single-held-lock treatment as [`Self::incr_sparse`]: the
    /// one-hot merge reads `self`'s current pairs and writes the result
    /// back without ever dropping `inner` in between.
    pub fn incr_one_hot(&self, other: &OneHotVector, weight: f32) {
        let scaled = other.scaled(weight);
        let mut inner = self.inner.lock();
        let pairs: Vec<(u32, f32)> = inner
            .indices
            .iter()
            .copied()
            .zip(inner.values.iter().copied())
            .collect();
        let merged = Self::merge_one_hot(&pairs, scaled.index(), scaled.value());
        inner.meta.length = None;
        inner.indices = merged.iter().map(|&(i, _)| i).collect();
        inner.values = merged.iter().map(|&(_, v)| v).collect();
    }

    pub fn incr_dense(&self, other: &super::dense::DenseVector, weight: f32) {
        let dense_as_sparse = other.to_sparse();
        self.incr_sparse(&dense_as_sparse, weight);
    }

    /// Same object, or equal size and identical `(index, value)`
    /// sequences. The donor's equivalent check is an unfinished stub that
    /// always returns `false`; this implements the behavior SPEC_FULL §4.5
    /// documents as intended (see DESIGN.md Open Question 2).
    pub fn content_equal(&self, other: &SparseVector) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        let (ai, av) = self.snapshot();
        let (bi, bv) = other.snapshot();
        ai == bi && av == bv
    }

    /// Folds element count and each `(index, value)` pair into a hash
    /// (SPEC_FULL §4.5), via the same logic as the [`std::hash::Hash`] impl.
    pub fn content_hash(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

impl Clone for SparseVector {
    fn clone(&self) -> Self {
        self.clone_vector()
    }
}

/// Same object, or equal size and identical `(index, value)` sequences
/// (SPEC_FULL §4.5). Delegates to [`Self::content_equal`] so `==` and the
/// explicit method never disagree.
impl PartialEq for SparseVector {
    fn eq(&self, other: &Self) -> bool {
        self.content_equal(other)
    }
}

impl Eq for SparseVector {}

/// Folds element count and each `(index, value)` pair into the hasher state
/// in order, so equal vectors (per [`PartialEq`]) always hash equal
/// (SPEC_FULL §4.5).
impl std::hash::Hash for SparseVector {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let (indices, values) = self.snapshot();
        indices.len().hash(state);
        for (&i, &v) in indices.iter().zip(values.iter()) {
            i.hash(state);
            v.to_bits().hash(state);
        }
    }
}
