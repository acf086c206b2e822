//! Concurrent context-vector collection: maps keys to term vectors and
//! accumulated context vectors, with race-tolerant minting of both
//! (SPEC_FULL §4.9, §5).

use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::basis::make_basis_vector;
use crate::vector::{DenseVector, OneHotVector, SparseVector, Vector};

/// Configuration fixed at construction time, except `dimensions` which may
/// be set once while still zero (SPEC_FULL §4.9).
pub struct ContextVectorCollection<K> {
    term_vectors: DashMap<K, Vector, ahash::RandomState>,
    context_vectors: DashMap<K, Vector, ahash::RandomState>,
    dimensions: AtomicUsize,
    plus_dimensions: usize,
    minus_dimensions: usize,
    sparse: bool,
}

impl<K> ContextVectorCollection<K>
where
    K: Eq + Hash + Clone + Send + Sync,
{
    pub fn new(sparse: bool) -> Self {
        ContextVectorCollection {
            term_vectors: DashMap::with_hasher(ahash::RandomState::new()),
            context_vectors: DashMap::with_hasher(ahash::RandomState::new()),
            dimensions: AtomicUsize::new(0),
            plus_dimensions: 4,
            minus_dimensions: 4,
            sparse,
        }
    }

    pub fn with_basis_dimensions(sparse: bool, plus: usize, minus: usize) -> Self {
        let mut c = Self::new(sparse);
        c.plus_dimensions = plus;
        c.minus_dimensions = minus;
        c
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions.load(Ordering::Acquire)
    }

    pub fn plus_dimensions(&self) -> usize {
        self.plus_dimensions
    }

    pub fn minus_dimensions(&self) -> usize {
        self.minus_dimensions
    }

    /// Honored only in dense mode, and only while dimensionality is still
    /// unfixed (SPEC_FULL §3, §4.9).
    pub fn set_dimensions(&self, d: usize) -> bool {
        if self.sparse {
            return false;
        }
        self.dimensions
            .compare_exchange(0, d, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn have_term_vector(&self, key: &K) -> bool {
        self.term_vectors.contains_key(key)
    }

    pub fn have_context_vector(&self, key: &K) -> bool {
        self.context_vectors.contains_key(key)
    }

    pub fn get_term_vector(&self, key: &K) -> Option<Vector> {
        self.term_vectors.get(key).map(|v| v.clone())
    }

    pub fn get_context_vector(&self, key: &K) -> Option<Vector> {
        self.context_vectors.get(key).map(|v| v.clone())
    }

    /// Insert-if-absent: fails if `key` already has a term vector.
    pub fn set_term_vector(&self, key: K, vector: Vector) -> bool {
        match self.term_vectors.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(vector);
                true
            }
        }
    }

    pub fn set_context_vector(&self, key: K, vector: Vector) -> bool {
        match self.context_vectors.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(vector);
                true
            }
        }
    }

    /// Sparse mode creates a one-hot vector; dense mode creates a dense
    /// vector sized to `dimensions` with `idx` set (SPEC_FULL §4.9).
    pub fn set_one_hot_vector(&self, key: K, idx: u32, value: f32, weight: f32) -> bool {
        let vector: Vector = if self.sparse {
            let oh = OneHotVector::new(idx, value);
            oh.set_weight(weight);
            oh.into()
        } else {
            let d = DenseVector::new(self.dimensions().max(idx as usize + 1));
            d.set_element(idx as usize, value);
            d.set_weight(weight);
            d.into()
        };
        self.set_term_vector(key, vector)
    }

    fn mint_term_vector(&self) -> Vector {
        let rank = self.term_vectors.len();
        if self.dimensions() == 0 {
            OneHotVector::new(rank as u32, 1.0).into()
        } else {
            make_basis_vector(
                self.dimensions(),
                self.plus_dimensions,
                self.minus_dimensions,
                rank as u64,
            )
            .into()
        }
    }

    fn mint_context_vector(&self) -> Vector {
        if self.sparse {
            SparseVector::new(0).into()
        } else {
            DenseVector::new(self.dimensions()).into()
        }
    }

    /// Lookup-or-create, race-tolerant: if two threads mint concurrently,
    /// exactly one insertion wins and the loser's candidate is dropped in
    /// favor of re-reading the winner (SPEC_FULL §4.9, §5).
    pub fn make_term_vector(&self, key: &K) -> Vector {
        if let Some(existing) = self.get_term_vector(key) {
            return existing;
        }
        let candidate = self.mint_term_vector();
        if self.set_term_vector(key.clone(), candidate.clone()) {
            tracing::trace!("minted new term vector");
            candidate
        } else {
            tracing::trace!("lost term vector minting race, re-reading winner");
            self.get_term_vector(key)
                .expect("winner must have inserted a term vector")
        }
    }

    pub fn make_context_vector(&self, key: &K) -> Vector {
        if let Some(existing) = self.get_context_vector(key) {
            return existing;
        }
        let candidate = self.mint_context_vector();
        if self.set_context_vector(key.clone(), candidate.clone()) {
            tracing::trace!("minted new context vector");
            candidate
        } else {
            tracing::trace!("lost context vector minting race, re-reading winner");
            self.get_context_vector(key)
                .expect("winner must have inserted a context vector")
        }
    }

    /// Always succeeds: obtains or creates both the context vector for
    /// `key` and the term vector for `term`, then folds
    /// `weight * term.weight()` of the term vector into the context
    /// vector (SPEC_FULL §4.9).
    pub fn add_term(&self, key: &K, term: &K, weight: f32) -> bool {
        let context = self.make_context_vector(key);
        let term_vec = self.make_term_vector(term);
        let effective_weight = weight * term_vec.weight();
        context.incr(&term_vec, effective_weight);
        tracing::debug!(?effective_weight, "folded term into context vector");
        true
    }

    /// Like [`Self::add_term`] but does not create a term vector: if
    /// `term` has no term vector yet, only the (possibly newly minted)
    /// context vector is produced, unchanged (SPEC_FULL §4.9).
    pub fn update_context_vector(&self, key: &K, term: &K, weight: f32) -> bool {
        let context = self.make_context_vector(key);
        if let Some(term_vec) = self.get_term_vector(term) {
            let effective_weight = weight * term_vec.weight();
            context.incr(&term_vec, effective_weight);
        }
        true
    }

    pub fn term_count(&self) -> usize {
        self.term_vectors.len()
    }

    pub fn context_count(&self) -> usize {
        self.context_vectors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_term_mints_one_hot_vectors_in_sparse_mode() {
        let coll: ContextVectorCollection<String> = ContextVectorCollection::new(true);
        assert!(coll.add_term(&"doc1".to_string(), &"cat".to_string(), 1.0));
        assert!(coll.add_term(&"doc1".to_string(), &"dog".to_string(), 2.0));
        assert_eq!(coll.term_count(), 2);
        let ctx = coll.get_context_vector(&"doc1".to_string()).unwrap();
        assert_eq!(ctx.canonicalize().snapshot(), (vec![0, 1], vec![1.0, 2.0]));
    }

    #[test]
    fn update_context_vector_does_not_create_term() {
        let coll: ContextVectorCollection<String> = ContextVectorCollection::new(true);
        assert!(coll.update_context_vector(&"doc1".to_string(), &"missing".to_string(), 1.0));
        assert_eq!(coll.term_count(), 0);
        assert!(coll.have_context_vector(&"doc1".to_string()));
    }

    #[test]
    fn concurrent_add_term_creates_exactly_one_term_vector() {
        use std::thread;
        let coll: Arc<ContextVectorCollection<&'static str>> =
            Arc::new(ContextVectorCollection::new(true));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let coll = Arc::clone(&coll);
                thread::spawn(move || {
                    coll.add_term("doc", "shared-term", 1.0);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(coll.term_count(), 1);
        let ctx = coll.get_context_vector(&"doc").unwrap();
        let (_, values) = ctx.canonicalize().snapshot();
        assert_eq!(values.iter().sum::<f32>(), 8.0);
    }
}
