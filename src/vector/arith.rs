//! Representation dispatcher: the cross-representation `add`/`incr` entry
//! points that pick the concrete algorithm for a given pair of operand
//! representations (SPEC_FULL §4.7).

use std::sync::Arc;

use super::{DenseVector, OneHotVector, SparseVector, Vector};

impl Vector {
    /// Adds two vectors irrespective of representation, returning a new
    /// vector (never mutates either operand).
    pub fn add(&self, other: &Vector) -> Vector {
        match (self, other) {
            (Vector::Dense(a), Vector::Dense(b)) => Vector::Dense(Arc::new(a.add_dense(b))),
            (Vector::Dense(a), Vector::Sparse(b)) => Vector::Dense(Arc::new(a.add_sparse(b))),
            (Vector::Dense(a), Vector::OneHot(b)) => Vector::Dense(Arc::new(a.add_one_hot(b))),
            (Vector::Sparse(a), Vector::Dense(b)) => Vector::Dense(Arc::new(a.add_dense(b))),
            (Vector::Sparse(a), Vector::Sparse(b)) => Vector::Sparse(Arc::new(a.add_sparse(b))),
            (Vector::Sparse(a), Vector::OneHot(b)) => Vector::Sparse(Arc::new(a.add_one_hot(b))),
            (Vector::OneHot(a), Vector::Dense(b)) => Vector::Dense(Arc::new(b.add_one_hot(a))),
            (Vector::OneHot(a), Vector::Sparse(b)) => Vector::Sparse(Arc::new(b.add_one_hot(a))),
            (Vector::OneHot(a), Vector::OneHot(b)) => {
                Vector::Sparse(Arc::new(a.to_sparse().add_one_hot(b)))
            }
        }
    }

    /// In-place weighted increment: `self += weight * other`. Returns
    /// whether the operation is supported for this pair of representations
    /// (a one-hot receiver is rejected rather than silently ignored — see
    /// SPEC_FULL §4.7).
    pub fn incr(&self, other: &Vector, weight: f32) -> bool {
        match (self, other) {
            (Vector::Dense(a), Vector::Dense(b)) => {
                a.incr_dense(b, weight);
                true
            }
            (Vector::Dense(a), Vector::Sparse(b)) => {
                a.incr_sparse(b, weight);
                true
            }
            (Vector::Dense(a), Vector::OneHot(b)) => {
                let scaled = b.scaled(weight);
                let merged = a.add_one_hot(&scaled);
                let snapshot = merged.snapshot();
                for (i, v) in snapshot.into_iter().enumerate() {
                    a.set_element(i, v);
                }
                true
            }
            (Vector::Sparse(a), Vector::Dense(b)) => {
                a.incr_dense(b, weight);
                true
            }
            (Vector::Sparse(a), Vector::Sparse(b)) => {
                a.incr_sparse(b, weight);
                true
            }
            (Vector::Sparse(a), Vector::OneHot(b)) => {
                a.incr_one_hot(b, weight);
                true
            }
            (Vector::OneHot(_), _) => false,
        }
    }

    pub fn scale(&self, factor: f32) {
        match self {
            Vector::Dense(v) => v.scale(factor),
            Vector::Sparse(v) => v.scale(factor),
            Vector::OneHot(_) => {
                // Immutable by design (SPEC_FULL §4.6); scaling a one-hot
                // operand in place has no representation to store into.
            }
        }
    }

    pub fn normalize(&self) {
        match self {
            Vector::Dense(v) => v.normalize(),
            Vector::Sparse(v) => v.normalize(),
            Vector::OneHot(_) => {}
        }
    }
}

impl From<DenseVector> for Vector {
    fn from(v: DenseVector) -> Self {
        Vector::Dense(Arc::new(v))
    }
}

impl From<SparseVector> for Vector {
    fn from(v: SparseVector) -> Self {
        Vector::Sparse(Arc::new(v))
    }
}

impl From<OneHotVector> for Vector {
    fn from(v: OneHotVector) -> Self {
        Vector::OneHot(Arc::new(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_representation_independent() {
        let dense: Vector = DenseVector::from_values(vec![1.0, 2.0, 3.0, 4.0]).into();
        let sparse: Vector = SparseVector::from_pairs(vec![(1, 10.0), (3, 100.0)]).into();
        let result = dense.add(&sparse);
        assert_eq!(result.canonicalize().snapshot(), (vec![0, 1, 2, 3], vec![1.0, 12.0, 3.0, 104.0]));
    }

    #[test]
    fn add_commutes_across_representations() {
        let dense: Vector = DenseVector::from_values(vec![1.0, 2.0, 3.0, 4.0]).into();
        let sparse: Vector = SparseVector::from_pairs(vec![(1, 10.0), (3, 100.0)]).into();
        let ds = dense.add(&sparse).canonicalize().snapshot();
        let sd = sparse.add(&dense).canonicalize().snapshot();
        assert_eq!(ds, sd);
    }

    #[test]
    fn one_hot_merges_into_sparse() {
        let sparse: Vector = SparseVector::from_pairs(vec![(0, 1.0), (2, 3.0), (4, 5.0)]).into();
        let hot: Vector = OneHotVector::new(2, 7.0).into();
        let merged = sparse.add(&hot);
        assert_eq!(merged.canonicalize().snapshot(), (vec![0, 2, 4], vec![1.0, 10.0, 5.0]));
    }

    #[test]
    fn incr_rejects_one_hot_receiver() {
        let hot: Vector = OneHotVector::new(0, 1.0).into();
        let dense: Vector = DenseVector::from_values(vec![1.0]).into();
        assert!(!hot.incr(&dense, 1.0));
    }

    // ------------------------------------------------------------------------
    // PROPERTY-BASED TESTS - commutativity of `add` across the representation
    // dispatcher itself, not just within a single representation.
    // ------------------------------------------------------------------------

    #[test]
    fn property_add_commutes_across_dense_and_sparse() {
        use proptest::prelude::*;

        proptest!(|(dense_vals in prop::collection::vec(-200.0f32..200.0, 0..12),
                    sparse_pairs in prop::collection::vec((0u32..24, -200.0f32..200.0), 0..12))| {
            let dense: Vector = DenseVector::from_values(dense_vals).into();
            let sparse: Vector = SparseVector::from_pairs(sparse_pairs).into();
            let ds = dense.add(&sparse).canonicalize().snapshot();
            let sd = sparse.add(&dense).canonicalize().snapshot();
            prop_assert_eq!(ds, sd);
        });
    }
}
