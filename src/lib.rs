//! # ctxvec — representation-polymorphic term/context vector engine
//!
//! ## Architecture overview
//!
//! The crate is built from the leaves up:
//!
//! - [`scalar`] parses textual scalars the way `strtol`/`strtof` do, not the
//!   way `str::parse` does (base auto-detection, partial-parse tolerance).
//! - [`buffer`] is a growable append buffer with an inline small-size
//!   reservoir and a parallel, reader/writer-locked variant.
//! - [`symbol`] interns `&str` keys/labels into cheap `Copy` handles.
//! - [`vector`] holds the three representations — [`vector::DenseVector`],
//!   [`vector::SparseVector`], [`vector::OneHotVector`] — plus the
//!   [`vector::Vector`] tagged union and its representation dispatcher.
//! - [`term`] and [`basis`] build on sparse vectors for the text-analytics
//!   use case: term vectors (frequency-as-weight) and basis vectors
//!   (pseudo-random fixed-weight vectors minted once dimensionality is
//!   fixed).
//! - [`context`] is the concurrent mapping layer tying keys to term and
//!   context vectors, with race-tolerant minting for concurrent callers.
//! - [`text`] renders/parses the `#<TYPE:...>` textual vector form.
//!
//! ## Concurrency
//!
//! Every vector representation guards its mutable state (storage, cached
//! length, key/label/weight) behind a single `parking_lot::Mutex` — a coarse
//! per-vector critical section, sufficient for every correctness property
//! this crate cares about (see DESIGN.md). The context-vector collection
//! layers two `dashmap::DashMap` instances on top and resolves concurrent
//! minting races by letting the losing thread's candidate simply drop.
//!
//! ## Why mimalloc
//!
//! Sparse-vector arithmetic allocates and frees a fresh backing buffer on
//! every `incr` (SPEC_FULL §4.5); mimalloc's per-thread, size-segregated
//! free lists keep that churn cheap and contention-free, so it is installed
//! as the global allocator for the whole process.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

pub mod basis;
pub mod buffer;
pub mod context;
pub mod error;
pub mod scalar;
pub mod symbol;
pub mod term;
pub mod text;
pub mod vector;

pub use context::ContextVectorCollection;
pub use symbol::Symbol;
pub use term::TermVector;
pub use vector::{DenseVector, OneHotVector, SparseVector, Vector};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_context_collection_scenario() {
        let coll: ContextVectorCollection<Symbol> = ContextVectorCollection::new(true);
        let doc = Symbol::intern("doc1");
        let cat = Symbol::intern("cat");
        let dog = Symbol::intern("dog");
        assert!(coll.add_term(&doc, &cat, 1.0));
        assert!(coll.add_term(&doc, &dog, 2.0));
        assert_eq!(coll.term_count(), 2);
        let ctx = coll.get_context_vector(&doc).unwrap();
        assert_eq!(ctx.canonicalize().snapshot(), (vec![0, 1], vec![1.0, 2.0]));
    }

    #[test]
    fn dense_sparse_one_hot_add_agree_on_representation_independent_result() {
        let dense: Vector = DenseVector::from_values(vec![1.0, 2.0, 3.0, 4.0]).into();
        let sparse: Vector = SparseVector::from_pairs(vec![(1, 10.0), (3, 100.0)]).into();
        let hot: Vector = OneHotVector::new(0, 1000.0).into();

        let via_dense = dense.add(&sparse).add(&hot).canonicalize().snapshot();
        let via_sparse = sparse.add(&dense).add(&hot).canonicalize().snapshot();
        assert_eq!(via_dense, via_sparse);
    }
}
