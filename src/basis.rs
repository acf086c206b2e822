//! Basis vector: a pseudo-random sparse vector with a fixed number of `+1`
//! and `-1` entries, minted once dimensionality is frozen (SPEC_FULL §3,
//! §4.9). No original source exists for this component (see DESIGN.md
//! Open Question 3) — it is designed from the spec's description alone,
//! made reproducible by seeding from the term's insertion rank.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;

use crate::vector::SparseVector;

/// Builds a sparse vector with `plus_count` entries set to `+1.0` and
/// `minus_count` further entries set to `-1.0`, all at distinct indices in
/// `[0, dimensions)`. Deterministic for a given `(dimensions, plus_count,
/// minus_count, seed)`.
pub fn make_basis_vector(dimensions: usize, plus_count: usize, minus_count: usize, seed: u64) -> SparseVector {
    assert!(
        plus_count + minus_count <= dimensions,
        "basis vector requests more nonzeros ({}) than available dimensions ({})",
        plus_count + minus_count,
        dimensions
    );
    let mut rng = StdRng::seed_from_u64(seed);
    let chosen = sample(&mut rng, dimensions, plus_count + minus_count);
    let mut pairs: Vec<(u32, f32)> = Vec::with_capacity(plus_count + minus_count);
    for (rank, idx) in chosen.iter().enumerate() {
        let value = if rank < plus_count { 1.0 } else { -1.0 };
        pairs.push((idx as u32, value));
    }
    SparseVector::from_pairs(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_vector_has_requested_nonzero_counts() {
        let v = make_basis_vector(100, 3, 2, 42);
        let (_, values) = v.snapshot();
        assert_eq!(values.len(), 5);
        assert_eq!(values.iter().filter(|&&v| v == 1.0).count(), 3);
        assert_eq!(values.iter().filter(|&&v| v == -1.0).count(), 2);
    }

    #[test]
    fn same_seed_is_reproducible() {
        let a = make_basis_vector(50, 2, 2, 7);
        let b = make_basis_vector(50, 2, 2, 7);
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn different_seeds_usually_differ() {
        let a = make_basis_vector(1000, 4, 4, 1);
        let b = make_basis_vector(1000, 4, 4, 2);
        assert_ne!(a.snapshot(), b.snapshot());
    }
}
