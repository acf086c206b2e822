//! One-hot vector representation: a single `(index, value)` pair held
//! inline, used as a read-only operand in sparse/dense arithmetic
//! (SPEC_FULL §3, §4.6).

use parking_lot::Mutex;

use super::sparse::SparseVector;
use super::{impl_meta_accessors, Meta};

struct OneHotInner {
    meta: Meta,
}

/// The single stored `(index, value)` pair is immutable after
/// construction: mutation that would introduce a second nonzero must go
/// through an explicit promotion to [`SparseVector`] (SPEC_FULL §4.6,
/// §4.7) rather than being silently absorbed here.
pub struct OneHotVector {
    index: u32,
    value: f32,
    inner: Mutex<OneHotInner>,
}

impl_meta_accessors!(OneHotVector, inner);

impl OneHotVector {
    pub fn new(index: u32, value: f32) -> Self {
        OneHotVector {
            index,
            value,
            inner: Mutex::new(OneHotInner {
                meta: Meta::default(),
            }),
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn element_index(&self, i: usize) -> u32 {
        let _ = i;
        self.index
    }

    pub fn element_value(&self, idx: u32) -> f32 {
        if idx == self.index {
            self.value
        } else {
            0.0
        }
    }

    pub fn length(&self) -> f64 {
        (self.value as f64).abs()
    }

    /// Returns a copy scaled by `factor`, used by [`SparseVector::incr_one_hot`]
    /// to apply a weight without mutating the (immutable) one-hot operand.
    pub fn scaled(&self, factor: f32) -> OneHotVector {
        OneHotVector::new(self.index, self.value * factor)
    }

    pub fn to_sparse(&self) -> SparseVector {
        SparseVector::from_pairs(vec![(self.index, self.value)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_value_only_nonzero_at_stored_index() {
        let oh = OneHotVector::new(3, 2.5);
        assert_eq!(oh.element_value(3), 2.5);
        assert_eq!(oh.element_value(4), 0.0);
    }

    #[test]
    fn length_is_absolute_value() {
        let oh = OneHotVector::new(0, -4.0);
        assert_eq!(oh.length(), 4.0);
    }

    #[test]
    fn to_sparse_round_trips() {
        let oh = OneHotVector::new(2, 7.0);
        let s = oh.to_sparse();
        assert_eq!(s.snapshot(), (vec![2], vec![7.0]));
    }
}
