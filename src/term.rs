//! Term vector: a sparse vector whose `weight` field doubles as a
//! frequency count (SPEC_FULL §4.8).

use crate::scalar::{parse, Cursor};
use crate::vector::SparseVector;

/// Thin wrapper around [`SparseVector`] that interprets `weight` as an
/// unsigned frequency count, matching the source's `TermVectorT<ValT>`
/// (SPEC_FULL §4.8).
pub struct TermVector {
    inner: SparseVector,
}

impl TermVector {
    pub fn new(capacity_hint: usize) -> Self {
        TermVector {
            inner: SparseVector::new(capacity_hint),
        }
    }

    pub fn inner(&self) -> &SparseVector {
        &self.inner
    }

    pub fn vector_freq(&self) -> u32 {
        self.inner.weight().round().max(0.0) as u32
    }

    pub fn set_vector_freq(&self, freq: u32) {
        self.inner.set_weight(freq as f32);
    }

    /// Reads whitespace-separated `index[:value]` pairs until end of input
    /// or `>`, defaulting a missing value to zero (SPEC_FULL §4.8).
    pub fn read(cursor: &mut Cursor<'_>, size_hint: usize) -> TermVector {
        let tv = TermVector::new(size_hint);
        loop {
            let remaining = cursor.remaining().trim_start();
            *cursor = Cursor::new(remaining);
            if cursor.at_end() || remaining.starts_with('>') {
                break;
            }
            let mut index = 0u32;
            if !parse(cursor, &mut index) {
                break;
            }
            let value = if cursor.remaining().starts_with(':') {
                let rest = &cursor.remaining()[1..];
                *cursor = Cursor::new(rest);
                let mut v = 0f32;
                parse(cursor, &mut v);
                v
            } else {
                0.0
            };
            tv.inner.set_element(index, value);
        }
        tv
    }
}
