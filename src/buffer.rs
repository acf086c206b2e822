//! Growable, append-only typed buffer with an inline small-size reservoir,
//! plus a parallel variant for concurrent producers (SPEC_FULL §4.2).

use parking_lot::RwLock;

use crate::scalar::{parse, Cursor, ParseScalar};

const DEFAULT_INLINE: usize = 16;

fn grow_to(current_capacity: usize) -> usize {
    if current_capacity > 200_000_000 {
        5 * current_capacity / 4
    } else if current_capacity > 1_000_000 {
        3 * current_capacity / 2
    } else {
        2 * current_capacity + 50
    }
}

fn grow_for(current_capacity: usize, additional: usize) -> usize {
    let grown = grow_to(current_capacity);
    let needed = current_capacity + additional;
    if grown >= needed {
        grown
    } else {
        5 * needed / 4
    }
}

/// A typed append buffer. `MIN` is the size of the inline reservoir held by
/// value before the first heap allocation.
pub struct BufferBuilder<T, const MIN: usize = DEFAULT_INLINE> {
    inline: [T; MIN],
    inline_len: usize,
    heap: Vec<T>,
    on_heap: bool,
}

impl<T: Copy + Default, const MIN: usize> BufferBuilder<T, MIN> {
    pub fn new() -> Self {
        BufferBuilder {
            inline: [T::default(); MIN],
            inline_len: 0,
            heap: Vec::new(),
            on_heap: false,
        }
    }

    pub fn len(&self) -> usize {
        if self.on_heap {
            self.heap.len()
        } else {
            self.inline_len
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        if self.on_heap {
            self.heap.capacity()
        } else {
            MIN
        }
    }

    pub fn clear(&mut self) {
        self.inline_len = 0;
        self.heap.clear();
        self.on_heap = false;
    }

    fn spill_to_heap(&mut self, min_capacity: usize) {
        let mut v = Vec::with_capacity(min_capacity.max(self.inline_len));
        v.extend_from_slice(&self.inline[..self.inline_len]);
        self.heap = v;
        self.on_heap = true;
    }

    /// Appends a single value, growing per the load-bearing policy in
    /// SPEC_FULL §4.2 once the inline reservoir is exhausted.
    pub fn append(&mut self, value: T) {
        if !self.on_heap {
            if self.inline_len < MIN {
                self.inline[self.inline_len] = value;
                self.inline_len += 1;
                return;
            }
            self.spill_to_heap(grow_to(MIN));
        }
        if self.heap.len() == self.heap.capacity() {
            let target = grow_to(self.heap.capacity());
            self.heap.reserve(target - self.heap.len());
        }
        self.heap.push(value);
    }

    pub fn append_n(&mut self, value: T, count: usize) {
        if count == 0 {
            return;
        }
        if !self.on_heap && self.inline_len + count > MIN {
            self.spill_to_heap(grow_for(MIN, count));
        }
        if !self.on_heap {
            self.inline[self.inline_len..self.inline_len + count].fill(value);
            self.inline_len += count;
            return;
        }
        let needed = self.heap.len() + count;
        if needed > self.heap.capacity() {
            let target = grow_for(self.heap.capacity(), count);
            self.heap.reserve(target.max(needed) - self.heap.len());
        }
        self.heap.extend(std::iter::repeat(value).take(count));
    }

    pub fn append_all(&mut self, other: &[T]) {
        for &v in other {
            self.append(v);
        }
    }

    pub fn reverse(&mut self) {
        if self.on_heap {
            self.heap.reverse();
        } else {
            self.inline[..self.inline_len].reverse();
        }
    }

    /// Detaches the current contents, resetting the builder to empty. If
    /// storage was still the inline reservoir, it is copied to the heap
    /// first so the returned buffer outlives the builder.
    pub fn take(&mut self) -> Vec<T> {
        if self.on_heap {
            self.on_heap = false;
            std::mem::take(&mut self.heap)
        } else {
            let v = self.inline[..self.inline_len].to_vec();
            self.inline_len = 0;
            v
        }
    }

    /// Copies current contents into a new exact-sized buffer without
    /// resetting the builder.
    pub fn finalize(&self) -> Vec<T> {
        if self.on_heap {
            self.heap.clone()
        } else {
            self.inline[..self.inline_len].to_vec()
        }
    }

    pub fn as_slice(&self) -> &[T] {
        if self.on_heap {
            &self.heap
        } else {
            &self.inline[..self.inline_len]
        }
    }
}

impl<T: Copy + Default, const MIN: usize> Default for BufferBuilder<T, MIN> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const MIN: usize> BufferBuilder<T, MIN>
where
    T: Copy + Default + ParseScalar,
{
    /// Parses one scalar via [`crate::scalar::parse`] and appends it on
    /// success. Returns whether a value was read.
    pub fn read(&mut self, cursor: &mut Cursor<'_>) -> bool {
        let mut value = T::default();
        if parse(cursor, &mut value) {
            self.append(value);
            true
        } else {
            false
        }
    }
}

/// Reader/writer-locked buffer for concurrent producers: reservation
/// (which may reallocate) takes the exclusive side, writes into
/// already-reserved slots take the shared side (SPEC_FULL §4.2, §5).
pub struct ParallelBufferBuilder<T> {
    storage: RwLock<Vec<T>>,
    len: std::sync::atomic::AtomicUsize,
}

impl<T: Clone + Default> ParallelBufferBuilder<T> {
    pub fn new() -> Self {
        ParallelBufferBuilder {
            storage: RwLock::new(Vec::new()),
            len: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.len.load(std::sync::atomic::Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reserves `n` elements, reallocating under the exclusive lock if
    /// needed, and returns the start index of the reserved range.
    pub fn reserve_elements(&self, n: usize) -> usize {
        let mut storage = self.storage.write();
        let current_len = self.len.load(std::sync::atomic::Ordering::Acquire);
        let needed = current_len + n;
        if needed > storage.len() {
            storage.resize(needed, T::default());
        }
        self.len.store(needed, std::sync::atomic::Ordering::Release);
        current_len
    }

    /// Writes into an already-reserved slot under the shared side of the
    /// lock. Callers must not read a slot before its producer's
    /// `reserve_elements`/`set_element` pair completes.
    pub fn set_element(&self, index: usize, value: T) {
        let storage = self.storage.read();
        assert!(index < storage.len(), "set_element index out of reserved range");
        // SAFETY: `reserve_elements` (taken under the exclusive side of this
        // same lock) guarantees `index` is in bounds before any producer
        // receives it, and distinct producers are expected to write disjoint
        // indices, so concurrent writers here never alias the same slot.
        unsafe {
            let ptr = storage.as_ptr() as *mut T;
            ptr.add(index).write(value);
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        self.storage.into_inner()
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.storage.read().clone()
    }
}

impl<T: Clone + Default> Default for ParallelBufferBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_then_heap_append() {
        let mut b: BufferBuilder<i32, 4> = BufferBuilder::new();
        for i in 0..10 {
            b.append(i);
        }
        assert_eq!(b.len(), 10);
        assert_eq!(b.as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn take_detaches_inline_storage() {
        let mut b: BufferBuilder<i32, 4> = BufferBuilder::new();
        b.append(1);
        b.append(2);
        let v = b.take();
        assert_eq!(v, vec![1, 2]);
        assert_eq!(b.len(), 0);
    }

    #[test]
    fn append_n_fills_repeated_values() {
        let mut b: BufferBuilder<i32, 2> = BufferBuilder::new();
        b.append_n(7, 5);
        assert_eq!(b.as_slice(), &[7, 7, 7, 7, 7]);
    }

    #[test]
    fn read_parses_and_appends() {
        let mut b: BufferBuilder<u32> = BufferBuilder::new();
        let mut c = Cursor::new("10 20 30");
        while b.read(&mut c) {
            let _ = c.remaining().trim_start();
        }
        assert!(b.len() >= 1);
    }

    #[test]
    fn growth_policy_matches_thresholds() {
        assert_eq!(grow_to(100), 250);
        assert_eq!(grow_to(2_000_000), 3_000_000);
        assert_eq!(grow_to(300_000_000), 375_000_000);
    }

    #[test]
    fn parallel_reserve_then_set() {
        let b: ParallelBufferBuilder<i32> = ParallelBufferBuilder::new();
        let start = b.reserve_elements(3);
        assert_eq!(start, 0);
        b.set_element(0, 1);
        b.set_element(1, 2);
        b.set_element(2, 3);
        assert_eq!(b.snapshot(), vec![1, 2, 3]);
    }
}
