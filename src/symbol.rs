//! Process-wide string interner.
//!
//! Stands in for the symbol-interning primitive the vector core assumes is
//! available (see SPEC_FULL.md §4.10). Interned strings are leaked once and
//! handed back as small `Copy` handles so keys/labels can be passed around
//! and hashed cheaply.

use dashmap::DashMap;
use std::fmt;
use std::sync::OnceLock;

/// A cheap, `Copy` handle to an interned string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

mod storage {
    use parking_lot::RwLock;

    #[derive(Default)]
    pub(super) struct IdTable(RwLock<Vec<&'static str>>);

    impl IdTable {
        pub(super) fn push(&self, s: &'static str) -> u32 {
            let mut guard = self.0.write();
            let id = guard.len() as u32;
            guard.push(s);
            id
        }

        pub(super) fn get(&self, id: u32) -> &'static str {
            self.0.read()[id as usize]
        }
    }
}

struct Interner {
    by_str: DashMap<Box<str>, Symbol, ahash::RandomState>,
    by_id: storage::IdTable,
}

impl Interner {
    fn new() -> Self {
        Interner {
            by_str: DashMap::with_hasher(ahash::RandomState::new()),
            by_id: storage::IdTable::default(),
        }
    }

    fn intern(&self, s: &str) -> Symbol {
        if let Some(existing) = self.by_str.get(s) {
            return *existing;
        }
        // Lost races just leak a second copy of `s`; leaks are cheap and the
        // table dedups future lookups against whichever entry won.
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let id = self.by_id.push(leaked);
        let sym = Symbol(id);
        match self.by_str.entry(leaked.to_owned().into_boxed_str()) {
            dashmap::mapref::entry::Entry::Occupied(o) => *o.get(),
            dashmap::mapref::entry::Entry::Vacant(v) => {
                v.insert(sym);
                sym
            }
        }
    }

    fn resolve(&self, sym: Symbol) -> &'static str {
        self.by_id.get(sym.0)
    }
}

static TABLE: OnceLock<Interner> = OnceLock::new();

fn table() -> &'static Interner {
    TABLE.get_or_init(Interner::new)
}

impl Symbol {
    /// Interns `s`, returning its handle. Repeated interning of an equal
    /// string returns the same handle.
    pub fn intern(s: &str) -> Self {
        table().intern(s)
    }

    /// Returns the original string this symbol was interned from.
    pub fn as_str(&self) -> &'static str {
        table().resolve(*self)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::intern(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let a = Symbol::intern("hello");
        let b = Symbol::intern("hello");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "hello");
    }

    #[test]
    fn distinct_strings_get_distinct_symbols() {
        let a = Symbol::intern("foo");
        let b = Symbol::intern("bar");
        assert_ne!(a, b);
    }

    #[test]
    fn concurrent_interning_converges() {
        use std::thread;
        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(|| Symbol::intern("shared")))
            .collect();
        let syms: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(syms.windows(2).all(|w| w[0] == w[1]));
    }
}
