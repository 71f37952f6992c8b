//! Interned identifiers.
//!
//! Package paths, identifier names, and field names are interned so that
//! comparisons and hash-map keys used throughout the evaluator and object
//! model are cheap `Copy` values instead of repeated string allocations.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// An interned string identifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string, always index 0.
    pub const EMPTY: Name = Name(0);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}

struct InternerInner {
    map: FxHashMap<String, u32>,
    strings: Vec<String>,
}

impl InternerInner {
    fn new() -> Self {
        let mut inner = InternerInner {
            map: FxHashMap::default(),
            strings: Vec::new(),
        };
        inner.intern_new("");
        inner
    }

    fn intern_new(&mut self, s: &str) -> u32 {
        let id = self.strings.len() as u32;
        self.strings.push(s.to_string());
        self.map.insert(s.to_string(), id);
        id
    }
}

/// Thread-safe string interner shared between the evaluator and its host.
///
/// Backed by a single `RwLock<FxHashMap>`. The evaluator runs single-threaded
/// per instance, but the interner is `Arc`-shared so that a
/// `FileSet`/`PackageInfo` produced by a scanner on one thread can be handed
/// to an interpreter on another without re-interning.
#[derive(Clone)]
pub struct StringInterner {
    inner: Arc<RwLock<InternerInner>>,
}

impl StringInterner {
    pub fn new() -> Self {
        StringInterner {
            inner: Arc::new(RwLock::new(InternerInner::new())),
        }
    }

    /// Intern a string, returning its `Name`. Idempotent.
    pub fn intern(&self, s: &str) -> Name {
        if let Some(&id) = self.inner.read().map.get(s) {
            return Name(id);
        }
        let mut inner = self.inner.write();
        if let Some(&id) = inner.map.get(s) {
            return Name(id);
        }
        Name(inner.intern_new(s))
    }

    /// Resolve a `Name` back to its string contents.
    ///
    /// # Panics
    /// Panics if `name` was not produced by this interner (invariant
    /// violation: every `Name` that reaches the evaluator must have been
    /// interned through the `StringInterner` it is evaluated with).
    pub fn lookup(&self, name: Name) -> String {
        self.inner.read().strings[name.0 as usize].clone()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
