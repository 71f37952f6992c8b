//! Interface → concrete type dispatch redirection.
//!
//! A binding never changes what a `Variable`'s static type is recorded as —
//! it only tells the evaluator which concrete type's method set to consult
//! when dispatching a call made through the interface.

use gosym_ir::Name;
use rustc_hash::FxHashMap;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypePath {
    pub pkg_path: Name,
    pub type_name: Name,
}

impl TypePath {
    pub fn new(pkg_path: Name, type_name: Name) -> Self {
        TypePath { pkg_path, type_name }
    }
}

#[derive(Default)]
pub struct InterfaceBindingTable {
    bindings: FxHashMap<TypePath, TypePath>,
}

impl InterfaceBindingTable {
    pub fn new() -> Self {
        InterfaceBindingTable::default()
    }

    /// Bind an interface to a concrete type. Last write wins.
    pub fn bind(&mut self, interface: TypePath, concrete: TypePath) {
        self.bindings.insert(interface, concrete);
    }

    pub fn resolve(&self, interface: TypePath) -> Option<TypePath> {
        self.bindings.get(&interface).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gosym_ir::StringInterner;

    #[test]
    fn unbound_interface_resolves_to_none() {
        let interner = StringInterner::new();
        let table = InterfaceBindingTable::new();
        let iface = TypePath::new(interner.intern("io"), interner.intern("Writer"));
        assert!(table.resolve(iface).is_none());
    }

    #[test]
    fn bound_interface_resolves_to_concrete() {
        let interner = StringInterner::new();
        let mut table = InterfaceBindingTable::new();
        let iface = TypePath::new(interner.intern("io"), interner.intern("Writer"));
        let concrete = TypePath::new(interner.intern("bytes"), interner.intern("Buffer"));
        table.bind(iface, concrete);
        assert_eq!(table.resolve(iface), Some(concrete));
    }

    #[test]
    fn last_write_wins() {
        let interner = StringInterner::new();
        let mut table = InterfaceBindingTable::new();
        let iface = TypePath::new(interner.intern("io"), interner.intern("Writer"));
        let first = TypePath::new(interner.intern("bytes"), interner.intern("Buffer"));
        let second = TypePath::new(interner.intern("os"), interner.intern("File"));
        table.bind(iface, first);
        table.bind(iface, second);
        assert_eq!(table.resolve(iface), Some(second));
    }
}
