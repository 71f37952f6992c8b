//! Lexically nested scopes.
//!
//! A chain of `Scope`s linked by `parent`, each a name → Object map.
//! `Environment` tracks the current (innermost) scope and a distinguished
//! universe scope at the root holding predeclared identifiers. Scopes are
//! `Rc`-shared so that capturing an environment for a function literal
//! is a cheap pointer clone, not a deep copy —
//! mutations made through the captured handle are visible to every holder.

use crate::object::Object;
use gosym_ir::Name;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// Cheaply cloneable handle to a shared, mutable `T`.
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl<T> Clone for LocalScope<T> {
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalScope(@{:x})", self.id())
    }
}

#[derive(Eq, PartialEq, Debug)]
pub enum AssignError {
    /// No binding with this name exists anywhere in the chain.
    Undefined,
    /// The binding exists but is not a mutable `Variable` (a constant,
    /// function, type or package symbol).
    Immutable,
}

pub struct Scope {
    bindings: FxHashMap<Name, Object>,
    parent: Option<LocalScope<Scope>>,
}

impl Scope {
    fn new(parent: Option<LocalScope<Scope>>) -> Self {
        Scope {
            bindings: FxHashMap::default(),
            parent,
        }
    }

    fn define(&mut self, name: Name, value: Object) {
        self.bindings.insert(name, value);
    }

    fn lookup(&self, name: Name, visited: &mut FxHashSet<usize>) -> Option<Object> {
        if let Some(value) = self.bindings.get(&name) {
            return Some(value.clone());
        }
        let parent = self.parent.as_ref()?;
        if !visited.insert(parent.id()) {
            return None;
        }
        parent.borrow().lookup(name, visited)
    }

    fn assign(&mut self, name: Name, value: Object, visited: &mut FxHashSet<usize>) -> Result<(), AssignError> {
        if let Some(existing) = self.bindings.get(&name) {
            return match existing {
                Object::Variable(cell) => {
                    if !cell.borrow().mutable {
                        return Err(AssignError::Immutable);
                    }
                    cell.borrow_mut().value = value;
                    Ok(())
                }
                _ => Err(AssignError::Immutable),
            };
        }
        let Some(parent) = self.parent.as_ref() else {
            return Err(AssignError::Undefined);
        };
        if !visited.insert(parent.id()) {
            return Err(AssignError::Undefined);
        }
        parent.borrow_mut().assign(name, value, visited)
    }
}

/// A lexical environment: the current scope plus the shared universe root.
#[derive(Clone)]
pub struct Environment {
    current: LocalScope<Scope>,
    universe: LocalScope<Scope>,
}

impl Environment {
    /// Construct a fresh environment with an empty universe scope and one
    /// package/global scope nested directly beneath it.
    pub fn new() -> Self {
        let universe = LocalScope::new(Scope::new(None));
        let current = LocalScope::new(Scope::new(Some(universe.clone())));
        Environment { current, universe }
    }

    /// Push a fresh, empty scope enclosed by the current one.
    pub fn push_scope(&mut self) {
        let child = LocalScope::new(Scope::new(Some(self.current.clone())));
        self.current = child;
    }

    /// Pop back to the enclosing scope. No-op if already at the outermost
    /// non-universe scope (popping past that would expose the universe
    /// scope to direct mutation, which only `define_universe` should do).
    pub fn pop_scope(&mut self) {
        let parent = self.current.borrow().parent.clone();
        if let Some(parent) = parent {
            self.current = parent;
        }
    }

    /// A child environment one scope deeper than `self`, sharing the same
    /// chain otherwise. This is how `Apply` builds a function's call
    /// environment from its captured `def_env` and how
    /// block/if/for bodies get their own enclosed scope.
    pub fn child(&self) -> Environment {
        let mut env = self.clone();
        env.push_scope();
        env
    }

    /// Snapshot the current scope chain for a function literal to carry as
    /// its `def_env`. Environments are Rc-backed, so this is just
    /// a named alias for `clone` kept for readability at capture sites.
    pub fn capture(&self) -> Environment {
        self.clone()
    }

    /// Define (or shadow) a binding in the current scope.
    pub fn define(&self, name: Name, value: Object) {
        self.current.borrow_mut().define(name, value);
    }

    /// Define a binding directly in the universe scope (`true`, `false`,
    /// `len`, `append`, `make`, `new`, `panic`, and any host-supplied extra
    /// universe bindings from `InterpreterBuilder`).
    pub fn define_universe(&self, name: Name, value: Object) {
        self.universe.borrow_mut().define(name, value);
    }

    /// Walk the scope chain outward, then the universe scope, returning the
    /// first binding found. Cycle-safe: a visited-set of scope identities
    /// guarantees termination even over a malformed cyclic chain.
    pub fn get(&self, name: Name) -> Option<Object> {
        let mut visited = FxHashSet::default();
        visited.insert(self.current.id());
        if let Some(value) = self.current.borrow().lookup(name, &mut visited) {
            return Some(value);
        }
        let mut visited = FxHashSet::default();
        visited.insert(self.universe.id());
        self.universe.borrow().lookup(name, &mut visited)
    }

    /// Mutate the nearest existing binding. Does not fall through to the
    /// universe scope — predeclared identifiers are not reassignable.
    pub fn assign(&self, name: Name, value: Object) -> Result<(), AssignError> {
        let mut visited = FxHashSet::default();
        visited.insert(self.current.id());
        self.current.borrow_mut().assign(name, value, &mut visited)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment(current=@{:x})", self.current.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Object, VariableValue};
    use gosym_ir::StringInterner;
    use std::rc::Rc;

    fn var(name: Name, value: Object, mutable: bool) -> Object {
        Object::Variable(Rc::new(RefCell::new(VariableValue {
            name,
            value,
            static_type: None,
            possible_types: Vec::new(),
            mutable,
        })))
    }

    #[test]
    fn defines_and_looks_up_in_current_scope() {
        let interner = StringInterner::new();
        let env = Environment::new();
        let x = interner.intern("x");
        env.define(x, Object::Integer(1));
        assert!(matches!(env.get(x), Some(Object::Integer(1))));
    }

    #[test]
    fn inner_scope_shadows_outer() {
        let interner = StringInterner::new();
        let mut env = Environment::new();
        let x = interner.intern("x");
        env.define(x, Object::Integer(1));
        env.push_scope();
        env.define(x, Object::Integer(2));
        assert!(matches!(env.get(x), Some(Object::Integer(2))));
        env.pop_scope();
        assert!(matches!(env.get(x), Some(Object::Integer(1))));
    }

    #[test]
    fn universe_bindings_are_visible_but_not_assignable() {
        let interner = StringInterner::new();
        let env = Environment::new();
        let name = interner.intern("true");
        env.define_universe(name, Object::Boolean(true));
        assert!(matches!(env.get(name), Some(Object::Boolean(true))));
        let err = env.assign(name, Object::Boolean(false));
        assert_eq!(err, Err(AssignError::Undefined));
    }

    #[test]
    fn assign_mutates_variable_cell_in_place() {
        let interner = StringInterner::new();
        let env = Environment::new();
        let x = interner.intern("x");
        env.define(x, var(x, Object::Integer(1), true));
        env.assign(x, Object::Integer(9)).unwrap();
        match env.get(x) {
            Some(Object::Variable(cell)) => {
                assert!(matches!(cell.borrow().value, Object::Integer(9)));
            }
            other => panic!("expected Variable, got {other:?}"),
        }
    }

    #[test]
    fn assign_to_immutable_binding_errors() {
        let interner = StringInterner::new();
        let env = Environment::new();
        let k = interner.intern("K");
        env.define(k, Object::Integer(42));
        assert_eq!(env.assign(k, Object::Integer(43)), Err(AssignError::Immutable));
    }

    #[test]
    fn capture_shares_mutations_with_original() {
        let interner = StringInterner::new();
        let env = Environment::new();
        let x = interner.intern("x");
        env.define(x, Object::Integer(1));
        let captured = env.capture();
        env.define(x, Object::Integer(2));
        assert!(matches!(captured.get(x), Some(Object::Integer(2))));
    }

    #[test]
    fn child_env_does_not_leak_into_parent() {
        let interner = StringInterner::new();
        let env = Environment::new();
        let x = interner.intern("x");
        env.define(x, Object::Integer(1));
        let child = env.child();
        child.define(x, Object::Integer(99));
        assert!(matches!(env.get(x), Some(Object::Integer(1))));
        assert!(matches!(child.get(x), Some(Object::Integer(99))));
    }
}
