//! `InterpreterBuilder`: scan-policy predicate lives on the `Resolver` the
//! caller hands in, so this builder covers the remaining options:
//! memoization, recursion depth, and extra universe bindings.

use super::Interpreter;
use crate::environment::Environment;
use crate::interface_binding::InterfaceBindingTable;
use crate::intrinsics::IntrinsicRegistry;
use crate::object::Object;
use crate::resolver::Resolver;
use crate::universe;
use gosym_diagnostic::CallStack;
use gosym_ir::{Arena, Name, StringInterner};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

pub struct InterpreterBuilder<'a> {
    interner: &'a StringInterner,
    resolver: Rc<Resolver>,
    extra_universe: Vec<(Name, Object)>,
    max_depth: Option<usize>,
    memoize: bool,
}

impl<'a> InterpreterBuilder<'a> {
    pub fn new(interner: &'a StringInterner, resolver: Rc<Resolver>) -> Self {
        InterpreterBuilder {
            interner,
            resolver,
            extra_universe: Vec::new(),
            max_depth: None,
            memoize: false,
        }
    }

    /// Bound the live `Apply` recursion depth: exceeding it
    /// returns a typed placeholder instead of risking a native stack
    /// overflow on a pathologically self-recursive analyzed program.
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Turn on function-level memoization. Off by default:
    /// memoization trades coverage (a helper called from two call sites
    /// runs its body once, not twice) for performance, so hosts opt in.
    #[must_use]
    pub fn memoize(mut self, on: bool) -> Self {
        self.memoize = on;
        self
    }

    /// Add a host-supplied extra universe binding.
    #[must_use]
    pub fn extra_universe(mut self, name: Name, value: Object) -> Self {
        self.extra_universe.push((name, value));
        self
    }

    pub fn build(self) -> Interpreter<'a> {
        let env = Environment::new();
        universe::install(&env, self.interner);
        for (name, value) in &self.extra_universe {
            env.define_universe(*name, value.clone());
        }

        Interpreter {
            interner: self.interner,
            env,
            resolver: self.resolver,
            intrinsics: IntrinsicRegistry::new(),
            bindings: InterfaceBindingTable::new(),
            call_stack: CallStack::new(self.max_depth),
            current_pkg: Name::EMPTY,
            current_arena: Arc::new(Arena::new()),
            memo: if self.memoize {
                Some(RefCell::new(rustc_hash::FxHashMap::default()))
            } else {
                None
            },
        }
    }
}
