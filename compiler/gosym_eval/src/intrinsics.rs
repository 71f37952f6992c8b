//! Stack of name-keyed intrinsic handler maps.
//!
//! `register` installs a permanent handler reachable for the whole run;
//! `push`/`pop` install a scoped overlay, e.g. while analyzing one HTTP
//! handler body with request-specific stubs. Lookup walks the stack
//! top-down so the innermost (most recently pushed) scope wins.

use crate::object::IntrinsicValue;
use gosym_patterns::MethodKey;
use rustc_hash::FxHashMap;
use std::rc::Rc;

pub type IntrinsicMap = FxHashMap<MethodKey, Rc<IntrinsicValue>>;

pub struct IntrinsicRegistry {
    /// `stack[0]` holds permanently registered handlers; `stack[1..]` are
    /// scoped overlays pushed and popped in LIFO order.
    stack: Vec<IntrinsicMap>,
}

impl IntrinsicRegistry {
    pub fn new() -> Self {
        IntrinsicRegistry {
            stack: vec![FxHashMap::default()],
        }
    }

    pub fn register(&mut self, key: MethodKey, handler: Rc<IntrinsicValue>) {
        self.stack[0].insert(key, handler);
    }

    pub fn push(&mut self, map: IntrinsicMap) {
        self.stack.push(map);
    }

    /// Pop the most recently pushed scoped overlay.
    ///
    /// # Panics
    /// In debug builds, panics if only the permanent base map remains —
    /// every `push` must be matched by exactly one `pop`, including on
    /// error/panic unwind paths.
    pub fn pop(&mut self) {
        debug_assert!(self.stack.len() > 1, "intrinsic registry underflow");
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    pub fn get(&self, key: &MethodKey) -> Option<Rc<IntrinsicValue>> {
        self.stack.iter().rev().find_map(|map| map.get(key).cloned())
    }

    /// Depth of the scope stack, including the permanent base map. Used by
    /// tests to verify push/pop balance.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Default for IntrinsicRegistry {
    fn default() -> Self {
        IntrinsicRegistry::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gosym_ir::StringInterner;
    use gosym_patterns::Receiver;

    fn handler(interner: &StringInterner, label: &str) -> Rc<IntrinsicValue> {
        let label = label.to_string();
        Rc::new(IntrinsicValue {
            key_display: label.clone(),
            handler: Rc::new(move |_interp, _args| crate::object::Object::Str(Rc::new(label.clone()))),
        })
    }

    #[test]
    fn registered_handler_is_found() {
        let interner = StringInterner::new();
        let mut registry = IntrinsicRegistry::new();
        let key = MethodKey::function(interner.intern("fmt"), interner.intern("Sprintf"));
        registry.register(key, handler(&interner, "base"));
        assert!(registry.get(&key).is_some());
    }

    #[test]
    fn innermost_push_wins_over_permanent_registration() {
        let interner = StringInterner::new();
        let mut registry = IntrinsicRegistry::new();
        let key = MethodKey::function(interner.intern("pkg"), interner.intern("Foo"));
        registry.register(key, handler(&interner, "permanent"));

        let mut overlay = FxHashMap::default();
        overlay.insert(key, handler(&interner, "scoped"));
        registry.push(overlay);

        let found = registry.get(&key).unwrap();
        assert_eq!(found.key_display, "scoped");
        registry.pop();
        let found = registry.get(&key).unwrap();
        assert_eq!(found.key_display, "permanent");
    }

    #[test]
    fn push_pop_is_balanced() {
        let interner = StringInterner::new();
        let mut registry = IntrinsicRegistry::new();
        let depth_before = registry.depth();
        registry.push(FxHashMap::default());
        registry.push(FxHashMap::default());
        registry.pop();
        registry.pop();
        assert_eq!(registry.depth(), depth_before);
        let _ = Receiver::Value; // exercise the re-export used by callers of this module
    }
}
