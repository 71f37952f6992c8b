//! Predeclared identifiers: `true`, `false`, and the
//! built-in functions `len`, `append`, `make`, `new`, `panic`.
//!
//! Built-ins are modeled as ordinary `Intrinsic` objects so `Apply` needs no
//! special case for them — they flow through the same dispatch path as a
//! host-registered intrinsic.

use crate::environment::Environment;
use crate::object::{IntrinsicValue, Object, StructValue, NIL};
use gosym_ir::StringInterner;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

fn builtin(name: &str, f: impl Fn(&mut crate::interpreter::Interpreter<'_>, Vec<Object>) -> Object + 'static) -> Object {
    Object::Intrinsic(Rc::new(IntrinsicValue {
        key_display: name.to_string(),
        handler: Rc::new(f),
    }))
}

/// Populate `env`'s universe scope with the predeclared identifiers. Called
/// once per interpreter at construction time.
pub fn install(env: &Environment, interner: &StringInterner) {
    env.define_universe(interner.intern("true"), Object::Boolean(true));
    env.define_universe(interner.intern("false"), Object::Boolean(false));
    env.define_universe(interner.intern("nil"), NIL);

    env.define_universe(interner.intern("len"), builtin("len", builtin_len));
    env.define_universe(interner.intern("append"), builtin("append", builtin_append));
    env.define_universe(interner.intern("make"), builtin("make", builtin_make));
    env.define_universe(interner.intern("new"), builtin("new", builtin_new));
    env.define_universe(interner.intern("panic"), builtin("panic", builtin_panic));
}

fn builtin_len(_interp: &mut crate::interpreter::Interpreter<'_>, args: Vec<Object>) -> Object {
    match args.first() {
        Some(Object::Str(s)) => Object::Integer(s.len() as i64),
        Some(Object::Array(elems, _) | Object::Slice(elems, _)) => Object::Integer(elems.borrow().len() as i64),
        Some(Object::Map(m, _)) => Object::Integer(m.borrow().len() as i64),
        Some(Object::SymbolicPlaceholder(_)) => Object::placeholder("len of symbolic value", None),
        _ => Object::Integer(0),
    }
}

fn builtin_append(_interp: &mut crate::interpreter::Interpreter<'_>, mut args: Vec<Object>) -> Object {
    if args.is_empty() {
        return Object::placeholder("append with no arguments", None);
    }
    let base = args.remove(0);
    match base {
        Object::Slice(elems, base_obj) => {
            let mut next: Vec<Object> = elems.borrow().clone();
            next.extend(args);
            Object::Slice(Rc::new(RefCell::new(next)), base_obj)
        }
        Object::SymbolicPlaceholder(_) => base,
        // A nil slice (the Go zero value) or any other non-slice argument in
        // first position still yields a usable slice rather than an error.
        _ => Object::Slice(Rc::new(RefCell::new(args)), crate::object::BaseObject::empty()),
    }
}

fn builtin_make(_interp: &mut crate::interpreter::Interpreter<'_>, args: Vec<Object>) -> Object {
    // `make` is always called with a type argument the caller has already
    // reduced to a placeholder/TypeRef; without constraint solving there is
    // no concrete length to honor, so produce an empty concrete collection
    // when the shape is known, else a typed placeholder.
    match args.first() {
        Some(Object::TypeRef(ty)) => match ty.kind {
            gosym_ir::TypeKind::Map => Object::Map(Rc::new(RefCell::new(FxHashMap::default())), crate::object::BaseObject::typed(ty.clone())),
            _ => Object::Slice(Rc::new(RefCell::new(Vec::new())), crate::object::BaseObject::typed(ty.clone())),
        },
        _ => Object::Slice(Rc::new(RefCell::new(Vec::new())), crate::object::BaseObject::empty()),
    }
}

fn builtin_new(_interp: &mut crate::interpreter::Interpreter<'_>, args: Vec<Object>) -> Object {
    match args.first() {
        Some(Object::TypeRef(ty)) if ty.struct_info.is_some() => {
            let value = Object::Struct(Rc::new(RefCell::new(StructValue {
                type_name: ty.name,
                fields: FxHashMap::default(),
                base: crate::object::BaseObject::typed(ty.clone()),
            })));
            Object::Pointer(Rc::new(RefCell::new(value)), crate::object::BaseObject::typed(ty.clone()))
        }
        Some(Object::TypeRef(ty)) => Object::Pointer(
            Rc::new(RefCell::new(Object::placeholder("zero value", Some(ty.clone())))),
            crate::object::BaseObject::typed(ty.clone()),
        ),
        _ => Object::Pointer(Rc::new(RefCell::new(NIL)), crate::object::BaseObject::empty()),
    }
}

/// `panic(v)` is a side effect this evaluator never actually performs; it
/// observes the call (so any intrinsic reached while evaluating `v` is
/// still recorded) but does not abort the run — it surfaces as a typed
/// placeholder, the same way a nil-function call does, so analysis keeps
/// going rather than unwinding.
fn builtin_panic(_interp: &mut crate::interpreter::Interpreter<'_>, _args: Vec<Object>) -> Object {
    Object::placeholder("panic", None)
}
