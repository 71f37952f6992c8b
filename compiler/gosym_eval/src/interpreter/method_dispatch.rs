//! Field/method selector resolution on struct, pointer and interface-typed
//! values.

use super::Interpreter;
use crate::object::{BoundMethodValue, Object};
use gosym_diagnostic::{not_a_struct, unknown_field, Error};
use gosym_ir::{Name, TypeInfo};
use gosym_patterns::{resolve_selector, SelectorHit};
use std::rc::Rc;
use std::sync::Arc;

/// Resolve `receiver.sel` against a struct/pointer-to-struct value, walking
/// embedded fields/methods. Returns the field's current value or a
/// `BoundMethod` wrapping the receiver.
pub(super) fn resolve_on_value(interp: &mut Interpreter<'_>, receiver: Object, sel: Name, sel_display: &str) -> Result<Object, Error> {
    let (struct_cell, ty, pointee_is_addr) = match &receiver {
        Object::Struct(cell) => (cell.clone(), cell.borrow().base.type_info.clone(), false),
        Object::Pointer(inner, _base) => match &*inner.borrow() {
            Object::Struct(cell) => (cell.clone(), cell.borrow().base.type_info.clone(), true),
            _ => {
                let mut err = not_a_struct(None);
                err.message = format!("cannot select {sel_display} on non-struct pointee");
                return Err(err);
            }
        },
        _ => return Err(not_a_struct(None)),
    };
    let _ = pointee_is_addr;

    let Some(ty) = ty else {
        // Shallow/unknown struct shape: treat the selector as a method
        // reachable on an unresolved type rather than failing outright.
        return Ok(Object::placeholder(format!("selector {sel_display} on unresolved struct"), None));
    };

    match resolve_selector(&ty, sel, sel_display, interp.resolver.as_ref())? {
        Some(SelectorHit::Field(field)) => {
            let value = struct_cell.borrow().fields.get(&field.name).cloned();
            Ok(value.unwrap_or_else(|| Object::placeholder("zero value", field.field_type.resolved.clone())))
        }
        Some(SelectorHit::Method(info)) => {
            let (decl, is_pointer) = interp
                .resolver
                .find_method(ty.pkg_path, ty.name, sel)
                .unwrap_or((Arc::new(info), false));
            let callee = method_callee(interp, ty.pkg_path, ty.name, &decl, is_pointer);
            Ok(Object::BoundMethod(Rc::new(BoundMethodValue { receiver, callee })))
        }
        None => Err(unknown_field(&interp.interner.lookup(ty.name), sel_display, None)),
    }
}

/// Resolve a selector on a `SymbolicPlaceholder`'s known (possibly
/// unresolved) concrete type: the placeholder has no
/// field storage, but its type may still carry a declared method — one the
/// owning package's scan surfaced even though the package itself was never
/// deeply parsed (shallow scan) or an intrinsic the host registered directly
/// against it. Either way the result is a *callable* typed by that method's
/// declared signature, not an opaque untyped placeholder.
pub(super) fn resolve_on_symbolic(interp: &mut Interpreter<'_>, ty: &TypeInfo, sel: Name, sel_display: &str) -> Result<Object, Error> {
    match resolve_selector(ty, sel, sel_display, interp.resolver.as_ref())? {
        Some(SelectorHit::Field(field)) => Ok(Object::placeholder("zero value", field.field_type.resolved.clone())),
        Some(SelectorHit::Method(info)) => {
            let (decl, is_pointer) = interp.resolver.find_method(ty.pkg_path, ty.name, sel).unwrap_or((Arc::new(info), false));
            Ok(method_callee(interp, ty.pkg_path, ty.name, &decl, is_pointer))
        }
        None => Ok(Object::placeholder(format!("selector {sel_display} on symbolic value"), None)),
    }
}

/// Resolve a selector on an interface-typed `Variable`: if the interface is bound to a concrete type, dispatch
/// there; otherwise return a placeholder callable typed by the method's
/// declared signature.
pub(super) fn resolve_on_interface(interp: &mut Interpreter<'_>, iface: &TypeInfo, sel: Name, sel_display: &str) -> Object {
    use crate::interface_binding::TypePath;

    let iface_path = TypePath::new(iface.pkg_path, iface.name);
    if let Some(concrete) = interp.bindings.resolve(iface_path) {
        if let Some((decl, is_pointer)) = interp.resolver.find_method(concrete.pkg_path, concrete.type_name, sel) {
            let callee = method_callee(interp, concrete.pkg_path, concrete.type_name, &decl, is_pointer);
            // The receiver is not materialized here: the caller (selector
            // evaluation) supplies it from the variable's current value.
            return callee;
        }
    }

    let declared = iface
        .interface_info
        .as_ref()
        .and_then(|info| info.methods.iter().find(|m| m.name == sel));
    match declared {
        Some(m) => Object::placeholder(
            format!("unbound interface method {sel_display}"),
            m.results.first().and_then(|r| r.resolved.clone()),
        ),
        None => Object::placeholder(format!("unbound interface method {sel_display}"), None),
    }
}

fn method_callee(interp: &mut Interpreter<'_>, pkg_path: Name, type_name: Name, info: &gosym_ir::FunctionInfo, is_pointer: bool) -> Object {
    use gosym_patterns::{MethodKey, Receiver};

    let key = MethodKey::method(pkg_path, type_name, info.name, if is_pointer { Receiver::Pointer } else { Receiver::Value });
    if let Some(handler) = interp.intrinsics.get(&key) {
        return Object::Intrinsic(handler);
    }
    let def_env = interp.resolver.package_env(pkg_path);
    crate::function::build_function_object(info, &def_env, pkg_path)
}
