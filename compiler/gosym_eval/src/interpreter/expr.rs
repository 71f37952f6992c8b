//! Expression evaluation.
//!
//! Every arm here returns a plain `Object` — `Object::Error` carries failure
//! the same way `Break`/`Continue`/`ReturnValue` carry control flow, so a
//! caller composing sub-expressions only needs to check `is_error()` at the
//! points where propagating early actually matters (binary/index/call
//! operands).

use super::method_dispatch::{resolve_on_interface, resolve_on_symbolic, resolve_on_value};
use super::{internal_error, to_object, Interpreter};
use crate::object::{BaseObject, Object, ObjectKey, StructValue};
use gosym_diagnostic::{division_by_zero, index_out_of_bounds, unknown_identifier};
use gosym_ir::{BinaryOp, ExprId, ExprKind, UnaryOp};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

pub(super) fn eval_expr(interp: &mut Interpreter<'_>, id: ExprId) -> Object {
    let expr = interp.current_arena.expr(id).clone();
    match expr.kind {
        ExprKind::Ident(name) => eval_ident(interp, name),
        ExprKind::IntLit(n) => Object::Integer(n),
        ExprKind::StringLit(name) => Object::Str(Rc::new(interp.interner.lookup(name))),
        ExprKind::BoolLit(b) => Object::bool_value(b),
        ExprKind::NilLit => Object::Nil,

        ExprKind::Binary { op, left, right } => eval_binary(interp, op, left, right),
        ExprKind::Unary { op, expr } => eval_unary(interp, op, expr),
        ExprKind::Selector { expr, sel } => eval_selector(interp, expr, sel),
        ExprKind::Index { expr, index } => eval_index(interp, expr, index),
        ExprKind::SliceExpr { expr, low, high } => eval_slice(interp, expr, low, high),
        ExprKind::Call { func, args, ellipsis } => eval_call(interp, func, &args, ellipsis),
        ExprKind::IndexList { expr, type_args } => super::generics::eval_explicit_instantiation(interp, expr, &type_args),
        ExprKind::CompositeLit { type_expr, elements } => eval_composite_lit(interp, type_expr, &elements),
        ExprKind::KeyValue { key, value } => {
            // Only reachable when evaluated directly (outside a composite
            // literal's own element loop); surface both sides as a pair.
            let k = interp.eval(key);
            let v = interp.eval(value);
            if k.is_error() {
                return k;
            }
            if v.is_error() {
                return v;
            }
            Object::MultiReturn(vec![k, v])
        }
        ExprKind::TypeAssert { expr, ty } => eval_type_assert(interp, expr, ty),
        ExprKind::FuncLit { decl } => eval_func_lit(interp, decl),
        ExprKind::Paren(inner) => interp.eval(inner),

        // Type expressions evaluate to a `TypeRef` when the name resolves in
        // the current environment/package, else an unresolved placeholder
        // type — callers (`make`/`new`/composite literals/type asserts) read
        // the TypeInfo off whichever shape comes back.
        ExprKind::ArrayType { elem, .. } | ExprKind::SliceType { elem } | ExprKind::PointerType { elem } => interp.eval(elem),
        ExprKind::MapType { value, .. } => interp.eval(value),
        ExprKind::InterfaceType { .. } | ExprKind::StructType { .. } | ExprKind::UnionType { .. } => {
            Object::placeholder("inline type expression", None)
        }
    }
}

fn eval_ident(interp: &mut Interpreter<'_>, name: gosym_ir::Name) -> Object {
    if let Some(value) = interp.env.get(name) {
        return value;
    }
    let pkg = interp.resolver.resolve_package(&interp.interner.lookup(interp.current_pkg));
    if let Some(value) = interp.resolver.package_member(&pkg, name) {
        return value;
    }
    to_object(interp, Err(unknown_identifier(&interp.interner.lookup(name), None)))
}

fn eval_selector(interp: &mut Interpreter<'_>, expr_id: ExprId, sel: gosym_ir::Name) -> Object {
    let base = interp.eval(expr_id);
    if base.is_error() {
        return base;
    }
    let sel_display = interp.interner.lookup(sel);

    match &base {
        Object::Package(_) => {
            let pkg_obj = base.clone();
            if let Err(err) = interp.resolver.ensure_loaded(&pkg_obj, &interp.intrinsics) {
                return to_object(interp, Err(err));
            }
            match interp.resolver.package_member(&pkg_obj, sel) {
                Some(value) => value,
                None => to_object(interp, Err(unknown_identifier(&format!("{}.{}", interp.interner.lookup(interp.current_pkg), sel_display), None))),
            }
        }
        Object::Variable(cell) => {
            let static_type = cell.borrow().static_type.clone();
            let current = cell.borrow().value.clone();
            if let Some(ty) = &static_type {
                if ty.interface_info.is_some() {
                    return resolve_on_interface(interp, ty, sel, &sel_display);
                }
            }
            match &current {
                Object::Struct(_) | Object::Pointer(..) => to_object(interp, resolve_on_value(interp, current.clone(), sel, &sel_display)),
                // A named (possibly unresolved) type whose current value is
                // still symbolic: the declared static type, if any, is more
                // specific than whatever type the placeholder itself carries.
                Object::SymbolicPlaceholder(p) => match static_type.or_else(|| p.base.type_info.clone()) {
                    Some(ty) => to_object(interp, resolve_on_symbolic(interp, &ty, sel, &sel_display)),
                    None => Object::placeholder(format!("selector {sel_display} on symbolic value"), None),
                },
                _ => to_object(interp, resolve_on_value(interp, current.clone(), sel, &sel_display)),
            }
        }
        Object::Struct(_) | Object::Pointer(..) => {
            let result = resolve_on_value(interp, base, sel, &sel_display);
            to_object(interp, result)
        }
        Object::SymbolicPlaceholder(p) => {
            let ty = p.base.type_info.clone();
            match &ty {
                Some(ty) if ty.interface_info.is_some() => resolve_on_interface(interp, ty, sel, &sel_display),
                Some(ty) => {
                    let result = resolve_on_symbolic(interp, ty, sel, &sel_display);
                    to_object(interp, result)
                }
                None => Object::placeholder(format!("selector {sel_display} on symbolic value"), None),
            }
        }
        other => {
            let mut err = gosym_diagnostic::not_a_struct(None);
            err.message = format!("cannot select {sel_display} on {}", other.type_name());
            to_object(interp, Err(err))
        }
    }
}

fn eval_unary(interp: &mut Interpreter<'_>, op: UnaryOp, expr_id: ExprId) -> Object {
    let value = interp.eval(expr_id);
    if value.is_error() {
        return value;
    }
    match op {
        UnaryOp::Addr => {
            let base = BaseObject {
                type_info: value.concrete_type_info(),
                field_type: None,
            };
            Object::Pointer(Rc::new(RefCell::new(value)), base)
        }
        UnaryOp::Deref => match value {
            Object::Pointer(inner, base) => {
                let pointee = inner.borrow().clone();
                if pointee.is_nil() {
                    return to_object(interp, Err(gosym_diagnostic::nil_pointer_dereference(None)));
                }
                let _ = base;
                pointee
            }
            Object::SymbolicPlaceholder(p) => Object::placeholder("dereference of symbolic pointer", p.base.type_info.clone()),
            Object::Nil => to_object(interp, Err(gosym_diagnostic::nil_pointer_dereference(None))),
            other => internal_error(format!("dereference of non-pointer {}", other.type_name())),
        },
        UnaryOp::Neg => match value {
            Object::Integer(n) => Object::Integer(n.wrapping_neg()),
            Object::SymbolicPlaceholder(_) => value,
            _ => Object::placeholder("negation of non-integer", None),
        },
        UnaryOp::Plus => value,
        UnaryOp::Not => match value {
            Object::Boolean(b) => Object::bool_value(!b),
            Object::SymbolicPlaceholder(_) => value,
            _ => Object::placeholder("logical not of non-boolean", None),
        },
        UnaryOp::Complement => match value {
            Object::Integer(n) => Object::Integer(!n),
            Object::SymbolicPlaceholder(_) => value,
            _ => Object::placeholder("complement of non-integer", None),
        },
    }
}

fn eval_binary(interp: &mut Interpreter<'_>, op: BinaryOp, left_id: ExprId, right_id: ExprId) -> Object {
    let left = interp.eval(left_id);
    if left.is_error() {
        return left;
    }
    let right = interp.eval(right_id);
    if right.is_error() {
        return right;
    }

    match (&left, &right) {
        (Object::Integer(a), Object::Integer(b)) => eval_integer_binary(interp, op, *a, *b),
        (Object::Str(a), Object::Str(b)) if op == BinaryOp::Add => Object::Str(Rc::new(format!("{a}{b}"))),
        (Object::Str(a), Object::Str(b)) => eval_comparison(op, a == b).unwrap_or_else(|| Object::placeholder("string comparison", None)),
        (Object::Boolean(a), Object::Boolean(b)) => match op {
            BinaryOp::Land => Object::bool_value(*a && *b),
            BinaryOp::Lor => Object::bool_value(*a || *b),
            BinaryOp::Eq => Object::bool_value(a == b),
            BinaryOp::Ne => Object::bool_value(a != b),
            _ => Object::placeholder("boolean operator", None),
        },
        (Object::Nil, Object::Nil) => match op {
            BinaryOp::Eq => Object::bool_value(true),
            BinaryOp::Ne => Object::bool_value(false),
            _ => Object::placeholder("nil operator", None),
        },
        _ => Object::placeholder("symbolic binary result", None),
    }
}

fn eval_integer_binary(interp: &mut Interpreter<'_>, op: BinaryOp, a: i64, b: i64) -> Object {
    match op {
        BinaryOp::Add => Object::Integer(a.wrapping_add(b)),
        BinaryOp::Sub => Object::Integer(a.wrapping_sub(b)),
        BinaryOp::Mul => Object::Integer(a.wrapping_mul(b)),
        BinaryOp::Quo => {
            if b == 0 {
                return to_object(interp, Err(division_by_zero(None)));
            }
            Object::Integer(a.wrapping_div(b))
        }
        BinaryOp::Rem => {
            if b == 0 {
                return to_object(interp, Err(division_by_zero(None)));
            }
            Object::Integer(a.wrapping_rem(b))
        }
        BinaryOp::And => Object::Integer(a & b),
        BinaryOp::Or => Object::Integer(a | b),
        BinaryOp::Xor => Object::Integer(a ^ b),
        BinaryOp::Shl => Object::Integer(a.wrapping_shl(b as u32)),
        BinaryOp::Shr => Object::Integer(a.wrapping_shr(b as u32)),
        BinaryOp::Eq => Object::bool_value(a == b),
        BinaryOp::Ne => Object::bool_value(a != b),
        BinaryOp::Lt => Object::bool_value(a < b),
        BinaryOp::Le => Object::bool_value(a <= b),
        BinaryOp::Gt => Object::bool_value(a > b),
        BinaryOp::Ge => Object::bool_value(a >= b),
        BinaryOp::Land | BinaryOp::Lor => Object::placeholder("logical operator on integers", None),
    }
}

fn eval_comparison(op: BinaryOp, equal: bool) -> Option<Object> {
    match op {
        BinaryOp::Eq => Some(Object::bool_value(equal)),
        BinaryOp::Ne => Some(Object::bool_value(!equal)),
        _ => None,
    }
}

fn eval_index(interp: &mut Interpreter<'_>, expr_id: ExprId, index_id: ExprId) -> Object {
    let base = interp.eval(expr_id);
    if base.is_error() {
        return base;
    }
    let index = interp.eval(index_id);
    if index.is_error() {
        return index;
    }

    match (&base, &index) {
        (Object::Array(elems, _) | Object::Slice(elems, _), Object::Integer(i)) => {
            let elems = elems.borrow();
            match usize::try_from(*i).ok().and_then(|i| elems.get(i)) {
                Some(value) => value.clone(),
                None => to_object(interp, Err(index_out_of_bounds(*i, elems.len(), None))),
            }
        }
        (Object::Map(map, base_obj), key) => {
            let Some(key) = to_map_key(key) else {
                return Object::placeholder("symbolic map lookup", base_obj.type_info.clone());
            };
            map.borrow().get(&key).cloned().unwrap_or(Object::Nil)
        }
        (Object::SymbolicPlaceholder(_), _) | (_, Object::SymbolicPlaceholder(_)) => Object::placeholder("symbolic index", None),
        _ => Object::placeholder("index of non-indexable value", None),
    }
}

pub(super) fn to_map_key(obj: &Object) -> Option<ObjectKey> {
    match obj {
        Object::Integer(n) => Some(ObjectKey::Integer(*n)),
        Object::Str(s) => Some(ObjectKey::Str((**s).clone())),
        Object::Boolean(b) => Some(ObjectKey::Boolean(*b)),
        Object::SymbolicPlaceholder(_) => Some(ObjectKey::Symbolic),
        _ => None,
    }
}

fn eval_slice(interp: &mut Interpreter<'_>, expr_id: ExprId, low: Option<ExprId>, high: Option<ExprId>) -> Object {
    let base = interp.eval(expr_id);
    if base.is_error() {
        return base;
    }
    let low_value = low.map(|id| interp.eval(id));
    if let Some(low_value) = &low_value {
        if low_value.is_error() {
            return low_value.clone();
        }
    }
    let high_value = high.map(|id| interp.eval(id));
    if let Some(high_value) = &high_value {
        if high_value.is_error() {
            return high_value.clone();
        }
    }

    let (Object::Array(elems, base_obj) | Object::Slice(elems, base_obj)) = &base else {
        return Object::placeholder("slice of non-sliceable value", None);
    };
    let elems = elems.borrow();
    let low = match low_value {
        Some(Object::Integer(n)) => n as usize,
        Some(_) => return Object::placeholder("symbolic slice bound", base_obj.type_info.clone()),
        None => 0,
    };
    let high = match high_value {
        Some(Object::Integer(n)) => n as usize,
        Some(_) => return Object::placeholder("symbolic slice bound", base_obj.type_info.clone()),
        None => elems.len(),
    };
    if low > high || high > elems.len() {
        return to_object(interp, Err(index_out_of_bounds(high as i64, elems.len(), None)));
    }
    Object::Slice(Rc::new(RefCell::new(elems[low..high].to_vec())), base_obj.clone())
}

fn eval_call(interp: &mut Interpreter<'_>, func_id: ExprId, arg_ids: &[ExprId], ellipsis: bool) -> Object {
    let func = interp.eval(func_id);
    if func.is_error() {
        return func;
    }

    let mut args = Vec::with_capacity(arg_ids.len());
    for &arg_id in arg_ids {
        let value = interp.eval(arg_id);
        if value.is_error() {
            return value;
        }
        args.push(value);
    }

    if ellipsis {
        if let Some(Object::Slice(elems, _) | Object::Array(elems, _)) = args.pop() {
            args.extend(elems.borrow().iter().cloned());
        }
    }

    interp.apply(func, args)
}

fn eval_composite_lit(interp: &mut Interpreter<'_>, type_expr: Option<ExprId>, elements: &[ExprId]) -> Object {
    let type_info = type_expr.and_then(|id| match interp.eval(id) {
        Object::TypeRef(ty) => Some(ty),
        _ => None,
    });

    if let Some(ty) = type_info.clone().filter(|ty| ty.struct_info.is_some()) {
        let field_names: Vec<gosym_ir::Name> = ty.struct_info.as_ref().map(|s| s.fields.iter().map(|f| f.name).collect()).unwrap_or_default();
        let mut fields = FxHashMap::default();
        for (i, &el) in elements.iter().enumerate() {
            // `Field: value` elements carry the field name as the key
            // expression's own identifier, read directly from the arena
            // rather than evaluated as a variable lookup.
            if let ExprKind::KeyValue { key, value } = &interp.current_arena.expr(el).kind {
                let ExprKind::Ident(name) = interp.current_arena.expr(*key).kind else {
                    continue;
                };
                let value = interp.eval(*value);
                if value.is_error() {
                    return value;
                }
                fields.insert(name, value);
            } else {
                let value = interp.eval(el);
                if value.is_error() {
                    return value;
                }
                if let Some(&name) = field_names.get(i) {
                    fields.insert(name, value);
                }
            }
        }
        return Object::Struct(Rc::new(RefCell::new(StructValue {
            type_name: ty.name,
            fields,
            base: BaseObject::typed(ty),
        })));
    }

    if let Some(ty) = type_info.clone().filter(|ty| ty.kind == gosym_ir::TypeKind::Map) {
        let mut map = crate::object::ObjectMap::default();
        for &el in elements {
            let ExprKind::KeyValue { key, value } = &interp.current_arena.expr(el).kind else {
                continue;
            };
            let key_value = interp.eval(*key);
            if key_value.is_error() {
                return key_value;
            }
            let value_value = interp.eval(*value);
            if value_value.is_error() {
                return value_value;
            }
            if let Some(k) = to_map_key(&key_value) {
                map.insert(k, value_value);
            }
        }
        return Object::Map(Rc::new(RefCell::new(map)), BaseObject::typed(ty));
    }

    let mut values = Vec::with_capacity(elements.len());
    for &el in elements {
        let value = interp.eval(el);
        if value.is_error() {
            return value;
        }
        values.push(value);
    }
    match type_info {
        Some(ty) => Object::Slice(Rc::new(RefCell::new(values)), BaseObject::typed(ty)),
        None => Object::Slice(Rc::new(RefCell::new(values)), BaseObject::empty()),
    }
}

fn eval_type_assert(interp: &mut Interpreter<'_>, expr_id: ExprId, ty: Option<ExprId>) -> Object {
    let value = interp.eval(expr_id);
    if value.is_error() {
        return value;
    }
    let Some(ty_id) = ty else {
        // `x.(type)` guard form: handled by the type-switch statement, which
        // reads the value directly rather than calling through here.
        return value;
    };
    let target = interp.eval(ty_id);
    let Object::TypeRef(target_ty) = target else {
        return Object::placeholder("type assertion against unresolved type", None);
    };

    if let Some(concrete) = value.concrete_type_info() {
        if concrete.name == target_ty.name && concrete.pkg_path == target_ty.pkg_path {
            return value;
        }
    }
    if let Object::Variable(cell) = &value {
        cell.borrow_mut().observe_concrete_type(target_ty.clone());
    }
    Object::placeholder("narrowed by type assertion", Some(target_ty))
}

fn eval_func_lit(interp: &mut Interpreter<'_>, decl: gosym_ir::FuncId) -> Object {
    let func = interp.current_arena.func(decl);
    let info = gosym_ir::FunctionInfo {
        name: func.name,
        pkg_path: interp.current_pkg,
        recv: None,
        type_params: func.type_params.clone(),
        params: func
            .params
            .iter()
            .map(|p| gosym_ir::FieldType::simple(p.name.unwrap_or(gosym_ir::Name::EMPTY)))
            .collect(),
        results: func
            .results
            .iter()
            .map(|p| gosym_ir::FieldType::simple(p.name.unwrap_or(gosym_ir::Name::EMPTY)))
            .collect(),
        is_variadic: func.is_variadic,
        body: func.body.map(|_| gosym_ir::FuncBody {
            arena: interp.current_arena.clone(),
            func: decl,
        }),
    };
    crate::function::build_function_object(&info, &interp.env, interp.current_pkg)
}
