//! Statement evaluation.
//!
//! Every statement returns `NIL` on ordinary fallthrough, or one of
//! `ReturnValue`/`Break`/`Continue`/`Error` when control flow needs to
//! propagate past it. `exec_block` is the one place that actually stops a
//! sequence of statements at the first such signal.

use super::{to_object, Interpreter};
use crate::environment::AssignError;
use crate::object::Object;
use gosym_diagnostic::{non_boolean_condition, not_a_struct, unknown_field};
use gosym_ir::{AssignOp, BinaryOp, ExprId, ExprKind, Name, StmtId, StmtKind};
use std::rc::Rc;

pub(super) fn exec_stmt(interp: &mut Interpreter<'_>, id: StmtId) -> Object {
    let stmt = interp.current_arena.stmt(id).clone();
    match stmt.kind {
        StmtKind::ExprStmt(expr) => {
            let value = interp.eval(expr);
            if value.is_error() {
                value
            } else {
                Object::Nil
            }
        }
        StmtKind::AssignStmt { lhs, rhs, op } => exec_assign(interp, &lhs, &rhs, op),
        StmtKind::VarDecl { names, type_expr, values } => exec_decl(interp, &names, type_expr, &values, true),
        StmtKind::ConstDecl { names, type_expr, values } => exec_decl(interp, &names, type_expr, &values, false),
        StmtKind::ReturnStmt { results } => exec_return(interp, &results),
        StmtKind::IfStmt { init, cond, then_block, else_stmt } => exec_if(interp, init, cond, then_block, else_stmt),
        StmtKind::ForStmt { init, cond, post, body } => exec_for(interp, init, cond, post, body),
        StmtKind::RangeStmt { key, value, define, x, body } => exec_range(interp, key, value, define, x, body),
        StmtKind::SwitchStmt { init, tag, cases } => exec_switch(interp, init, tag, &cases),
        StmtKind::TypeSwitchStmt { init, bind, x, cases } => exec_type_switch(interp, init, bind, x, &cases),
        StmtKind::BranchStmt { kind, label } => match kind {
            gosym_ir::BranchKind::Break => Object::Break(label),
            gosym_ir::BranchKind::Continue => Object::Continue(label),
        },
        StmtKind::BlockStmt { stmts } => interp.exec_block_enclosed(&stmts),
        StmtKind::LabeledStmt { stmt, .. } => interp.exec_stmt(stmt),
    }
}

/// Run `stmts` in the current scope (caller is responsible for push/pop),
/// stopping at the first `Error`/`ReturnValue`/`Break`/`Continue`.
pub(super) fn exec_block(interp: &mut Interpreter<'_>, stmts: &[StmtId]) -> Object {
    for &stmt in stmts {
        let result = interp.exec_stmt(stmt);
        if result.is_control_flow() {
            return result;
        }
    }
    Object::Nil
}

fn exec_decl(interp: &mut Interpreter<'_>, names: &[Name], type_expr: Option<ExprId>, values: &[ExprId], mutable: bool) -> Object {
    let declared_type = type_expr.and_then(|id| match interp.eval(id) {
        Object::TypeRef(ty) => Some(ty),
        _ => None,
    });

    let mut evaluated = Vec::with_capacity(values.len());
    for &value_id in values {
        let value = unwrap_return(interp.eval(value_id));
        if value.is_error() {
            return value;
        }
        evaluated.push(value);
    }

    // Multi-value RHS from a single call (`a, b := f()`).
    if evaluated.len() == 1 && names.len() > 1 {
        if let Object::MultiReturn(parts) = evaluated.remove(0) {
            evaluated = parts;
        } else {
            evaluated = Vec::new();
        }
    }

    for (i, &name) in names.iter().enumerate() {
        if name == Name::EMPTY {
            continue; // `_`
        }
        let value = evaluated.get(i).cloned().unwrap_or(Object::Nil);
        if let Some(concrete) = value.concrete_type_info() {
            if let Some(declared) = &declared_type {
                if declared.interface_info.is_some() {
                    interp.env.define(name, Object::new_variable(name, value, declared_type.clone(), mutable));
                    if let Some(Object::Variable(cell)) = interp.env.get(name) {
                        cell.borrow_mut().observe_concrete_type(concrete);
                    }
                    continue;
                }
            }
        }
        let static_type = declared_type.clone().or_else(|| value.concrete_type_info());
        interp.env.define(name, Object::new_variable(name, value, static_type, mutable));
    }
    Object::Nil
}

fn unwrap_return(value: Object) -> Object {
    match value {
        Object::ReturnValue(inner, _) => *inner,
        other => other,
    }
}

fn exec_assign(interp: &mut Interpreter<'_>, lhs: &[ExprId], rhs: &[ExprId], op: AssignOp) -> Object {
    if let AssignOp::Define = op {
        let names: Vec<Name> = lhs
            .iter()
            .map(|&id| match interp.current_arena.expr(id).kind {
                ExprKind::Ident(name) => name,
                _ => Name::EMPTY,
            })
            .collect();
        return exec_decl(interp, &names, None, rhs, true);
    }

    let mut values = Vec::with_capacity(rhs.len());
    for &id in rhs {
        let value = unwrap_return(interp.eval(id));
        if value.is_error() {
            return value;
        }
        values.push(value);
    }
    if values.len() == 1 && lhs.len() > 1 {
        if let Object::MultiReturn(parts) = values.remove(0) {
            values = parts;
        }
    }

    for (i, &target) in lhs.iter().enumerate() {
        let Some(mut value) = values.get(i).cloned() else {
            continue;
        };
        if let AssignOp::Compound(bin_op) = op {
            let current = interp.eval(target);
            if current.is_error() {
                return current;
            }
            value = apply_compound(interp, bin_op, current, value);
            if value.is_error() {
                return value;
            }
        }
        let result = assign_to(interp, target, value);
        if result.is_error() {
            return result;
        }
    }
    Object::Nil
}

fn apply_compound(interp: &mut Interpreter<'_>, op: BinaryOp, left: Object, right: Object) -> Object {
    match (left.deref_variable(), right.deref_variable()) {
        (Object::Integer(a), Object::Integer(b)) => match op {
            BinaryOp::Add => Object::Integer(a.wrapping_add(b)),
            BinaryOp::Sub => Object::Integer(a.wrapping_sub(b)),
            BinaryOp::Mul => Object::Integer(a.wrapping_mul(b)),
            BinaryOp::Quo if b == 0 => to_object(interp, Err(gosym_diagnostic::division_by_zero(None))),
            BinaryOp::Quo => Object::Integer(a.wrapping_div(b)),
            BinaryOp::Rem if b == 0 => to_object(interp, Err(gosym_diagnostic::division_by_zero(None))),
            BinaryOp::Rem => Object::Integer(a.wrapping_rem(b)),
            BinaryOp::And => Object::Integer(a & b),
            BinaryOp::Or => Object::Integer(a | b),
            BinaryOp::Xor => Object::Integer(a ^ b),
            _ => Object::placeholder("compound assignment", None),
        },
        (Object::Str(a), Object::Str(b)) if op == BinaryOp::Add => Object::Str(Rc::new(format!("{a}{b}"))),
        _ => Object::placeholder("compound assignment on symbolic value", None),
    }
}

fn assign_to(interp: &mut Interpreter<'_>, target: ExprId, value: Object) -> Object {
    match &interp.current_arena.expr(target).kind.clone() {
        ExprKind::Ident(name) => {
            if *name == Name::EMPTY {
                return Object::Nil;
            }
            if let Some(Object::Variable(cell)) = interp.env.get(*name) {
                if let Some(concrete) = value.concrete_type_info() {
                    if cell.borrow().static_type.as_ref().is_some_and(|t| t.interface_info.is_some()) {
                        cell.borrow_mut().observe_concrete_type(concrete);
                    }
                }
            }
            match interp.env.assign(*name, value) {
                Ok(()) => Object::Nil,
                Err(AssignError::Undefined) => to_object(interp, Err(gosym_diagnostic::unknown_identifier(&interp.interner.lookup(*name), None))),
                Err(AssignError::Immutable) => to_object(interp, Err(gosym_diagnostic::internal(format!("cannot assign to constant {}", interp.interner.lookup(*name))))),
            }
        }
        ExprKind::Selector { expr, sel } => {
            let base = interp.eval(*expr);
            if base.is_error() {
                return base;
            }
            let struct_cell = match &base {
                Object::Struct(cell) => Some(cell.clone()),
                Object::Pointer(inner, _) => match &*inner.borrow() {
                    Object::Struct(cell) => Some(cell.clone()),
                    _ => None,
                },
                _ => None,
            };
            let Some(struct_cell) = struct_cell else {
                return to_object(interp, Err(not_a_struct(None)));
            };
            let sel_display = interp.interner.lookup(*sel);
            if !struct_cell.borrow().fields.contains_key(sel) {
                let type_name = interp.interner.lookup(struct_cell.borrow().type_name);
                return to_object(interp, Err(unknown_field(&type_name, &sel_display, None)));
            }
            struct_cell.borrow_mut().fields.insert(*sel, value);
            Object::Nil
        }
        ExprKind::Index { expr, index } => {
            let base = interp.eval(*expr);
            if base.is_error() {
                return base;
            }
            let index_value = interp.eval(*index);
            if index_value.is_error() {
                return index_value;
            }
            match &base {
                Object::Array(elems, _) | Object::Slice(elems, _) => {
                    let Object::Integer(i) = index_value else {
                        return Object::Nil;
                    };
                    let mut elems = elems.borrow_mut();
                    match usize::try_from(i).ok().filter(|&i| i < elems.len()) {
                        Some(i) => {
                            elems[i] = value;
                            Object::Nil
                        }
                        None => to_object(interp, Err(gosym_diagnostic::index_out_of_bounds(i, elems.len(), None))),
                    }
                }
                Object::Map(map, _) => {
                    if let Some(key) = super::expr::to_map_key(&index_value) {
                        map.borrow_mut().insert(key, value);
                    }
                    Object::Nil
                }
                _ => Object::Nil,
            }
        }
        _ => Object::Nil,
    }
}

fn exec_return(interp: &mut Interpreter<'_>, results: &[ExprId]) -> Object {
    let mut values = Vec::with_capacity(results.len());
    for &id in results {
        let value = interp.eval(id);
        if value.is_error() {
            return value;
        }
        values.push(value);
    }
    match values.len() {
        0 => Object::ReturnValue(Box::new(Object::Nil), None),
        1 => Object::ReturnValue(Box::new(values.remove(0)), None),
        _ => Object::ReturnValue(Box::new(Object::MultiReturn(values)), None),
    }
}

fn exec_if(interp: &mut Interpreter<'_>, init: Option<StmtId>, cond: ExprId, then_block: StmtId, else_stmt: Option<StmtId>) -> Object {
    interp.env.push_scope();
    if let Some(init) = init {
        let result = interp.exec_stmt(init);
        if result.is_control_flow() {
            interp.env.pop_scope();
            return result;
        }
    }
    let cond_value = interp.eval(cond);
    if cond_value.is_error() {
        interp.env.pop_scope();
        return cond_value;
    }

    let then_result = interp.exec_stmt(then_block);
    let else_result = match else_stmt {
        Some(stmt) => interp.exec_stmt(stmt),
        None => Object::Nil,
    };
    interp.env.pop_scope();

    if !matches!(cond_value, Object::Boolean(_) | Object::SymbolicPlaceholder(_)) {
        return to_object(interp, Err(non_boolean_condition(None)));
    }

    // Errors always win; otherwise the then-branch's signal wins on
    // collision.
    if then_result.is_error() {
        return then_result;
    }
    if else_result.is_error() {
        return else_result;
    }
    if !matches!(then_result, Object::Nil | Object::ReturnValue(..)) {
        return then_result;
    }
    if matches!(then_result, Object::ReturnValue(..)) || matches!(else_result, Object::ReturnValue(..)) {
        // Never let a ReturnValue leak past the statement itself — the
        // enclosing function body's block loop absorbs it, not `if`.
        return if matches!(then_result, Object::ReturnValue(..)) { then_result } else { else_result };
    }
    else_result
}

fn exec_for(interp: &mut Interpreter<'_>, init: Option<StmtId>, cond: Option<ExprId>, post: Option<StmtId>, body: StmtId) -> Object {
    interp.env.push_scope();
    if let Some(init) = init {
        let result = interp.exec_stmt(init);
        if result.is_control_flow() {
            interp.env.pop_scope();
            return result;
        }
    }
    if let Some(cond) = cond {
        let cond_value = interp.eval(cond);
        if cond_value.is_error() {
            interp.env.pop_scope();
            return cond_value;
        }
    }

    let body_result = interp.exec_stmt(body);

    if let Some(post) = post {
        let post_result = interp.exec_stmt(post);
        if post_result.is_error() {
            interp.env.pop_scope();
            return post_result;
        }
    }
    interp.env.pop_scope();

    match body_result {
        Object::Break(_) | Object::Continue(_) => Object::Nil,
        other => other,
    }
}

fn exec_range(interp: &mut Interpreter<'_>, key: Option<Name>, value: Option<Name>, define: bool, x: ExprId, body: StmtId) -> Object {
    let collection = interp.eval(x);
    if collection.is_error() {
        return collection;
    }

    interp.env.push_scope();
    let (key_value, elem_value) = range_one(&collection);
    if define {
        if let Some(name) = key {
            interp.env.define(name, Object::new_variable(name, key_value.clone(), key_value.concrete_type_info(), true));
        }
        if let Some(name) = value {
            interp.env.define(name, Object::new_variable(name, elem_value.clone(), elem_value.concrete_type_info(), true));
        }
    } else {
        if let Some(name) = key {
            let _ = interp.env.assign(name, key_value);
        }
        if let Some(name) = value {
            let _ = interp.env.assign(name, elem_value);
        }
    }

    let body_result = interp.exec_stmt(body);
    interp.env.pop_scope();

    match body_result {
        Object::Break(_) | Object::Continue(_) => Object::Nil,
        other => other,
    }
}

/// One representative `(key, value)` pair for a single bounded range
/// iteration.
fn range_one(collection: &Object) -> (Object, Object) {
    match collection {
        Object::Array(elems, _) | Object::Slice(elems, _) => {
            let elems = elems.borrow();
            match elems.first() {
                Some(v) => (Object::Integer(0), v.clone()),
                None => (Object::Integer(0), Object::placeholder("range over empty collection", None)),
            }
        }
        Object::Map(map, base) => match map.borrow().iter().next() {
            Some((k, v)) => (map_key_to_object(k), v.clone()),
            None => (
                Object::placeholder("range key", base.type_info.clone()),
                Object::placeholder("range value", base.type_info.clone()),
            ),
        },
        Object::Str(s) => match s.chars().next() {
            Some(c) => (Object::Integer(0), Object::Integer(c as i64)),
            None => (Object::Integer(0), Object::placeholder("range over empty string", None)),
        },
        Object::Integer(_) => (Object::Integer(0), Object::Nil),
        _ => (Object::placeholder("range key", None), Object::placeholder("range value", None)),
    }
}

fn map_key_to_object(key: &crate::object::ObjectKey) -> Object {
    match key {
        crate::object::ObjectKey::Integer(n) => Object::Integer(*n),
        crate::object::ObjectKey::Str(s) => Object::Str(Rc::new(s.clone())),
        crate::object::ObjectKey::Boolean(b) => Object::Boolean(*b),
        crate::object::ObjectKey::Symbolic => Object::placeholder("symbolic map key", None),
    }
}

fn exec_switch(interp: &mut Interpreter<'_>, init: Option<StmtId>, tag: Option<ExprId>, cases: &[gosym_ir::CaseClause]) -> Object {
    interp.env.push_scope();
    if let Some(init) = init {
        let result = interp.exec_stmt(init);
        if result.is_control_flow() {
            interp.env.pop_scope();
            return result;
        }
    }
    let tag_value = tag.map(|id| interp.eval(id));
    if let Some(tag_value) = &tag_value {
        if tag_value.is_error() {
            interp.env.pop_scope();
            return tag_value.clone();
        }
    }

    let mut outcome = Object::Nil;
    for case in cases {
        for &value_id in &case.values {
            let value = interp.eval(value_id);
            if value.is_error() {
                interp.env.pop_scope();
                return value;
            }
        }
        let result = interp.exec_block_enclosed(&case.body);
        match result {
            Object::Error(_) => {
                interp.env.pop_scope();
                return result;
            }
            Object::Break(_) => {}
            Object::ReturnValue(..) => outcome = result,
            _ => {}
        }
    }
    interp.env.pop_scope();
    outcome
}

fn exec_type_switch(interp: &mut Interpreter<'_>, init: Option<StmtId>, bind: Option<Name>, x: ExprId, cases: &[gosym_ir::TypeCaseClause]) -> Object {
    interp.env.push_scope();
    if let Some(init) = init {
        let result = interp.exec_stmt(init);
        if result.is_control_flow() {
            interp.env.pop_scope();
            return result;
        }
    }
    let subject = interp.eval(x);
    if subject.is_error() {
        interp.env.pop_scope();
        return subject;
    }

    let mut outcome = Object::Nil;
    for case in cases {
        interp.env.push_scope();
        if let Some(name) = bind {
            let narrowed_type = case
                .types
                .first()
                .and_then(|&id| match interp.eval(id) {
                    Object::TypeRef(ty) => Some(ty),
                    _ => None,
                })
                .or_else(|| subject.concrete_type_info());
            if let Object::Variable(cell) = &subject {
                if let Some(ty) = &narrowed_type {
                    cell.borrow_mut().observe_concrete_type(ty.clone());
                }
            }
            interp.env.define(name, Object::new_variable(name, subject.deref_variable(), narrowed_type, true));
        }
        let result = interp.exec_block_enclosed(&case.body);
        interp.env.pop_scope();
        match result {
            Object::Error(_) => {
                interp.env.pop_scope();
                return result;
            }
            Object::Break(_) => {}
            Object::ReturnValue(..) => outcome = result,
            _ => {}
        }
    }
    interp.env.pop_scope();
    outcome
}
