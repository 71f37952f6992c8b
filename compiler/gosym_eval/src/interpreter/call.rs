//! `Apply`: the six-way dispatch every callable `Object`
//! variant goes through, and the `Function` case's env/arena/call-stack
//! bookkeeping.

use super::{internal_error, to_object, Interpreter};
use crate::environment::Environment;
use crate::object::{BaseObject, FunctionValue, Object};
use gosym_diagnostic::not_a_function;
use gosym_ir::{FunctionInfo, Param};
use gosym_patterns::FunctionSignature;
use std::cell::RefCell;
use std::rc::Rc;

pub(super) fn apply(interp: &mut Interpreter<'_>, func: Object, mut args: Vec<Object>) -> Object {
    match func {
        Object::Intrinsic(intrinsic) => (intrinsic.handler)(interp, args),

        Object::BoundMethod(bound) => {
            let mut full_args = Vec::with_capacity(args.len() + 1);
            full_args.push(bound.receiver.clone());
            full_args.append(&mut args);
            apply(interp, bound.callee.clone(), full_args)
        }

        Object::Function(func_value) => apply_function(interp, func_value, args),

        Object::UnresolvedFunction(unresolved) => placeholder_for_signature(unresolved.signature.as_deref()),

        // An unbound interface method, or a generic placeholder typed as
        // callable: the declared return type (if any) is all we know.
        Object::SymbolicPlaceholder(p) => Object::placeholder("result of calling a symbolic callable", p.base.type_info.clone()),

        Object::Nil => {
            gosym_diagnostic::call_on_nil("call expression");
            Object::placeholder("call on nil function value", None)
        }

        other => {
            let mut err = not_a_function(None);
            err.message = format!("cannot call non-function value of type {}", other.type_name());
            to_object(interp, Err(err))
        }
    }
}

fn placeholder_for_signature(signature: Option<&FunctionInfo>) -> Object {
    let Some(sig) = signature else {
        return Object::placeholder("result of calling an unresolved function", None);
    };
    match sig.results.len() {
        0 => Object::Nil,
        1 => Object::placeholder("result of an unresolved call", sig.results[0].resolved.clone()),
        _ => Object::MultiReturn(
            sig.results
                .iter()
                .map(|r| Object::placeholder("result of an unresolved call", r.resolved.clone()))
                .collect(),
        ),
    }
}

fn apply_function(interp: &mut Interpreter<'_>, func_value: Rc<FunctionValue>, args: Vec<Object>) -> Object {
    let Some(body) = &func_value.body else {
        return internal_error("Function object has no body to evaluate");
    };
    let decl = body.arena.func(body.func).clone();

    let signature = FunctionSignature::from_function_info(&func_value.decl);
    let positional_count = if decl.recv.is_some() { args.len().saturating_sub(1) } else { args.len() };
    if let Err(err) = signature.check_arity(positional_count) {
        return to_object(interp, Err(err));
    }

    // Memoization keys on the identity of this function object plus the
    // shape of the *full* argument list (receiver included), computed
    // before binding so a cache hit never touches the environment at all
    //.
    let fn_ptr = Rc::as_ptr(&func_value) as usize;
    if let Some(cached) = interp.memo_get(fn_ptr, &args) {
        return cached;
    }

    let mut positional = args.clone();
    let call_env = func_value.def_env.child();

    if decl.recv.is_some() && !positional.is_empty() {
        let receiver_value = positional.remove(0);
        if let Some(name) = decl.recv.as_ref().and_then(|recv| recv.name) {
            call_env.define(name, receiver_value);
        }
    }
    bind_params(&call_env, &decl.params, &func_value.params, positional.clone(), func_value.is_variadic);
    if !func_value.type_params.is_empty() {
        super::generics::bind_implicit_type_params(&call_env, &body.arena, &func_value.type_params, &decl.params, &positional);
    }

    if let Err(placeholder) = interp.push_call_frame(func_value.name) {
        return placeholder;
    }

    let caller_env = std::mem::replace(&mut interp.env, call_env);
    let caller_arena = std::mem::replace(&mut interp.current_arena, body.arena.clone());
    let caller_pkg = std::mem::replace(&mut interp.current_pkg, func_value.pkg_path);

    let raw_result = match decl.body {
        Some(stmt) => interp.exec_stmt(stmt),
        None => Object::Nil,
    };

    interp.env = caller_env;
    interp.current_arena = caller_arena;
    interp.current_pkg = caller_pkg;
    interp.pop_call_frame();

    let result = match raw_result {
        Object::ReturnValue(inner, _) => *inner,
        Object::Error(_) => raw_result,
        // A `ReturnValue`-shaped body that fell through without an
        // explicit `return` yields `NIL`.
        _ => Object::Nil,
    };

    if !result.is_error() {
        interp.memo_put(fn_ptr, &args, result.clone());
    }
    result
}

/// Bind `args` to `params` in `env`: positional binding, with
/// the trailing parameter collecting the remainder into a `Slice` when the
/// function is variadic.
///
/// `declared` is the resolved `FieldType` for each parameter (when the
/// scanner resolved one). A parameter declared with an interface static type
/// keeps that interface identity regardless of which concrete value is
/// passed in — the same rule `VarDecl` applies here, since a call argument
/// is just another way a variable gets its first value.
fn bind_params(env: &Environment, params: &[Param], declared: &[gosym_ir::FieldType], mut args: Vec<Object>, is_variadic: bool) {
    let last = params.len().saturating_sub(1);
    for (i, param) in params.iter().enumerate() {
        let Some(name) = param.name else { continue };
        if is_variadic && i == last {
            let rest = if i < args.len() { args.split_off(i) } else { Vec::new() };
            env.define(name, Object::new_variable(name, Object::Slice(Rc::new(RefCell::new(rest)), BaseObject::empty()), None, true));
            return;
        }
        let value = args.get(i).cloned().unwrap_or(Object::Nil);
        let declared_type = declared.get(i).and_then(|ft| ft.resolved.clone());
        if let (Some(concrete), Some(iface)) = (value.concrete_type_info(), &declared_type) {
            if iface.interface_info.is_some() {
                env.define(name, Object::new_variable(name, value, declared_type.clone(), true));
                if let Some(Object::Variable(cell)) = env.get(name) {
                    cell.borrow_mut().observe_concrete_type(concrete);
                }
                continue;
            }
        }
        let static_type = declared_type.or_else(|| value.concrete_type_info());
        env.define(name, Object::new_variable(name, value, static_type, true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::build_function_object;
    use crate::resolver::{allow_all, Resolver};
    use gosym_ir::{Arena, ExprKind, FieldType, FuncBody, FuncDecl, Span, StmtKind, StringInterner};

    struct NoScanner;
    impl gosym_ir::Scanner for NoScanner {
        fn scan_package_by_import(&self, _import_path: &str) -> Result<std::sync::Arc<gosym_ir::PackageInfo>, String> {
            Err("no packages".into())
        }
        fn scan_files(&self, _files: &[std::path::PathBuf]) -> Result<std::sync::Arc<gosym_ir::PackageInfo>, String> {
            Err("no files".into())
        }
        fn fset(&self) -> std::sync::Arc<gosym_ir::FileSet> {
            std::sync::Arc::new(gosym_ir::FileSet::new())
        }
        fn build_import_lookup(&self, _file: &std::path::PathBuf) -> rustc_hash::FxHashMap<String, String> {
            rustc_hash::FxHashMap::default()
        }
    }

    /// Builds `func add(a, b int) int { return a + b }` entirely in-memory
    /// and checks `Apply` actually runs the body.
    #[test]
    fn apply_runs_a_function_body_and_unwraps_its_return() {
        let interner = StringInterner::new();
        let mut arena = Arena::new();

        let a = interner.intern("a");
        let b = interner.intern("b");
        let a_ident = arena.alloc_expr(ExprKind::Ident(a), Span::DUMMY);
        let b_ident = arena.alloc_expr(ExprKind::Ident(b), Span::DUMMY);
        let sum = arena.alloc_expr(
            ExprKind::Binary {
                op: gosym_ir::BinaryOp::Add,
                left: a_ident,
                right: b_ident,
            },
            Span::DUMMY,
        );
        let ret = arena.alloc_stmt(StmtKind::ReturnStmt { results: vec![sum] }, Span::DUMMY);
        let block = arena.alloc_stmt(StmtKind::BlockStmt { stmts: vec![ret] }, Span::DUMMY);

        let func_id = arena.alloc_func(FuncDecl {
            name: interner.intern("add"),
            recv: None,
            type_params: Vec::new(),
            params: vec![
                Param { name: Some(a), type_expr: a_ident },
                Param { name: Some(b), type_expr: b_ident },
            ],
            results: Vec::new(),
            is_variadic: false,
            body: Some(block),
        });
        let arena = std::sync::Arc::new(arena);

        let info = FunctionInfo {
            name: interner.intern("add"),
            pkg_path: interner.intern("pkg"),
            recv: None,
            type_params: Vec::new(),
            params: vec![FieldType::simple(interner.intern("int")), FieldType::simple(interner.intern("int"))],
            results: vec![FieldType::simple(interner.intern("int"))],
            is_variadic: false,
            body: Some(FuncBody { arena: arena.clone(), func: func_id }),
        };

        let resolver = Rc::new(Resolver::new(Rc::new(NoScanner), allow_all(), interner.clone()));
        let mut interp = Interpreter::builder(&interner, resolver).build();
        let def_env = interp.env.capture();
        let func_obj = build_function_object(&info, &def_env, interner.intern("pkg"));

        let result = apply(&mut interp, func_obj, vec![Object::Integer(2), Object::Integer(3)]);
        assert!(matches!(result, Object::Integer(5)));
    }

    #[test]
    fn calling_nil_warns_and_returns_a_placeholder() {
        let interner = StringInterner::new();
        let resolver = Rc::new(Resolver::new(Rc::new(NoScanner), allow_all(), interner.clone()));
        let mut interp = Interpreter::builder(&interner, resolver).build();
        let result = apply(&mut interp, Object::Nil, vec![]);
        assert!(matches!(result, Object::SymbolicPlaceholder(_)));
    }

    #[test]
    fn calling_a_non_function_value_errors() {
        let interner = StringInterner::new();
        let resolver = Rc::new(Resolver::new(Rc::new(NoScanner), allow_all(), interner.clone()));
        let mut interp = Interpreter::builder(&interner, resolver).build();
        let result = apply(&mut interp, Object::Integer(1), vec![]);
        assert!(result.is_error());
    }
}
