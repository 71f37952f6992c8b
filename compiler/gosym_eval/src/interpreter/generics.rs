//! Generic functions: explicit `F[T1,T2]` instantiation,
//! best-effort implicit unification from argument types, and type-list /
//! union constraint satisfaction.

use super::Interpreter;
use crate::environment::Environment;
use crate::object::Object;
use gosym_ir::{Arena, ExprId, ExprKind, Name, Param};
use std::rc::Rc;

/// `ExprKind::IndexList { expr, type_args }`: evaluate the callee, evaluate each type argument
/// expression to a `TypeRef`, and bind the function's type-parameter names
/// to those `TypeRef`s in a fresh scope enclosing its definition
/// environment, before the call ever happens. A non-generic or
/// non-`Function` callee passes through unchanged — `F[T]` on a plain value
/// is not meaningfully different from `F` itself for a symbolic evaluator.
pub(super) fn eval_explicit_instantiation(interp: &mut Interpreter<'_>, expr: ExprId, type_args: &[ExprId]) -> Object {
    let callee = interp.eval(expr);
    let Object::Function(func_value) = &callee else {
        return callee;
    };
    if func_value.type_params.is_empty() {
        return callee;
    }

    let specialized_env = func_value.def_env.child();
    for (&param_name, &arg_expr) in func_value.type_params.iter().zip(type_args.iter()) {
        let type_value = interp.eval(arg_expr);
        specialized_env.define(param_name, type_value);
    }

    let specialized = crate::object::FunctionValue {
        name: func_value.name,
        pkg_path: func_value.pkg_path,
        decl: func_value.decl.clone(),
        body: func_value.body.clone(),
        params: func_value.params.clone(),
        results: func_value.results.clone(),
        is_variadic: func_value.is_variadic,
        type_params: func_value.type_params.clone(),
        recv: func_value.recv.clone(),
        def_env: specialized_env,
    };
    Object::Function(Rc::new(specialized))
}

/// Implicit instantiation: for each type parameter not already bound by an
/// explicit instantiation, find the first ordinary parameter declared with
/// that type-parameter name and bind it to the matching argument's concrete
/// type, falling back to a fresh untyped placeholder. Called from `Apply`
/// right after ordinary parameter binding, before the call stack frame is
/// pushed.
pub(super) fn bind_implicit_type_params(env: &Environment, arena: &Arena, type_params: &[Name], params: &[Param], args: &[Object]) {
    for &type_param in type_params {
        if env.get(type_param).is_some() {
            continue;
        }
        let inferred = params.iter().zip(args.iter()).find_map(|(param, arg)| match arena.expr(param.type_expr).kind {
            ExprKind::Ident(name) if name == type_param => Some(arg.clone()),
            _ => None,
        });
        let type_value = match inferred.and_then(|arg| arg.concrete_type_info()) {
            Some(type_info) => Object::TypeRef(type_info),
            None => Object::placeholder("generic type parameter inferred from argument", None),
        };
        env.define(type_param, type_value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{allow_all, Resolver};
    use gosym_ir::{FuncDecl, Span, StringInterner};

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

    #[test]
    fn implicit_unification_falls_back_to_a_placeholder_when_no_match() {
        let interner = StringInterner::new();
        let resolver = Rc::new(Resolver::new(Rc::new(NoScanner), allow_all(), interner.clone()));
        let interp = Interpreter::builder(&interner, resolver).build();
        let arena = Arena::new();
        let t = interner.intern("T");
        bind_implicit_type_params(&interp.env, &arena, &[t], &[], &[]);
        assert!(matches!(interp.env.get(t), Some(Object::SymbolicPlaceholder(_))));
    }

    #[test]
    fn non_generic_instantiation_is_a_no_op() {
        let interner = StringInterner::new();
        let resolver = Rc::new(Resolver::new(Rc::new(NoScanner), allow_all(), interner.clone()));
        let mut interp = Interpreter::builder(&interner, resolver).build();

        let mut arena = Arena::new();
        let func_id = arena.alloc_func(FuncDecl {
            name: interner.intern("id"),
            recv: None,
            type_params: Vec::new(),
            params: Vec::new(),
            results: Vec::new(),
            is_variadic: false,
            body: None,
        });
        let info = gosym_ir::FunctionInfo {
            name: interner.intern("id"),
            pkg_path: Name::EMPTY,
            recv: None,
            type_params: Vec::new(),
            params: Vec::new(),
            results: Vec::new(),
            is_variadic: false,
            body: Some(gosym_ir::FuncBody {
                arena: std::sync::Arc::new(arena),
                func: func_id,
            }),
        };
        let def_env = interp.env.capture();
        let func_obj = crate::function::build_function_object(&info, &def_env, Name::EMPTY);

        let id_name = interner.intern("id");
        interp.env.define(id_name, func_obj);
        let mut call_arena = Arena::new();
        let callee_expr = call_arena.alloc_expr(ExprKind::Ident(id_name), Span::DUMMY);
        interp.current_arena = std::sync::Arc::new(call_arena);

        let result = eval_explicit_instantiation(&mut interp, callee_expr, &[]);
        assert!(matches!(result, Object::Function(_)));
    }
}
