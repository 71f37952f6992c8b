//! The evaluator: the AST walker, tying together the object model,
//! environment, resolver, intrinsic registry and interface binding table.
//!
//! `Interpreter::eval`/`exec_stmt` dispatch on the AST node kind and
//! delegate to the `expr`/`stmt`/`call`/`method_dispatch` helper modules,
//! keeping this file a coordination point rather than a monolith.

mod builder;
mod call;
mod expr;
mod generics;
mod method_dispatch;
mod scope_guard;
mod stmt;

pub use builder::InterpreterBuilder;
pub use scope_guard::IntrinsicScope;

use crate::environment::Environment;
use crate::interface_binding::InterfaceBindingTable;
use crate::intrinsics::IntrinsicRegistry;
use crate::object::Object;
use crate::resolver::Resolver;
use gosym_diagnostic::{internal, CallFrame, CallStack, Error, EvalResult};
use gosym_ir::{Arena, ConstValue, ExprId, Name, PackageInfo, StmtId, StringInterner};
use gosym_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// Key a memoized call by the function's pointer identity plus the "shape"
/// of its arguments: concrete value for concrete args,
/// type-only for placeholders.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub(crate) enum ArgShape {
    Int(i64),
    Str(String),
    Bool(bool),
    Nil,
    TypeOnly(Option<(Name, Name)>),
    Opaque,
}

type MemoKey = (usize, Vec<ArgShape>);

/// The tree-walking evaluator.
///
/// One `Interpreter` processes one call stack at a time: it is
/// not `Send`/`Sync` (environments and the package cache are `Rc`/`RefCell`
/// based), and host tools that want concurrency must run disjoint
/// instances, never share one across threads.
pub struct Interpreter<'a> {
    pub interner: &'a StringInterner,
    pub env: Environment,
    pub resolver: Rc<Resolver>,
    pub intrinsics: IntrinsicRegistry,
    pub bindings: InterfaceBindingTable,
    pub call_stack: CallStack,
    /// Import path of the package currently being evaluated; used to key
    /// intrinsic lookups for unqualified (non-selector) calls and to tag
    /// freshly built function/struct objects with their declaring package.
    pub current_pkg: Name,
    /// Arena the expression/statement ids passed to `eval`/`exec_stmt`
    /// currently index into. Swapped for the callee's arena across `Apply`
    ///.
    pub(crate) current_arena: Arc<Arena>,
    memo: Option<RefCell<FxHashMap<MemoKey, Object>>>,
}

impl<'a> Interpreter<'a> {
    pub fn builder(interner: &'a StringInterner, resolver: Rc<Resolver>) -> InterpreterBuilder<'a> {
        InterpreterBuilder::new(interner, resolver)
    }

    /// Evaluate an expression. Wrapped in `ensure_sufficient_stack` because
    /// `Eval`/`Apply` recurse with the shape of the analyzed program, whose
    /// nesting depth this evaluator does not control.
    pub fn eval(&mut self, id: ExprId) -> Object {
        ensure_sufficient_stack(|| expr::eval_expr(self, id))
    }

    /// Execute a statement, returning `NIL` on ordinary fallthrough or one
    /// of `ReturnValue`/`Break`/`Continue`/`Error`.
    pub fn exec_stmt(&mut self, id: StmtId) -> Object {
        ensure_sufficient_stack(|| stmt::exec_stmt(self, id))
    }

    /// Execute a sequence of statements in a freshly enclosed scope,
    /// stopping at the first control-flow/error signal.
    pub(crate) fn exec_block_enclosed(&mut self, stmts: &[StmtId]) -> Object {
        self.env.push_scope();
        let result = stmt::exec_block(self, stmts);
        self.env.pop_scope();
        result
    }

    /// Call `func` with `args`.
    pub fn apply(&mut self, func: Object, args: Vec<Object>) -> Object {
        ensure_sufficient_stack(|| call::apply(self, func, args))
    }

    /// Public `Apply` entrypoint for host tools: unwraps an
    /// `Object::Error` result into `Result::Err` instead of handing back an
    /// error-shaped value, since callers outside the evaluator expect a
    /// conventional `Result`.
    pub fn apply_pub(&mut self, func: Object, args: Vec<Object>) -> EvalResult<Object> {
        to_result(self.apply(func, args))
    }

    /// Populate `pkg`'s top-level bindings (functions, methods, constants,
    /// variables, types, and the current file's import aliases) into this
    /// interpreter's environment, the way `Eval(ctx, astFile, pkg)` would.
    pub fn eval_file(&mut self, pkg: &PackageInfo, import_lookup: &FxHashMap<String, String>) -> EvalResult<Object> {
        self.current_pkg = pkg.import_path;
        self.resolver.register_methods(pkg.import_path, &pkg.functions);

        for func in &pkg.functions {
            if func.recv.is_some() {
                continue;
            }
            let key = gosym_patterns::MethodKey::function(pkg.import_path, func.name);
            let value = if let Some(handler) = self.intrinsics.get(&key) {
                Object::Intrinsic(handler)
            } else {
                crate::function::build_function_object(func, &self.env, pkg.import_path)
            };
            self.env.define(func.name, value);
        }
        for (name, field_type) in &pkg.constants {
            let value = match pkg.constant_values.get(name) {
                Some(literal) => literal_object(literal),
                None => Object::placeholder("package-level value", field_type.resolved.clone()),
            };
            self.env.define(*name, Object::new_variable(*name, value, field_type.resolved.clone(), true));
        }
        for (name, field_type) in &pkg.variables {
            self.env.define(
                *name,
                Object::new_variable(*name, Object::placeholder("package-level value", field_type.resolved.clone()), field_type.resolved.clone(), true),
            );
        }
        for ty in &pkg.types {
            self.env.define(ty.name, Object::TypeRef(Arc::new(ty.clone())));
        }
        for (alias, import_path) in import_lookup {
            let alias_name = self.interner.intern(alias);
            self.env.define(alias_name, self.resolver.resolve_package(import_path));
        }
        Ok(Object::Nil)
    }

    /// Look up a top-level name already populated into `pkg_path`'s env by
    /// `eval_file`/the resolver.
    pub fn find_object_in_package(&self, pkg_path: &str, name: &str) -> Option<Object> {
        let package = self.resolver.resolve_package(pkg_path);
        self.resolver.ensure_loaded(&package, &self.intrinsics).ok()?;
        self.resolver.package_member(&package, self.interner.intern(name))
    }

    /// Push a scoped intrinsic overlay for the duration of `f`. Pops automatically on every exit path, including `f` panicking,
    /// via `IntrinsicScope`'s `Drop`.
    pub fn with_scoped_intrinsics<R>(&mut self, map: crate::intrinsics::IntrinsicMap, f: impl FnOnce(&mut Self) -> R) -> R {
        let _guard = IntrinsicScope::push(self, map);
        f(self)
    }

    pub(crate) fn push_call_frame(&mut self, name: Name) -> Result<(), Object> {
        self.call_stack.push(CallFrame::new(name, None)).map_err(|_max| {
            Object::placeholder("recursion depth exceeded", None)
        })
    }

    pub(crate) fn pop_call_frame(&mut self) {
        self.call_stack.pop();
    }

    /// Attach the call stack (and `current_pkg`-qualified position, when
    /// known) to an error the moment it is first observed.
    pub(crate) fn attach_call_stack(&self, err: Error) -> Error {
        err.with_call_stack(self.call_stack.snapshot())
    }

    fn memo_key(&self, fn_ptr: usize, args: &[Object]) -> MemoKey {
        (fn_ptr, args.iter().map(arg_shape).collect())
    }

    pub(crate) fn memo_get(&self, fn_ptr: usize, args: &[Object]) -> Option<Object> {
        let memo = self.memo.as_ref()?;
        let key = self.memo_key(fn_ptr, args);
        memo.borrow().get(&key).cloned()
    }

    pub(crate) fn memo_put(&self, fn_ptr: usize, args: &[Object], result: Object) {
        let Some(memo) = self.memo.as_ref() else { return };
        let key = self.memo_key(fn_ptr, args);
        memo.borrow_mut().insert(key, result);
    }
}

/// Lift a scanner-resolved constant literal into its concrete `Object`.
pub(crate) fn literal_object(literal: &ConstValue) -> Object {
    match literal {
        ConstValue::Integer(n) => Object::Integer(*n),
        ConstValue::Str(s) => Object::Str(Rc::new(s.clone())),
        ConstValue::Bool(b) => Object::bool_value(*b),
    }
}

fn arg_shape(obj: &Object) -> ArgShape {
    match obj.deref_variable() {
        Object::Integer(n) => ArgShape::Int(n),
        Object::Str(s) => ArgShape::Str((*s).clone()),
        Object::Boolean(b) => ArgShape::Bool(b),
        Object::Nil => ArgShape::Nil,
        other => ArgShape::TypeOnly(other.concrete_type_info().map(|t| (t.pkg_path, t.name))),
    }
}

/// Unwrap an `Object::Error` into `Result::Err` for the benefit of
/// conventional-`Result` host APIs; every other `Object`
/// variant is handed back as `Ok`.
pub(crate) fn to_result(obj: Object) -> EvalResult<Object> {
    match obj {
        Object::Error(err) => Err(*err),
        other => Ok(other),
    }
}

/// Lift an internal `Result` into the tagged-variant `Object` flow: `Ok`
/// passes through, `Err` becomes `Object::Error` with the current call
/// stack attached.
pub(crate) fn to_object(interp: &Interpreter<'_>, result: EvalResult<Object>) -> Object {
    match result {
        Ok(obj) => obj,
        Err(err) => Object::Error(Box::new(interp.attach_call_stack(err))),
    }
}

pub(crate) fn internal_error(message: impl Into<String>) -> Object {
    Object::Error(Box::new(internal(message)))
}
