//! Build a `Function`/`UnresolvedFunction` object from a scanned
//! `FunctionInfo`.

use crate::environment::Environment;
use crate::object::{FunctionValue, Object, UnresolvedFunctionValue};
use gosym_ir::{FunctionInfo, Name};
use std::rc::Rc;
use std::sync::Arc;

/// `def_env` is captured as the function's closure environment, used to
/// build its call environment later in `Apply`.
/// A function with no parsed body (out-of-policy, or a bare declaration)
/// becomes `UnresolvedFunction` instead, carrying its static signature.
pub fn build_function_object(info: &FunctionInfo, def_env: &Environment, pkg_path: Name) -> Object {
    match &info.body {
        Some(body) => Object::Function(Rc::new(FunctionValue {
            name: info.name,
            pkg_path,
            decl: Arc::new(info.clone()),
            body: Some(body.clone()),
            params: info.params.clone(),
            results: info.results.clone(),
            is_variadic: info.is_variadic,
            type_params: info.type_params.clone(),
            recv: info.recv.clone(),
            def_env: def_env.capture(),
        })),
        None => Object::UnresolvedFunction(Rc::new(UnresolvedFunctionValue {
            name: info.name,
            pkg_path,
            signature: Some(Arc::new(info.clone())),
        })),
    }
}
