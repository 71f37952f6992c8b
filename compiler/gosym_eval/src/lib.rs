//! Symbolic execution evaluator for a Go-like language's object model.
//!
//! This crate provides the tree-walking `Interpreter`: a closed `Object`
//! value universe, a lexically nested `Environment`, lazy package
//! resolution, intrinsic method dispatch, and interface-binding-table-
//! driven interface satisfaction.
//!
//! # Architecture
//!
//! - `Object`/`environment`: the value universe and scope chain.
//! - `resolver`: lazy, policy-gated package loading and method lookup.
//! - `intrinsics`/`interface_binding`: the two host-extensible dispatch
//!   tables `Apply` and selector resolution consult.
//! - `interpreter`: `Eval`/`Exec`/`Apply`, generics, memoization.

mod environment;
mod function;
mod interface_binding;
pub mod interpreter;
mod intrinsics;
mod object;
mod resolver;
#[cfg(test)]
mod tests;
mod universe;

pub use environment::{AssignError, Environment, LocalScope, Scope};
pub use function::build_function_object;
pub use interface_binding::{InterfaceBindingTable, TypePath};
pub use interpreter::{Interpreter, InterpreterBuilder, IntrinsicScope};
pub use intrinsics::{IntrinsicMap, IntrinsicRegistry};
pub use object::{
    BaseObject, BoundMethodValue, FunctionValue, IntrinsicValue, Object, ObjectKey, ObjectMap,
    PackageValue, PlaceholderValue, StructValue, UnresolvedFunctionValue, VariableValue, FALSE,
    NIL, TRUE,
};
pub use resolver::{allow_all, Resolver, ScanPolicy};

// Re-exported for host tools that want to register intrinsics or construct
// call sites without a separate `gosym_patterns` dependency.
pub use gosym_patterns::{MethodKey, MethodLookup, Receiver};
