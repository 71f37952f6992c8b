//! Shared, object-model-independent patterns reused by the evaluator:
//! embedded-field selector resolution, function-signature arity checking,
//! and generic type-constraint satisfaction.

pub mod constraints;
pub mod method_key;
pub mod selector;
pub mod signature;

pub use constraints::satisfies_type_list;
pub use method_key::{MethodKey, Receiver};
pub use selector::{resolve_selector, MethodLookup, SelectorHit};
pub use signature::FunctionSignature;
