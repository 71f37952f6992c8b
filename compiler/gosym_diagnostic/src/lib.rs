//! Error and call-stack diagnostics shared by every stage of the evaluator.

mod call_stack;
mod errors;
mod warnings;

pub use call_stack::{CallFrame, CallStack};
pub use errors::{
    ambiguous_selector, arity_mismatch, division_by_zero, index_out_of_bounds, internal,
    nil_pointer_dereference, non_boolean_condition, not_a_function, not_a_struct,
    unknown_field, unknown_identifier, unknown_package, Error, ErrorKind, EvalResult,
};
pub use warnings::{call_on_nil, shallow_scan_miss};
