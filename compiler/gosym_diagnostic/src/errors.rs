//! Error objects and their constructors, grouped into four kinds:
//! resolution, shape, runtime-mirror, internal.
//!
//! Kinds are a tag on one `Error` struct, not a type hierarchy — every
//! fallible evaluator path returns the same `Error`, so the interpreter
//! can attach a call stack and position uniformly regardless of which
//! kind produced it.

use crate::call_stack::CallFrame;
use gosym_ir::Position;
use std::fmt;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    // --- Resolution errors ---
    UnknownPackage,
    UnknownIdentifier,
    UnknownField,
    AmbiguousSelector,
    // --- Shape errors ---
    ArityMismatch,
    NotAFunction,
    NotAStruct,
    NonBooleanCondition,
    // --- Runtime-mirror errors ---
    DivisionByZero,
    IndexOutOfBounds,
    NilPointerDereference,
    // --- Internal errors (invariant violations; should be impossible) ---
    Internal,
}

/// An evaluator error: human-readable message, source position (when
/// known), and the call stack recorded at the point of failure.
#[derive(Clone, Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub pos: Option<Position>,
    pub call_stack: Vec<CallFrame>,
}

impl Error {
    fn new(kind: ErrorKind, message: impl Into<String>, pos: Option<Position>) -> Self {
        Error {
            kind,
            message: message.into(),
            pos,
            call_stack: Vec::new(),
        }
    }

    /// Attach the call stack recorded at the moment of failure. Called once,
    /// by the frame that first observes the error, typically the nearest
    /// enclosing `Apply`.
    #[must_use]
    pub fn with_call_stack(mut self, frames: Vec<CallFrame>) -> Self {
        if self.call_stack.is_empty() {
            self.call_stack = frames;
        }
        self
    }

    pub fn is_internal(&self) -> bool {
        self.kind == ErrorKind::Internal
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pos {
            Some(pos) => write!(f, "{pos}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for Error {}

pub type EvalResult<T> = Result<T, Error>;

// --- Resolution errors ---

pub fn unknown_package(import_path: &str, pos: Option<Position>) -> Error {
    Error::new(
        ErrorKind::UnknownPackage,
        format!("unknown package {import_path:?}"),
        pos,
    )
}

pub fn unknown_identifier(name: &str, pos: Option<Position>) -> Error {
    Error::new(ErrorKind::UnknownIdentifier, format!("undefined: {name}"), pos)
}

pub fn unknown_field(type_name: &str, field: &str, pos: Option<Position>) -> Error {
    Error::new(
        ErrorKind::UnknownField,
        format!("{type_name} has no field or method {field}"),
        pos,
    )
}

pub fn ambiguous_selector(selector: &str, pos: Option<Position>) -> Error {
    Error::new(
        ErrorKind::AmbiguousSelector,
        format!("ambiguous selector {selector}"),
        pos,
    )
}

// --- Shape errors ---

pub fn arity_mismatch(expected: usize, found: usize, pos: Option<Position>) -> Error {
    Error::new(
        ErrorKind::ArityMismatch,
        format!("expected {expected} argument(s), found {found}"),
        pos,
    )
}

pub fn not_a_function(pos: Option<Position>) -> Error {
    Error::new(ErrorKind::NotAFunction, "cannot call non-function value", pos)
}

pub fn not_a_struct(pos: Option<Position>) -> Error {
    Error::new(ErrorKind::NotAStruct, "field assignment on non-struct value", pos)
}

pub fn non_boolean_condition(pos: Option<Position>) -> Error {
    Error::new(
        ErrorKind::NonBooleanCondition,
        "non-boolean value used as condition",
        pos,
    )
}

// --- Runtime-mirror errors ---

pub fn division_by_zero(pos: Option<Position>) -> Error {
    Error::new(ErrorKind::DivisionByZero, "division by zero", pos)
}

pub fn index_out_of_bounds(index: i64, len: usize, pos: Option<Position>) -> Error {
    Error::new(
        ErrorKind::IndexOutOfBounds,
        format!("index {index} out of range [0, {len})"),
        pos,
    )
}

pub fn nil_pointer_dereference(pos: Option<Position>) -> Error {
    Error::new(ErrorKind::NilPointerDereference, "nil pointer dereference", pos)
}

// --- Internal errors ---

/// An invariant violation: a bug in the evaluator itself, not in the
/// analyzed code. E.g. a `ReturnValue` control-flow signal
/// escaping past the function boundary that should have absorbed it.
pub fn internal(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::Internal, message.into(), None)
}
