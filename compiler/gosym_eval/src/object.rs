//! The value universe: a closed, tagged-variant `Object` enum, plus the
//! supporting value structs each variant carries.
//!
//! Copies are shallow — values flow by reference the way Go's composite
//! types do internally, with `Pointer` modeling explicit address-taking.
//! `Rc<RefCell<_>>` gives every composite variant that reference semantics
//! without an arena of its own; the evaluator is single-threaded
//! so `Rc`/`RefCell` (not `Arc`/`Mutex`) are the right tool.

use crate::environment::Environment;
use gosym_diagnostic::Error as EvalError;
use gosym_ir::{FieldType, FuncBody, FunctionInfo, Name, TypeInfo};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Resolved static type and declaring field-type, carried by object
/// variants for which that information is meaningful.
#[derive(Clone, Debug, Default)]
pub struct BaseObject {
    pub type_info: Option<Arc<TypeInfo>>,
    pub field_type: Option<FieldType>,
}

impl BaseObject {
    pub fn empty() -> Self {
        BaseObject::default()
    }

    pub fn typed(type_info: Arc<TypeInfo>) -> Self {
        BaseObject {
            type_info: Some(type_info),
            field_type: None,
        }
    }
}

pub type ObjectMap = FxHashMap<ObjectKey, Object>;

/// Map keys restricted to the kinds Go allows as map keys. A symbolic key
/// (an index expression whose value isn't known concretely) collapses to a
/// single shared bucket rather than being rejected — concrete reads/writes
/// through that bucket still observe each other, which is the closest
/// faithful approximation without real constraint solving.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ObjectKey {
    Integer(i64),
    Str(String),
    Boolean(bool),
    Symbolic,
}

#[derive(Clone, Debug)]
pub struct StructValue {
    pub type_name: Name,
    pub fields: FxHashMap<Name, Object>,
    pub base: BaseObject,
}

/// A user-defined function or method, as captured into the object model.
/// `def_env` is the environment in which the function literal was created —
/// not the caller's — which is what gives `Apply` lexical-closure semantics.
pub struct FunctionValue {
    pub name: Name,
    pub pkg_path: Name,
    pub decl: Arc<FunctionInfo>,
    pub body: Option<FuncBody>,
    pub params: Vec<FieldType>,
    pub results: Vec<FieldType>,
    pub is_variadic: bool,
    pub type_params: Vec<Name>,
    pub recv: Option<FieldType>,
    pub def_env: Environment,
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionValue")
            .field("name", &self.name)
            .field("pkg_path", &self.pkg_path)
            .field("is_variadic", &self.is_variadic)
            .finish_non_exhaustive()
    }
}

/// A host-registered intrinsic handler. `key_display` is
/// kept for error messages and logging; the registry itself keys by
/// `MethodKey`, not by this string.
pub struct IntrinsicValue {
    pub key_display: String,
    #[allow(clippy::type_complexity)]
    pub handler: Rc<dyn Fn(&mut crate::interpreter::Interpreter<'_>, Vec<Object>) -> Object>,
}

impl fmt::Debug for IntrinsicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Intrinsic({})", self.key_display)
    }
}

pub struct PackageValue {
    pub name: Name,
    pub import_path: Name,
    pub env: Environment,
    pub loaded: bool,
}

impl fmt::Debug for PackageValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageValue")
            .field("name", &self.name)
            .field("import_path", &self.import_path)
            .field("loaded", &self.loaded)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub struct PlaceholderValue {
    pub reason: String,
    pub base: BaseObject,
}

#[derive(Clone, Debug)]
pub struct UnresolvedFunctionValue {
    pub name: Name,
    pub pkg_path: Name,
    pub signature: Option<Arc<FunctionInfo>>,
}

#[derive(Clone, Debug)]
pub struct VariableValue {
    pub name: Name,
    pub value: Object,
    /// Declared static type. For an interface-typed variable this NEVER
    /// changes across assignment — only
    /// `possible_types` grows.
    pub static_type: Option<Arc<TypeInfo>>,
    pub possible_types: Vec<Arc<TypeInfo>>,
    pub mutable: bool,
}

impl VariableValue {
    /// Record a concrete type as having flowed through this variable,
    /// without touching `static_type`.
    pub fn observe_concrete_type(&mut self, concrete: Arc<TypeInfo>) {
        if !self.possible_types.iter().any(|t| t.name == concrete.name && t.pkg_path == concrete.pkg_path) {
            self.possible_types.push(concrete);
        }
    }
}

#[derive(Clone, Debug)]
pub struct BoundMethodValue {
    pub receiver: Object,
    pub callee: Object,
}

/// The value universe. Closed tagged variant; every evaluator
/// code path matches exhaustively over this enum rather than working
/// through a trait-object `dyn Value`.
#[derive(Clone, Debug)]
pub enum Object {
    Integer(i64),
    Str(Rc<String>),
    Boolean(bool),
    Nil,

    Array(Rc<RefCell<Vec<Object>>>, BaseObject),
    Slice(Rc<RefCell<Vec<Object>>>, BaseObject),
    Map(Rc<RefCell<ObjectMap>>, BaseObject),

    /// Covers both struct literals and instances of named struct types,
    /// since a Go instance of a named struct type IS a struct value.
    Struct(Rc<RefCell<StructValue>>),
    Pointer(Rc<RefCell<Object>>, BaseObject),

    Function(Rc<FunctionValue>),
    Intrinsic(Rc<IntrinsicValue>),
    BoundMethod(Rc<BoundMethodValue>),

    Package(Rc<RefCell<PackageValue>>),

    SymbolicPlaceholder(Rc<PlaceholderValue>),
    UnresolvedFunction(Rc<UnresolvedFunctionValue>),

    MultiReturn(Vec<Object>),
    /// Control-flow marker for `return`. Transient: never stored as a field
    /// value, map value, or passed as an argument — `Apply` and the block
    /// executor strip it at the right boundary.
    ReturnValue(Box<Object>, Option<FieldType>),
    Break(Option<Name>),
    Continue(Option<Name>),
    Error(Box<EvalError>),

    Variable(Rc<RefCell<VariableValue>>),
    TypeRef(Arc<TypeInfo>),
}

/// Process-wide `Nil` value. `Nil` carries no payload, so any two
/// `Object::Nil` values are indistinguishable and `is_nil` is the correct
/// "is this NIL" check rather than comparing addresses.
pub const NIL: Object = Object::Nil;
pub const TRUE: Object = Object::Boolean(true);
pub const FALSE: Object = Object::Boolean(false);

impl Object {
    pub fn is_nil(&self) -> bool {
        matches!(self, Object::Nil)
    }

    pub fn bool_value(value: bool) -> Object {
        if value {
            TRUE
        } else {
            FALSE
        }
    }

    /// `true` for the control-flow marker variants that must never leak
    /// into field values, map values, or call arguments.
    pub fn is_control_flow(&self) -> bool {
        matches!(
            self,
            Object::ReturnValue(..) | Object::Break(_) | Object::Continue(_) | Object::Error(_)
        )
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Integer(_) => "Integer",
            Object::Str(_) => "String",
            Object::Boolean(_) => "Boolean",
            Object::Nil => "Nil",
            Object::Array(..) => "Array",
            Object::Slice(..) => "Slice",
            Object::Map(..) => "Map",
            Object::Struct(_) => "Struct",
            Object::Pointer(..) => "Pointer",
            Object::Function(_) => "Function",
            Object::Intrinsic(_) => "Intrinsic",
            Object::BoundMethod(_) => "BoundMethod",
            Object::Package(_) => "Package",
            Object::SymbolicPlaceholder(_) => "SymbolicPlaceholder",
            Object::UnresolvedFunction(_) => "UnresolvedFunction",
            Object::MultiReturn(_) => "MultiReturn",
            Object::ReturnValue(..) => "ReturnValue",
            Object::Break(_) => "Break",
            Object::Continue(_) => "Continue",
            Object::Error(_) => "Error",
            Object::Variable(_) => "Variable",
            Object::TypeRef(_) => "TypeRef",
        }
    }

    /// Unwrap one level of `Variable`, returning the current value. Most
    /// evaluator code wants the value an identifier denotes, not the cell.
    pub fn deref_variable(&self) -> Object {
        match self {
            Object::Variable(cell) => cell.borrow().value.clone(),
            other => other.clone(),
        }
    }

    /// Build a placeholder of the given reason, optionally typed.
    pub fn placeholder(reason: impl Into<String>, type_info: Option<Arc<TypeInfo>>) -> Object {
        Object::SymbolicPlaceholder(Rc::new(PlaceholderValue {
            reason: reason.into(),
            base: BaseObject {
                type_info,
                field_type: None,
            },
        }))
    }

    /// Build a fresh `Variable` cell. Used by every binding site (`var`
    /// declarations, parameter binding, short declarations, `range`
    /// bindings) so the declared-static-type / possible-types bookkeeping
    /// stays in one place.
    pub fn new_variable(name: Name, value: Object, static_type: Option<Arc<TypeInfo>>, mutable: bool) -> Object {
        Object::Variable(Rc::new(RefCell::new(VariableValue {
            name,
            value,
            static_type,
            possible_types: Vec::new(),
            mutable,
        })))
    }

    /// `Arc<TypeInfo>` this object's current concrete type, if it has one
    /// worth recording into a `Variable.PossibleTypes` set. `Nil`
    /// and untyped literals have none.
    pub fn concrete_type_info(&self) -> Option<Arc<TypeInfo>> {
        match self {
            Object::Struct(s) => s.borrow().base.type_info.clone(),
            Object::Pointer(_, base) | Object::Array(_, base) | Object::Slice(_, base) | Object::Map(_, base) => {
                base.type_info.clone()
            }
            Object::SymbolicPlaceholder(p) => p.base.type_info.clone(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_is_nil() {
        assert!(NIL.is_nil());
        assert!(!TRUE.is_nil());
    }

    #[test]
    fn bool_value_maps_to_singletons() {
        assert!(matches!(Object::bool_value(true), Object::Boolean(true)));
        assert!(matches!(Object::bool_value(false), Object::Boolean(false)));
    }

    #[test]
    fn control_flow_markers_are_flagged() {
        assert!(Object::Break(None).is_control_flow());
        assert!(Object::Continue(None).is_control_flow());
        assert!(!Object::Integer(1).is_control_flow());
    }

    #[test]
    fn deref_variable_unwraps_the_cell() {
        let cell = Rc::new(RefCell::new(VariableValue {
            name: Name::EMPTY,
            value: Object::Integer(7),
            static_type: None,
            possible_types: Vec::new(),
            mutable: true,
        }));
        let variable = Object::Variable(cell);
        assert!(matches!(variable.deref_variable(), Object::Integer(7)));
    }
}
