//! Data shapes produced by the scanner frontend, and the `Scanner`
//! collaborator interface itself. The frontend that actually
//! walks source files and builds these is out of scope; this crate only
//! models the shapes the evaluator reads so the evaluator can be built and
//! tested against hand-written fixtures.

use crate::ast::{Arena, FuncId, Param};
use crate::name::Name;
use crate::span::{FileSet, Span};
use rustc_hash::FxHashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// A function/method body, paired with the arena it indexes into. Carried
/// alongside the `FuncId` because a package's declarations may come from
/// several parsed files, each with its own arena.
#[derive(Clone, Debug)]
pub struct FuncBody {
    pub arena: Arc<Arena>,
    pub func: FuncId,
}

/// Kind of a resolved type.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum TypeKind {
    Basic,
    Struct,
    Interface,
    Alias,
    Named,
    Pointer,
    Slice,
    Array,
    Map,
    Func,
}

/// A field or embedded-type entry of a struct or interface.
#[derive(Clone, Debug)]
pub struct FieldInfo {
    pub name: Name,
    pub field_type: FieldType,
    /// `true` for an embedded (anonymous) field/interface, which
    /// participates in promoted-selector BFS lookup.
    pub embedded: bool,
}

/// A struct's declared shape.
#[derive(Clone, Debug, Default)]
pub struct StructInfo {
    /// Fields in declaration order (embedded fields included, `embedded:
    /// true`). Declaration order matters: BFS method/field promotion ties
    /// are broken by this order, and remaining ties become "ambiguous
    /// selector" errors.
    pub fields: Vec<FieldInfo>,
}

/// An interface's declared method set.
#[derive(Clone, Debug, Default)]
pub struct InterfaceInfo {
    pub methods: Vec<FunctionInfo>,
    /// Embedded interfaces, promoted the same way embedded struct fields are.
    pub embeds: Vec<TypeInfo>,
}

/// Resolved (or deliberately unresolved) static type information.
///
/// An "unresolved" `TypeInfo` is a first-class placeholder:
/// the shallow-scan path returns one instead of `nil`/`Option::None`, so
/// downstream evaluator logic never needs a nil-guard — it always has a
/// `TypeInfo` to attach to an `Object`, just one that says "don't know more
/// than the name".
#[derive(Clone, Debug)]
pub struct TypeInfo {
    pub name: Name,
    pub pkg_path: Name,
    pub kind: TypeKind,
    pub struct_info: Option<StructInfo>,
    pub interface_info: Option<InterfaceInfo>,
    pub underlying: Option<Arc<TypeInfo>>,
    /// Type-list/union constraint terms, for generic interface constraints
    /// like `~int | string`. Empty for ordinary interfaces.
    pub type_list: Vec<TypeListTerm>,
    /// `true` if this came from a policy-gated shallow scan: only name,
    /// package and (if cheaply available) method signatures are known.
    pub unresolved: bool,
}

#[derive(Clone, Debug)]
pub struct TypeListTerm {
    pub type_name: Name,
    pub underlying_only: bool,
}

impl TypeInfo {
    /// Build a minimal unresolved placeholder carrying identity only.
    pub fn unresolved_named(name: Name, pkg_path: Name) -> Self {
        TypeInfo {
            name,
            pkg_path,
            kind: TypeKind::Named,
            struct_info: None,
            interface_info: None,
            underlying: None,
            type_list: Vec::new(),
            unresolved: true,
        }
    }
}

/// A field's declared type, as it appears in source before or independent
/// of full resolution. Always carries at least a textual name; `resolved`
/// is populated when (and only when) the declaring package was scanned
/// deeply enough to produce a full `TypeInfo`.
#[derive(Clone, Debug)]
pub struct FieldType {
    pub name: Name,
    pub is_pointer: bool,
    pub is_slice: bool,
    pub is_variadic: bool,
    pub resolved: Option<Arc<TypeInfo>>,
}

impl FieldType {
    pub fn simple(name: Name) -> Self {
        FieldType {
            name,
            is_pointer: false,
            is_slice: false,
            is_variadic: false,
            resolved: None,
        }
    }
}

/// A scanned function or method signature, with its body if the owning
/// package was scanned deeply.
#[derive(Clone, Debug)]
pub struct FunctionInfo {
    pub name: Name,
    pub pkg_path: Name,
    /// Receiver field type, for methods. `is_pointer` distinguishes value
    /// vs. pointer receivers for intrinsic-key purposes.
    pub recv: Option<FieldType>,
    pub type_params: Vec<Name>,
    pub params: Vec<FieldType>,
    pub results: Vec<FieldType>,
    pub is_variadic: bool,
    /// Populated only for in-policy, deeply scanned functions.
    pub body: Option<FuncBody>,
}

/// A constant's literal value, when the scanner could resolve one at scan
/// time (a simple literal initializer — `const K = 42`, not an arbitrary
/// expression, which the shallow-scan data model has no room to carry).
#[derive(Clone, Debug)]
pub enum ConstValue {
    Integer(i64),
    Str(String),
    Bool(bool),
}

/// Everything the scanner knows about one package.
pub struct PackageInfo {
    pub import_path: Name,
    /// `main` packages are renamed to `<import_path>.main` so multiple
    /// analyzed `main` packages in one workspace don't collide.
    pub name: Name,
    pub ast_files: FxHashMap<PathBuf, Arc<Arena>>,
    pub types: Vec<TypeInfo>,
    pub functions: Vec<FunctionInfo>,
    pub constants: Vec<(Name, FieldType)>,
    pub variables: Vec<(Name, FieldType)>,
    /// Literal values for the subset of `constants` the scanner resolved to
    /// a simple literal.
    pub constant_values: FxHashMap<Name, ConstValue>,
    pub fset: Arc<FileSet>,
}

impl PackageInfo {
    pub fn find_type(&self, name: Name) -> Option<&TypeInfo> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn find_function(&self, name: Name) -> Option<&FunctionInfo> {
        self.functions.iter().find(|f| f.name == name && f.recv.is_none())
    }
}

/// Normalizes a scanned package's name for `main` packages.
///
/// All intrinsic keys and lookups must use the normalized form, so this is
/// the single place that decision is made.
pub fn normalize_package_name(import_path: &str, raw_name: &str) -> String {
    if raw_name == "main" {
        format!("{import_path}.main")
    } else {
        raw_name.to_string()
    }
}

/// Position information for one span, independent of which arena it lives in.
#[derive(Copy, Clone, Debug)]
pub struct SourcePos {
    pub span: Span,
}

/// The scanner collaborator interface. The evaluator only ever
/// calls through this trait; it never constructs `PackageInfo` itself.
pub trait Scanner {
    /// Scan a package by its import path. Returns an error if the package
    /// cannot be located or (for an in-policy package) fails to parse.
    fn scan_package_by_import(&self, import_path: &str) -> Result<Arc<PackageInfo>, String>;

    /// Scan an explicit list of files as a single package (used for the
    /// workspace's own `main` packages, which aren't resolved by import
    /// path alone).
    fn scan_files(&self, files: &[PathBuf]) -> Result<Arc<PackageInfo>, String>;

    /// The shared file set used to resolve positions across every package
    /// this scanner has produced.
    fn fset(&self) -> Arc<FileSet>;

    /// Map short import aliases used within one file to full import paths,
    /// e.g. `{"fmt": "fmt", "b": "bytes"}`.
    fn build_import_lookup(&self, file: &PathBuf) -> FxHashMap<String, String>;
}


// Re-exported for consumers that only need a Param shape without pulling in
// the full `ast` module path.
pub type RecvParam = Param;
