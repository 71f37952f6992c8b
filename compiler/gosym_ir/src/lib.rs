//! Shared intermediate representation: interned names, source spans, the
//! Go-like AST, and the scanner-produced shapes the evaluator consumes.
//!
//! This crate has no evaluation logic of its own — it only defines the data
//! the scanner frontend hands in and the AST shapes an evaluator walks.

pub mod ast;
pub mod name;
pub mod scan;
pub mod span;

pub use ast::{
    Arena, AssignOp, BinaryOp, BranchKind, CaseClause, Expr, ExprId, ExprKind, FuncDecl, FuncId,
    Param, Stmt, StmtId, StmtKind, TypeCaseClause, UnaryOp, UnionTerm,
};
pub use name::{Name, StringInterner};
pub use scan::{
    normalize_package_name, ConstValue, FieldInfo, FieldType, FuncBody, FunctionInfo,
    InterfaceInfo, PackageInfo, Scanner, SourcePos, StructInfo, TypeInfo, TypeKind, TypeListTerm,
};
pub use span::{FileId, FileSet, Position, Span};
