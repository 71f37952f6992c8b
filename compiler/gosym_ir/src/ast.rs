//! Go-like abstract syntax tree.
//!
//! Nodes are addressed by id into an `Arena` rather than boxed recursively.
//! The indirection matters for two things the evaluator depends on: a
//! `FunctionValue` can carry a `StmtId`/`ExprId` into an arena shared with
//! its capturing environment without lifetime gymnastics, and recursive
//! structures (a function whose body calls itself) don't need `Rc`-cycles
//! at the syntax-tree level.

use crate::name::Name;
use crate::span::Span;

macro_rules! arena_id {
    ($name:ident) => {
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                $name(raw)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id!(ExprId);
arena_id!(StmtId);
arena_id!(FuncId);

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Land,
    Lor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `+x`
    Plus,
    /// `!x`
    Not,
    /// `^x` (bitwise complement)
    Complement,
    /// `&x` (address-of)
    Addr,
    /// `*x` (dereference, when `x` evaluates to a `Pointer`)
    Deref,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `:=`
    Define,
    /// `+=`, `-=`, ... desugars to a binary op at assignment time.
    Compound(BinaryOp),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum BranchKind {
    Break,
    Continue,
}

/// One expression node.
#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Ident(Name),
    IntLit(i64),
    StringLit(Name),
    BoolLit(bool),
    NilLit,

    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Unary {
        op: UnaryOp,
        expr: ExprId,
    },

    /// `x.Sel` — selector expression (package member, struct field, or method).
    Selector {
        expr: ExprId,
        sel: Name,
    },
    Index {
        expr: ExprId,
        index: ExprId,
    },
    SliceExpr {
        expr: ExprId,
        low: Option<ExprId>,
        high: Option<ExprId>,
    },
    /// `f(args...)`. `ellipsis` marks `f(xs...)` variadic-slice spreading.
    Call {
        func: ExprId,
        args: Vec<ExprId>,
        ellipsis: bool,
    },
    /// `F[T1, T2]` explicit generic instantiation.
    IndexList {
        expr: ExprId,
        type_args: Vec<ExprId>,
    },
    /// `T{elements...}` composite literal. `type_expr` is absent for the
    /// element-position literals inside an already-typed outer literal.
    CompositeLit {
        type_expr: Option<ExprId>,
        elements: Vec<ExprId>,
    },
    /// `key: value` inside a composite literal or map literal.
    KeyValue {
        key: ExprId,
        value: ExprId,
    },
    /// `x.(T)`. `ty` is `None` inside a type-switch guard (`x.(type)`).
    TypeAssert {
        expr: ExprId,
        ty: Option<ExprId>,
    },
    FuncLit {
        decl: FuncId,
    },
    Paren(ExprId),

    // Type expressions. Go blurs expression and type grammar; these appear
    // wherever a type is syntactically expected (composite literal heads,
    // `make`/`new` arguments, type-switch case lists, parameter types).
    ArrayType {
        len: Option<ExprId>,
        elem: ExprId,
    },
    SliceType {
        elem: ExprId,
    },
    MapType {
        key: ExprId,
        value: ExprId,
    },
    PointerType {
        elem: ExprId,
    },
    InterfaceType {
        methods: Vec<Name>,
    },
    StructType {
        fields: Vec<Name>,
    },
    /// `~int | string` type-list/union constraint (generic interfaces).
    UnionType {
        terms: Vec<UnionTerm>,
    },
}

#[derive(Clone, Debug)]
pub struct UnionTerm {
    pub type_expr: ExprId,
    /// `~T` matches any type whose underlying type is `T`, not just `T`.
    pub underlying_only: bool,
}

#[derive(Clone, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum StmtKind {
    ExprStmt(ExprId),
    AssignStmt {
        lhs: Vec<ExprId>,
        rhs: Vec<ExprId>,
        op: AssignOp,
    },
    VarDecl {
        names: Vec<Name>,
        type_expr: Option<ExprId>,
        values: Vec<ExprId>,
    },
    ConstDecl {
        names: Vec<Name>,
        type_expr: Option<ExprId>,
        values: Vec<ExprId>,
    },
    ReturnStmt {
        results: Vec<ExprId>,
    },
    IfStmt {
        init: Option<StmtId>,
        cond: ExprId,
        then_block: StmtId,
        else_stmt: Option<StmtId>,
    },
    ForStmt {
        init: Option<StmtId>,
        cond: Option<ExprId>,
        post: Option<StmtId>,
        body: StmtId,
    },
    RangeStmt {
        key: Option<Name>,
        value: Option<Name>,
        define: bool,
        x: ExprId,
        body: StmtId,
    },
    SwitchStmt {
        init: Option<StmtId>,
        tag: Option<ExprId>,
        cases: Vec<CaseClause>,
    },
    TypeSwitchStmt {
        init: Option<StmtId>,
        /// `v := x.(type)` binds `v` with a per-case narrowed type.
        bind: Option<Name>,
        x: ExprId,
        cases: Vec<TypeCaseClause>,
    },
    BranchStmt {
        kind: BranchKind,
        label: Option<Name>,
    },
    BlockStmt {
        stmts: Vec<StmtId>,
    },
    LabeledStmt {
        label: Name,
        stmt: StmtId,
    },
}

/// One `case` arm of a value `switch`. Empty `values` means `default`.
#[derive(Clone, Debug)]
pub struct CaseClause {
    pub values: Vec<ExprId>,
    pub body: Vec<StmtId>,
}

/// One `case` arm of a `switch x := y.(type)`. Empty `types` means `default`.
#[derive(Clone, Debug)]
pub struct TypeCaseClause {
    pub types: Vec<ExprId>,
    pub body: Vec<StmtId>,
}

#[derive(Clone, Debug)]
pub struct Param {
    pub name: Option<Name>,
    pub type_expr: ExprId,
}

/// A function or method declaration.
#[derive(Clone, Debug)]
pub struct FuncDecl {
    pub name: Name,
    /// Receiver, for methods (`func (r Receiver) Name(...)`).
    pub recv: Option<Param>,
    /// Generic type parameter names, e.g. `[T any]`.
    pub type_params: Vec<Name>,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    pub is_variadic: bool,
    /// `None` for a declaration with no body (e.g. an interface method, or
    /// an unresolved placeholder signature).
    pub body: Option<StmtId>,
}

/// Arena holding all expression, statement and function nodes for one
/// package's parsed source. Shared (by id, never by pointer) between every
/// `Environment`/`Object` that references code from this package.
#[derive(Default)]
pub struct Arena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    funcs: Vec<FuncDecl>,
}

impl Arena {
    pub fn new() -> Self {
        Arena::default()
    }

    pub fn alloc_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.exprs.push(Expr { kind, span });
        ExprId::from_raw((self.exprs.len() - 1) as u32)
    }

    pub fn alloc_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        self.stmts.push(Stmt { kind, span });
        StmtId::from_raw((self.stmts.len() - 1) as u32)
    }

    pub fn alloc_func(&mut self, decl: FuncDecl) -> FuncId {
        self.funcs.push(decl);
        FuncId::from_raw((self.funcs.len() - 1) as u32)
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn func(&self, id: FuncId) -> &FuncDecl {
        &self.funcs[id.index()]
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_and_retrieves_expr() {
        let mut arena = Arena::new();
        let id = arena.alloc_expr(ExprKind::IntLit(42), Span::DUMMY);
        assert!(matches!(arena.expr(id).kind, ExprKind::IntLit(42)));
    }

    #[test]
    fn expr_ids_are_stable_across_further_allocation() {
        let mut arena = Arena::new();
        let first = arena.alloc_expr(ExprKind::IntLit(1), Span::DUMMY);
        let _second = arena.alloc_expr(ExprKind::IntLit(2), Span::DUMMY);
        assert!(matches!(arena.expr(first).kind, ExprKind::IntLit(1)));
    }
}
