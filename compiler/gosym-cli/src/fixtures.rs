//! A tiny in-memory `Scanner` plus hand-built `PackageInfo` fixtures, so this
//! binary can exercise the evaluator end-to-end without a real Go-like
//! frontend. Modeled on
//! `gosym_eval`'s own test fixtures, trimmed to what a demo host needs.

use gosym_ir::{
    Arena, BinaryOp, ConstValue, ExprKind, FieldType, FileSet, FuncBody,
    FuncDecl, FunctionInfo, Param, PackageInfo, Scanner, Span, StmtId, StmtKind,
    StringInterner,
};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::Arc;

/// A `Scanner` backed by packages registered ahead of time, rather than
/// parsed from files. `scan_count` lets the demo print how many times each
/// package was actually loaded, the observable this binary cares about.
#[derive(Default)]
pub struct FixtureScanner {
    packages: RefCell<FxHashMap<String, Arc<PackageInfo>>>,
    scan_calls: RefCell<Vec<String>>,
}

impl FixtureScanner {
    pub fn register(&self, import_path: &str, info: PackageInfo) {
        self.packages.borrow_mut().insert(import_path.to_string(), Arc::new(info));
    }

    pub fn scan_count(&self, import_path: &str) -> usize {
        self.scan_calls.borrow().iter().filter(|p| p.as_str() == import_path).count()
    }
}

impl Scanner for FixtureScanner {
    fn scan_package_by_import(&self, import_path: &str) -> Result<Arc<PackageInfo>, String> {
        self.scan_calls.borrow_mut().push(import_path.to_string());
        self.packages
            .borrow()
            .get(import_path)
            .cloned()
            .ok_or_else(|| format!("fixture has no package registered for {import_path:?}"))
    }

    fn scan_files(&self, _files: &[PathBuf]) -> Result<Arc<PackageInfo>, String> {
        Err("FixtureScanner does not support scan_files".to_string())
    }

    fn fset(&self) -> Arc<FileSet> {
        Arc::new(FileSet::new())
    }

    fn build_import_lookup(&self, _file: &PathBuf) -> FxHashMap<String, String> {
        FxHashMap::default()
    }
}

/// `package mathutil; const Answer = 42; func Double(x int) int { return x * 2 }`
pub fn mathutil_package(interner: &StringInterner) -> PackageInfo {
    let pkg_path = interner.intern("example.com/mathutil");
    let mut arena = Arena::new();

    let x = interner.intern("x");
    let x_ident = arena.alloc_expr(ExprKind::Ident(x), Span::DUMMY);
    let two = arena.alloc_expr(ExprKind::IntLit(2), Span::DUMMY);
    let doubled = arena.alloc_expr(
        ExprKind::Binary { op: BinaryOp::Mul, left: x_ident, right: two },
        Span::DUMMY,
    );
    let ret: StmtId = arena.alloc_stmt(StmtKind::ReturnStmt { results: vec![doubled] }, Span::DUMMY);
    let body = arena.alloc_stmt(StmtKind::BlockStmt { stmts: vec![ret] }, Span::DUMMY);

    let double_name = interner.intern("Double");
    let func_id = arena.alloc_func(FuncDecl {
        name: double_name,
        recv: None,
        type_params: Vec::new(),
        params: vec![Param { name: Some(x), type_expr: x_ident }],
        results: Vec::new(),
        is_variadic: false,
        body: Some(body),
    });
    let arena = Arc::new(arena);

    let double_info = FunctionInfo {
        name: double_name,
        pkg_path,
        recv: None,
        type_params: Vec::new(),
        params: vec![FieldType::simple(interner.intern("int"))],
        results: vec![FieldType::simple(interner.intern("int"))],
        is_variadic: false,
        body: Some(FuncBody { arena: arena.clone(), func: func_id }),
    };

    let answer_name = interner.intern("Answer");
    let mut constant_values = FxHashMap::default();
    constant_values.insert(answer_name, ConstValue::Integer(42));

    PackageInfo {
        import_path: pkg_path,
        name: interner.intern("mathutil"),
        ast_files: FxHashMap::default(),
        types: Vec::new(),
        functions: vec![double_info],
        constants: vec![(answer_name, FieldType::simple(interner.intern("int")))],
        variables: Vec::new(),
        constant_values,
        fset: Arc::new(FileSet::new()),
    }
}

/// The entry package this binary evaluates: `V := mathutil.Answer` followed
/// by `R := mathutil.Double(V)`, exercising lazy package selection and a user call into the loaded package's function.
pub fn main_package(interner: &StringInterner) -> (Arc<Arena>, FunctionInfo) {
    let pkg_path = interner.intern("example.com/app");
    let mut arena = Arena::new();

    let mathutil = interner.intern("mathutil");
    let answer = interner.intern("Answer");
    let double = interner.intern("Double");
    let v = interner.intern("V");
    let r = interner.intern("R");

    let mathutil_ident = arena.alloc_expr(ExprKind::Ident(mathutil), Span::DUMMY);
    let answer_sel = arena.alloc_expr(ExprKind::Selector { expr: mathutil_ident, sel: answer }, Span::DUMMY);
    let v_decl: StmtId = arena.alloc_stmt(
        StmtKind::VarDecl { names: vec![v], type_expr: None, values: vec![answer_sel] },
        Span::DUMMY,
    );

    let mathutil_ident2 = arena.alloc_expr(ExprKind::Ident(mathutil), Span::DUMMY);
    let double_sel = arena.alloc_expr(ExprKind::Selector { expr: mathutil_ident2, sel: double }, Span::DUMMY);
    let v_ident = arena.alloc_expr(ExprKind::Ident(v), Span::DUMMY);
    let call = arena.alloc_expr(ExprKind::Call { func: double_sel, args: vec![v_ident], ellipsis: false }, Span::DUMMY);
    let r_decl = arena.alloc_stmt(
        StmtKind::VarDecl { names: vec![r], type_expr: None, values: vec![call] },
        Span::DUMMY,
    );

    let r_ident = arena.alloc_expr(ExprKind::Ident(r), Span::DUMMY);
    let ret = arena.alloc_stmt(StmtKind::ReturnStmt { results: vec![r_ident] }, Span::DUMMY);
    let body = arena.alloc_stmt(StmtKind::BlockStmt { stmts: vec![v_decl, r_decl, ret] }, Span::DUMMY);

    let main_name = interner.intern("main");
    let func_id = arena.alloc_func(FuncDecl {
        name: main_name,
        recv: None,
        type_params: Vec::new(),
        params: Vec::new(),
        results: Vec::new(),
        is_variadic: false,
        body: Some(body),
    });
    let arena = Arc::new(arena);

    let info = FunctionInfo {
        name: main_name,
        pkg_path,
        recv: None,
        type_params: Vec::new(),
        params: Vec::new(),
        results: vec![FieldType::simple(interner.intern("int"))],
        is_variadic: false,
        body: Some(FuncBody { arena: arena.clone(), func: func_id }),
    };
    (arena, info)
}
