//! The six end-to-end scenarios. Each builds one or two in-memory packages
//! with the `Builder`/`FixtureScanner` harness, runs them through a real
//! `Interpreter`, and checks the observable outcome the scenario names —
//! not intermediate object shapes.

use super::fixtures::{const_package, empty_type_info, Builder, FixtureScanner};
use crate::{allow_all, IntrinsicValue, Interpreter, MethodKey, Object, Receiver, Resolver};
use gosym_ir::{FieldType, FileSet, FunctionInfo, PackageInfo, StringInterner};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

fn empty_package(interner: &StringInterner, import_path: &str, functions: Vec<FunctionInfo>) -> PackageInfo {
    PackageInfo {
        import_path: interner.intern(import_path),
        name: interner.intern(import_path.rsplit('/').next().unwrap_or(import_path)),
        ast_files: FxHashMap::default(),
        types: Vec::new(),
        functions,
        constants: Vec::new(),
        variables: Vec::new(),
        constant_values: FxHashMap::default(),
        fset: Arc::new(FileSet::new()),
    }
}

/// 1. Package selector lazy load: `main` imports `p`, which exports `const
/// K = 42`; `main.main` assigns `V = p.K` and returns it. `p` must be
/// scanned exactly once.
#[test]
fn package_selector_lazy_load() {
    let interner = StringInterner::new();
    let scanner = Rc::new(FixtureScanner::new());
    scanner.register("p", const_package(&interner, "p", "K", 42));

    let resolver = Rc::new(Resolver::new(scanner.clone(), allow_all(), interner.clone()));
    let mut interp = Interpreter::builder(&interner, resolver).build();

    let mut b = Builder::new(&interner);
    let p_dot_k = {
        let p_ident = b.ident("p");
        b.selector(p_ident, "K")
    };
    let decl = b.define(&["V"], vec![p_dot_k]);
    let v_ident = b.ident("V");
    let ret = b.ret(vec![v_ident]);
    let body = b.block(vec![decl, ret]);
    let main_pkg_path = interner.intern("m/main");
    let (main_id, main_info) = b.func("main", &[], body, main_pkg_path);
    let (_, functions) = b.finish(vec![(main_id, main_info)]);

    let main_pkg = empty_package(&interner, "m/main", functions);
    let mut import_lookup = FxHashMap::default();
    import_lookup.insert("p".to_string(), "p".to_string());
    interp.eval_file(&main_pkg, &import_lookup).unwrap();

    let main_fn = interp.env.get(interner.intern("main")).expect("main defined");
    let result = interp.apply(main_fn, vec![]);

    assert!(matches!(result, Object::Integer(42)), "expected Integer(42), got {result:?}");
    assert_eq!(scanner.scan_count("p"), 1);
}

/// 2. Intrinsic dispatch: a registered intrinsic for `m/pkg.Foo` is invoked
/// with the call's evaluated arguments and its return value becomes the
/// call's result.
#[test]
fn intrinsic_dispatch() {
    let interner = StringInterner::new();
    let pkg_path = interner.intern("pkg");
    let foo_name = interner.intern("Foo");

    let foo_info = FunctionInfo {
        name: foo_name,
        pkg_path,
        recv: None,
        type_params: Vec::new(),
        params: vec![FieldType::simple(interner.intern("int")), FieldType::simple(interner.intern("int"))],
        results: vec![FieldType::simple(interner.intern("string"))],
        is_variadic: false,
        body: None,
    };
    let scanner = Rc::new(FixtureScanner::new());
    scanner.register("pkg", empty_package(&interner, "pkg", vec![foo_info]));

    let resolver = Rc::new(Resolver::new(scanner.clone(), allow_all(), interner.clone()));
    let mut interp = Interpreter::builder(&interner, resolver).build();

    let seen: Rc<RefCell<Vec<Vec<Object>>>> = Rc::new(RefCell::new(Vec::new()));
    let seen_handler = seen.clone();
    interp.intrinsics.register(
        MethodKey::function(pkg_path, foo_name),
        Rc::new(IntrinsicValue {
            key_display: "pkg.Foo".to_string(),
            handler: Rc::new(move |_interp, args| {
                seen_handler.borrow_mut().push(args);
                Object::Str(Rc::new("ok".to_string()))
            }),
        }),
    );

    let mut b = Builder::new(&interner);
    let call = {
        let pkg_ident = b.ident("pkg");
        let foo_sel = b.selector(pkg_ident, "Foo");
        let one = b.int(1);
        let two = b.int(2);
        b.call(foo_sel, vec![one, two])
    };
    let ret = b.ret(vec![call]);
    let body = b.block(vec![ret]);
    let main_pkg_path = interner.intern("m/main");
    let (main_id, main_info) = b.func("main", &[], body, main_pkg_path);
    let (_, functions) = b.finish(vec![(main_id, main_info)]);

    let main_pkg = empty_package(&interner, "m/main", functions);
    let mut import_lookup = FxHashMap::default();
    import_lookup.insert("pkg".to_string(), "pkg".to_string());
    interp.eval_file(&main_pkg, &import_lookup).unwrap();

    let main_fn = interp.env.get(interner.intern("main")).expect("main defined");
    let result = interp.apply(main_fn, vec![]);

    match result {
        Object::Str(s) => assert_eq!(*s, "ok"),
        other => panic!("expected String(\"ok\"), got {other:?}"),
    }
    let calls = seen.borrow();
    assert_eq!(calls.len(), 1);
    assert!(matches!(calls[0][0], Object::Integer(1)));
    assert!(matches!(calls[0][1], Object::Integer(2)));
}

/// 3. Interface binding: `io.Writer` is bound to `*bytes.Buffer`, and an
/// intrinsic is registered on `(*bytes.Buffer).WriteString`. A function
/// parameter declared `io.Writer` keeps that static type no matter what
/// concrete value is passed, and a call through it reaches the intrinsic.
#[test]
fn interface_binding_dispatches_through_bound_concrete_type() {
    use crate::interface_binding::TypePath;

    let interner = StringInterner::new();
    let io_pkg = interner.intern("io");
    let writer_name = interner.intern("Writer");
    let bytes_pkg = interner.intern("bytes");
    let buffer_name = interner.intern("Buffer");
    let write_string_name = interner.intern("WriteString");

    let write_string_method = FunctionInfo {
        name: write_string_name,
        pkg_path: io_pkg,
        recv: None,
        type_params: Vec::new(),
        params: vec![FieldType::simple(interner.intern("string"))],
        results: Vec::new(),
        is_variadic: false,
        body: None,
    };
    let writer_iface = Arc::new(gosym_ir::TypeInfo {
        name: writer_name,
        pkg_path: io_pkg,
        kind: gosym_ir::TypeKind::Interface,
        struct_info: None,
        interface_info: Some(gosym_ir::InterfaceInfo {
            methods: vec![write_string_method],
            embeds: Vec::new(),
        }),
        underlying: None,
        type_list: Vec::new(),
        unresolved: false,
    });

    let scanner = Rc::new(FixtureScanner::new());
    let resolver = Rc::new(Resolver::new(scanner, allow_all(), interner.clone()));

    // `(*bytes.Buffer).WriteString` is declared with a pointer receiver, the
    // way the interface-satisfying method would be; its signature is all the
    // resolver needs.
    let buffer_write_string = FunctionInfo {
        name: write_string_name,
        pkg_path: bytes_pkg,
        recv: Some(FieldType {
            name: buffer_name,
            is_pointer: true,
            is_slice: false,
            is_variadic: false,
            resolved: None,
        }),
        type_params: Vec::new(),
        params: vec![FieldType::simple(interner.intern("string"))],
        results: Vec::new(),
        is_variadic: false,
        body: None,
    };
    resolver.register_methods(bytes_pkg, &[buffer_write_string]);

    let mut interp = Interpreter::builder(&interner, resolver).build();
    interp.bindings.bind(TypePath::new(io_pkg, writer_name), TypePath::new(bytes_pkg, buffer_name));

    let calls: Rc<RefCell<usize>> = Rc::new(RefCell::new(0));
    let calls_handler = calls.clone();
    interp.intrinsics.register(
        MethodKey::method(bytes_pkg, buffer_name, write_string_name, Receiver::Pointer),
        Rc::new(IntrinsicValue {
            key_display: "(*bytes.Buffer).WriteString".to_string(),
            handler: Rc::new(move |_interp, _args| {
                *calls_handler.borrow_mut() += 1;
                Object::Nil
            }),
        }),
    );

    let mut b = Builder::new(&interner);
    let call = {
        let w_ident = b.ident("w");
        let write_sel = b.selector(w_ident, "WriteString");
        let hi = b.string_lit("hi");
        b.call(write_sel, vec![hi])
    };
    let expr_stmt = b.expr_stmt(call);
    let body = b.block(vec![expr_stmt]);
    let main_pkg_path = interner.intern("m/main");
    let (f_id, mut f_info) = b.func("F", &["w"], body, main_pkg_path);
    // The builder's generic `param` helper gives every parameter an `int`
    // shape; overwrite `w`'s declared type with the interface this scenario
    // is actually about.
    f_info.params = vec![FieldType {
        name: writer_name,
        is_pointer: false,
        is_slice: false,
        is_variadic: false,
        resolved: Some(writer_iface),
    }];
    let (_, functions) = b.finish(vec![(f_id, f_info)]);

    let main_pkg = empty_package(&interner, "m/main", functions);
    interp.eval_file(&main_pkg, &FxHashMap::default()).unwrap();

    let f = interp.env.get(interner.intern("F")).expect("F defined");
    // The argument's own concrete type is irrelevant to what `w`'s static
    // type ends up being — pass a plain Nil to make that point sharply.
    let result = interp.apply(f, vec![Object::Nil]);

    assert!(!result.is_error(), "unexpected error: {result:?}");
    assert_eq!(*calls.borrow(), 1);
}

/// 4. If-both-branches: intrinsics `A` and `B` sit in the then- and
/// else-branches of a condition whose value is itself symbolic (unknown).
/// Both must be recorded as called.
#[test]
fn if_both_branches_are_evaluated() {
    let interner = StringInterner::new();
    let scanner = Rc::new(FixtureScanner::new());
    let resolver = Rc::new(Resolver::new(scanner, allow_all(), interner.clone()));
    let mut interp = Interpreter::builder(&interner, resolver).build();

    let main_pkg_path = interner.intern("m/main");
    let called: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

    let mut register_recorder = |interp: &mut Interpreter<'_>, name: &'static str| {
        let recorder = called.clone();
        interp.intrinsics.register(
            MethodKey::function(main_pkg_path, interner.intern(name)),
            Rc::new(IntrinsicValue {
                key_display: name.to_string(),
                handler: Rc::new(move |_interp, _args| {
                    recorder.borrow_mut().push(name);
                    Object::Nil
                }),
            }),
        );
    };
    register_recorder(&mut interp, "unknown");
    register_recorder(&mut interp, "A");
    register_recorder(&mut interp, "B");

    let mut b = Builder::new(&interner);
    let unknown_ident = b.ident("unknown");
    let unknown_call = b.call(unknown_ident, vec![]);
    let cond_decl = b.define(&["cond"], vec![unknown_call]);
    let cond_ident = b.ident("cond");
    let then_block = {
        let a_ident = b.ident("A");
        let a_call = b.call(a_ident, vec![]);
        let stmt = b.expr_stmt(a_call);
        b.block(vec![stmt])
    };
    let else_block = {
        let b_ident = b.ident("B");
        let b_call = b.call(b_ident, vec![]);
        let stmt = b.expr_stmt(b_call);
        b.block(vec![stmt])
    };
    let if_stmt = b.if_stmt(cond_ident, then_block, Some(else_block));
    let body = b.block(vec![cond_decl, if_stmt]);
    let (main_id, main_info) = b.func("main", &[], body, main_pkg_path);

    // `unknown`, `A`, `B` are declared alongside `main` purely so
    // `eval_file` installs each as the registered `Intrinsic` rather than a
    // bodyless `Function`; none carry real bodies of their own.
    let no_op = |name: &str| FunctionInfo {
        name: interner.intern(name),
        pkg_path: main_pkg_path,
        recv: None,
        type_params: Vec::new(),
        params: Vec::new(),
        results: vec![FieldType::simple(interner.intern("bool"))],
        is_variadic: false,
        body: None,
    };
    let (_, mut functions) = b.finish(vec![(main_id, main_info)]);
    functions.push(no_op("unknown"));
    functions.push(no_op("A"));
    functions.push(no_op("B"));

    let main_pkg = empty_package(&interner, "m/main", functions);
    interp.eval_file(&main_pkg, &FxHashMap::default()).unwrap();

    let main_fn = interp.env.get(interner.intern("main")).expect("main defined");
    let result = interp.apply(main_fn, vec![]);

    assert!(!result.is_error(), "unexpected error: {result:?}");
    let seen = called.borrow();
    assert!(seen.contains(&"A"), "then-branch intrinsic A was not called: {seen:?}");
    assert!(seen.contains(&"B"), "else-branch intrinsic B was not called: {seen:?}");
}

/// 5. Shallow-scan method: `third/party` is out of policy. A function
/// returns a value of its unresolved type `Foo`; calling `.Bar()` on that
/// value never triggers a scan of `third/party`, and yields a placeholder
/// typed by `Bar`'s declared return — known because a separate, cheap
/// signature pass (not a body parse) already told the resolver about it.
#[test]
fn shallow_scan_method_returns_a_typed_placeholder_without_parsing() {
    let interner = StringInterner::new();
    let third_party = interner.intern("third/party");
    let foo_name = interner.intern("Foo");
    let bar_name = interner.intern("Bar");

    let foo_type = empty_type_info(&interner, "third/party", "Foo");
    let status_type = empty_type_info(&interner, "third/party", "Status");

    let scanner = Rc::new(FixtureScanner::new());
    let policy: crate::ScanPolicy = Rc::new(|path: &str| path != "third/party");
    let resolver = Rc::new(Resolver::new(scanner.clone(), policy, interner.clone()));

    let bar_info = FunctionInfo {
        name: bar_name,
        pkg_path: third_party,
        recv: Some(FieldType {
            name: foo_name,
            is_pointer: false,
            is_slice: false,
            is_variadic: false,
            resolved: None,
        }),
        type_params: Vec::new(),
        params: Vec::new(),
        results: vec![FieldType {
            name: interner.intern("Status"),
            is_pointer: false,
            is_slice: false,
            is_variadic: false,
            resolved: Some(status_type.clone()),
        }],
        is_variadic: false,
        body: None,
    };
    resolver.register_methods(third_party, &[bar_info]);

    let mut interp = Interpreter::builder(&interner, resolver).build();

    let main_pkg_path = interner.intern("m/main");
    let mut b = Builder::new(&interner);
    let f_body = {
        let foo_val_ident = b.ident("fooVal");
        let ret = b.ret(vec![foo_val_ident]);
        b.block(vec![ret])
    };
    let (f_id, f_info) = b.func("F", &[], f_body, main_pkg_path);

    let entry_body = {
        let f_ident = b.ident("F");
        let f_call = b.call(f_ident, vec![]);
        let bar_sel = b.selector(f_call, "Bar");
        let bar_call = b.call(bar_sel, vec![]);
        let ret = b.ret(vec![bar_call]);
        b.block(vec![ret])
    };
    let (entry_id, entry_info) = b.func("main", &[], entry_body, main_pkg_path);
    let (_, functions) = b.finish(vec![(f_id, f_info), (entry_id, entry_info)]);

    let mut main_pkg = empty_package(&interner, "m/main", functions);
    main_pkg.variables.push((
        interner.intern("fooVal"),
        FieldType {
            name: foo_name,
            is_pointer: false,
            is_slice: false,
            is_variadic: false,
            resolved: Some(foo_type),
        },
    ));
    interp.eval_file(&main_pkg, &FxHashMap::default()).unwrap();

    let main_fn = interp.env.get(interner.intern("main")).expect("main defined");
    let result = interp.apply(main_fn, vec![]);

    match result {
        Object::SymbolicPlaceholder(p) => {
            let ty = p.base.type_info.as_ref().expect("placeholder should carry Bar's declared return type");
            assert_eq!(ty.name, interner.intern("Status"));
            assert_eq!(ty.pkg_path, third_party);
        }
        other => panic!("expected a typed placeholder, got {other:?}"),
    }
    assert_eq!(scanner.scan_count("third/party"), 0);
}

/// 6. Memoization: a helper called from two call sites runs its body once
/// with memoization on, twice with it off, exactly as observed through an
/// intrinsic the helper calls.
#[test]
fn memoization_runs_a_shared_helper_once_or_twice() {
    for (memoize, expected_calls) in [(true, 1), (false, 2)] {
        let interner = StringInterner::new();
        let scanner = Rc::new(FixtureScanner::new());
        let resolver = Rc::new(Resolver::new(scanner, allow_all(), interner.clone()));
        let mut interp = Interpreter::builder(&interner, resolver).memoize(memoize).build();

        let main_pkg_path = interner.intern("m/main");
        let counter: Rc<RefCell<usize>> = Rc::new(RefCell::new(0));
        let counter_handler = counter.clone();
        interp.intrinsics.register(
            MethodKey::function(main_pkg_path, interner.intern("count")),
            Rc::new(IntrinsicValue {
                key_display: "count".to_string(),
                handler: Rc::new(move |_interp, _args| {
                    *counter_handler.borrow_mut() += 1;
                    Object::Nil
                }),
            }),
        );

        let mut b = Builder::new(&interner);
        let helper_body = {
            let count_ident = b.ident("count");
            let count_call = b.call(count_ident, vec![]);
            let stmt = b.expr_stmt(count_call);
            b.block(vec![stmt])
        };
        let (helper_id, helper_info) = b.func("helper", &[], helper_body, main_pkg_path);

        let entry_body = {
            let h1 = b.ident("helper");
            let call1 = b.call(h1, vec![]);
            let s1 = b.expr_stmt(call1);
            let h2 = b.ident("helper");
            let call2 = b.call(h2, vec![]);
            let s2 = b.expr_stmt(call2);
            b.block(vec![s1, s2])
        };
        let (entry_id, entry_info) = b.func("main", &[], entry_body, main_pkg_path);
        let (_, mut functions) = b.finish(vec![(helper_id, helper_info), (entry_id, entry_info)]);
        functions.push(FunctionInfo {
            name: interner.intern("count"),
            pkg_path: main_pkg_path,
            recv: None,
            type_params: Vec::new(),
            params: Vec::new(),
            results: Vec::new(),
            is_variadic: false,
            body: None,
        });

        let main_pkg = empty_package(&interner, "m/main", functions);
        interp.eval_file(&main_pkg, &FxHashMap::default()).unwrap();

        let main_fn = interp.env.get(interner.intern("main")).expect("main defined");
        let result = interp.apply(main_fn, vec![]);

        assert!(!result.is_error(), "unexpected error: {result:?}");
        assert_eq!(*counter.borrow(), expected_calls, "memoize={memoize}");
    }
}
