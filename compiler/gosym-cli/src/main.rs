//! Demo host binary for the `gosym_eval` evaluator.
//!
//! Exercises the Interpreter API (`builder`, `RegisterIntrinsic`-equivalent
//! registration, `Eval`, `Apply`) against an in-memory fixture `Scanner` —
//! this binary ships its own hand-built `PackageInfo` fixtures instead of a
//! real Go-like frontend, since the scanner/parser is a separate concern
//! this workspace doesn't build.

mod fixtures;

use gosym_diagnostic::Error as EvalError;
use gosym_eval::{Interpreter, Object};
use gosym_ir::StringInterner;
use gosym_patterns::MethodKey;
use rustc_hash::FxHashMap;
use std::rc::Rc;
use std::sync::Arc;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("demo") | None => run_demo(),
        Some("intrinsic-demo") => run_intrinsic_demo(),
        Some("batch-demo") => run_batch_demo(),
        Some("help" | "--help" | "-h") => print_usage(),
        Some(other) => {
            eprintln!("unknown command: {other}");
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("gosym — demo host for the gosym_eval symbolic evaluator");
    println!();
    println!("Usage: gosym <command>");
    println!();
    println!("Commands:");
    println!("  demo             Lazy package selector load + a call into the loaded package");
    println!("  intrinsic-demo   Register an intrinsic and dispatch a call through it");
    println!("  batch-demo       Run several disjoint interpreter instances concurrently");
    println!("  help             Show this help message");
}

/// One interpreter, one package, one answer: built fresh so it can run on
/// any thread. `Interpreter` itself is `!Send`/`!Sync` (its environments and
/// package cache are `Rc`/`RefCell`), so the only way to evaluate more than
/// one program at a time is the host driving several *disjoint* instances —
/// never sharing one interpreter's state across threads. This is that: each
/// call owns its interner, scanner and resolver end to end.
fn evaluate_one_instance(label: &str) -> Result<i64, String> {
    let interner = StringInterner::new();
    let scanner = Rc::new(fixtures::FixtureScanner::default());
    scanner.register("example.com/mathutil", fixtures::mathutil_package(&interner));

    let resolver = Rc::new(gosym_eval::Resolver::new(scanner, gosym_eval::allow_all(), interner.clone()));
    let mut interp = Interpreter::builder(&interner, resolver).build();

    let (_, main_info) = fixtures::main_package(&interner);
    let mut import_lookup = FxHashMap::default();
    import_lookup.insert("mathutil".to_string(), "example.com/mathutil".to_string());

    let pkg = empty_main_package(&interner, "example.com/app");
    interp.eval_file(&pkg, &import_lookup).map_err(|err| format!("{label}: {err}"))?;

    let main_func = gosym_eval::build_function_object(&main_info, &interp.env, interner.intern("example.com/app"));
    match interp.apply_pub(main_func, Vec::new()) {
        Ok(Object::Integer(n)) => Ok(n),
        Ok(other) => Err(format!("{label}: unexpected result {other:?}")),
        Err(err) => Err(format!("{label}: {err}")),
    }
}

/// Evaluate the same program across several independent instances at once,
/// one per rayon worker thread, demonstrating spec's concurrency rule: the
/// evaluator is single-threaded per run, but a host may fan out across
/// disjoint interpreters.
fn run_batch_demo() {
    use rayon::prelude::*;

    let labels: Vec<String> = (0..8).map(|i| format!("run-{i}")).collect();
    let results: Vec<(String, Result<i64, String>)> = labels.into_par_iter().map(|label| {
        let result = evaluate_one_instance(&label);
        (label, result)
    }).collect();

    let mut failed = false;
    for (label, result) in results {
        match result {
            Ok(n) => println!("{label}: main() => {n}"),
            Err(err) => {
                eprintln!("{label}: error: {err}");
                failed = true;
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
}

/// Lazy package-selector load composed with a call: `main`
/// reads `mathutil.Answer`, then calls `mathutil.Double` on it, and returns
/// the result. Prints the final `Object` plus how many times `mathutil` was
/// actually scanned (should be exactly once).
fn run_demo() {
    let interner = StringInterner::new();
    let scanner = Rc::new(fixtures::FixtureScanner::default());
    scanner.register("example.com/mathutil", fixtures::mathutil_package(&interner));

    let resolver = Rc::new(gosym_eval::Resolver::new(
        scanner.clone(),
        gosym_eval::allow_all(),
        interner.clone(),
    ));
    let mut interp = Interpreter::builder(&interner, resolver).build();

    let (_, main_info) = fixtures::main_package(&interner);
    let mut import_lookup = FxHashMap::default();
    import_lookup.insert("mathutil".to_string(), "example.com/mathutil".to_string());

    let pkg = empty_main_package(&interner, "example.com/app");
    if let Err(err) = interp.eval_file(&pkg, &import_lookup) {
        report_error(&interner, &err);
        std::process::exit(1);
    }

    let main_func = gosym_eval::build_function_object(&main_info, &interp.env, interner.intern("example.com/app"));

    match interp.apply_pub(main_func, Vec::new()) {
        Ok(result) => {
            println!("main() => {result:?}");
            println!("mathutil scanned {} time(s)", scanner.scan_count("example.com/mathutil"));
        }
        Err(err) => {
            report_error(&interner, &err);
            std::process::exit(1);
        }
    }
}

/// Intrinsic dispatch: register a handler for
/// `example.com/mathutil.Double` that ignores the real body entirely and
/// always reports `-1`, then run the same program as `demo`. Demonstrates
/// that an intrinsic takes priority over the user-defined function it
/// shadows without the caller's code changing at all.
fn run_intrinsic_demo() {
    let interner = StringInterner::new();
    let scanner = Rc::new(fixtures::FixtureScanner::default());
    scanner.register("example.com/mathutil", fixtures::mathutil_package(&interner));

    let resolver = Rc::new(gosym_eval::Resolver::new(
        scanner.clone(),
        gosym_eval::allow_all(),
        interner.clone(),
    ));
    let mut interp = Interpreter::builder(&interner, resolver).build();

    let key = MethodKey::function(interner.intern("example.com/mathutil"), interner.intern("Double"));
    interp.intrinsics.register(
        key,
        Rc::new(gosym_eval::IntrinsicValue {
            key_display: "example.com/mathutil.Double".to_string(),
            handler: Rc::new(|_interp, _args| Object::Integer(-1)),
        }),
    );

    let (_, main_info) = fixtures::main_package(&interner);
    let mut import_lookup = FxHashMap::default();
    import_lookup.insert("mathutil".to_string(), "example.com/mathutil".to_string());

    let pkg = empty_main_package(&interner, "example.com/app");
    if let Err(err) = interp.eval_file(&pkg, &import_lookup) {
        report_error(&interner, &err);
        std::process::exit(1);
    }

    let main_func = gosym_eval::build_function_object(&main_info, &interp.env, interner.intern("example.com/app"));

    match interp.apply_pub(main_func, Vec::new()) {
        Ok(result) => println!("main() => {result:?} (Double intercepted by intrinsic)"),
        Err(err) => {
            report_error(&interner, &err);
            std::process::exit(1);
        }
    }
}

fn empty_main_package(interner: &StringInterner, import_path: &str) -> gosym_ir::PackageInfo {
    gosym_ir::PackageInfo {
        import_path: interner.intern(import_path),
        name: interner.intern(&gosym_ir::normalize_package_name(import_path, "main")),
        ast_files: FxHashMap::default(),
        types: Vec::new(),
        functions: Vec::new(),
        constants: Vec::new(),
        variables: Vec::new(),
        constant_values: FxHashMap::default(),
        fset: Arc::new(gosym_ir::FileSet::new()),
    }
}

fn report_error(interner: &StringInterner, err: &EvalError) {
    eprintln!("error: {err}");
    for frame in err.call_stack.iter() {
        eprintln!("  at {}", interner.lookup(frame.name));
    }
}
