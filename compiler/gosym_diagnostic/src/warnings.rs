//! Warnings: conditions the evaluator logs but does not fail on.
//! Shallow-scan misses and calls through a nil function value both
//! continue analysis with a placeholder rather than unwinding an `Error`.

/// A shallow-scan policy denied `pkg_path`, so `name` resolved to an
/// unresolved-typed placeholder instead of a parsed symbol.
pub fn shallow_scan_miss(pkg_path: &str, name: &str) {
    tracing::warn!(pkg_path, name, "symbol resolved against an unscanned package");
}

/// A call target evaluated to `Nil`; the call becomes a typed
/// placeholder and analysis continues.
pub fn call_on_nil(context: &str) {
    tracing::warn!(context, "call on nil function value");
}
