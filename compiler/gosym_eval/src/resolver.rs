//! Import-path → `Package` object resolution, gated by a `ScanPolicy`
//! predicate.
//!
//! **Design decision (recorded in DESIGN.md):** the scanner interface takes
//! no policy argument, and an out-of-policy path must never have its
//! sources parsed. The only way to honor both is for the *resolver* to
//! decide before ever calling the scanner: in-policy paths are scanned
//! deeply and populated eagerly; out-of-policy paths are never scanned at
//! all, and their package env is populated lazily, per missed symbol, by
//! `package_member`, which synthesizes an `UnresolvedFunction` placeholder
//! and caches it so repeat lookups are idempotent. A miss against an
//! in-policy (already deep-scanned) package env is a different case
//! entirely — the symbol genuinely doesn't exist — and `package_member`
//! reports that with `None` instead, so the caller can raise the
//! undefined-symbol error the spec requires.

use crate::function::build_function_object;
use crate::intrinsics::IntrinsicRegistry;
use crate::object::{Object, PackageValue, UnresolvedFunctionValue, VariableValue};
use gosym_diagnostic::{unknown_package, EvalResult};
use gosym_ir::{normalize_package_name, FieldType, FunctionInfo, Name, PackageInfo, Scanner, StringInterner};
use gosym_patterns::{MethodKey, MethodLookup};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

pub type ScanPolicy = Rc<dyn Fn(&str) -> bool>;

/// Always scan every package deeply. The default absent host configuration.
pub fn allow_all() -> ScanPolicy {
    Rc::new(|_path: &str| true)
}

pub struct Resolver {
    scanner: Rc<dyn Scanner>,
    policy: ScanPolicy,
    interner: StringInterner,
    /// Process-wide-in-spirit package cache, keyed by import path. Written
    /// once per path for the lifetime of this resolver.
    cache: RefCell<FxHashMap<String, Object>>,
    /// Methods are attached to a type, not nested inside it:
    /// `func (r T) M()` declarations are recorded here, keyed by the
    /// receiver's `(pkg_path, type_name)`, for the selector-resolution chain
    /// (`gosym_patterns::resolve_selector`) to walk.
    methods: RefCell<FxHashMap<(Name, Name), Vec<Arc<FunctionInfo>>>>,
}

impl Resolver {
    pub fn new(scanner: Rc<dyn Scanner>, policy: ScanPolicy, interner: StringInterner) -> Self {
        Resolver {
            scanner,
            policy,
            interner,
            cache: RefCell::new(FxHashMap::default()),
            methods: RefCell::new(FxHashMap::default()),
        }
    }

    /// The declaring `FunctionInfo` for `method_name` on `(pkg_path,
    /// type_name)`, plus whether it has a pointer receiver.
    pub fn find_method(&self, pkg_path: Name, type_name: Name, method_name: Name) -> Option<(Arc<FunctionInfo>, bool)> {
        self.methods.borrow().get(&(pkg_path, type_name))?.iter().find_map(|f| {
            if f.name == method_name {
                let is_pointer = f.recv.as_ref().is_some_and(|r| r.is_pointer);
                Some((f.clone(), is_pointer))
            } else {
                None
            }
        })
    }

    /// Record every method declared in `functions` (those with a receiver)
    /// into the method table, keyed by the receiver's `(pkg_path,
    /// type_name)`. Idempotent to call more than once is NOT guaranteed
    /// (each call appends); callers scan a given `functions` list once per
    /// package, matching `PackageInfo`'s own one-scan-per-path lifecycle.
    pub fn register_methods(&self, pkg_path: Name, functions: &[FunctionInfo]) {
        for func in functions {
            if let Some(recv) = &func.recv {
                self.methods
                    .borrow_mut()
                    .entry((pkg_path, recv.name))
                    .or_default()
                    .push(Arc::new(func.clone()));
            }
        }
    }

    /// The environment methods/functions declared in `pkg_path` should
    /// capture as their `def_env`: the package's own member env,
    /// created (but not necessarily populated yet) on first reference.
    pub fn package_env(&self, pkg_path: Name) -> crate::environment::Environment {
        let import_path = self.interner.lookup(pkg_path);
        match self.resolve_package(&import_path) {
            Object::Package(cell) => cell.borrow().env.clone(),
            _ => crate::environment::Environment::new(),
        }
    }

    pub fn is_in_policy(&self, import_path: &str) -> bool {
        (self.policy)(import_path)
    }

    /// Get or create the (possibly still-unloaded) `Package` object for an
    /// import path.
    pub fn resolve_package(&self, import_path: &str) -> Object {
        if let Some(existing) = self.cache.borrow().get(import_path) {
            return existing.clone();
        }
        let raw_name = import_path.rsplit('/').next().unwrap_or(import_path);
        let normalized = normalize_package_name(import_path, raw_name);
        let package = Object::Package(Rc::new(RefCell::new(PackageValue {
            name: self.interner.intern(&normalized),
            import_path: self.interner.intern(import_path),
            env: crate::environment::Environment::new(),
            loaded: false,
        })));
        self.cache
            .borrow_mut()
            .insert(import_path.to_string(), package.clone());
        package
    }

    /// Populate a package's member env on first access. No-op
    /// if already loaded. Returns an error only for an in-policy package
    /// that fails to scan/parse — that failure is fatal for the call that
    /// triggered it.
    pub fn ensure_loaded(&self, package: &Object, intrinsics: &IntrinsicRegistry) -> EvalResult<()> {
        let Object::Package(cell) = package else {
            return Ok(());
        };
        if cell.borrow().loaded {
            return Ok(());
        }
        let import_path = self.interner.lookup(cell.borrow().import_path);

        if !self.is_in_policy(&import_path) {
            gosym_diagnostic::shallow_scan_miss(&import_path, "<package>");
            cell.borrow_mut().loaded = true;
            return Ok(());
        }

        let info = self.scanner.scan_package_by_import(&import_path).map_err(|message| {
            let mut err = unknown_package(&import_path, None);
            err.message = format!("package {import_path:?} could not be scanned: {message}");
            err
        })?;
        self.populate_deep(cell, &info, intrinsics);
        cell.borrow_mut().loaded = true;
        Ok(())
    }

    fn populate_deep(&self, cell: &Rc<RefCell<PackageValue>>, info: &PackageInfo, intrinsics: &IntrinsicRegistry) {
        let env = cell.borrow().env.clone();
        let pkg_path = cell.borrow().import_path;

        self.register_methods(pkg_path, &info.functions);

        for func in &info.functions {
            if func.recv.is_some() {
                // Methods dispatch through selector resolution against the
                // receiver's TypeInfo, not through the package env.
                continue;
            }
            let key = MethodKey::function(pkg_path, func.name);
            let value = if let Some(handler) = intrinsics.get(&key) {
                Object::Intrinsic(handler)
            } else {
                build_function_object(func, &env, pkg_path)
            };
            env.define(func.name, value);
        }

        for (name, field_type) in &info.constants {
            let value = match info.constant_values.get(name) {
                Some(literal) => crate::interpreter::literal_object(literal),
                None => Object::placeholder("package-level value", field_type.resolved.clone()),
            };
            env.define(*name, Object::new_variable(*name, value, field_type.resolved.clone(), true));
        }
        for (name, field_type) in &info.variables {
            env.define(*name, self.package_value_variable(*name, field_type));
        }
        for ty in &info.types {
            env.define(ty.name, Object::TypeRef(Arc::new(ty.clone())));
        }
    }

    fn package_value_variable(&self, name: Name, field_type: &FieldType) -> Object {
        let value = Object::placeholder("package-level value", field_type.resolved.clone());
        Object::Variable(Rc::new(RefCell::new(VariableValue {
            name,
            value,
            static_type: field_type.resolved.clone(),
            possible_types: Vec::new(),
            mutable: true,
        })))
    }

    /// Look up `name` in an already-loaded package's env.
    ///
    /// A miss is handled two different ways depending on whether `name`'s
    /// package is in policy: an out-of-policy package was never populated
    /// with real symbols, so a miss there synthesizes (and caches) an
    /// unresolved placeholder. An in-policy package was deep-scanned by
    /// `ensure_loaded`, so its env already holds every symbol the scanner
    /// reported; a miss there means `name` genuinely doesn't exist, and the
    /// caller is expected to raise the spec's `undefined: pkg.Sym` error —
    /// returning `None` for that case rather than another placeholder.
    pub fn package_member(&self, package: &Object, name: Name) -> Option<Object> {
        let Object::Package(cell) = package else {
            return None;
        };
        let env = cell.borrow().env.clone();
        if let Some(found) = env.get(name) {
            return Some(found);
        }
        let pkg_path = cell.borrow().import_path;
        let import_path = self.interner.lookup(pkg_path);
        if self.is_in_policy(&import_path) {
            return None;
        }
        gosym_diagnostic::shallow_scan_miss(&import_path, &self.interner.lookup(name));
        let placeholder = Object::UnresolvedFunction(Rc::new(UnresolvedFunctionValue {
            name,
            pkg_path,
            signature: None,
        }));
        env.define(name, placeholder.clone());
        Some(placeholder)
    }
}

impl MethodLookup for Resolver {
    fn methods_of(&self, pkg_path: Name, type_name: Name) -> Vec<FunctionInfo> {
        self.methods
            .borrow()
            .get(&(pkg_path, type_name))
            .map(|v| v.iter().map(|f| (**f).clone()).collect())
            .unwrap_or_default()
    }
}
