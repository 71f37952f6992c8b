//! RAII guard pairing `IntrinsicRegistry::push`/`pop` so a scoped overlay
//! installed for one sub-analysis is released on every exit path —
//! including a Rust panic unwinding through it — not just the happy path.

use super::Interpreter;
use crate::intrinsics::IntrinsicMap;

pub struct IntrinsicScope<'g, 'a> {
    interp: &'g mut Interpreter<'a>,
}

impl<'g, 'a> IntrinsicScope<'g, 'a> {
    pub(super) fn push(interp: &'g mut Interpreter<'a>, map: IntrinsicMap) -> Self {
        interp.intrinsics.push(map);
        IntrinsicScope { interp }
    }
}

impl<'a> std::ops::Deref for IntrinsicScope<'_, 'a> {
    type Target = Interpreter<'a>;
    fn deref(&self) -> &Self::Target {
        self.interp
    }
}

impl<'a> std::ops::DerefMut for IntrinsicScope<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interp
    }
}

impl Drop for IntrinsicScope<'_, '_> {
    fn drop(&mut self) {
        self.interp.intrinsics.pop();
    }
}

#[cfg(test)]
mod tests {
    use crate::resolver::{allow_all, Resolver};
    use gosym_ir::StringInterner;
    use rustc_hash::FxHashMap;
    use std::rc::Rc;
    use std::sync::Arc;

    struct NoScanner;
    impl gosym_ir::Scanner for NoScanner {
        fn scan_package_by_import(&self, _import_path: &str) -> Result<Arc<gosym_ir::PackageInfo>, String> {
            Err("no packages".into())
        }
        fn scan_files(&self, _files: &[std::path::PathBuf]) -> Result<Arc<gosym_ir::PackageInfo>, String> {
            Err("no files".into())
        }
        fn fset(&self) -> Arc<gosym_ir::FileSet> {
            Arc::new(gosym_ir::FileSet::new())
        }
        fn build_import_lookup(&self, _file: &std::path::PathBuf) -> FxHashMap<String, String> {
            FxHashMap::default()
        }
    }

    #[test]
    fn scope_pops_on_normal_exit() {
        let interner = StringInterner::new();
        let resolver = Rc::new(Resolver::new(Rc::new(NoScanner), allow_all(), interner.clone()));
        let mut interp = super::Interpreter::builder(&interner, resolver).build();
        let before = interp.intrinsics.depth();
        interp.with_scoped_intrinsics(FxHashMap::default(), |_| {});
        assert_eq!(interp.intrinsics.depth(), before);
    }

    #[test]
    fn scope_pops_even_when_closure_panics() {
        let interner = StringInterner::new();
        let resolver = Rc::new(Resolver::new(Rc::new(NoScanner), allow_all(), interner.clone()));
        let mut interp = super::Interpreter::builder(&interner, resolver).build();
        let before = interp.intrinsics.depth();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            interp.with_scoped_intrinsics(FxHashMap::default(), |_| panic!("boom"));
        }));
        assert!(result.is_err());
        assert_eq!(interp.intrinsics.depth(), before);
    }
}
