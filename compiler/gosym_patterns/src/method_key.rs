//! Fully-qualified method/function keys, in the four forms the intrinsic
//! registry and the interface binding table key their maps by:
//! `<pkgpath>.<Func>`, `(<pkgpath>.<Type>).<Method>`,
//! `(*<pkgpath>.<Type>).<Method>`, `(<pkgpath>.<Interface>).<Method>`.

use gosym_ir::{Name, StringInterner};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Receiver {
    /// Bare function, no receiver: `<pkgpath>.<Func>`.
    None,
    /// Value receiver: `(<pkgpath>.<Type>).<Method>`.
    Value,
    /// Pointer receiver: `(*<pkgpath>.<Type>).<Method>`.
    Pointer,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct MethodKey {
    pub pkg_path: Name,
    pub type_name: Name,
    pub method_name: Name,
    pub receiver: Receiver,
}

impl MethodKey {
    pub fn function(pkg_path: Name, func_name: Name) -> Self {
        MethodKey {
            pkg_path,
            type_name: Name::EMPTY,
            method_name: func_name,
            receiver: Receiver::None,
        }
    }

    pub fn method(pkg_path: Name, type_name: Name, method_name: Name, receiver: Receiver) -> Self {
        MethodKey {
            pkg_path,
            type_name,
            method_name,
            receiver,
        }
    }

    /// Render this key in the wire format the intrinsic registry's string
    /// keys use, resolving interned names through `interner`.
    pub fn display(&self, interner: &StringInterner) -> String {
        let pkg = interner.lookup(self.pkg_path);
        let method = interner.lookup(self.method_name);
        match self.receiver {
            Receiver::None => format!("{pkg}.{method}"),
            Receiver::Value => {
                let ty = interner.lookup(self.type_name);
                format!("({pkg}.{ty}).{method}")
            }
            Receiver::Pointer => {
                let ty = interner.lookup(self.type_name);
                format!("(*{pkg}.{ty}).{method}")
            }
        }
    }
}
