//! Type-list / union constraint satisfaction for generic type parameters:
//! `~int | string` stored as a list of terms on the constraining
//! interface, satisfied if any term matches.

use gosym_ir::{Name, TypeListTerm};

/// `candidate_underlying` is the candidate type's underlying type name
/// (itself, for an unnamed/basic type) — needed because `~T` terms match
/// anything whose *underlying* type is `T`, not just `T` itself.
pub fn satisfies_type_list(
    candidate_name: Name,
    candidate_underlying: Name,
    terms: &[TypeListTerm],
) -> bool {
    if terms.is_empty() {
        // No constraint recorded means an unconstrained interface (e.g. `any`).
        return true;
    }
    terms.iter().any(|term| {
        if term.underlying_only {
            candidate_underlying == term.type_name
        } else {
            candidate_name == term.type_name
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gosym_ir::StringInterner;

    #[test]
    fn empty_constraint_list_accepts_anything() {
        let interner = StringInterner::new();
        assert!(satisfies_type_list(
            interner.intern("MyInt"),
            interner.intern("int"),
            &[]
        ));
    }

    #[test]
    fn exact_term_requires_exact_name() {
        let interner = StringInterner::new();
        let terms = vec![TypeListTerm {
            type_name: interner.intern("int"),
            underlying_only: false,
        }];
        assert!(satisfies_type_list(
            interner.intern("int"),
            interner.intern("int"),
            &terms
        ));
        assert!(!satisfies_type_list(
            interner.intern("MyInt"),
            interner.intern("int"),
            &terms
        ));
    }

    #[test]
    fn underlying_only_term_matches_named_types() {
        let interner = StringInterner::new();
        let terms = vec![TypeListTerm {
            type_name: interner.intern("int"),
            underlying_only: true,
        }];
        assert!(satisfies_type_list(
            interner.intern("MyInt"),
            interner.intern("int"),
            &terms
        ));
    }

    #[test]
    fn union_satisfied_by_any_term() {
        let interner = StringInterner::new();
        let terms = vec![
            TypeListTerm {
                type_name: interner.intern("int"),
                underlying_only: false,
            },
            TypeListTerm {
                type_name: interner.intern("string"),
                underlying_only: false,
            },
        ];
        assert!(satisfies_type_list(
            interner.intern("string"),
            interner.intern("string"),
            &terms
        ));
    }
}
