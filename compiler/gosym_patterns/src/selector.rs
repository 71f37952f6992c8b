//! Embedded-field selector resolution.
//!
//! Pure with respect to the object model: given a `TypeInfo` and a method
//! lookup collaborator, walks embedded fields breadth-first. Declaration
//! order within a struct breaks ties between sibling fields at the same
//! depth; a name reachable through more than one path at the *shallowest*
//! depth it appears at is an ambiguous selector.

use gosym_diagnostic::{ambiguous_selector, Error};
use gosym_ir::{FieldInfo, FunctionInfo, Name, TypeInfo};
use rustc_hash::FxHashSet;

/// What a selector resolved to.
#[derive(Clone, Debug)]
pub enum SelectorHit {
    Field(FieldInfo),
    Method(FunctionInfo),
}

/// Collaborator supplying a type's directly declared methods (methods are
/// registered separately from `TypeInfo`, the way Go attaches `func (r T)
/// M()` declarations to a type rather than nesting them inside it).
pub trait MethodLookup {
    fn methods_of(&self, pkg_path: Name, type_name: Name) -> Vec<FunctionInfo>;
}

/// Resolve `selector` against `root`, promoting through embedded fields and
/// embedded interfaces breadth-first. Returns `Ok(None)` if nothing at any
/// depth matches, `Err` if two or more distinct paths reach it at the same
/// (shallowest) depth.
pub fn resolve_selector(
    root: &TypeInfo,
    selector: Name,
    selector_display: &str,
    methods: &dyn MethodLookup,
) -> Result<Option<SelectorHit>, Error> {
    let mut frontier = vec![root.clone()];
    let mut visited: FxHashSet<(Name, Name)> = FxHashSet::default();
    visited.insert((root.pkg_path, root.name));

    while !frontier.is_empty() {
        let mut hits = Vec::new();
        let mut next_frontier = Vec::new();

        for ty in &frontier {
            if let Some(struct_info) = &ty.struct_info {
                for field in &struct_info.fields {
                    if field.name == selector && !field.embedded {
                        hits.push(SelectorHit::Field(field.clone()));
                    }
                }
            }
            for m in methods.methods_of(ty.pkg_path, ty.name) {
                if m.name == selector {
                    hits.push(SelectorHit::Method(m));
                }
            }

            if let Some(struct_info) = &ty.struct_info {
                for field in &struct_info.fields {
                    if field.embedded {
                        if let Some(resolved) = &field.field_type.resolved {
                            let key = (resolved.pkg_path, resolved.name);
                            if visited.insert(key) {
                                next_frontier.push((**resolved).clone());
                            }
                        }
                    }
                }
            }
            if let Some(iface) = &ty.interface_info {
                for embed in &iface.embeds {
                    let key = (embed.pkg_path, embed.name);
                    if visited.insert(key) {
                        next_frontier.push(embed.clone());
                    }
                }
            }
        }

        if hits.len() > 1 {
            return Err(ambiguous_selector(selector_display, None));
        }
        if let Some(hit) = hits.into_iter().next() {
            return Ok(Some(hit));
        }
        frontier = next_frontier;
    }

    Ok(None)
}
