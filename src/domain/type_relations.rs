//! Type identity, method sets and the error-like test.
//!
//! The front end only reports methods declared directly on a named type.
//! Promotion through embedded fields and receiver addressability are
//! resolved here.

use std::collections::{HashMap, HashSet};

use super::type_graph::{BasicKind, Position, TypeDesc, TypeGraph, TypeId};

/// A method visible in a type's method set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodRef<'g> {
    pub name: &'g str,
    pub signature: TypeId,
    pub position: Option<&'g Position>,
}

/// Reports whether two types are the same type.
///
/// Named types and type parameters are only identical to themselves; every
/// other kind is compared structurally.
pub fn identical(graph: &TypeGraph, a: TypeId, b: TypeId) -> bool {
    if a == b {
        return true;
    }
    match (graph.ty(a), graph.ty(b)) {
        (TypeDesc::Basic { basic: x }, TypeDesc::Basic { basic: y }) => x == y,
        (TypeDesc::Pointer { elem: x }, TypeDesc::Pointer { elem: y })
        | (TypeDesc::Slice { elem: x }, TypeDesc::Slice { elem: y })
        | (TypeDesc::Chan { elem: x }, TypeDesc::Chan { elem: y }) => identical(graph, *x, *y),
        (TypeDesc::Array { elem: x, len: n }, TypeDesc::Array { elem: y, len: m }) => {
            n == m && identical(graph, *x, *y)
        }
        (TypeDesc::Map { key: k1, value: v1 }, TypeDesc::Map { key: k2, value: v2 }) => {
            identical(graph, *k1, *k2) && identical(graph, *v1, *v2)
        }
        (TypeDesc::Struct { fields: f1 }, TypeDesc::Struct { fields: f2 }) => {
            f1.len() == f2.len()
                && f1.iter().zip(f2).all(|(x, y)| {
                    x.name == y.name && x.embedded == y.embedded && identical(graph, x.ty, y.ty)
                })
        }
        (TypeDesc::Signature(s1), TypeDesc::Signature(s2)) => {
            s1.variadic == s2.variadic
                && s1.params.len() == s2.params.len()
                && s1.results.len() == s2.results.len()
                && s1
                    .params
                    .iter()
                    .chain(&s1.results)
                    .zip(s2.params.iter().chain(&s2.results))
                    .all(|(x, y)| identical(graph, x.ty, y.ty))
        }
        (TypeDesc::Interface { methods: m1 }, TypeDesc::Interface { methods: m2 }) => {
            if m1.len() != m2.len() {
                return false;
            }
            let mut m1: Vec<_> = m1.iter().collect();
            let mut m2: Vec<_> = m2.iter().collect();
            m1.sort_by(|x, y| x.name.cmp(&y.name));
            m2.sort_by(|x, y| x.name.cmp(&y.name));
            m1.iter()
                .zip(&m2)
                .all(|(x, y)| x.name == y.name && identical(graph, x.signature, y.signature))
        }
        _ => false,
    }
}

/// Method set of `ty`. With `addressable` set, pointer-receiver methods are
/// included as well. Sorted by name.
pub fn method_set(graph: &TypeGraph, ty: TypeId, addressable: bool) -> Vec<MethodRef<'_>> {
    let mut seen_names: HashSet<&str> = HashSet::new();
    let mut visited: HashSet<TypeId> = HashSet::new();
    let mut out = Vec::new();
    let mut level = vec![(ty, addressable)];

    while !level.is_empty() {
        let mut next = Vec::new();
        let mut found = Vec::new();
        let mut field_names: Vec<&str> = Vec::new();

        for (ty, addressable) in level {
            let (ty, addressable) = match graph.ty(ty) {
                TypeDesc::Pointer { elem } => (*elem, true),
                _ => (ty, addressable),
            };
            let structural = match graph.ty(ty) {
                TypeDesc::Named(named) => {
                    if !visited.insert(ty) {
                        continue;
                    }
                    found.extend(named.methods.iter().map(|m| {
                        let method = MethodRef {
                            name: m.name.as_str(),
                            signature: m.signature,
                            position: m.position.as_ref(),
                        };
                        (method, addressable || !m.pointer_receiver)
                    }));
                    graph.ty(graph.underlying(ty))
                }
                other => other,
            };
            match structural {
                TypeDesc::Struct { fields } => {
                    field_names.extend(fields.iter().map(|f| f.name.as_str()));
                    next.extend(fields.iter().filter(|f| f.embedded).map(|f| (f.ty, addressable)));
                }
                TypeDesc::Interface { methods } => {
                    found.extend(methods.iter().map(|m| {
                        let method = MethodRef {
                            name: m.name.as_str(),
                            signature: m.signature,
                            position: None,
                        };
                        (method, true)
                    }));
                }
                _ => {}
            }
        }

        // names from a shallower depth shadow deeper ones, even when the
        // shallower method is excluded by its receiver. A name met twice at
        // one depth, or shared with a field there, is ambiguous: it selects
        // nothing but still shadows.
        let mut occurrences: HashMap<&str, usize> = HashMap::new();
        for name in found.iter().map(|(m, _)| m.name).chain(field_names.iter().copied()) {
            *occurrences.entry(name).or_default() += 1;
        }
        for (method, in_set) in found {
            if in_set && !seen_names.contains(method.name) && occurrences[method.name] == 1 {
                out.push(method);
            }
        }
        seen_names.extend(occurrences.into_keys());
        level = next;
    }

    out.sort_by(|a, b| a.name.cmp(b.name));
    out
}

/// Everything callable on a value or pointer of `ty`: declared and promoted
/// methods with both receiver kinds.
pub fn intuitive_method_set(graph: &TypeGraph, ty: TypeId) -> Vec<MethodRef<'_>> {
    method_set(graph, ty, true)
}

/// True when `ty`, or the type it points to, provides `Error() string`.
pub fn is_error_like(graph: &TypeGraph, ty: TypeId) -> bool {
    let addressable = graph.is_pointer(ty);
    method_set(graph, ty, addressable)
        .iter()
        .any(|m| m.name == "Error" && is_message_signature(graph, m.signature))
}

fn is_message_signature(graph: &TypeGraph, signature: TypeId) -> bool {
    let Some(sig) = graph.signature(signature) else {
        return false;
    };
    sig.params.is_empty()
        && !sig.variadic
        && sig.results.len() == 1
        && matches!(
            graph.ty(sig.results[0].ty),
            TypeDesc::Basic {
                basic: BasicKind::String
            }
        )
}
