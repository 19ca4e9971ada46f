//! Instantiation of type parameters and pattern matching of types against
//! parameterized patterns.

use hashbrown::HashMap;

use crate::types::factory::TypeFactory;
use crate::types::types::{Fields, Type, TypeKind};

/// A binding table from parameter types to the concrete types they were
/// matched against. Keys are always `Parameter` variants.
pub type Bindings = HashMap<Type, Type>;

impl Type {
    /// Replace parameter types by their bindings, recursively. Parameters
    /// without a binding pass through untouched; everything that is not a
    /// parameter and not structural is returned as-is.
    pub fn instantiate(&self, bindings: &Bindings, tf: &TypeFactory) -> Type {
        if bindings.is_empty() || !self.is_open() {
            return self.clone();
        }
        match self.kind() {
            TypeKind::Parameter { .. } => {
                bindings.get(self).cloned().unwrap_or_else(|| self.clone())
            }
            TypeKind::Tuple { fields, labels } => {
                let fields: Fields = fields
                    .iter()
                    .map(|f| f.instantiate(bindings, tf))
                    .collect();
                tf.tuple_with_labels(fields, labels.clone())
            }
            TypeKind::List { elem } => tf.list(elem.instantiate(bindings, tf)),
            TypeKind::Set { elem } => tf.set(elem.instantiate(bindings, tf)),
            TypeKind::Map { key, value } => tf.map(
                key.instantiate(bindings, tf),
                value.instantiate(bindings, tf),
            ),
            TypeKind::AbstractData { name, params } => {
                let params: Vec<Type> =
                    params.iter().map(|p| p.instantiate(bindings, tf)).collect();
                tf.abstract_data(name.clone(), params)
            }
            TypeKind::Constructor { name, adt, fields } => tf.constructor_from_tuple(
                adt.instantiate(bindings, tf),
                name.clone(),
                fields.instantiate(bindings, tf),
            ),
            TypeKind::Alias {
                name,
                params,
                aliased,
            } => {
                let params: Vec<Type> =
                    params.iter().map(|p| p.instantiate(bindings, tf)).collect();
                tf.alias(name.clone(), aliased.instantiate(bindings, tf), params)
            }
            _ => self.clone(),
        }
    }

    /// Match `candidate` against the receiver, treating the receiver as a
    /// pattern that may contain parameter types.
    ///
    /// A parameter binds to the candidate if the candidate satisfies its
    /// bound; a candidate outside the bound, or a conflicting rebinding of
    /// an already-bound parameter (to something not equivalent), rejects
    /// the match. Rejection is an ordinary `false` — speculative matching
    /// is an expected, recoverable outcome, not an error.
    pub fn match_bindings(&self, candidate: &Type, bindings: &mut Bindings) -> bool {
        match self.kind() {
            TypeKind::Alias { aliased, .. } => aliased.match_bindings(candidate, bindings),
            TypeKind::Parameter { bound, .. } => {
                if !candidate.is_subtype_of(bound) {
                    return false;
                }
                match bindings.get(self) {
                    Some(existing) => existing.equivalent(candidate),
                    None => {
                        bindings.insert(self.clone(), candidate.clone());
                        true
                    }
                }
            }
            _ => self.match_structure(candidate.resolved(), bindings),
        }
    }

    fn match_structure(&self, candidate: &Type, bindings: &mut Bindings) -> bool {
        use TypeKind::*;
        // The bottom matches every pattern without binding anything.
        if candidate.is_bottom() {
            return true;
        }
        match (self.kind(), candidate.kind()) {
            (Tuple { fields: f1, .. }, Tuple { fields: f2, .. }) => {
                f1.len() == f2.len()
                    && f1
                        .iter()
                        .zip(f2.iter())
                        .all(|(p, c)| p.match_bindings(c, bindings))
            }
            (List { elem: p }, List { elem: c }) | (Set { elem: p }, Set { elem: c }) => {
                p.match_bindings(c, bindings)
            }
            (Map { key: k1, value: v1 }, Map { key: k2, value: v2 }) => {
                k1.match_bindings(k2, bindings) && v1.match_bindings(v2, bindings)
            }
            (
                AbstractData {
                    name: n1,
                    params: p1,
                },
                AbstractData {
                    name: n2,
                    params: p2,
                },
            ) => {
                n1 == n2
                    && p1.len() == p2.len()
                    && p1
                        .iter()
                        .zip(p2.iter())
                        .all(|(p, c)| p.match_bindings(c, bindings))
            }
            (AbstractData { .. }, Constructor { adt, .. }) => self.match_bindings(adt, bindings),
            (
                Constructor {
                    name: n1,
                    adt: a1,
                    fields: f1,
                },
                Constructor {
                    name: n2,
                    adt: a2,
                    fields: f2,
                },
            ) => {
                n1 == n2 && a1.match_bindings(a2, bindings) && f1.match_bindings(f2, bindings)
            }
            // Everything else falls back to the plain subtype test.
            _ => candidate.is_subtype_of(self),
        }
    }
}
