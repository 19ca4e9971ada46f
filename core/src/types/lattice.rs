//! The partial order over types: subtyping, join/meet, and the relational
//! type operators.
//!
//! Everything here is an exhaustive match over pairs of variants. Aliases
//! and parameters are looked through first, so the concrete rules never
//! see them; the external escape hatch is consulted last, only for pairs
//! none of the structural rules resolved.

use crate::errors::{Error, Result};
use crate::types::factory::TypeFactory;
use crate::types::types::{Fields, Type, TypeKind};

impl Type {
    /// The view of a type the order relation works on: aliases are
    /// transparent and a parameter behaves exactly as its bound.
    fn lattice_view(&self) -> &Type {
        let mut current = self;
        loop {
            match current.kind() {
                TypeKind::Alias { aliased, .. } => current = aliased,
                TypeKind::Parameter { bound, .. } => current = bound,
                _ => return current,
            }
        }
    }

    /// The subtype relation. `Value` is the top and `Void` the bottom of
    /// the lattice; the relation is reflexive and transitive.
    pub fn is_subtype_of(&self, other: &Type) -> bool {
        if self == other {
            return true;
        }
        use TypeKind::*;
        match (self.kind(), other.kind()) {
            // Neither an alias nor a parameter is a lattice point of its
            // own.
            (Alias { aliased, .. }, _) => aliased.is_subtype_of(other),
            (_, Alias { aliased, .. }) => self.is_subtype_of(aliased),
            (Parameter { bound, .. }, _) => bound.is_subtype_of(other),
            (_, Parameter { bound, .. }) => self.is_subtype_of(bound),

            (Void, _) => true,
            (_, Void) => false,
            (_, Value) => true,
            (Value, _) => false,

            (Bool, Bool)
            | (Str, Str)
            | (SourceLocation, SourceLocation)
            | (DateTime, DateTime)
            | (Node, Node)
            | (Number, Number)
            | (Integer, Integer)
            | (Real, Real)
            | (Rational, Rational) => true,
            (Integer | Real | Rational, Number) => true,

            // Containers are covariant.
            (List { elem: a }, List { elem: b }) | (Set { elem: a }, Set { elem: b }) => {
                a.is_subtype_of(b)
            }
            (Map { key: k1, value: v1 }, Map { key: k2, value: v2 }) => {
                k1.is_subtype_of(k2) && v1.is_subtype_of(v2)
            }
            (Tuple { fields: f1, .. }, Tuple { fields: f2, .. }) => {
                f1.len() == f2.len() && f1.iter().zip(f2.iter()).all(|(a, b)| a.is_subtype_of(b))
            }

            (AbstractData { .. } | Constructor { .. }, Node) => true,
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
                    && p1.iter().zip(p2.iter()).all(|(a, b)| a.is_subtype_of(b))
            }
            (Constructor { adt, .. }, AbstractData { .. }) => adt.is_subtype_of(other),
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
            ) => n1 == n2 && a1.is_subtype_of(a2) && f1.is_subtype_of(f2),

            // Escape hatch, tried last on both sides.
            (External(ext), _) => ext.0.is_subtype_of(other),
            (_, External(ext)) => ext.0.is_supertype_of(self),

            _ => false,
        }
    }

    /// Subtype but not equivalent.
    pub fn is_strict_subtype_of(&self, other: &Type) -> bool {
        !self.equivalent(other) && self.is_subtype_of(other)
    }

    /// Two types are comparable when one is a subtype of the other.
    pub fn comparable(&self, other: &Type) -> bool {
        self == other || self.is_subtype_of(other) || other.is_subtype_of(self)
    }

    /// Mutual subtypes: the same set of values, though possibly distinct
    /// identities (an alias and its aliased type are equivalent).
    pub fn equivalent(&self, other: &Type) -> bool {
        self == other || (self.is_subtype_of(other) && other.is_subtype_of(self))
    }

    /// Least upper bound. Total: every pair of types has one.
    pub fn lub(&self, other: &Type, tf: &TypeFactory) -> Type {
        let a = self.lattice_view();
        let b = other.lattice_view();
        if a == b || b.is_subtype_of(a) {
            return a.clone();
        }
        if a.is_subtype_of(b) {
            return b.clone();
        }
        // From here on the two types are incomparable.
        use TypeKind::*;
        match (a.kind(), b.kind()) {
            (Integer | Real | Rational, Integer | Real | Rational) => tf.number(),

            (List { elem: x }, List { elem: y }) => tf.list(x.lub(y, tf)),
            (Set { elem: x }, Set { elem: y }) => tf.set(x.lub(y, tf)),
            (Map { key: k1, value: v1 }, Map { key: k2, value: v2 }) => {
                tf.map(k1.lub(k2, tf), v1.lub(v2, tf))
            }
            (
                Tuple {
                    fields: f1,
                    labels: l1,
                },
                Tuple {
                    fields: f2,
                    labels: l2,
                },
            ) => {
                if f1.len() != f2.len() {
                    return tf.value_type();
                }
                let fields: Fields = f1
                    .iter()
                    .zip(f2.iter())
                    .map(|(x, y)| x.lub(y, tf))
                    .collect();
                // Field labels survive only when both sides agree on them.
                let labels = if l1 == l2 { l1.clone() } else { None };
                tf.tuple_with_labels(fields, labels)
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
            ) if n1 == n2 && p1.len() == p2.len() => {
                let params: Vec<Type> = p1
                    .iter()
                    .zip(p2.iter())
                    .map(|(x, y)| x.lub(y, tf))
                    .collect();
                tf.abstract_data(n1.clone(), params)
            }
            // Distinct abstract data types still share the node carrier.
            (AbstractData { .. }, AbstractData { .. }) => tf.node(),
            (AbstractData { .. }, Constructor { adt, .. }) => a.lub(adt, tf),
            (Constructor { adt, .. }, AbstractData { .. }) => adt.lub(b, tf),
            (Constructor { adt: a1, .. }, Constructor { adt: a2, .. }) => a1.lub(a2, tf),

            (External(ext), _) => ext.0.lub(a, b),
            (_, External(ext)) => ext.0.lub(b, a),

            _ => tf.value_type(),
        }
    }

    /// Greatest lower bound. Total: every pair of types has one.
    pub fn glb(&self, other: &Type, tf: &TypeFactory) -> Type {
        let a = self.lattice_view();
        let b = other.lattice_view();
        if a == b || a.is_subtype_of(b) {
            return a.clone();
        }
        if b.is_subtype_of(a) {
            return b.clone();
        }
        use TypeKind::*;
        match (a.kind(), b.kind()) {
            (Integer | Real | Rational, Integer | Real | Rational) => tf.void_type(),

            (List { elem: x }, List { elem: y }) => tf.list(x.glb(y, tf)),
            (Set { elem: x }, Set { elem: y }) => tf.set(x.glb(y, tf)),
            (Map { key: k1, value: v1 }, Map { key: k2, value: v2 }) => {
                tf.map(k1.glb(k2, tf), v1.glb(v2, tf))
            }
            (
                Tuple {
                    fields: f1,
                    labels: l1,
                },
                Tuple {
                    fields: f2,
                    labels: l2,
                },
            ) => {
                if f1.len() != f2.len() {
                    return tf.void_type();
                }
                let fields: Fields = f1
                    .iter()
                    .zip(f2.iter())
                    .map(|(x, y)| x.glb(y, tf))
                    .collect();
                let labels = if l1 == l2 { l1.clone() } else { None };
                tf.tuple_with_labels(fields, labels)
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
            ) if n1 == n2 && p1.len() == p2.len() => {
                let params: Vec<Type> = p1
                    .iter()
                    .zip(p2.iter())
                    .map(|(x, y)| x.glb(y, tf))
                    .collect();
                tf.abstract_data(n1.clone(), params)
            }

            (External(ext), _) => ext.0.glb(a, b),
            (_, External(ext)) => ext.0.glb(b, a),

            _ => tf.void_type(),
        }
    }

    /// Compose two binary tuple types, or two relation types elementwise.
    ///
    /// For tuples: both sides must have arity exactly 2; the result's
    /// fields are the left's first and the right's second. When the
    /// adjoining fields are not comparable the composition is inhabited by
    /// nothing and degenerates to `Void` (for relations: to the empty
    /// relation type `Set[Void]`), without error.
    pub fn compose(&self, other: &Type, tf: &TypeFactory) -> Result<Type> {
        let a = self.lattice_view();
        let b = other.lattice_view();
        use TypeKind::*;
        match (a.kind(), b.kind()) {
            // Constructors are fixed-width through their field tuple.
            (Constructor { fields, .. }, _) => fields.compose(b, tf),
            (_, Constructor { fields, .. }) => a.compose(fields, tf),
            (
                Tuple {
                    fields: f1,
                    labels: l1,
                },
                Tuple {
                    fields: f2,
                    labels: l2,
                },
            ) => {
                if f1.len() != 2 || f2.len() != 2 {
                    return Err(Error::unsupported("compose", format!("{a} with {b}")));
                }
                if !f1[1].comparable(&f2[0]) {
                    return Ok(tf.void_type());
                }
                let fields: Fields = [f1[0].clone(), f2[1].clone()].into_iter().collect();
                let labels = match (l1, l2) {
                    // Keep the outer labels unless they would collide.
                    (Some(l1), Some(l2)) if l1[0] != l2[1] => {
                        Some([l1[0].clone(), l2[1].clone()].into_iter().collect())
                    }
                    _ => None,
                };
                Ok(tf.tuple_with_labels(fields, labels))
            }
            (Set { elem: e1 }, Set { elem: e2 }) => {
                // An empty relation has no known fields; composing with it
                // needs no type probing.
                if e1.is_bottom() {
                    return Ok(a.clone());
                }
                if e2.is_bottom() {
                    return Ok(b.clone());
                }
                Ok(tf.set(e1.compose(e2, tf)?))
            }
            (List { elem: e1 }, List { elem: e2 }) => {
                if e1.is_bottom() {
                    return Ok(a.clone());
                }
                if e2.is_bottom() {
                    return Ok(b.clone());
                }
                Ok(tf.list(e1.compose(e2, tf)?))
            }
            _ => Err(Error::unsupported("compose", format!("{a} with {b}"))),
        }
    }

    /// Transitive-closure type: for a binary tuple (or relation of such)
    /// whose two fields are comparable, collapse both fields to their lub.
    pub fn closure(&self, tf: &TypeFactory) -> Result<Type> {
        let a = self.lattice_view();
        use TypeKind::*;
        match a.kind() {
            Tuple { fields, labels } => {
                if fields.len() != 2 {
                    return Err(Error::unsupported("closure", a));
                }
                if !fields[0].comparable(&fields[1]) {
                    return Err(Error::unsupported("closure", a));
                }
                let step = fields[0].lub(&fields[1], tf);
                let fields: Fields = [step.clone(), step].into_iter().collect();
                Ok(tf.tuple_with_labels(fields, labels.clone()))
            }
            Constructor { fields, .. } => fields.closure(tf),
            Set { elem } => {
                if elem.is_bottom() {
                    return Ok(a.clone());
                }
                Ok(tf.set(elem.closure(tf)?))
            }
            List { elem } => {
                if elem.is_bottom() {
                    return Ok(a.clone());
                }
                Ok(tf.list(elem.closure(tf)?))
            }
            _ => Err(Error::unsupported("closure", a)),
        }
    }

    /// The carrier: a set of the lub of everything that can appear inside
    /// the receiver. Defined for fixed-width types, relations and maps.
    pub fn carrier(&self, tf: &TypeFactory) -> Result<Type> {
        let a = self.lattice_view();
        use TypeKind::*;
        match a.kind() {
            Tuple { fields, .. } => {
                let lub = fields
                    .iter()
                    .fold(tf.void_type(), |acc, field| acc.lub(field, tf));
                Ok(tf.set(lub))
            }
            Constructor { fields, .. } => fields.carrier(tf),
            Set { elem } | List { elem } => {
                if elem.is_bottom() {
                    return Ok(tf.set(tf.void_type()));
                }
                elem.carrier(tf)
            }
            Map { key, value } => Ok(tf.set(key.lub(value, tf))),
            _ => Err(Error::unsupported("carrier", a)),
        }
    }

    /// Project the given fields out of a tuple (or of a relation's element
    /// tuple), preserving labels when present.
    pub fn select(&self, indices: &[usize], tf: &TypeFactory) -> Result<Type> {
        let a = self.lattice_view();
        use TypeKind::*;
        match a.kind() {
            Tuple { fields, labels } => {
                let mut selected: Fields = Fields::new();
                for &i in indices {
                    let field = fields
                        .get(i)
                        .cloned()
                        .ok_or_else(|| Error::unsupported("select", a))?;
                    selected.push(field);
                }
                let labels = labels
                    .as_ref()
                    .map(|labels| indices.iter().map(|&i| labels[i].clone()).collect());
                Ok(tf.tuple_with_labels(selected, labels))
            }
            Constructor { fields, .. } => fields.select(indices, tf),
            Set { elem } if elem.is_fixed_width() => Ok(tf.set(elem.select(indices, tf)?)),
            List { elem } if elem.is_fixed_width() => Ok(tf.list(elem.select(indices, tf)?)),
            _ => Err(Error::unsupported("select", a)),
        }
    }
}
