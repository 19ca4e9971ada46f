use std::sync::Arc;

use ecow::EcoString;
use smallvec::SmallVec;

use crate::canonical::CanonicalTable;
use crate::types::types::{ExternalRef, ExternalType, Fields, Labels, Type, TypeKind};

/// Constructs canonical [`Type`] instances.
///
/// Every type flows through the factory's canonical table, so within one
/// factory structurally equal types are pointer-identical and `==` on
/// `Type` is a valid substitute for deep equality. The attribute-free
/// primitives are interned once at construction so the hot predicates
/// never touch the table.
pub struct TypeFactory {
    table: Arc<CanonicalTable<TypeKind>>,
    void_t: Type,
    value_t: Type,
    bool_t: Type,
    integer_t: Type,
    real_t: Type,
    rational_t: Type,
    number_t: Type,
    str_t: Type,
    loc_t: Type,
    datetime_t: Type,
    node_t: Type,
}

impl TypeFactory {
    pub fn new() -> Self {
        let table = CanonicalTable::new();
        let intern = |kind: TypeKind| Type(table.get(kind));
        TypeFactory {
            void_t: intern(TypeKind::Void),
            value_t: intern(TypeKind::Value),
            bool_t: intern(TypeKind::Bool),
            integer_t: intern(TypeKind::Integer),
            real_t: intern(TypeKind::Real),
            rational_t: intern(TypeKind::Rational),
            number_t: intern(TypeKind::Number),
            str_t: intern(TypeKind::Str),
            loc_t: intern(TypeKind::SourceLocation),
            datetime_t: intern(TypeKind::DateTime),
            node_t: intern(TypeKind::Node),
            table,
        }
    }

    pub(crate) fn intern(&self, kind: TypeKind) -> Type {
        Type(self.table.get(kind))
    }

    // Primitives.

    pub fn void_type(&self) -> Type {
        self.void_t.clone()
    }

    pub fn value_type(&self) -> Type {
        self.value_t.clone()
    }

    pub fn bool_type(&self) -> Type {
        self.bool_t.clone()
    }

    pub fn integer(&self) -> Type {
        self.integer_t.clone()
    }

    pub fn real(&self) -> Type {
        self.real_t.clone()
    }

    pub fn rational(&self) -> Type {
        self.rational_t.clone()
    }

    pub fn number(&self) -> Type {
        self.number_t.clone()
    }

    pub fn string(&self) -> Type {
        self.str_t.clone()
    }

    pub fn source_location(&self) -> Type {
        self.loc_t.clone()
    }

    pub fn date_time(&self) -> Type {
        self.datetime_t.clone()
    }

    pub fn node(&self) -> Type {
        self.node_t.clone()
    }

    // Composites.

    /// An unlabelled tuple type.
    pub fn tuple(&self, fields: impl IntoIterator<Item = Type>) -> Type {
        self.intern(TypeKind::Tuple {
            fields: fields.into_iter().collect(),
            labels: None,
        })
    }

    /// A fully labelled tuple type. Taking `(label, type)` pairs makes a
    /// partially labelled tuple unrepresentable.
    pub fn tuple_labelled<L, I>(&self, fields: I) -> Type
    where
        L: Into<EcoString>,
        I: IntoIterator<Item = (L, Type)>,
    {
        let mut types: Fields = SmallVec::new();
        let mut labels: Labels = SmallVec::new();
        for (label, ty) in fields {
            labels.push(label.into());
            types.push(ty);
        }
        self.intern(TypeKind::Tuple {
            fields: types,
            labels: Some(labels),
        })
    }

    pub(crate) fn tuple_with_labels(&self, fields: Fields, labels: Option<Labels>) -> Type {
        self.intern(TypeKind::Tuple { fields, labels })
    }

    pub fn list(&self, elem: Type) -> Type {
        self.intern(TypeKind::List { elem })
    }

    pub fn set(&self, elem: Type) -> Type {
        self.intern(TypeKind::Set { elem })
    }

    pub fn map(&self, key: Type, value: Type) -> Type {
        self.intern(TypeKind::Map { key, value })
    }

    /// A relation: a set of tuples of the given field types.
    pub fn relation(&self, fields: impl IntoIterator<Item = Type>) -> Type {
        self.set(self.tuple(fields))
    }

    /// A list relation: a list of tuples of the given field types.
    pub fn list_relation(&self, fields: impl IntoIterator<Item = Type>) -> Type {
        self.list(self.tuple(fields))
    }

    /// An abstract data type. Declaration into a namespace is a separate
    /// concern, handled by [`TypeStore`](crate::types::TypeStore).
    pub fn abstract_data(
        &self,
        name: impl Into<EcoString>,
        params: impl IntoIterator<Item = Type>,
    ) -> Type {
        self.intern(TypeKind::AbstractData {
            name: name.into(),
            params: params.into_iter().collect(),
        })
    }

    /// A constructor of `adt` with unlabelled fields.
    pub fn constructor(
        &self,
        adt: Type,
        name: impl Into<EcoString>,
        fields: impl IntoIterator<Item = Type>,
    ) -> Type {
        let fields = self.tuple(fields);
        self.intern(TypeKind::Constructor {
            name: name.into(),
            adt,
            fields,
        })
    }

    /// A constructor of `adt` with labelled fields.
    pub fn constructor_labelled<L, I>(
        &self,
        adt: Type,
        name: impl Into<EcoString>,
        fields: I,
    ) -> Type
    where
        L: Into<EcoString>,
        I: IntoIterator<Item = (L, Type)>,
    {
        let fields = self.tuple_labelled(fields);
        self.intern(TypeKind::Constructor {
            name: name.into(),
            adt,
            fields,
        })
    }

    pub(crate) fn constructor_from_tuple(
        &self,
        adt: Type,
        name: EcoString,
        fields: Type,
    ) -> Type {
        debug_assert!(matches!(fields.kind(), TypeKind::Tuple { .. }));
        self.intern(TypeKind::Constructor { name, adt, fields })
    }

    pub fn alias(
        &self,
        name: impl Into<EcoString>,
        aliased: Type,
        params: impl IntoIterator<Item = Type>,
    ) -> Type {
        self.intern(TypeKind::Alias {
            name: name.into(),
            params: params.into_iter().collect(),
            aliased,
        })
    }

    pub fn parameter(&self, name: impl Into<EcoString>, bound: Type) -> Type {
        self.intern(TypeKind::Parameter {
            name: name.into(),
            bound,
        })
    }

    /// A parameter bounded only by the top of the lattice.
    pub fn parameter_unbounded(&self, name: impl Into<EcoString>) -> Type {
        self.parameter(name, self.value_type())
    }

    pub fn external(&self, behavior: Arc<dyn ExternalType>) -> Type {
        self.intern(TypeKind::External(ExternalRef(behavior)))
    }
}

impl Default for TypeFactory {
    fn default() -> Self {
        TypeFactory::new()
    }
}
