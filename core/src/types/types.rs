use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use ecow::EcoString;
use smallvec::SmallVec;

use crate::errors::{Error, Result};

pub type Fields = SmallVec<[Type; 4]>;
pub type Labels = SmallVec<[EcoString; 4]>;
pub type Params = SmallVec<[Type; 2]>;

/// The closed set of type variants.
///
/// Types form a partial order with `Value` as the unique top and `Void` as
/// the unique bottom. Each variant carries only the attributes relevant to
/// it; the lattice operations are exhaustive matches over pairs of these
/// variants (see `lattice.rs`), so an unhandled pair is a compile error,
/// not a runtime fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// The bottom of the lattice; subtype of everything, no values.
    Void,
    /// The top of the lattice; every value has this type.
    Value,
    Bool,
    Integer,
    Real,
    Rational,
    /// Supertype of `Integer`, `Real` and `Rational`, which are pairwise
    /// incomparable below it.
    Number,
    Str,
    SourceLocation,
    DateTime,
    /// Supertype of all tree values, including every abstract data type.
    Node,
    /// Fixed-width product; either all fields are labelled or none.
    Tuple {
        fields: Fields,
        labels: Option<Labels>,
    },
    List {
        elem: Type,
    },
    Set {
        elem: Type,
    },
    Map {
        key: Type,
        value: Type,
    },
    /// A named sum of constructors, possibly open in its type parameters.
    /// The constructors themselves live in a `TypeStore`, not here.
    AbstractData {
        name: EcoString,
        params: Params,
    },
    /// A constructor of an abstract data type. `fields` is always a
    /// `Tuple` type, which is what makes constructors fixed-width.
    Constructor {
        name: EcoString,
        adt: Type,
        fields: Type,
    },
    /// Transparent name for another type: every lattice operation
    /// delegates to `aliased`; the alias identity survives only for
    /// display and reification.
    Alias {
        name: EcoString,
        params: Params,
        aliased: Type,
    },
    /// A type parameter, behaving as its upper bound until instantiated.
    Parameter {
        name: EcoString,
        bound: Type,
    },
    /// Host-supplied escape hatch; consulted last by the lattice.
    External(ExternalRef),
}

/// Behavior a host must supply for a [`TypeKind::External`] type.
///
/// The lattice tries all of its own rules first and only delegates to the
/// external operand when a pair of types is not otherwise resolvable.
pub trait ExternalType: fmt::Debug + Send + Sync {
    /// Identity for canonicalization and display.
    fn name(&self) -> &str;
    /// Does the external type admit `other` as a subtype?
    fn is_supertype_of(&self, other: &Type) -> bool;
    /// Is the external type a subtype of `other`?
    fn is_subtype_of(&self, other: &Type) -> bool;
    /// Least upper bound of the external type (`this`) and `other`.
    fn lub(&self, this: &Type, other: &Type) -> Type;
    /// Greatest lower bound of the external type (`this`) and `other`.
    fn glb(&self, this: &Type, other: &Type) -> Type;
}

/// Shared handle to host behavior. Canonical identity is by name: two
/// external types with the same name are the same lattice point.
#[derive(Debug, Clone)]
pub struct ExternalRef(pub Arc<dyn ExternalType>);

impl PartialEq for ExternalRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.name() == other.0.name()
    }
}

impl Eq for ExternalRef {}

impl Hash for ExternalRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name().hash(state);
    }
}

/// A canonical, immutable type.
///
/// Produced only by [`TypeFactory`](crate::types::TypeFactory), which
/// interns every `TypeKind` through a canonical table. Within one factory,
/// structurally equal types are pointer-identical, so equality and hashing
/// here are pointer operations; use [`Type::equivalent`] for the lattice
/// notion of "same set of values" (which an alias and its aliased type
/// satisfy while remaining distinct identities).
#[derive(Clone)]
pub struct Type(pub(crate) Arc<TypeKind>);

static_assertions::assert_impl_all!(Type: Send, Sync);

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self)
    }
}

impl Type {
    pub fn kind(&self) -> &TypeKind {
        &self.0
    }

    /// Follow alias indirection to the underlying lattice point. Returns
    /// `self` for everything that is not an alias.
    pub fn resolved(&self) -> &Type {
        let mut current = self;
        while let TypeKind::Alias { aliased, .. } = current.kind() {
            current = aliased;
        }
        current
    }

    // ------------------------------------------------------------------
    // Structural accessors. Each is defined only for the variants that
    // carry the attribute and reports `UnsupportedOperation` otherwise;
    // aliases are looked through.
    // ------------------------------------------------------------------

    /// Element type of a list or set (and hence of a relation).
    pub fn element_type(&self) -> Result<Type> {
        match self.resolved().kind() {
            TypeKind::List { elem } | TypeKind::Set { elem } => Ok(elem.clone()),
            _ => Err(Error::unsupported("elementType", self)),
        }
    }

    /// Key type of a map.
    pub fn key_type(&self) -> Result<Type> {
        match self.resolved().kind() {
            TypeKind::Map { key, .. } => Ok(key.clone()),
            _ => Err(Error::unsupported("keyType", self)),
        }
    }

    /// Value type of a map.
    pub fn value_type(&self) -> Result<Type> {
        match self.resolved().kind() {
            TypeKind::Map { value, .. } => Ok(value.clone()),
            _ => Err(Error::unsupported("valueType", self)),
        }
    }

    /// Width of a tuple or constructor.
    pub fn arity(&self) -> Result<usize> {
        match self.resolved().kind() {
            TypeKind::Tuple { fields, .. } => Ok(fields.len()),
            TypeKind::Constructor { fields, .. } => fields.arity(),
            _ => Err(Error::unsupported("arity", self)),
        }
    }

    /// Field types of a tuple or constructor.
    pub fn field_types(&self) -> Result<Fields> {
        match self.resolved().kind() {
            TypeKind::Tuple { fields, .. } => Ok(fields.clone()),
            TypeKind::Constructor { fields, .. } => fields.field_types(),
            _ => Err(Error::unsupported("fieldTypes", self)),
        }
    }

    /// Type of the field at index `i` of a tuple or constructor.
    pub fn field_type(&self, i: usize) -> Result<Type> {
        match self.resolved().kind() {
            TypeKind::Tuple { fields, .. } => fields
                .get(i)
                .cloned()
                .ok_or_else(|| Error::unsupported("fieldType", self)),
            TypeKind::Constructor { fields, .. } => fields.field_type(i),
            _ => Err(Error::unsupported("fieldType", self)),
        }
    }

    /// Type of the field labelled `name`. Reports a declaration error when
    /// the receiver has no such label (or no labels at all).
    pub fn field_type_by_name(&self, name: &str) -> Result<Type> {
        let i = self.field_index(name)?;
        self.field_type(i)
    }

    /// Label of field `i`, for labelled tuples and constructors.
    pub fn field_name(&self, i: usize) -> Result<EcoString> {
        match self.resolved().kind() {
            TypeKind::Tuple {
                labels: Some(labels),
                ..
            } => labels
                .get(i)
                .cloned()
                .ok_or_else(|| Error::unsupported("fieldName", self)),
            TypeKind::Constructor { fields, .. } => fields.field_name(i),
            _ => Err(Error::unsupported("fieldName", self)),
        }
    }

    /// Index of the field labelled `name`.
    pub fn field_index(&self, name: &str) -> Result<usize> {
        match self.resolved().kind() {
            TypeKind::Tuple {
                labels: Some(labels),
                ..
            } => labels
                .iter()
                .position(|l| l == name)
                .ok_or_else(|| Error::declaration(format!("no field `{name}` in {self}"))),
            TypeKind::Constructor { fields, .. } => fields.field_index(name),
            _ => Err(Error::unsupported("fieldIndex", self)),
        }
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field_index(name).is_ok()
    }

    /// Whether a tuple or constructor carries field labels.
    pub fn has_field_names(&self) -> bool {
        match self.resolved().kind() {
            TypeKind::Tuple { labels, .. } => labels.is_some(),
            TypeKind::Constructor { fields, .. } => fields.has_field_names(),
            _ => false,
        }
    }

    /// The abstract data type a constructor constructs.
    pub fn get_abstract_data_type(&self) -> Result<Type> {
        match self.resolved().kind() {
            TypeKind::Constructor { adt, .. } => Ok(adt.clone()),
            TypeKind::AbstractData { .. } => Ok(self.resolved().clone()),
            _ => Err(Error::unsupported("abstractDataType", self)),
        }
    }

    /// The type an alias stands for. Not alias-resolving on purpose: this
    /// is the one accessor that asks about the alias itself.
    pub fn get_aliased(&self) -> Result<Type> {
        match self.kind() {
            TypeKind::Alias { aliased, .. } => Ok(aliased.clone()),
            _ => Err(Error::unsupported("aliased", self)),
        }
    }

    /// Upper bound of a type parameter.
    pub fn get_bound(&self) -> Result<Type> {
        match self.kind() {
            TypeKind::Parameter { bound, .. } => Ok(bound.clone()),
            _ => Err(Error::unsupported("bound", self)),
        }
    }

    /// Name of an abstract data type, constructor, alias, parameter or
    /// external type.
    pub fn name(&self) -> Result<EcoString> {
        match self.kind() {
            TypeKind::AbstractData { name, .. }
            | TypeKind::Constructor { name, .. }
            | TypeKind::Alias { name, .. }
            | TypeKind::Parameter { name, .. } => Ok(name.clone()),
            TypeKind::External(ext) => Ok(EcoString::from(ext.0.name())),
            _ => Err(Error::unsupported("name", self)),
        }
    }

    /// Type parameters of an abstract data type or alias.
    pub fn type_parameters(&self) -> Result<Params> {
        match self.kind() {
            TypeKind::AbstractData { params, .. } | TypeKind::Alias { params, .. } => {
                Ok(params.clone())
            }
            _ => Err(Error::unsupported("typeParameters", self)),
        }
    }

    pub fn is_parameterized(&self) -> bool {
        match self.kind() {
            TypeKind::AbstractData { params, .. } | TypeKind::Alias { params, .. } => {
                !params.is_empty()
            }
            _ => false,
        }
    }

    /// Whether any uninstantiated type parameter occurs inside this type.
    pub fn is_open(&self) -> bool {
        match self.kind() {
            TypeKind::Parameter { .. } => true,
            TypeKind::Tuple { fields, .. } => fields.iter().any(Type::is_open),
            TypeKind::List { elem } | TypeKind::Set { elem } => elem.is_open(),
            TypeKind::Map { key, value } => key.is_open() || value.is_open(),
            TypeKind::AbstractData { params, .. } => params.iter().any(Type::is_open),
            TypeKind::Constructor { adt, fields, .. } => adt.is_open() || fields.is_open(),
            TypeKind::Alias {
                params, aliased, ..
            } => aliased.is_open() || params.iter().any(Type::is_open),
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Variant predicates.
    // ------------------------------------------------------------------

    pub fn is_top(&self) -> bool {
        matches!(self.resolved().kind(), TypeKind::Value)
    }

    pub fn is_bottom(&self) -> bool {
        matches!(self.resolved().kind(), TypeKind::Void)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self.resolved().kind(), TypeKind::Bool)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self.resolved().kind(), TypeKind::Integer)
    }

    pub fn is_real(&self) -> bool {
        matches!(self.resolved().kind(), TypeKind::Real)
    }

    pub fn is_rational(&self) -> bool {
        matches!(self.resolved().kind(), TypeKind::Rational)
    }

    /// True for all of the numeric tower, including `Number` itself.
    pub fn is_number(&self) -> bool {
        matches!(
            self.resolved().kind(),
            TypeKind::Integer | TypeKind::Real | TypeKind::Rational | TypeKind::Number
        )
    }

    pub fn is_string(&self) -> bool {
        matches!(self.resolved().kind(), TypeKind::Str)
    }

    pub fn is_source_location(&self) -> bool {
        matches!(self.resolved().kind(), TypeKind::SourceLocation)
    }

    pub fn is_date_time(&self) -> bool {
        matches!(self.resolved().kind(), TypeKind::DateTime)
    }

    pub fn is_node(&self) -> bool {
        matches!(
            self.resolved().kind(),
            TypeKind::Node | TypeKind::AbstractData { .. } | TypeKind::Constructor { .. }
        )
    }

    pub fn is_abstract_data(&self) -> bool {
        matches!(
            self.resolved().kind(),
            TypeKind::AbstractData { .. } | TypeKind::Constructor { .. }
        )
    }

    pub fn is_constructor(&self) -> bool {
        matches!(self.resolved().kind(), TypeKind::Constructor { .. })
    }

    pub fn is_aliased(&self) -> bool {
        matches!(self.kind(), TypeKind::Alias { .. })
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self.kind(), TypeKind::Parameter { .. })
    }

    pub fn is_external(&self) -> bool {
        matches!(self.resolved().kind(), TypeKind::External(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self.resolved().kind(), TypeKind::List { .. })
    }

    pub fn is_set(&self) -> bool {
        matches!(self.resolved().kind(), TypeKind::Set { .. })
    }

    pub fn is_map(&self) -> bool {
        matches!(self.resolved().kind(), TypeKind::Map { .. })
    }

    pub fn is_tuple(&self) -> bool {
        self.is_fixed_width()
    }

    /// A type with a statically known arity: a tuple or a constructor.
    pub fn is_fixed_width(&self) -> bool {
        matches!(
            self.resolved().kind(),
            TypeKind::Tuple { .. } | TypeKind::Constructor { .. }
        )
    }

    /// A relation is a set whose element type is fixed-width.
    pub fn is_relation(&self) -> bool {
        match self.resolved().kind() {
            TypeKind::Set { elem } => elem.is_fixed_width(),
            _ => false,
        }
    }

    /// A list relation is a list whose element type is fixed-width.
    pub fn is_list_relation(&self) -> bool {
        match self.resolved().kind() {
            TypeKind::List { elem } => elem.is_fixed_width(),
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            TypeKind::Void => write!(f, "Void"),
            TypeKind::Value => write!(f, "Value"),
            TypeKind::Bool => write!(f, "Bool"),
            TypeKind::Integer => write!(f, "Int"),
            TypeKind::Real => write!(f, "Real"),
            TypeKind::Rational => write!(f, "Rat"),
            TypeKind::Number => write!(f, "Num"),
            TypeKind::Str => write!(f, "Str"),
            TypeKind::SourceLocation => write!(f, "Loc"),
            TypeKind::DateTime => write!(f, "DateTime"),
            TypeKind::Node => write!(f, "Node"),
            TypeKind::Tuple { fields, labels } => {
                write!(f, "Tuple[")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match labels {
                        Some(labels) => write!(f, "{} {}", field, labels[i])?,
                        None => write!(f, "{}", field)?,
                    }
                }
                write!(f, "]")
            }
            TypeKind::List { elem } => write!(f, "List[{}]", elem),
            TypeKind::Set { elem } => write!(f, "Set[{}]", elem),
            TypeKind::Map { key, value } => write!(f, "Map[{}, {}]", key, value),
            TypeKind::AbstractData { name, params } => {
                write!(f, "{}", name)?;
                write_params(f, params)
            }
            TypeKind::Constructor { name, adt, fields } => {
                write!(f, "{}::{}", adt, name)?;
                match fields.kind() {
                    TypeKind::Tuple {
                        fields: field_types,
                        labels,
                    } => {
                        write!(f, "(")?;
                        for (i, field) in field_types.iter().enumerate() {
                            if i > 0 {
                                write!(f, ", ")?;
                            }
                            match labels {
                                Some(labels) => write!(f, "{} {}", field, labels[i])?,
                                None => write!(f, "{}", field)?,
                            }
                        }
                        write!(f, ")")
                    }
                    _ => write!(f, "(?)"),
                }
            }
            TypeKind::Alias { name, params, .. } => {
                write!(f, "{}", name)?;
                write_params(f, params)
            }
            TypeKind::Parameter { name, .. } => write!(f, "&{}", name),
            TypeKind::External(ext) => write!(f, "{}", ext.0.name()),
        }
    }
}

fn write_params(f: &mut fmt::Formatter<'_>, params: &Params) -> fmt::Result {
    if params.is_empty() {
        return Ok(());
    }
    write!(f, "[")?;
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", p)?;
    }
    write!(f, "]")
}
