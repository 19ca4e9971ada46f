use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use ecow::EcoString;
use smallvec::SmallVec;

use crate::errors::{Error, Result};
use crate::types::{Type, TypeFactory};

pub type TupleValues = SmallVec<[Value; 4]>;

/// The closed set of value variants.
///
/// `Real` compares and hashes bitwise so that interning is total (a NaN is
/// canonical like everything else). Sets and maps hash order-independently
/// over the pointer identities of their members, which is sound because
/// members are themselves canonical.
#[derive(Debug, Clone)]
pub enum ValueKind {
    Bool(bool),
    Integer(i64),
    Real(f64),
    /// Normalized: `den > 0` and gcd(num, den) == 1.
    Rational { num: i64, den: i64 },
    Str(EcoString),
    SourceLocation {
        uri: EcoString,
        /// Character offset and length, when known.
        offset: Option<(usize, usize)>,
    },
    /// An instant in epoch milliseconds. Calendar-field construction is a
    /// collaborator's concern, not ours.
    DateTime(i64),
    Tuple(TupleValues),
    /// A generic tree node; also the carrier of reified type symbols.
    Node {
        name: EcoString,
        children: im::Vector<Value>,
    },
    List(im::Vector<Value>),
    Set(im::HashSet<Value>),
    Map(im::HashMap<Value, Value>),
}

impl PartialEq for ValueKind {
    fn eq(&self, other: &Self) -> bool {
        use ValueKind::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Real(a), Real(b)) => a.to_bits() == b.to_bits(),
            (Rational { num: n1, den: d1 }, Rational { num: n2, den: d2 }) => {
                n1 == n2 && d1 == d2
            }
            (Str(a), Str(b)) => a == b,
            (
                SourceLocation {
                    uri: u1,
                    offset: o1,
                },
                SourceLocation {
                    uri: u2,
                    offset: o2,
                },
            ) => u1 == u2 && o1 == o2,
            (DateTime(a), DateTime(b)) => a == b,
            (Tuple(a), Tuple(b)) => a == b,
            (
                Node {
                    name: n1,
                    children: c1,
                },
                Node {
                    name: n2,
                    children: c2,
                },
            ) => n1 == n2 && c1 == c2,
            (List(a), List(b)) => a == b,
            (Set(a), Set(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ValueKind {}

impl Hash for ValueKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        use ValueKind::*;
        std::mem::discriminant(self).hash(state);
        match self {
            Bool(b) => b.hash(state),
            Integer(i) => i.hash(state),
            Real(r) => r.to_bits().hash(state),
            Rational { num, den } => {
                num.hash(state);
                den.hash(state);
            }
            Str(s) => s.hash(state),
            SourceLocation { uri, offset } => {
                uri.hash(state);
                offset.hash(state);
            }
            DateTime(millis) => millis.hash(state),
            Tuple(values) => values.hash(state),
            Node { name, children } => {
                name.hash(state);
                for child in children {
                    child.hash(state);
                }
            }
            List(values) => {
                for value in values {
                    value.hash(state);
                }
            }
            // Iteration order over a hash set is arbitrary, so fold the
            // member identities commutatively before feeding the hasher.
            Set(values) => {
                let mut acc: u64 = 0;
                for value in values {
                    acc = acc.wrapping_add(value.identity());
                }
                values.len().hash(state);
                acc.hash(state);
            }
            Map(entries) => {
                let mut acc: u64 = 0;
                for (key, value) in entries {
                    acc = acc.wrapping_add(key.identity().rotate_left(17) ^ value.identity());
                }
                entries.len().hash(state);
                acc.hash(state);
            }
        }
    }
}

/// A canonical, immutable value.
///
/// Produced only by [`ValueFactory`](crate::values::ValueFactory), which
/// interns every `ValueKind`; equality and hashing are pointer operations,
/// amortizing structural comparison to a reference check everywhere values
/// are used (set membership, join indexes, fixpoint deltas).
#[derive(Clone)]
pub struct Value(pub(crate) Arc<ValueKind>);

static_assertions::assert_impl_all!(Value: Send, Sync);

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({})", self)
    }
}

impl Value {
    pub fn kind(&self) -> &ValueKind {
        &self.0
    }

    fn identity(&self) -> u64 {
        Arc::as_ptr(&self.0) as usize as u64
    }

    /// The precise structural type of this value. Collection types use the
    /// least upper bound of their members' types, with `Void` elements for
    /// empty collections.
    pub fn type_of(&self, tf: &TypeFactory) -> Type {
        match self.kind() {
            ValueKind::Bool(_) => tf.bool_type(),
            ValueKind::Integer(_) => tf.integer(),
            ValueKind::Real(_) => tf.real(),
            ValueKind::Rational { .. } => tf.rational(),
            ValueKind::Str(_) => tf.string(),
            ValueKind::SourceLocation { .. } => tf.source_location(),
            ValueKind::DateTime(_) => tf.date_time(),
            ValueKind::Tuple(values) => tf.tuple(values.iter().map(|v| v.type_of(tf))),
            ValueKind::Node { .. } => tf.node(),
            ValueKind::List(values) => tf.list(lub_of(values.iter(), tf)),
            ValueKind::Set(values) => tf.set(lub_of(values.iter(), tf)),
            ValueKind::Map(entries) => tf.map(
                lub_of(entries.keys(), tf),
                lub_of(entries.values(), tf),
            ),
        }
    }

    // ------------------------------------------------------------------
    // Variant access.
    // ------------------------------------------------------------------

    pub fn as_bool(&self) -> Result<bool> {
        match self.kind() {
            ValueKind::Bool(b) => Ok(*b),
            _ => Err(Error::unsupported("asBool", self)),
        }
    }

    pub fn as_integer(&self) -> Result<i64> {
        match self.kind() {
            ValueKind::Integer(i) => Ok(*i),
            _ => Err(Error::unsupported("asInteger", self)),
        }
    }

    pub fn as_real(&self) -> Result<f64> {
        match self.kind() {
            ValueKind::Real(r) => Ok(*r),
            _ => Err(Error::unsupported("asReal", self)),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self.kind() {
            ValueKind::Str(s) => Ok(s.as_str()),
            _ => Err(Error::unsupported("asStr", self)),
        }
    }

    pub fn as_tuple(&self) -> Result<&TupleValues> {
        match self.kind() {
            ValueKind::Tuple(values) => Ok(values),
            _ => Err(Error::unsupported("asTuple", self)),
        }
    }

    pub fn as_list(&self) -> Result<&im::Vector<Value>> {
        match self.kind() {
            ValueKind::List(values) => Ok(values),
            _ => Err(Error::unsupported("asList", self)),
        }
    }

    pub fn as_set(&self) -> Result<&im::HashSet<Value>> {
        match self.kind() {
            ValueKind::Set(values) => Ok(values),
            _ => Err(Error::unsupported("asSet", self)),
        }
    }

    pub fn as_map(&self) -> Result<&im::HashMap<Value, Value>> {
        match self.kind() {
            ValueKind::Map(entries) => Ok(entries),
            _ => Err(Error::unsupported("asMap", self)),
        }
    }

    pub fn as_node(&self) -> Result<(&EcoString, &im::Vector<Value>)> {
        match self.kind() {
            ValueKind::Node { name, children } => Ok((name, children)),
            _ => Err(Error::unsupported("asNode", self)),
        }
    }

    /// Width of a tuple value.
    pub fn arity(&self) -> Result<usize> {
        Ok(self.as_tuple()?.len())
    }

    /// Field `i` of a tuple value.
    pub fn get(&self, i: usize) -> Result<Value> {
        self.as_tuple()?
            .get(i)
            .cloned()
            .ok_or_else(|| Error::unsupported("get", self))
    }

    pub fn is_set(&self) -> bool {
        matches!(self.kind(), ValueKind::Set(_))
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self.kind(), ValueKind::Tuple(_))
    }
}

fn lub_of<'a>(values: impl Iterator<Item = &'a Value>, tf: &TypeFactory) -> Type {
    values.fold(tf.void_type(), |acc, v| acc.lub(&v.type_of(tf), tf))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ValueKind::Bool(b) => write!(f, "{}", b),
            ValueKind::Integer(i) => write!(f, "{}", i),
            ValueKind::Real(r) => format_real(f, *r),
            ValueKind::Rational { num, den } => write!(f, "{}r{}", num, den),
            ValueKind::Str(s) => write!(f, "\"{}\"", escape_str(s)),
            ValueKind::SourceLocation { uri, offset } => match offset {
                Some((offset, length)) => write!(f, "|{}|({},{})", uri, offset, length),
                None => write!(f, "|{}|", uri),
            },
            ValueKind::DateTime(millis) => write!(f, "$instant({})", millis),
            ValueKind::Tuple(values) => {
                write!(f, "<")?;
                write_joined(f, values.iter())?;
                write!(f, ">")
            }
            ValueKind::Node { name, children } => {
                write!(f, "{}(", name)?;
                write_joined(f, children.iter())?;
                write!(f, ")")
            }
            ValueKind::List(values) => {
                write!(f, "[")?;
                write_joined(f, values.iter())?;
                write!(f, "]")
            }
            ValueKind::Set(values) => {
                write!(f, "{{")?;
                write_joined(f, values.iter())?;
                write!(f, "}}")
            }
            ValueKind::Map(entries) => {
                write!(f, "(")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, ")")
            }
        }
    }
}

fn write_joined<'a>(
    f: &mut fmt::Formatter<'_>,
    values: impl Iterator<Item = &'a Value>,
) -> fmt::Result {
    for (i, value) in values.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", value)?;
    }
    Ok(())
}

/// Reals always render with a decimal point so they never read as ints.
fn format_real(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        return write!(f, "nan");
    }
    if value.is_infinite() {
        return write!(f, "{}", if value > 0.0 { "inf" } else { "-inf" });
    }
    let s = value.to_string();
    if s.contains('.') || s.contains('e') || s.contains('E') {
        write!(f, "{}", s)
    } else {
        write!(f, "{}.", s)
    }
}

fn escape_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}
