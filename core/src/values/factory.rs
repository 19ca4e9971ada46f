use std::sync::Arc;

use ecow::EcoString;

use crate::canonical::CanonicalTable;
use crate::errors::{Error, Result};
use crate::types::TypeFactory;
use crate::values::value::{Value, ValueKind};

/// Constructs canonical [`Value`] instances.
///
/// Every value flows through the factory's canonical table, bottom-up:
/// children are interned before the composites holding them, so structural
/// hashing inside the table only ever sees canonical children. The two
/// booleans are pre-interned.
pub struct ValueFactory {
    types: Arc<TypeFactory>,
    table: Arc<CanonicalTable<ValueKind>>,
    true_v: Value,
    false_v: Value,
}

impl ValueFactory {
    pub fn new() -> Self {
        ValueFactory::with_types(Arc::new(TypeFactory::new()))
    }

    /// Share an existing type factory, so values and types agree on
    /// canonical type identity.
    pub fn with_types(types: Arc<TypeFactory>) -> Self {
        let table = CanonicalTable::new();
        let intern = |kind: ValueKind| Value(table.get(kind));
        ValueFactory {
            true_v: intern(ValueKind::Bool(true)),
            false_v: intern(ValueKind::Bool(false)),
            types,
            table,
        }
    }

    pub fn types(&self) -> &TypeFactory {
        &self.types
    }

    pub(crate) fn intern(&self, kind: ValueKind) -> Value {
        Value(self.table.get(kind))
    }

    pub fn bool_value(&self, value: bool) -> Value {
        if value {
            self.true_v.clone()
        } else {
            self.false_v.clone()
        }
    }

    pub fn integer(&self, value: i64) -> Value {
        self.intern(ValueKind::Integer(value))
    }

    pub fn real(&self, value: f64) -> Value {
        self.intern(ValueKind::Real(value))
    }

    /// A rational, normalized so the denominator is positive and the two
    /// components are coprime. A zero denominator is rejected.
    pub fn rational(&self, num: i64, den: i64) -> Result<Value> {
        if den == 0 {
            return Err(Error::unsupported("rational", "zero denominator"));
        }
        let sign = if den < 0 { -1 } else { 1 };
        let g = gcd(num.unsigned_abs(), den.unsigned_abs()) as i64;
        Ok(self.intern(ValueKind::Rational {
            num: sign * num / g,
            den: den.abs() / g,
        }))
    }

    pub fn string(&self, value: impl Into<EcoString>) -> Value {
        self.intern(ValueKind::Str(value.into()))
    }

    pub fn source_location(
        &self,
        uri: impl Into<EcoString>,
        offset: Option<(usize, usize)>,
    ) -> Value {
        self.intern(ValueKind::SourceLocation {
            uri: uri.into(),
            offset,
        })
    }

    pub fn date_time(&self, instant_millis: i64) -> Value {
        self.intern(ValueKind::DateTime(instant_millis))
    }

    pub fn tuple(&self, values: impl IntoIterator<Item = Value>) -> Value {
        self.intern(ValueKind::Tuple(values.into_iter().collect()))
    }

    /// Binary tuple; the building block of relations.
    pub fn pair(&self, left: Value, right: Value) -> Value {
        self.tuple([left, right])
    }

    pub fn node(
        &self,
        name: impl Into<EcoString>,
        children: impl IntoIterator<Item = Value>,
    ) -> Value {
        self.intern(ValueKind::Node {
            name: name.into(),
            children: children.into_iter().collect(),
        })
    }

    pub fn list(&self, values: impl IntoIterator<Item = Value>) -> Value {
        self.list_value(values.into_iter().collect())
    }

    pub(crate) fn list_value(&self, values: im::Vector<Value>) -> Value {
        self.intern(ValueKind::List(values))
    }

    pub fn set(&self, values: impl IntoIterator<Item = Value>) -> Value {
        self.set_value(values.into_iter().collect())
    }

    pub(crate) fn set_value(&self, values: im::HashSet<Value>) -> Value {
        self.intern(ValueKind::Set(values))
    }

    pub fn empty_set(&self) -> Value {
        self.set_value(im::HashSet::new())
    }

    pub fn map(&self, entries: impl IntoIterator<Item = (Value, Value)>) -> Value {
        self.map_value(entries.into_iter().collect())
    }

    pub(crate) fn map_value(&self, entries: im::HashMap<Value, Value>) -> Value {
        self.intern(ValueKind::Map(entries))
    }
}

impl Default for ValueFactory {
    fn default() -> Self {
        ValueFactory::new()
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a.max(1)
}
