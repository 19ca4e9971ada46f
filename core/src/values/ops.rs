//! Operations on immutable collection values. Every result is a fresh
//! canonical value; nothing here mutates in place.

use crate::errors::{Error, Result};
use crate::values::factory::ValueFactory;
use crate::values::value::{Value, ValueKind};

impl Value {
    /// Number of members of a collection value (including the fields of a
    /// tuple and the characters of a string).
    pub fn len(&self) -> Result<usize> {
        match self.kind() {
            ValueKind::Tuple(values) => Ok(values.len()),
            ValueKind::List(values) => Ok(values.len()),
            ValueKind::Set(values) => Ok(values.len()),
            ValueKind::Map(entries) => Ok(entries.len()),
            ValueKind::Str(s) => Ok(s.chars().count()),
            _ => Err(Error::unsupported("len", self)),
        }
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    // ------------------------------------------------------------------
    // Sets.
    // ------------------------------------------------------------------

    pub fn set_insert(&self, elem: Value, vf: &ValueFactory) -> Result<Value> {
        let mut set = self.as_set()?.clone();
        set.insert(elem);
        Ok(vf.set_value(set))
    }

    pub fn set_contains(&self, elem: &Value) -> Result<bool> {
        Ok(self.as_set()?.contains(elem))
    }

    pub fn union(&self, other: &Value, vf: &ValueFactory) -> Result<Value> {
        let mut set = self.as_set()?.clone();
        for elem in other.as_set()? {
            set.insert(elem.clone());
        }
        Ok(vf.set_value(set))
    }

    pub fn intersect(&self, other: &Value, vf: &ValueFactory) -> Result<Value> {
        let big = self.as_set()?;
        let small = other.as_set()?;
        // Membership is a pointer probe either way around; scan the
        // smaller side.
        let (scan, probe) = if small.len() <= big.len() {
            (small, big)
        } else {
            (big, small)
        };
        let set = scan
            .iter()
            .filter(|elem| probe.contains(*elem))
            .cloned()
            .collect();
        Ok(vf.set_value(set))
    }

    pub fn subtract(&self, other: &Value, vf: &ValueFactory) -> Result<Value> {
        let mut set = self.as_set()?.clone();
        for elem in other.as_set()? {
            set.remove(elem);
        }
        Ok(vf.set_value(set))
    }

    /// Cartesian product: the set of pairs over both operands.
    pub fn product(&self, other: &Value, vf: &ValueFactory) -> Result<Value> {
        let mut pairs = im::HashSet::new();
        for left in self.as_set()? {
            for right in other.as_set()? {
                pairs.insert(vf.pair(left.clone(), right.clone()));
            }
        }
        Ok(vf.set_value(pairs))
    }

    pub fn is_subset_of(&self, other: &Value) -> Result<bool> {
        let other = other.as_set()?;
        Ok(self.as_set()?.iter().all(|elem| other.contains(elem)))
    }

    // ------------------------------------------------------------------
    // Lists.
    // ------------------------------------------------------------------

    pub fn append(&self, elem: Value, vf: &ValueFactory) -> Result<Value> {
        let mut list = self.as_list()?.clone();
        list.push_back(elem);
        Ok(vf.list_value(list))
    }

    pub fn concat(&self, other: &Value, vf: &ValueFactory) -> Result<Value> {
        let mut list = self.as_list()?.clone();
        list.append(other.as_list()?.clone());
        Ok(vf.list_value(list))
    }

    pub fn list_get(&self, i: usize) -> Result<Value> {
        self.as_list()?
            .get(i)
            .cloned()
            .ok_or_else(|| Error::unsupported("listGet", self))
    }

    // ------------------------------------------------------------------
    // Strings.
    // ------------------------------------------------------------------

    pub fn str_concat(&self, other: &Value, vf: &ValueFactory) -> Result<Value> {
        let mut s = ecow::EcoString::from(self.as_str()?);
        s.push_str(other.as_str()?);
        Ok(vf.string(s))
    }

    // ------------------------------------------------------------------
    // Maps.
    // ------------------------------------------------------------------

    pub fn map_put(&self, key: Value, value: Value, vf: &ValueFactory) -> Result<Value> {
        let mut entries = self.as_map()?.clone();
        entries.insert(key, value);
        Ok(vf.map_value(entries))
    }

    pub fn map_get(&self, key: &Value) -> Result<Option<Value>> {
        Ok(self.as_map()?.get(key).cloned())
    }
}
