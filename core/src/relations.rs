//! Relational algebra over canonical sets of binary tuples: composition
//! as a hash join, transitive closure as a semi-naive fixpoint.
//!
//! A relation here is derived data: a set value whose elements are
//! fixed-width tuples. Every operator returns a fresh canonical set and
//! never mutates its operands; type-level preconditions are checked
//! through the lattice before any value-level work.

use std::collections::VecDeque;

use hashbrown::{HashMap, HashSet};

use crate::errors::{Error, Result};
use crate::types::{Type, TypeFactory};
use crate::values::{Value, ValueFactory};

/// A binary-relation view over a canonical set value.
pub struct SetRelation<'f> {
    vf: &'f ValueFactory,
    set: Value,
}

impl<'f> SetRelation<'f> {
    /// Wrap a set value. The set's elements are validated lazily, by the
    /// type-level gates of each operation.
    pub fn new(vf: &'f ValueFactory, set: Value) -> Result<Self> {
        if !set.is_set() {
            return Err(Error::unsupported("relation", &set));
        }
        Ok(SetRelation { vf, set })
    }

    pub fn as_container(&self) -> &Value {
        &self.set
    }

    fn tf(&self) -> &TypeFactory {
        self.vf.types()
    }

    fn element_type(&self) -> Result<Type> {
        self.set.type_of(self.tf()).element_type()
    }

    /// Natural-join composition: `{(a, c) | ∃b. (a, b) ∈ self ∧ (b, c) ∈
    /// other}`.
    ///
    /// An empty operand (void element type) short-circuits without any
    /// type probing; non-binary element types are an error; incomparable
    /// adjoining field types yield the empty set without error.
    pub fn compose(&self, other: &SetRelation<'_>) -> Result<Value> {
        let tf = self.tf();
        let left_elem = self.element_type()?;
        let right_elem = other.element_type()?;
        if left_elem.is_bottom() {
            return Ok(self.set.clone());
        }
        if right_elem.is_bottom() {
            return Ok(other.set.clone());
        }
        if left_elem.arity().unwrap_or(0) != 2 || right_elem.arity().unwrap_or(0) != 2 {
            return Err(Error::unsupported(
                "compose",
                format!("{left_elem} with {right_elem}"),
            ));
        }
        if !left_elem
            .field_type(1)?
            .comparable(&right_elem.field_type(0)?)
        {
            return Ok(self.vf.empty_set());
        }

        // Index the right-hand side on its first column, then probe with
        // the left-hand side's second column: a hash join.
        let mut right_index: HashMap<Value, Vec<Value>> = HashMap::new();
        for pair in other.set.as_set()? {
            let key = pair.get(0)?;
            right_index.entry(key).or_default().push(pair.get(1)?);
        }

        let mut result = im::HashSet::new();
        for pair in self.set.as_set()? {
            let probe = pair.get(1)?;
            if let Some(rights) = right_index.get(&probe) {
                let left = pair.get(0)?;
                for right in rights {
                    result.insert(self.vf.pair(left.clone(), right.clone()));
                }
            }
        }
        Ok(self.vf.set_value(result))
    }

    /// Transitive closure, computed semi-naively: each round propagates
    /// only the pairs derived in the previous round.
    pub fn closure(&self) -> Result<Value> {
        // The type-level gate also covers the reflexivity requirement that
        // the two columns be comparable.
        self.set.type_of(self.tf()).closure(self.tf())?;
        let delta = self.closure_delta()?;
        let mut result = self.set.as_set()?.clone();
        for pair in delta {
            result.insert(pair);
        }
        Ok(self.vf.set_value(result))
    }

    /// Reflexive-transitive closure: the closure plus `(e, e)` for every
    /// element of the carrier.
    pub fn closure_star(&self) -> Result<Value> {
        self.set.type_of(self.tf()).closure(self.tf())?;
        let delta = self.closure_delta()?;
        let mut result = self.set.as_set()?.clone();
        for pair in delta {
            result.insert(pair);
        }
        for elem in self.carrier_elements()? {
            result.insert(self.vf.pair(elem.clone(), elem));
        }
        Ok(self.vf.set_value(result))
    }

    /// The newly derivable pairs, excluding the relation itself.
    ///
    /// Round structure: for every "interesting" left value and each right
    /// value newly queued under it, look the right value up in the
    /// previous round's potential-right-sides index (keyed by the
    /// intermediate value); every hit derives a pair. A pair seen before
    /// is dropped; a fresh one is queued for the next round. Work is
    /// proportional to the number of distinct derived tuples and their
    /// immediate successors.
    fn closure_delta(&self) -> Result<HashSet<Value>> {
        // Index the relation: every left value starts out interesting,
        // with all of its right values queued; the potential-right-sides
        // index holds, per key, the right values newly reachable through
        // that key as of the previous round.
        let mut initial: HashMap<Value, VecDeque<Value>> = HashMap::new();
        let mut potential_right_sides: HashMap<Value, HashSet<Value>> = HashMap::new();
        for pair in self.set.as_set()? {
            let left = pair.get(0)?;
            let right = pair.get(1)?;
            initial
                .entry(left.clone())
                .or_default()
                .push_back(right.clone());
            potential_right_sides
                .entry(left)
                .or_default()
                .insert(right);
        }

        let mut interesting: Vec<(Value, VecDeque<Value>)> = initial.into_iter().collect();
        let mut derived: HashSet<Value> = HashSet::new();

        while !interesting.is_empty() {
            let right_sides = std::mem::take(&mut potential_right_sides);
            let mut next: Vec<(Value, VecDeque<Value>)> = Vec::new();
            let mut next_slots: HashMap<Value, usize> = HashMap::new();

            for (left, mut queue) in std::mem::take(&mut interesting) {
                while let Some(via) = queue.pop_front() {
                    let Some(rights) = right_sides.get(&via) else {
                        continue;
                    };
                    for right in rights {
                        let pair = self.vf.pair(left.clone(), right.clone());
                        if !derived.insert(pair) {
                            continue;
                        }
                        // Fresh derivation: queue it under this left value
                        // for the next round, and record it as newly
                        // reachable through the intermediate value.
                        let slot = match next_slots.get(&left) {
                            Some(&slot) => slot,
                            None => {
                                next.push((left.clone(), VecDeque::new()));
                                next_slots.insert(left.clone(), next.len() - 1);
                                next.len() - 1
                            }
                        };
                        next[slot].1.push_back(right.clone());
                        potential_right_sides
                            .entry(via.clone())
                            .or_default()
                            .insert(right.clone());
                    }
                }
            }
            tracing::trace!(
                derived = derived.len(),
                next_round = next.len(),
                "closure round complete"
            );
            interesting = next;
        }

        Ok(derived)
    }

    /// All values appearing in any position of any tuple, as a set.
    pub fn carrier(&self) -> Result<Value> {
        Ok(self.vf.set(self.carrier_elements()?))
    }

    /// Projection to the set of first components.
    pub fn domain(&self) -> Result<Value> {
        let mut elems = im::HashSet::new();
        for tuple in self.set.as_set()? {
            elems.insert(tuple.get(0)?);
        }
        Ok(self.vf.set_value(elems))
    }

    /// Projection to the set of last components.
    pub fn range(&self) -> Result<Value> {
        let mut elems = im::HashSet::new();
        for tuple in self.set.as_set()? {
            let arity = tuple.arity()?;
            elems.insert(tuple.get(arity.saturating_sub(1))?);
        }
        Ok(self.vf.set_value(elems))
    }

    fn carrier_elements(&self) -> Result<Vec<Value>> {
        let mut seen = HashSet::new();
        let mut elems = Vec::new();
        for tuple in self.set.as_set()? {
            for value in tuple.as_tuple()? {
                if seen.insert(value.clone()) {
                    elems.push(value.clone());
                }
            }
        }
        Ok(elems)
    }
}
