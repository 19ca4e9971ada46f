//! Tern - a canonical value-and-type model for term rewriting hosts
//!
//! # Overview
//!
//! Tern models the runtime values of a term-rewriting/metaprogramming
//! system — integers, strings, sets, maps, tuples, tree nodes — each
//! carrying a precise structural type drawn from a shared type lattice.
//! Structurally equal values and types are guaranteed to be the *same*
//! canonical object, which turns deep equality into pointer comparison
//! across the whole system.
//!
//! # Quick Start
//!
//! ```
//! use tern::{SetRelation, ValueFactory};
//!
//! let vf = ValueFactory::new();
//!
//! // Two equal values are the same canonical object.
//! let a = vf.integer(42);
//! let b = vf.integer(42);
//! assert_eq!(a, b);
//!
//! // Relations are canonical sets of pairs.
//! let edges = vf.set([
//!     vf.pair(vf.integer(1), vf.integer(2)),
//!     vf.pair(vf.integer(2), vf.integer(3)),
//! ]);
//! let reach = SetRelation::new(&vf, edges).unwrap().closure().unwrap();
//! assert_eq!(reach.len().unwrap(), 3);
//! ```
//!
//! # Types
//!
//! Types come from a [`TypeFactory`] and support the full lattice
//! protocol — `is_subtype_of`, `lub`, `glb` — plus parametric
//! instantiation/matching and reification to a generic tree value:
//!
//! ```
//! use std::sync::Arc;
//! use tern::{TypeFactory, ValueFactory};
//!
//! let tf = Arc::new(TypeFactory::new());
//! let vf = ValueFactory::with_types(tf.clone());
//!
//! let rel = tf.relation([tf.integer(), tf.integer()]);
//! assert!(rel.is_relation());
//! assert!(rel.is_subtype_of(&tf.set(tf.value_type())));
//!
//! // Values and types agree on canonical identity.
//! let pair = vf.pair(vf.integer(1), vf.integer(2));
//! assert_eq!(vf.set([pair]).type_of(&tf), rel);
//! ```

// Re-export the public API from tern_core
pub use tern_core::canonical::{CanonicalTable, CLEANUP_INTERVAL};
pub use tern_core::errors::{Error, Result};
pub use tern_core::relations::SetRelation;
pub use tern_core::types::{
    self, from_symbol, from_symbols, productions_for, Bindings, ExternalType, ReifyEnv, Type,
    TypeFactory, TypeKind, TypeStore,
};
pub use tern_core::values::{self, Value, ValueFactory, ValueKind};
