//! The canonical, immutable value-and-type model behind a term-rewriting
//! host.
//!
//! Three tightly-coupled subsystems make the model efficient and correct:
//!
//! - [`canonical`] — weak hash-consing tables guaranteeing at most one
//!   live representative per structurally-equal immutable object, so
//!   equality is a pointer comparison everywhere else;
//! - [`types`] — the type lattice: subtyping, least upper bounds and
//!   greatest lower bounds over a closed set of variants, parametric
//!   instantiation and matching, and bidirectional reification of types
//!   to a generic tree value;
//! - [`relations`] — composition and transitive closure over canonical
//!   sets of binary tuples, the payoff of having canonical immutable
//!   sets.
//!
//! Values ([`values`]) carry precise structural types drawn from the
//! lattice; the persistent containers behind lists, sets and maps come
//! from the `im` crate.

pub mod canonical;
pub mod errors;
pub mod relations;
pub mod types;
pub mod values;

pub use errors::{Error, Result};
pub use relations::SetRelation;
pub use types::{Type, TypeFactory, TypeKind, TypeStore};
pub use values::{Value, ValueFactory, ValueKind};

/// Test utilities for enabling logging in tests
#[cfg(test)]
pub mod test_utils {
    /// Initialize tracing subscriber for tests with DEBUG level
    /// Call this at the start of tests where you want to see logging output
    pub fn init_test_logging() {
        use tracing_subscriber::{fmt, EnvFilter};

        // Try to initialize, ignore error if already initialized
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}
