pub mod factory;
mod lattice;
pub mod parametric;
pub mod reify;
pub mod store;
mod types;

#[cfg(test)]
mod factory_test;
#[cfg(test)]
mod parametric_test;
#[cfg(test)]
mod reify_test;

pub use factory::TypeFactory;
pub use parametric::Bindings;
pub use reify::{from_symbol, from_symbols, productions_for, ReifyEnv};
pub use store::TypeStore;
pub use types::{ExternalRef, ExternalType, Fields, Labels, Params, Type, TypeKind};
