use core::fmt::Display;

use thiserror::Error;

/// Errors raised by the type lattice, the stores, reification and the
/// relational operators.
///
/// All of these are local, synchronous failures raised at the call that
/// violates a precondition. None are retried internally, and a failed
/// operation never installs a partial entry into a canonical table or a
/// [`TypeStore`](crate::types::TypeStore).
#[derive(Debug, Error)]
pub enum Error {
    /// An operation was invoked on a variant or arity for which it is not
    /// defined, e.g. `arity()` on a primitive or `compose` on a non-binary
    /// relation. This is a programming error on the caller's side.
    #[error("unsupported operation `{op}` on {on}")]
    UnsupportedOperation { op: &'static str, on: String },

    /// A pattern match failed in a way the caller chose to promote to an
    /// error: a candidate that does not satisfy a parameter's bound, or a
    /// conflicting rebinding of the same parameter. Unlike the other kinds
    /// this one is an expected, recoverable outcome of speculative matching.
    #[error("type mismatch: {message}")]
    TypeMismatch { message: String },

    /// An unrecognized or malformed symbol during type reconstruction.
    /// Fatal to that reconstruction call, not to the process.
    #[error("reification failed: {message}")]
    Reification { message: String },

    /// A named-declaration lookup failed: unknown type name, field label,
    /// annotation or keyword field, or a conflicting re-declaration.
    #[error("declaration error: {message}")]
    Declaration { message: String },
}

impl Error {
    pub(crate) fn unsupported(op: &'static str, on: impl Display) -> Self {
        Error::UnsupportedOperation {
            op,
            on: on.to_string(),
        }
    }

    pub(crate) fn mismatch(message: impl Into<String>) -> Self {
        Error::TypeMismatch {
            message: message.into(),
        }
    }

    pub(crate) fn reification(message: impl Into<String>) -> Self {
        Error::Reification {
            message: message.into(),
        }
    }

    pub(crate) fn declaration(message: impl Into<String>) -> Self {
        Error::Declaration {
            message: message.into(),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
