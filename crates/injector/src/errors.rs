//! Error types for registration and resolution.

use thiserror::Error;

use crate::identity::TypeKey;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Registration rejected: the constructor can never produce its product.
    #[error("invalid constructor for `{type_name}`: {reason}")]
    InvalidConstructor {
        type_name: &'static str,
        reason: &'static str,
    },

    /// A stored value did not hold the type its key promises.
    #[error("value stored for `{key}` is not a `{requested}`")]
    BindingMismatch {
        key: TypeKey,
        requested: &'static str,
    },

    /// Resolution reached a concrete type with no binding and no cached
    /// instance.
    #[error("no binding registered for `{0}`")]
    NoBindingRegistered(TypeKey),

    /// An interface request found no cached instance, binding, or upcast
    /// satisfying it.
    #[error("no implementation found for interface `{0}`")]
    NoImplementationFound(TypeKey),

    /// The dependency chain looped back onto a type already under
    /// construction on this call stack.
    #[error("circular dependency detected: {}", .chain.join(" -> "))]
    CircularDependency { chain: Vec<&'static str> },

    /// A fallible constructor reported failure. Nothing is cached for the
    /// identity; a later resolution retries from scratch.
    #[error("constructor for `{type_name}` failed")]
    ConstructionFailed {
        type_name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}
