//! Field-wise construction for types built without a constructor binding.

use crate::container::Container;
use crate::context::ResolutionContext;
use crate::errors::Result;
use crate::identity::Dependency;
use crate::traits::Component;

/// A type the container can assemble by resolving each declared field.
///
/// Implementations are normally generated by `#[derive(Inject)]` on a
/// named-field struct whose fields all implement
/// [`Resolve`](crate::Resolve). The assembly contract matches constructor
/// parameters exactly: fields resolve in declaration order, the first
/// unresolvable field aborts the whole build, and no partial value is ever
/// produced.
pub trait Inject: Component + Sized {
    /// Field dependency descriptors, in declaration order.
    fn dependencies() -> Vec<Dependency>;

    /// Resolves every field and assembles the value.
    fn inject(container: &Container, ctx: &mut ResolutionContext) -> Result<Self>;
}
