//! Core traits: component marking, dependency resolution, interface upcasts.

use std::any::Any;
use std::sync::Arc;

use crate::container::Container;
use crate::context::ResolutionContext;
use crate::errors::{Error, Result};
use crate::identity::{Dependency, TypeKey};

/// Marker for values the container may construct and cache.
///
/// Implement it directly (`impl Component for Db {}`) or through
/// `#[derive(Component)]`. The marker keeps constructor inference
/// unambiguous: a `Result` is never a component, so a fallible constructor
/// cannot be mistaken for a plain one returning a `Result` product.
pub trait Component: Any + Send + Sync {}

/// A value that can be resolved out of a [`Container`]: constructor
/// parameters and injected struct fields both go through this trait.
pub trait Resolve: Sized + Send + Sync + 'static {
    /// Descriptor of the dependency this value stands for.
    fn dependency() -> Dependency;

    fn resolve(container: &Container, ctx: &mut ResolutionContext) -> Result<Self>;
}

/// Shared handle to a cached singleton, concrete or interface.
impl<T: ?Sized + Send + Sync + 'static> Resolve for Arc<T> {
    fn dependency() -> Dependency {
        Dependency::required(TypeKey::of::<T>())
    }

    fn resolve(container: &Container, ctx: &mut ResolutionContext) -> Result<Self> {
        container.resolve_in::<T>(ctx)
    }
}

/// Optional dependency: an absent binding for `T` itself resolves to `None`
/// instead of failing. Failures deeper in `T`'s own dependency chain still
/// propagate.
impl<T: ?Sized + Send + Sync + 'static> Resolve for Option<Arc<T>> {
    fn dependency() -> Dependency {
        Dependency::optional(TypeKey::of::<T>())
    }

    fn resolve(container: &Container, ctx: &mut ResolutionContext) -> Result<Self> {
        let own_key = TypeKey::of::<T>();
        match container.resolve_in::<T>(ctx) {
            Ok(value) => Ok(Some(value)),
            Err(Error::NoBindingRegistered(key)) if key == own_key => Ok(None),
            Err(Error::NoImplementationFound(key)) if key == own_key => Ok(None),
            Err(other) => Err(other),
        }
    }
}

/// The container itself can be asked for, for factories that look services
/// up at call time rather than through parameters.
impl Resolve for Container {
    fn dependency() -> Dependency {
        Dependency::optional(TypeKey::of::<Container>())
    }

    fn resolve(container: &Container, _ctx: &mut ResolutionContext) -> Result<Self> {
        Ok(container.clone())
    }
}

/// Declares that `Self` satisfies the interface `I` and provides the
/// unsizing step the container cannot perform through erased storage.
///
/// Usually emitted by `#[component(implements(dyn I))]`; a manual
/// implementation is one line:
///
/// ```ignore
/// impl Implements<dyn Store> for Db {
///     fn upcast(this: Arc<Self>) -> Arc<dyn Store> {
///         this
///     }
/// }
/// ```
///
/// The coercion in the body only compiles when `Self` actually implements
/// the trait behind `I`, which is what makes a mismatched interface
/// registration a compile error rather than a runtime one.
pub trait Implements<I: ?Sized + 'static>: Component {
    fn upcast(this: Arc<Self>) -> Arc<I>;
}
