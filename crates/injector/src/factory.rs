//! Constructor registration: any suitable `Fn` acts as a factory.

use std::any::type_name;

use crate::container::Container;
use crate::context::ResolutionContext;
use crate::errors::{Error, Result};
use crate::identity::Dependency;
use crate::traits::{Component, Resolve};

#[doc(hidden)]
pub struct Value;

#[doc(hidden)]
pub struct Fallible;

/// A registerable constructor.
///
/// Implemented for every `Fn` of up to eight parameters where each
/// parameter implements [`Resolve`] and the return type is either a
/// [`Component`] or a `Result<Component, E>` with `E: Into<anyhow::Error>`.
/// `M` is an inference marker; callers never name it.
pub trait Factory<M>: Send + Sync + 'static {
    type Output: Component;

    /// Parameter descriptors, in declared order.
    fn dependencies() -> Vec<Dependency>;

    /// Resolves every parameter, then invokes the underlying function.
    ///
    /// Parameter-resolution failures propagate unchanged; a failure
    /// reported by the function itself becomes
    /// [`Error::ConstructionFailed`].
    fn construct(&self, container: &Container, ctx: &mut ResolutionContext)
        -> Result<Self::Output>;
}

macro_rules! impl_factory {
    ($($param:ident),*) => {
        impl<Func, Out, $($param,)*> Factory<(Value, fn($($param,)*) -> Out)> for Func
        where
            Func: Fn($($param),*) -> Out + Send + Sync + 'static,
            Out: Component,
            $($param: Resolve,)*
        {
            type Output = Out;

            fn dependencies() -> Vec<Dependency> {
                vec![$(<$param as Resolve>::dependency()),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn construct(
                &self,
                container: &Container,
                ctx: &mut ResolutionContext,
            ) -> Result<Out> {
                $(let $param = <$param as Resolve>::resolve(container, ctx)?;)*
                Ok((self)($($param),*))
            }
        }

        impl<Func, Out, Fail, $($param,)*>
            Factory<(Fallible, fn($($param,)*) -> std::result::Result<Out, Fail>)> for Func
        where
            Func: Fn($($param),*) -> std::result::Result<Out, Fail> + Send + Sync + 'static,
            Out: Component,
            Fail: Into<anyhow::Error>,
            $($param: Resolve,)*
        {
            type Output = Out;

            fn dependencies() -> Vec<Dependency> {
                vec![$(<$param as Resolve>::dependency()),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn construct(
                &self,
                container: &Container,
                ctx: &mut ResolutionContext,
            ) -> Result<Out> {
                $(let $param = <$param as Resolve>::resolve(container, ctx)?;)*
                (self)($($param),*).map_err(|source| Error::ConstructionFailed {
                    type_name: type_name::<Out>(),
                    source: source.into(),
                })
            }
        }
    };
}

impl_factory!();
impl_factory!(A);
impl_factory!(A, B);
impl_factory!(A, B, C);
impl_factory!(A, B, C, D);
impl_factory!(A, B, C, D, E);
impl_factory!(A, B, C, D, E, F);
impl_factory!(A, B, C, D, E, F, G);
impl_factory!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::identity::TypeKey;

    struct First;
    struct Second;
    struct Product;

    impl Component for First {}
    impl Component for Second {}
    impl Component for Product {}

    fn deps_of<M, F: Factory<M>>(_factory: &F) -> Vec<Dependency> {
        F::dependencies()
    }

    fn build(_first: Arc<First>, _second: Option<Arc<Second>>) -> Product {
        Product
    }

    fn build_fallible(_first: Arc<First>) -> anyhow::Result<Product> {
        Ok(Product)
    }

    #[test]
    fn dependencies_in_declared_order() {
        let deps = deps_of(&build);
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].key, TypeKey::of::<First>());
        assert!(deps[0].required);
        assert_eq!(deps[1].key, TypeKey::of::<Second>());
        assert!(!deps[1].required);
    }

    #[test]
    fn fallible_constructors_are_factories_too() {
        let deps = deps_of(&build_fallible);
        assert_eq!(deps.len(), 1);
    }

    #[test]
    fn closures_are_factories() {
        let deps = deps_of(&|| Product);
        assert!(deps.is_empty());
    }
}
