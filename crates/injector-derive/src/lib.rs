//! Derive macros for the `injector` container.
//!
//! - `#[derive(Component)]` marks a type as constructible and cacheable,
//!   optionally declaring interface satisfaction via
//!   `#[component(implements(dyn Trait, ...))]`
//! - `#[derive(Inject)]` generates field-wise assembly for structs built
//!   without a constructor binding

use proc_macro::TokenStream;

mod component;
mod inject;

/// Marks a type as a container component.
///
/// Generates `impl injector::Component` and, for every trait object listed
/// in the optional `implements` attribute, an `injector::Implements` upcast:
///
/// ```ignore
/// use injector::Component;
///
/// #[derive(Component)]
/// #[component(implements(dyn Store))]
/// struct SledStore {
///     path: PathBuf,
/// }
///
/// // Generated:
/// // impl injector::Component for SledStore {}
/// // impl injector::Implements<dyn Store> for SledStore { ... }
/// ```
///
/// The upcast body is a plain coercion, so listing a trait the type does
/// not implement is a compile error.
#[proc_macro_derive(Component, attributes(component))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    component::expand(input)
}

/// Generates field-wise assembly for a named-field struct.
///
/// Every field type must implement `injector::Resolve` (in practice
/// `Arc<T>`, `Arc<dyn Trait>`, or `Option<Arc<T>>`), and the struct itself
/// must also derive or implement `Component`:
///
/// ```ignore
/// use std::sync::Arc;
/// use injector::{Component, Inject};
///
/// #[derive(Component, Inject)]
/// struct App {
///     store: Arc<dyn Store>,
///     config: Arc<Config>,
/// }
///
/// let app = container.try_inject::<App>()?;
/// ```
#[proc_macro_derive(Inject)]
pub fn derive_inject(input: TokenStream) -> TokenStream {
    inject::expand(input)
}
