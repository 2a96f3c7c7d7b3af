//! Runtime dependency injection for wiring an application object graph at
//! startup.
//!
//! A [`Container`] maps type identities to constructors and to the
//! singleton instances those constructors produce. Callers ask for a type;
//! the container constructs it on first request by recursively resolving
//! the constructor's own parameters, caches the result, and hands the same
//! shared instance to every later request.
//!
//! ```
//! use std::sync::Arc;
//! use injector::{Component, Container};
//!
//! #[derive(Component)]
//! struct Config {
//!     url: String,
//! }
//!
//! #[derive(Component)]
//! struct Client {
//!     config: Arc<Config>,
//! }
//!
//! fn load_config() -> Config {
//!     Config { url: "localhost".into() }
//! }
//!
//! fn connect(config: Arc<Config>) -> Client {
//!     Client { config }
//! }
//!
//! let container = Container::new();
//! container.provide_lazy(load_config).unwrap();
//! container.provide_lazy(connect).unwrap();
//!
//! let client = container.resolve::<Client>().unwrap();
//! let config = container.resolve::<Config>().unwrap();
//! assert!(Arc::ptr_eq(&client.config, &config));
//! ```
//!
//! Interfaces are trait objects. A constructor registered with
//! [`Container::provide_lazy_as`] is reachable through both its concrete
//! product type and the interface, backed by one instance. Types without a
//! constructor can be assembled field by field with `#[derive(Inject)]` and
//! [`Container::try_inject`].
//!
//! Interface traits must be usable behind `Arc<dyn Trait>` across threads,
//! so declare them `Send + Sync`:
//!
//! ```ignore
//! pub trait Store: Send + Sync {
//!     fn put(&self, key: &str, value: &str);
//! }
//! ```

mod container;
mod context;
mod errors;
mod factory;
mod graph;
mod identity;
mod inject;
mod traits;

pub use container::Container;
pub use context::ResolutionContext;
pub use errors::{Error, Result};
pub use factory::Factory;
pub use identity::{Dependency, TypeKey};
pub use inject::Inject;
pub use traits::{Component, Implements, Resolve};

pub use injector_derive::{Component, Inject};

#[doc(hidden)]
pub use factory::{Fallible, Value};
