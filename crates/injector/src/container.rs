//! The container: binding registry, instance cache, and resolver.

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};
use tracing::{debug, warn};

use crate::context::ResolutionContext;
use crate::errors::{Error, Result};
use crate::factory::Factory;
use crate::graph::DependencyGraph;
use crate::identity::{Dependency, TypeKey};
use crate::inject::Inject;
use crate::traits::{Component, Implements};

/// Type-erased singleton storage. The box always holds an `Arc<T>` for the
/// `T` whose key indexes it, including `Arc<dyn Trait>` for interface keys.
type BoxedInstance = Box<dyn Any + Send + Sync>;

type ConstructFn =
    dyn Fn(&Container, &mut ResolutionContext) -> Result<BoxedInstance> + Send + Sync;

struct Binding {
    /// Key this binding is registered under (interface key for `_as`
    /// registrations, otherwise the product key).
    key: TypeKey,
    /// Concrete product key.
    produced: TypeKey,
    /// Declared constructor parameters, in order.
    dependencies: Vec<Dependency>,
    construct: Arc<ConstructFn>,
}

struct CachedInstance {
    key: TypeKey,
    value: BoxedInstance,
}

/// Upcast entry: turns a cached concrete instance into an interface handle.
struct Caster {
    concrete: TypeKey,
    upcast: Box<dyn Fn(&BoxedInstance) -> Option<BoxedInstance> + Send + Sync>,
}

/// Dependency-injection container.
///
/// Owns the binding registry and the singleton instance cache. Cloning is
/// cheap and clones share all state, so a container can be handed to
/// factories or threads freely. Intended use is single-threaded wiring at
/// process startup; concurrent first-time resolutions are nevertheless
/// serialized so no identity is ever constructed twice.
#[derive(Clone)]
pub struct Container {
    bindings: Arc<RwLock<HashMap<TypeId, Binding>>>,
    instances: Arc<RwLock<HashMap<TypeId, CachedInstance>>>,
    casters: Arc<RwLock<HashMap<TypeId, Vec<Caster>>>>,
    /// Serializes top-level resolutions. Re-entrant so a factory holding a
    /// container clone may resolve on the same thread; such a call is an
    /// independent resolution with its own context.
    wiring: Arc<ReentrantMutex<()>>,
}

impl Container {
    pub fn new() -> Self {
        Self {
            bindings: Arc::new(RwLock::new(HashMap::new())),
            instances: Arc::new(RwLock::new(HashMap::new())),
            casters: Arc::new(RwLock::new(HashMap::new())),
            wiring: Arc::new(ReentrantMutex::new(())),
        }
    }

    // ---- registration ----

    /// Registers a constructor for its concrete product type without
    /// invoking it. Re-registration for the same product silently replaces
    /// the previous binding.
    pub fn provide_lazy<M, F>(&self, factory: F) -> Result<()>
    where
        M: 'static,
        F: Factory<M>,
    {
        let produced = TypeKey::of::<F::Output>();
        let dependencies = F::dependencies();
        Self::check_constructor(produced, &dependencies)?;

        let construct: Arc<ConstructFn> = Arc::new(move |container, ctx| {
            let value = factory.construct(container, ctx)?;
            Ok(Box::new(Arc::new(value)) as BoxedInstance)
        });
        self.insert_binding(Binding {
            key: produced,
            produced,
            dependencies,
            construct,
        });
        Ok(())
    }

    /// Registers a constructor as the implementation of interface `I`.
    ///
    /// The binding is stored under both the concrete product key and the
    /// interface key; resolving either reaches the same instance. The
    /// product must declare satisfaction through [`Implements<I>`].
    pub fn provide_lazy_as<I, M, F>(&self, factory: F) -> Result<()>
    where
        I: ?Sized + Send + Sync + 'static,
        M: 'static,
        F: Factory<M>,
        F::Output: Implements<I>,
    {
        self.provide_lazy(factory)?;

        let interface = TypeKey::of::<I>();
        let concrete = TypeKey::of::<F::Output>();
        // The interface entry builds through the concrete entry, which
        // caches the product under its own key, then upcasts. Both keys end
        // up pointing at one allocation.
        let construct: Arc<ConstructFn> = Arc::new(move |container, ctx| {
            let value = container.resolve_in::<F::Output>(ctx)?;
            Ok(Box::new(<F::Output as Implements<I>>::upcast(value)) as BoxedInstance)
        });
        self.insert_binding(Binding {
            key: interface,
            produced: concrete,
            dependencies: vec![Dependency::required(concrete)],
            construct,
        });
        self.register_upcast::<I, F::Output>();
        Ok(())
    }

    /// Registers and immediately constructs, surfacing construction
    /// failures at the call instead of at first resolution.
    pub fn provide<M, F>(&self, factory: F) -> Result<()>
    where
        M: 'static,
        F: Factory<M>,
    {
        self.provide_lazy(factory)?;
        self.resolve::<F::Output>()?;
        Ok(())
    }

    /// Eager variant of [`provide_lazy_as`](Self::provide_lazy_as).
    pub fn provide_as<I, M, F>(&self, factory: F) -> Result<()>
    where
        I: ?Sized + Send + Sync + 'static,
        M: 'static,
        F: Factory<M>,
        F::Output: Implements<I>,
    {
        self.provide_lazy_as::<I, M, F>(factory)?;
        self.resolve::<I>()?;
        Ok(())
    }

    /// Places an already-built value directly in the instance cache.
    pub fn provide_instance<T: Component>(&self, instance: T) -> Result<()> {
        let key = TypeKey::of::<T>();
        self.store_instance(key, Box::new(Arc::new(instance)));
        Ok(())
    }

    /// Like [`provide_instance`](Self::provide_instance), additionally
    /// making the value discoverable through interface `I`.
    pub fn provide_instance_as<I, T>(&self, instance: T) -> Result<()>
    where
        I: ?Sized + Send + Sync + 'static,
        T: Implements<I>,
    {
        self.provide_instance(instance)?;
        self.register_upcast::<I, T>();
        Ok(())
    }

    // ---- resolution ----

    /// Resolves an instance of `T`, constructing it (and its transitive
    /// dependencies) on first request and returning the cached singleton
    /// afterwards. `T` may be a concrete component or an interface trait
    /// object.
    pub fn resolve<T>(&self) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let _wiring = self.wiring.lock();
        let mut ctx = ResolutionContext::new();
        self.resolve_in::<T>(&mut ctx)
    }

    /// Non-failing probe; `None` on any resolution error.
    pub fn try_resolve<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve::<T>().ok()
    }

    /// Convenience surface for startup wiring: aborts on resolution
    /// failure.
    ///
    /// # Panics
    ///
    /// Panics with the underlying resolution error. Use
    /// [`resolve`](Self::resolve) where failure is recoverable.
    pub fn get<T>(&self) -> Arc<T>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve::<T>().unwrap_or_else(|err| {
            panic!("failed to resolve `{}`: {err}", TypeKey::of::<T>())
        })
    }

    /// Builds `T` field by field, bypassing constructor bindings for `T`
    /// itself. Fields resolve through the normal path and the assembled
    /// value joins the singleton cache under `T`'s key.
    pub fn try_inject<T: Inject>(&self) -> Result<Arc<T>> {
        let _wiring = self.wiring.lock();
        let mut ctx = ResolutionContext::new();
        self.inject_in::<T>(&mut ctx)
    }

    /// Aborting variant of [`try_inject`](Self::try_inject).
    ///
    /// # Panics
    ///
    /// Panics with the underlying resolution error.
    pub fn inject<T: Inject>(&self) -> Arc<T> {
        self.try_inject::<T>().unwrap_or_else(|err| {
            panic!("field injection for `{}` failed: {err}", TypeKey::of::<T>())
        })
    }

    // ---- introspection and reset ----

    /// Whether `T` currently has a binding or a cached instance.
    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        let id = TypeId::of::<T>();
        self.bindings.read().contains_key(&id) || self.instances.read().contains_key(&id)
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.read().len()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.read().len()
    }

    /// Names of all registered binding keys, sorted. Diagnostics only.
    pub fn registered_type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .bindings
            .read()
            .values()
            .map(|binding| binding.key.name())
            .collect();
        names.sort_unstable();
        names
    }

    /// Empties registry, cache, and upcast table. The container is reusable
    /// afterwards as if freshly created.
    pub fn clear(&self) {
        self.bindings.write().clear();
        self.instances.write().clear();
        self.casters.write().clear();
        debug!("container cleared");
    }

    /// Checks the static dependency graph of all registered bindings before
    /// any construction: every required dependency must be satisfiable and
    /// no binding chain may form a cycle.
    pub fn validate(&self) -> Result<()> {
        let mut graph = DependencyGraph::new();
        let satisfied: HashSet<TypeId> = {
            let bindings = self.bindings.read();
            let instances = self.instances.read();
            let casters = self.casters.read();
            for binding in bindings.values() {
                graph.insert(binding.key, binding.dependencies.clone());
            }
            bindings
                .keys()
                .chain(instances.keys())
                .chain(casters.keys())
                .copied()
                .collect()
        };

        if let Some((dependent, missing)) = graph.missing_dependency(&satisfied) {
            warn!(dependent = %dependent, missing = %missing, "dependency graph is incomplete");
            return Err(if missing.is_interface() {
                Error::NoImplementationFound(missing)
            } else {
                Error::NoBindingRegistered(missing)
            });
        }
        if let Some(cycle) = graph.find_cycle() {
            return Err(Error::CircularDependency {
                chain: cycle.iter().map(|key| key.name()).collect(),
            });
        }
        Ok(())
    }

    // ---- internals ----

    pub(crate) fn resolve_in<T>(&self, ctx: &mut ResolutionContext) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = TypeKey::of::<T>();
        if let Some(cached) = self.cached::<T>(key)? {
            debug!(key = %key, "resolved from cache");
            return Ok(cached);
        }
        if let Some(adapted) = self.scan_implementations::<T>(key)? {
            debug!(key = %key, "resolved interface from cached implementation");
            return Ok(adapted);
        }

        ctx.enter(key)?;
        let constructed = self.construct::<T>(key, ctx);
        ctx.exit(key);
        constructed
    }

    pub(crate) fn inject_in<T: Inject>(&self, ctx: &mut ResolutionContext) -> Result<Arc<T>> {
        let key = TypeKey::of::<T>();
        if let Some(cached) = self.cached::<T>(key)? {
            return Ok(cached);
        }

        ctx.enter(key)?;
        let assembled = T::inject(self, ctx);
        ctx.exit(key);

        let value = Arc::new(assembled?);
        self.store_instance(key, Box::new(Arc::clone(&value)));
        debug!(key = %key, "assembled by field injection");
        Ok(value)
    }

    fn check_constructor(produced: TypeKey, dependencies: &[Dependency]) -> Result<()> {
        if dependencies.iter().any(|dep| dep.key == produced) {
            return Err(Error::InvalidConstructor {
                type_name: produced.name(),
                reason: "constructor lists its own product among its parameters",
            });
        }
        Ok(())
    }

    fn insert_binding(&self, binding: Binding) {
        let key = binding.key;
        let mut bindings = self.bindings.write();
        if bindings.insert(key.id(), binding).is_some() {
            warn!(key = %key, "replacing existing binding");
        } else {
            debug!(key = %key, "registered binding");
        }
    }

    fn register_upcast<I, C>(&self)
    where
        I: ?Sized + Send + Sync + 'static,
        C: Implements<I>,
    {
        let interface = TypeKey::of::<I>();
        let concrete = TypeKey::of::<C>();
        let caster = Caster {
            concrete,
            upcast: Box::new(|boxed| {
                boxed.downcast_ref::<Arc<C>>().map(|value| {
                    Box::new(<C as Implements<I>>::upcast(Arc::clone(value))) as BoxedInstance
                })
            }),
        };
        let mut casters = self.casters.write();
        let entry = casters.entry(interface.id()).or_default();
        entry.retain(|existing| existing.concrete != concrete);
        entry.push(caster);
        debug!(interface = %interface, concrete = %concrete, "registered interface upcast");
    }

    fn store_instance(&self, key: TypeKey, value: BoxedInstance) {
        let mut instances = self.instances.write();
        if instances
            .insert(key.id(), CachedInstance { key, value })
            .is_some()
        {
            warn!(key = %key, "replacing cached instance");
        }
    }

    fn cached<T>(&self, key: TypeKey) -> Result<Option<Arc<T>>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let instances = self.instances.read();
        match instances.get(&key.id()) {
            Some(cached) => Self::unbox::<T>(key, &cached.value).map(Some),
            None => Ok(None),
        }
    }

    /// Scans the upcast table for an already-cached concrete instance
    /// satisfying interface key `key`. Scan order is upcast registration
    /// order and is not a contract. A hit joins the cache under the
    /// interface key so later requests short-circuit.
    fn scan_implementations<T>(&self, key: TypeKey) -> Result<Option<Arc<T>>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let adapted = {
            let casters = self.casters.read();
            let Some(entries) = casters.get(&key.id()) else {
                return Ok(None);
            };
            let instances = self.instances.read();
            entries.iter().find_map(|caster| {
                instances
                    .get(&caster.concrete.id())
                    .and_then(|cached| (caster.upcast)(&cached.value))
            })
        };
        let Some(boxed) = adapted else {
            return Ok(None);
        };
        let value = Self::unbox::<T>(key, &boxed)?;
        self.store_instance(key, boxed);
        Ok(Some(value))
    }

    fn construct<T>(&self, key: TypeKey, ctx: &mut ResolutionContext) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let construct = {
            let bindings = self.bindings.read();
            match bindings.get(&key.id()) {
                Some(binding) => Arc::clone(&binding.construct),
                None => return Err(self.missing(key)),
            }
        };
        // No map lock is held while the constructor runs; it recurses back
        // into the resolver for its parameters.
        let boxed = construct(self, ctx)?;
        let value = Self::unbox::<T>(key, &boxed)?;
        self.store_instance(key, boxed);
        debug!(key = %key, depth = ctx.depth(), "constructed");
        Ok(value)
    }

    fn missing(&self, key: TypeKey) -> Error {
        if key.is_interface() || self.casters.read().contains_key(&key.id()) {
            Error::NoImplementationFound(key)
        } else {
            Error::NoBindingRegistered(key)
        }
    }

    fn unbox<T>(key: TypeKey, boxed: &BoxedInstance) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        boxed
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or(Error::BindingMismatch {
                key,
                requested: std::any::type_name::<T>(),
            })
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("bindings", &self.binding_count())
            .field("instances", &self.instance_count())
            .finish()
    }
}
