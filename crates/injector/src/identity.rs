//! Type identity keys used to index every container map.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Stable, copyable key for a type.
///
/// Lookup equality and hashing use the [`TypeId`] alone; the type name is
/// carried for diagnostics and error messages. Two keys built from the same
/// logical type always compare equal.
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this key denotes an interface (a trait object) rather than a
    /// concrete type. Trait-object type names always carry the `dyn` prefix.
    pub fn is_interface(&self) -> bool {
        self.name.starts_with("dyn ")
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// One declared dependency of a constructor or injected struct.
///
/// `required` is false for dependencies that tolerate an absent binding,
/// such as `Option<Arc<T>>` parameters; graph validation skips those in the
/// missing-binding check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    pub key: TypeKey,
    pub required: bool,
}

impl Dependency {
    pub fn required(key: TypeKey) -> Self {
        Self { key, required: true }
    }

    pub fn optional(key: TypeKey) -> Self {
        Self { key, required: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Marker: Send + Sync {}

    struct Plain;

    #[test]
    fn same_type_same_key() {
        assert_eq!(TypeKey::of::<Plain>(), TypeKey::of::<Plain>());
        assert_eq!(TypeKey::of::<dyn Marker>(), TypeKey::of::<dyn Marker>());
    }

    #[test]
    fn distinct_types_distinct_keys() {
        assert_ne!(TypeKey::of::<Plain>(), TypeKey::of::<String>());
    }

    #[test]
    fn interface_kind() {
        assert!(TypeKey::of::<dyn Marker>().is_interface());
        assert!(!TypeKey::of::<Plain>().is_interface());
    }

    #[test]
    fn display_uses_type_name() {
        let rendered = TypeKey::of::<Plain>().to_string();
        assert!(rendered.ends_with("Plain"), "unexpected name: {rendered}");
    }
}
