use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A type-erased built value as stored in the registry and lifecycle cache.
///
/// The concrete type behind the `Any` is the component type itself, so an
/// `Arc<dyn Trait>` component is stored as `Arc<Arc<dyn Trait>>` erased to
/// `Arc<dyn Any>`.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Identifies the slot type a provider satisfies.
///
/// Only the `TypeId` takes part in equality and hashing; the name is kept
/// for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Render a `(type, name)` lookup key for error messages.
    pub(crate) fn describe(&self, name: Option<&str>) -> String {
        match name {
            Some(name) => format!("{} (name: \"{}\")", self.name, name),
            None => self.name.to_string(),
        }
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

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeKey").field(&self.name).finish()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Marker {}

    #[test]
    fn test_key_equality_ignores_name() {
        assert_eq!(TypeKey::of::<String>(), TypeKey::of::<String>());
        assert_ne!(TypeKey::of::<String>(), TypeKey::of::<Arc<String>>());
        assert_ne!(TypeKey::of::<Arc<dyn Marker>>(), TypeKey::of::<dyn Marker>());
    }

    #[test]
    fn test_describe_with_name() {
        let key = TypeKey::of::<u32>();
        assert_eq!(key.describe(None), "u32");
        assert_eq!(key.describe(Some("port")), "u32 (name: \"port\")");
    }
}
