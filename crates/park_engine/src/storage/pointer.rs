//! Resource pointers held by component fields

use super::{ResourceStore, StorageError};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A loaded resource value, shared between the store and every linked pointer
pub type Resource = Arc<dyn Any + Send + Sync>;

/// Identifies a resource in the backing store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    /// Resource id (unique within the store)
    pub id: String,
    /// Type id selecting the loader
    pub type_id: String,
}

impl ResourceKey {
    /// Create a new key
    pub fn new(id: impl Into<String>, type_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_id: type_id.into(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.id, self.type_id)
    }
}

/// Reference from a component field to a stored resource
///
/// The cached handle is populated only while the owning scene is linked or
/// playing and the pointer is not null. Equality compares the id pair only.
#[derive(Clone, Default)]
pub struct ResourcePointer {
    key: Option<ResourceKey>,
    handle: Option<Resource>,
}

impl ResourcePointer {
    /// Create an unlinked pointer to `id` of type `type_id`
    pub fn new(id: impl Into<String>, type_id: impl Into<String>) -> Self {
        Self {
            key: Some(ResourceKey::new(id, type_id)),
            handle: None,
        }
    }

    /// The canonical "no resource" value
    pub fn null() -> Self {
        Self::default()
    }

    /// Create an unlinked pointer from a key
    pub fn from_key(key: ResourceKey) -> Self {
        Self {
            key: Some(key),
            handle: None,
        }
    }

    /// Whether this is the "no resource" value
    pub fn is_null(&self) -> bool {
        self.key.is_none()
    }

    /// The id pair, if any
    pub fn key(&self) -> Option<&ResourceKey> {
        self.key.as_ref()
    }

    /// Resource id, if any
    pub fn resource_id(&self) -> Option<&str> {
        self.key.as_ref().map(|k| k.id.as_str())
    }

    /// Type id, if any
    pub fn type_id(&self) -> Option<&str> {
        self.key.as_ref().map(|k| k.type_id.as_str())
    }

    /// Whether a loaded value is cached
    pub fn is_linked(&self) -> bool {
        self.handle.is_some()
    }

    /// The cached loaded value
    pub fn handle(&self) -> Option<&Resource> {
        self.handle.as_ref()
    }

    /// Typed access to the cached loaded value
    pub fn resource<T: Any>(&self) -> Option<&T> {
        self.handle.as_deref()?.downcast_ref::<T>()
    }

    /// Whether this pointer names `key`
    pub fn points_to(&self, key: &ResourceKey) -> bool {
        self.key.as_ref() == Some(key)
    }

    /// Acquire a store reference and cache the loaded value
    pub(crate) fn link(&mut self, store: &mut ResourceStore) -> Result<(), StorageError> {
        if let Some(key) = &self.key {
            store.add_reference(&key.id, &key.type_id)?;
            self.handle = store.get_loaded(&key.id);
        }
        Ok(())
    }

    /// Drop the cached value and release the store reference
    pub(crate) fn unlink(&mut self, store: &mut ResourceStore) -> Result<(), StorageError> {
        if let Some(key) = &self.key {
            self.handle = None;
            store.remove_reference(&key.id, &key.type_id)?;
        }
        Ok(())
    }

    /// Forget the cached value without touching the store
    pub(crate) fn detach_handle(&mut self) {
        self.handle = None;
    }
}

impl PartialEq for ResourcePointer {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ResourcePointer {}

impl fmt::Debug for ResourcePointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourcePointer")
            .field("key", &self.key)
            .field("linked", &self.is_linked())
            .finish()
    }
}

impl From<ResourceKey> for ResourcePointer {
    fn from(key: ResourceKey) -> Self {
        Self::from_key(key)
    }
}
