//! Pluggable loader and backend contracts

use super::{Resource, ResourceKey, ResourcePointer, ResourceStore, StorageError};

/// Per-type resource loader
///
/// Must be registered with the store before any resource of its type id is
/// referenced.
pub trait ResourceLoader: Send {
    /// Load the resource named `id`
    fn load(&mut self, id: &str) -> Result<Resource, StorageError>;

    /// Release a value whose last reference was dropped
    fn unload(&mut self, _id: &str, _resource: Resource) {}

    /// Persist `resource`, generating an id when `id` is `None`
    ///
    /// Returns the id the resource was stored under.
    fn save(&mut self, id: Option<&str>, resource: &Resource) -> Result<String, StorageError>;

    /// Remove the resource from the backing store
    fn delete(&mut self, id: &str) -> Result<(), StorageError>;
}

/// Backing-store enumeration (file system, in-memory, ...)
pub trait StorageBackend: Send {
    /// Whether `id` of type `type_id` exists in the backing store
    fn exists(&self, id: &str, type_id: &str) -> bool;

    /// Every resource in the backing store, as unlinked pointers
    fn list_resource_pointers(&self) -> Result<Vec<ResourcePointer>, StorageError>;
}

/// Receives the resource-deleted notification before a resource is deleted
pub trait ResourceDeletedListener {
    /// Error surfaced by the listener; storage failures convert into it
    type Error: From<StorageError>;

    /// Clear every reference to `key`, releasing store references as needed
    fn on_resource_deleted(
        &mut self,
        store: &mut ResourceStore,
        key: &ResourceKey,
    ) -> Result<(), Self::Error>;
}
