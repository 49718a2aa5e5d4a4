//! In-process storage shared between a backend and its loaders

use super::{
    Resource, ResourceKey, ResourceLoader, ResourcePointer, ResourceStore, StorageBackend,
    StorageError, TYPE_ID_SCENE, TYPE_ID_TEXT,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Table = Arc<RwLock<HashMap<ResourceKey, Resource>>>;

fn read(table: &Table) -> RwLockReadGuard<'_, HashMap<ResourceKey, Resource>> {
    // A poisoned table still holds consistent entries: every write is a single insert/remove
    table.read().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn write(table: &Table) -> RwLockWriteGuard<'_, HashMap<ResourceKey, Resource>> {
    table.write().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Resource table kept in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    table: Table,
}

impl MemoryStorage {
    /// Empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `value` under `id`/`type_id`, replacing any previous value
    pub fn insert(&self, id: impl Into<String>, type_id: impl Into<String>, value: Resource) {
        write(&self.table).insert(ResourceKey::new(id, type_id), value);
    }

    /// Number of stored resources
    pub fn len(&self) -> usize {
        read(&self.table).len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        read(&self.table).is_empty()
    }

    /// A loader for `type_id` over this table
    pub fn loader(&self, type_id: impl Into<String>) -> MemoryLoader {
        MemoryLoader {
            type_id: type_id.into(),
            table: Arc::clone(&self.table),
        }
    }

    /// Build a store over this table with the text and scene loaders registered
    pub fn into_store(self) -> ResourceStore {
        let text = self.loader(TYPE_ID_TEXT);
        let scene = self.loader(TYPE_ID_SCENE);
        let mut store = ResourceStore::new(self);
        store.register_loader(TYPE_ID_TEXT, text);
        store.register_loader(TYPE_ID_SCENE, scene);
        store
    }
}

impl StorageBackend for MemoryStorage {
    fn exists(&self, id: &str, type_id: &str) -> bool {
        read(&self.table).contains_key(&ResourceKey::new(id, type_id))
    }

    fn list_resource_pointers(&self) -> Result<Vec<ResourcePointer>, StorageError> {
        let mut keys: Vec<ResourceKey> = read(&self.table).keys().cloned().collect();
        keys.sort();
        Ok(keys.into_iter().map(ResourcePointer::from_key).collect())
    }
}

/// Loader for one type id over a [`MemoryStorage`] table
#[derive(Debug, Clone)]
pub struct MemoryLoader {
    type_id: String,
    table: Table,
}

impl MemoryLoader {
    fn key(&self, id: &str) -> ResourceKey {
        ResourceKey::new(id, self.type_id.clone())
    }
}

impl ResourceLoader for MemoryLoader {
    fn load(&mut self, id: &str) -> Result<Resource, StorageError> {
        read(&self.table)
            .get(&self.key(id))
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                id: id.to_string(),
                type_id: self.type_id.clone(),
            })
    }

    fn save(&mut self, id: Option<&str>, resource: &Resource) -> Result<String, StorageError> {
        let id = id.map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_string);
        write(&self.table).insert(self.key(&id), Arc::clone(resource));
        Ok(id)
    }

    fn delete(&mut self, id: &str) -> Result<(), StorageError> {
        write(&self.table)
            .remove(&self.key(id))
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound {
                id: id.to_string(),
                type_id: self.type_id.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_shares_table() {
        let storage = MemoryStorage::new();
        storage.insert("intro", TYPE_ID_TEXT, Arc::new(String::from("hello")));
        let mut loader = storage.loader(TYPE_ID_TEXT);

        let value = loader.load("intro").unwrap();
        assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("hello"));
        assert!(loader.load("other").is_err());

        let id = loader.save(None, &value).unwrap();
        assert!(storage.exists(&id, TYPE_ID_TEXT));
        assert_eq!(storage.len(), 2);
    }

    #[test]
    fn test_type_ids_are_separate() {
        let storage = MemoryStorage::new();
        storage.insert("same", TYPE_ID_TEXT, Arc::new(String::new()));
        assert!(storage.exists("same", TYPE_ID_TEXT));
        assert!(!storage.exists("same", TYPE_ID_SCENE));
        assert!(storage.loader(TYPE_ID_SCENE).load("same").is_err());
    }

    #[test]
    fn test_listing_is_sorted() {
        let storage = MemoryStorage::new();
        storage.insert("b", TYPE_ID_TEXT, Arc::new(String::new()));
        storage.insert("a", TYPE_ID_TEXT, Arc::new(String::new()));
        let listed = storage.list_resource_pointers().unwrap();
        assert_eq!(listed[0].resource_id(), Some("a"));
        assert_eq!(listed[1].resource_id(), Some("b"));
    }
}
