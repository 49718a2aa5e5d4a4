//! Resource Store - reference-counted resource cache
//!
//! **SEPARATION OF CONCERNS**:
//! - ResourceStore: records, reference counts, loader dispatch
//! - ResourceLoader: how a type id is read, written and deleted
//! - StorageBackend: what exists in the backing store
//!
//! A record exists if and only if its reference count is at least one.
//! Reaching zero removes the record and hands the value back to the loader.
//! Records are keyed by resource id alone.

use super::{
    Resource, ResourceDeletedListener, ResourceKey, ResourceLoader, ResourcePointer,
    StorageBackend, StorageError,
};
use std::collections::HashMap;

struct ResourceRecord {
    value: Resource,
    type_id: String,
    references: usize,
}

/// Reference-counted cache over externally loaded resources
pub struct ResourceStore {
    loaders: HashMap<String, Box<dyn ResourceLoader>>,
    records: HashMap<String, ResourceRecord>,
    backend: Box<dyn StorageBackend>,
}

impl ResourceStore {
    /// Create an empty store over `backend`
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            loaders: HashMap::new(),
            records: HashMap::new(),
            backend: Box::new(backend),
        }
    }

    /// Register (or replace) the loader for `type_id`
    pub fn register_loader(&mut self, type_id: impl Into<String>, loader: impl ResourceLoader + 'static) {
        let type_id = type_id.into();
        log::debug!("Registering loader for type '{}'", type_id);
        self.loaders.insert(type_id, Box::new(loader));
    }

    /// Remove the loader for `type_id`
    pub fn unregister_loader(&mut self, type_id: &str) -> Option<Box<dyn ResourceLoader>> {
        self.loaders.remove(type_id)
    }

    /// Whether a loader is registered for `type_id`
    pub fn has_loader(&self, type_id: &str) -> bool {
        self.loaders.contains_key(type_id)
    }

    fn loader_mut(&mut self, type_id: &str) -> Result<&mut Box<dyn ResourceLoader>, StorageError> {
        self.loaders
            .get_mut(type_id)
            .ok_or_else(|| StorageError::MissingLoader(type_id.to_string()))
    }

    /// Add one reference to `id`, loading it on the first reference
    ///
    /// Every call must be paired with exactly one [`remove_reference`](Self::remove_reference).
    pub fn add_reference(&mut self, id: &str, type_id: &str) -> Result<(), StorageError> {
        if let Some(record) = self.records.get_mut(id) {
            record.references += 1;
            log::debug!("Added reference to '{}' ({} refs)", id, record.references);
            return Ok(());
        }

        let value = self
            .loader_mut(type_id)?
            .load(id)
            .map_err(|e| match e {
                StorageError::MissingLoader(_) => e,
                other => StorageError::LoadFailure {
                    id: id.to_string(),
                    type_id: type_id.to_string(),
                    reason: other.to_string(),
                },
            })?;

        self.records.insert(
            id.to_string(),
            ResourceRecord {
                value,
                type_id: type_id.to_string(),
                references: 1,
            },
        );
        log::debug!("Loaded resource '{}' of type '{}'", id, type_id);
        Ok(())
    }

    /// Release one reference to `id`, unloading it when none remain
    pub fn remove_reference(&mut self, id: &str, type_id: &str) -> Result<(), StorageError> {
        let remaining = {
            let record = self
                .records
                .get_mut(id)
                .ok_or_else(|| StorageError::UnbalancedReference { id: id.to_string() })?;
            record.references -= 1;
            record.references
        };

        if remaining > 0 {
            log::debug!("Removed reference to '{}' ({} refs)", id, remaining);
            return Ok(());
        }

        if let Some(record) = self.records.remove(id) {
            if record.type_id != type_id {
                log::warn!(
                    "Resource '{}' released as type '{}' but loaded as '{}'",
                    id,
                    type_id,
                    record.type_id
                );
            }
            match self.loaders.get_mut(&record.type_id) {
                Some(loader) => loader.unload(id, record.value),
                None => log::warn!("Loader for '{}' vanished before unloading '{}'", record.type_id, id),
            }
            log::debug!("Unloaded resource '{}'", id);
        }
        Ok(())
    }

    /// The live value for `id`
    ///
    /// Callers are expected to hold a reference; `None` otherwise.
    pub fn get_loaded(&self, id: &str) -> Option<Resource> {
        self.records.get(id).map(|r| r.value.clone())
    }

    /// Current reference count of `id` (0 if untracked)
    pub fn reference_count(&self, id: &str) -> usize {
        self.records.get(id).map_or(0, |r| r.references)
    }

    /// Number of live records
    pub fn loaded_count(&self) -> usize {
        self.records.len()
    }

    /// Persist `value` through the loader of `type_id`
    ///
    /// Returns the id used, which the loader may generate when `id` is `None`.
    pub fn save(&mut self, id: Option<&str>, type_id: &str, value: &Resource) -> Result<String, StorageError> {
        let saved = self.loader_mut(type_id)?.save(id, value)?;
        log::debug!("Saved resource '{}' of type '{}'", saved, type_id);
        Ok(saved)
    }

    /// Delete `id` from the backing store without notifying anyone
    ///
    /// Fails with [`StorageError::ResourceInUse`] while a record is still live.
    /// Only for resources no scene can point at, such as temporary play
    /// copies; everything else goes through
    /// [`delete_notifying`](Self::delete_notifying).
    pub(crate) fn delete(&mut self, id: &str, type_id: &str) -> Result<(), StorageError> {
        if let Some(record) = self.records.get(id) {
            return Err(StorageError::ResourceInUse {
                id: id.to_string(),
                references: record.references,
            });
        }
        self.loader_mut(type_id)?.delete(id)?;
        log::info!("Deleted resource '{}' of type '{}'", id, type_id);
        Ok(())
    }

    /// Notify `listener` that `id` is going away, then delete it
    ///
    /// The listener releases its references and clears its pointers first;
    /// the delete then fails with [`StorageError::ResourceInUse`] if any
    /// record is still live.
    pub fn delete_notifying<L>(&mut self, id: &str, type_id: &str, listener: &mut L) -> Result<(), L::Error>
    where
        L: ResourceDeletedListener + ?Sized,
    {
        let key = ResourceKey::new(id, type_id);
        listener.on_resource_deleted(self, &key)?;
        self.delete(id, type_id)?;
        Ok(())
    }

    /// Whether `id` of type `type_id` exists in the backing store
    pub fn exists(&self, id: &str, type_id: &str) -> bool {
        self.backend.exists(id, type_id)
    }

    /// Every resource in the backing store
    pub fn list_resource_pointers(&self) -> Result<Vec<ResourcePointer>, StorageError> {
        self.backend.list_resource_pointers()
    }
}

impl std::fmt::Debug for ResourceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut loaders: Vec<_> = self.loaders.keys().collect();
        loaders.sort();
        f.debug_struct("ResourceStore")
            .field("loaders", &loaders)
            .field("loaded", &self.records.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counters {
        loads: AtomicUsize,
        unloads: AtomicUsize,
        deletes: AtomicUsize,
    }

    /// Loader that serves the id back as the value and counts calls
    struct CountingLoader {
        counters: Arc<Counters>,
        fail: bool,
    }

    impl ResourceLoader for CountingLoader {
        fn load(&mut self, id: &str) -> Result<Resource, StorageError> {
            if self.fail {
                return Err(StorageError::NotFound {
                    id: id.to_string(),
                    type_id: "test".to_string(),
                });
            }
            self.counters.loads.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(id.to_string()))
        }

        fn unload(&mut self, _id: &str, _resource: Resource) {
            self.counters.unloads.fetch_add(1, Ordering::SeqCst);
        }

        fn save(&mut self, id: Option<&str>, _resource: &Resource) -> Result<String, StorageError> {
            Ok(id.unwrap_or("generated").to_string())
        }

        fn delete(&mut self, _id: &str) -> Result<(), StorageError> {
            self.counters.deletes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn counting_store() -> (ResourceStore, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let mut store = ResourceStore::new(MemoryStorage::new());
        store.register_loader(
            "test",
            CountingLoader {
                counters: counters.clone(),
                fail: false,
            },
        );
        (store, counters)
    }

    #[test]
    fn test_first_reference_loads() {
        let (mut store, counters) = counting_store();
        store.add_reference("a", "test").unwrap();
        store.add_reference("a", "test").unwrap();

        assert_eq!(store.reference_count("a"), 2);
        assert_eq!(counters.loads.load(Ordering::SeqCst), 1);
        let value = store.get_loaded("a").unwrap();
        assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("a"));
    }

    #[test]
    fn test_last_reference_unloads() {
        let (mut store, counters) = counting_store();
        store.add_reference("a", "test").unwrap();
        store.add_reference("a", "test").unwrap();
        store.remove_reference("a", "test").unwrap();
        assert_eq!(counters.unloads.load(Ordering::SeqCst), 0);
        assert_eq!(store.reference_count("a"), 1);

        store.remove_reference("a", "test").unwrap();
        assert_eq!(counters.unloads.load(Ordering::SeqCst), 1);
        assert_eq!(store.reference_count("a"), 0);
        assert!(store.get_loaded("a").is_none());
        assert_eq!(store.loaded_count(), 0);
    }

    #[test]
    fn test_refcount_tracks_adds_minus_removes() {
        let (mut store, _) = counting_store();
        let ops = [true, true, false, true, false, false, true];
        let mut expected = 0usize;
        for add in ops {
            if add {
                store.add_reference("r", "test").unwrap();
                expected += 1;
            } else {
                store.remove_reference("r", "test").unwrap();
                expected -= 1;
            }
            assert_eq!(store.reference_count("r"), expected);
            assert_eq!(store.get_loaded("r").is_some(), expected > 0);
        }
    }

    #[test]
    fn test_unbalanced_remove_fails() {
        let (mut store, _) = counting_store();
        assert!(matches!(
            store.remove_reference("never", "test"),
            Err(StorageError::UnbalancedReference { .. })
        ));

        store.add_reference("once", "test").unwrap();
        store.remove_reference("once", "test").unwrap();
        assert!(matches!(
            store.remove_reference("once", "test"),
            Err(StorageError::UnbalancedReference { .. })
        ));
    }

    #[test]
    fn test_load_failure() {
        let mut store = ResourceStore::new(MemoryStorage::new());
        store.register_loader(
            "test",
            CountingLoader {
                counters: Arc::default(),
                fail: true,
            },
        );

        let result = store.add_reference("missing", "test");
        assert!(matches!(result, Err(StorageError::LoadFailure { .. })));
        assert_eq!(store.reference_count("missing"), 0);
    }

    #[test]
    fn test_missing_loader() {
        let mut store = ResourceStore::new(MemoryStorage::new());
        assert!(matches!(
            store.add_reference("a", "nothing"),
            Err(StorageError::MissingLoader(_))
        ));
    }

    #[test]
    fn test_delete_in_use_fails() {
        let (mut store, counters) = counting_store();
        store.add_reference("a", "test").unwrap();

        assert!(matches!(
            store.delete("a", "test"),
            Err(StorageError::ResourceInUse { references: 1, .. })
        ));
        assert_eq!(counters.deletes.load(Ordering::SeqCst), 0);

        store.remove_reference("a", "test").unwrap();
        store.delete("a", "test").unwrap();
        assert_eq!(counters.deletes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_save_delegates_id_generation() {
        let (mut store, _) = counting_store();
        let value: Resource = Arc::new(String::new());
        assert_eq!(store.save(None, "test", &value).unwrap(), "generated");
        assert_eq!(store.save(Some("named"), "test", &value).unwrap(), "named");
    }

    #[test]
    fn test_delete_notifying_runs_listener_first() {
        struct Releaser {
            notified: Vec<ResourceKey>,
        }

        impl ResourceDeletedListener for Releaser {
            type Error = StorageError;

            fn on_resource_deleted(
                &mut self,
                store: &mut ResourceStore,
                key: &ResourceKey,
            ) -> Result<(), StorageError> {
                self.notified.push(key.clone());
                while store.reference_count(&key.id) > 0 {
                    store.remove_reference(&key.id, &key.type_id)?;
                }
                Ok(())
            }
        }

        let (mut store, counters) = counting_store();
        store.add_reference("a", "test").unwrap();
        let mut listener = Releaser { notified: Vec::new() };

        store.delete_notifying("a", "test", &mut listener).unwrap();

        assert_eq!(listener.notified, vec![ResourceKey::new("a", "test")]);
        assert_eq!(counters.deletes.load(Ordering::SeqCst), 1);
        assert_eq!(store.reference_count("a"), 0);
    }
}
