//! Cross-module scenario tests
//!
//! Shared fixtures: every sample component registered, and a memory store
//! holding two text resources, `intro` and `map`.

mod codec_scenarios;

use crate::components::register_all;
use crate::schema::ComponentRegistry;
use crate::storage::{MemoryStorage, ResourcePointer, ResourceStore, TYPE_ID_TEXT};
use std::sync::Arc;

fn registry() -> Arc<ComponentRegistry> {
    let mut registry = ComponentRegistry::new();
    register_all(&mut registry).unwrap();
    Arc::new(registry)
}

fn store() -> (ResourceStore, MemoryStorage) {
    let storage = MemoryStorage::new();
    storage.insert("intro", TYPE_ID_TEXT, Arc::new(String::from("Welcome to the park")));
    storage.insert("map", TYPE_ID_TEXT, Arc::new(String::from("North gate, south lake")));
    (storage.clone().into_store(), storage)
}

fn text(id: &str) -> ResourcePointer {
    ResourcePointer::new(id, TYPE_ID_TEXT)
}
