//! Resource storage
//!
//! A keyed cache over externally loaded resources with explicit reference
//! counting. Resources are loaded on their first reference and unloaded when
//! the last reference is released.
//!
//! ```text
//! ResourcePointer (component field)
//!        ↓ link / unlink
//! ResourceStore (records + reference counts)
//!        ↓ load / unload / save / delete
//! ResourceLoader (one per type id)  +  StorageBackend (exists / listing)
//! ```

mod error;
mod pointer;
mod loader;
mod store;
mod file;
mod memory;

pub use error::StorageError;
pub use pointer::{Resource, ResourceKey, ResourcePointer};
pub use loader::{ResourceLoader, StorageBackend, ResourceDeletedListener};
pub use store::ResourceStore;
pub use file::{FileStorage, FileLoader, FileResource, FileTextLoader, FileSceneLoader};
pub use memory::{MemoryStorage, MemoryLoader};

/// Type id of serialized scenes
pub const TYPE_ID_SCENE: &str = "scene";

/// Type id of plain text resources
pub const TYPE_ID_TEXT: &str = "txt";
