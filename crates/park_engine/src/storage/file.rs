//! File-backed storage
//!
//! Resource `<id>` of type `<type>` lives at `<base_path>/<id>.<type>`.

use super::{
    Resource, ResourceLoader, ResourcePointer, ResourceStore, StorageBackend, StorageError,
    TYPE_ID_SCENE, TYPE_ID_TEXT,
};
use crate::codec::SceneDocument;
use std::any::Any;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A value that can be stored as a single text file
pub trait FileResource: Any + Send + Sync + Sized {
    /// Type id (and file extension) this value is stored under
    const TYPE_ID: &'static str;

    /// Build the value from file contents
    fn from_text(text: String) -> Result<Self, StorageError>;

    /// File contents for this value
    fn to_text(&self) -> &str;
}

impl FileResource for String {
    const TYPE_ID: &'static str = TYPE_ID_TEXT;

    fn from_text(text: String) -> Result<Self, StorageError> {
        Ok(text)
    }

    fn to_text(&self) -> &str {
        self
    }
}

impl FileResource for SceneDocument {
    const TYPE_ID: &'static str = TYPE_ID_SCENE;

    fn from_text(text: String) -> Result<Self, StorageError> {
        Ok(Self::new(text))
    }

    fn to_text(&self) -> &str {
        self.as_str()
    }
}

fn resource_path(base_path: &Path, id: &str, type_id: &str) -> PathBuf {
    base_path.join(format!("{id}.{type_id}"))
}

/// Directory-backed storage backend
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Open (creating if needed) the storage directory
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;
        log::info!("File storage at {}", base_path.display());
        Ok(Self { base_path })
    }

    /// Storage directory
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of resource `id` of type `type_id`
    pub fn path_for(&self, id: &str, type_id: &str) -> PathBuf {
        resource_path(&self.base_path, id, type_id)
    }

    /// Build a store over this directory with the text and scene loaders registered
    pub fn into_store(self) -> ResourceStore {
        let text = FileTextLoader::new(&self.base_path);
        let scene = FileSceneLoader::new(&self.base_path);
        let mut store = ResourceStore::new(self);
        store.register_loader(TYPE_ID_TEXT, text);
        store.register_loader(TYPE_ID_SCENE, scene);
        store
    }
}

impl StorageBackend for FileStorage {
    fn exists(&self, id: &str, type_id: &str) -> bool {
        self.path_for(id, type_id).is_file()
    }

    fn list_resource_pointers(&self) -> Result<Vec<ResourcePointer>, StorageError> {
        let mut pointers = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let (Some(id), Some(type_id)) = (
                path.file_stem().and_then(|s| s.to_str()),
                path.extension().and_then(|s| s.to_str()),
            ) else {
                continue;
            };
            pointers.push(ResourcePointer::new(id, type_id));
        }
        pointers.sort_by(|a, b| a.key().cmp(&b.key()));
        Ok(pointers)
    }
}

/// Loader for one [`FileResource`] type inside a storage directory
pub struct FileLoader<T: FileResource> {
    base_path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

/// Loader for plain text resources
pub type FileTextLoader = FileLoader<String>;

/// Loader for serialized scenes
pub type FileSceneLoader = FileLoader<SceneDocument>;

impl<T: FileResource> FileLoader<T> {
    /// Loader reading and writing under `base_path`
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            _marker: PhantomData,
        }
    }

    fn path(&self, id: &str) -> PathBuf {
        resource_path(&self.base_path, id, T::TYPE_ID)
    }
}

impl<T: FileResource> ResourceLoader for FileLoader<T> {
    fn load(&mut self, id: &str) -> Result<Resource, StorageError> {
        let path = self.path(id);
        if !path.is_file() {
            return Err(StorageError::NotFound {
                id: id.to_string(),
                type_id: T::TYPE_ID.to_string(),
            });
        }
        let text = fs::read_to_string(&path)?;
        log::trace!("Read {} bytes from {}", text.len(), path.display());
        Ok(Arc::new(T::from_text(text)?))
    }

    fn save(&mut self, id: Option<&str>, resource: &Resource) -> Result<String, StorageError> {
        let id = id.map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_string);
        let value = resource
            .downcast_ref::<T>()
            .ok_or_else(|| StorageError::InvalidResource {
                id: id.clone(),
                expected: std::any::type_name::<T>(),
            })?;
        fs::write(self.path(&id), value.to_text())?;
        Ok(id)
    }

    fn delete(&mut self, id: &str) -> Result<(), StorageError> {
        fs::remove_file(self.path(id))?;
        Ok(())
    }
}
