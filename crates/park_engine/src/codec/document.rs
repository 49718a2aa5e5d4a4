//! Serialized scenes as stored resources

use super::{deserialize, serialize, CodecError};
use crate::scene::Scene;
use crate::schema::ComponentRegistry;
use std::sync::Arc;

/// A scene in its text form
///
/// This is the value the `scene` loaders store; it is decoded against the
/// live registry whenever a scene is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneDocument {
    text: String,
}

impl SceneDocument {
    /// Wrap serialized text
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Serialize `scene`
    pub fn from_scene(scene: &Scene) -> Self {
        Self::new(serialize(scene))
    }

    /// Decode into a new unlinked scene
    pub fn to_scene(&self, registry: Arc<ComponentRegistry>) -> Result<Scene, CodecError> {
        deserialize(&self.text, registry)
    }

    /// Serialized text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Unwrap the serialized text
    pub fn into_string(self) -> String {
        self.text
    }
}
