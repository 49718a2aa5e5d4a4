//! Scene graph errors

use super::SceneState;
use crate::schema::SchemaError;
use crate::storage::StorageError;
use thiserror::Error;

/// Scene graph errors
#[derive(Debug, Error)]
pub enum SceneError {
    /// Lifecycle precondition violated
    #[error("Cannot {operation} a scene in state {state:?}")]
    InvalidStateTransition {
        /// Attempted operation
        operation: &'static str,
        /// State the scene was in
        state: SceneState,
    },

    /// Resource deletion attempted while the scene is playing
    #[error("Cannot delete resource {0} while the scene is playing")]
    InvalidOperationWhilePlaying(String),

    /// Object handle not present in this scene
    #[error("Object not found in scene")]
    UnknownObject,

    /// Component handle not present in this scene
    #[error("Component not found in scene")]
    UnknownComponent,

    /// Field schema error
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Resource store error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
