//! Scene codec errors

use crate::scene::SceneError;
use crate::schema::SchemaError;
use thiserror::Error;

/// Errors raised while encoding or decoding a scene
#[derive(Debug, Error)]
pub enum CodecError {
    /// Malformed serialized input
    #[error("Corrupt scene data at line {line}: {reason}")]
    CorruptSceneData {
        /// 1-based line number
        line: usize,
        /// What was wrong
        reason: String,
    },

    /// A decoded value was rejected by the component schema
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The decoded graph could not be assembled
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}
