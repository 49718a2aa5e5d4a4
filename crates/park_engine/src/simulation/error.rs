//! Simulation context errors

use super::SimulationState;
use crate::codec::CodecError;
use crate::config::ConfigError;
use crate::scene::SceneError;
use crate::schema::SchemaError;
use crate::storage::StorageError;
use thiserror::Error;

/// Errors raised by the simulation context
#[derive(Debug, Error)]
pub enum EngineError {
    /// Driver operation not allowed in the current state
    #[error("Cannot {operation} while the simulation is {state:?}")]
    InvalidStateTransition {
        /// Attempted operation
        operation: &'static str,
        /// State the simulation was in
        state: SimulationState,
    },

    /// Resource store error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Scene graph error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Scene codec error
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Component registration error
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}
