//! Resource storage errors

use thiserror::Error;

/// Resource store errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// `remove_reference` called for a resource that holds no references
    #[error("Unbalanced remove reference for resource {id}")]
    UnbalancedReference {
        /// Resource id
        id: String,
    },

    /// The registered loader could not produce a value
    #[error("Cannot load resource {id} of type {type_id}: {reason}")]
    LoadFailure {
        /// Resource id
        id: String,
        /// Type id
        type_id: String,
        /// Loader-provided reason
        reason: String,
    },

    /// Delete attempted while references to the resource are still alive
    #[error("Resource {id} is in use ({references} references), remove all references before deleting it")]
    ResourceInUse {
        /// Resource id
        id: String,
        /// Outstanding references
        references: usize,
    },

    /// No loader registered for the type id
    #[error("No loader registered for type {0}")]
    MissingLoader(String),

    /// Resource missing from the backing store
    #[error("Resource {id} of type {type_id} not found")]
    NotFound {
        /// Resource id
        id: String,
        /// Type id
        type_id: String,
    },

    /// A loader was handed a value of the wrong type
    #[error("Resource {id} is not a {expected}")]
    InvalidResource {
        /// Resource id
        id: String,
        /// Expected value type
        expected: &'static str,
    },

    /// IO error in a file-backed store
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
