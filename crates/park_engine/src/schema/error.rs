//! Field schema errors

use thiserror::Error;

/// Errors raised by the component registry and schema builder
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// No field with this name on the component type
    #[error("Component {component} has no field named {field}")]
    UnknownField {
        /// Component type name
        component: String,
        /// Requested field
        field: String,
    },

    /// The field is read-only
    #[error("Field {field} of component {component} is read-only")]
    NotWritable {
        /// Component type name
        component: String,
        /// Requested field
        field: String,
    },

    /// Array index or range outside the current bounds
    #[error("Index {index} (count {count}) out of range for field {field} of length {len}")]
    IndexOutOfRange {
        /// Array field
        field: String,
        /// First index touched
        index: usize,
        /// Number of elements touched
        count: usize,
        /// Current array length
        len: usize,
    },

    /// No enum type registered under this name
    #[error("Unknown enum type {0}")]
    UnknownType(String),

    /// No component type registered under this name
    #[error("Unknown component type {0}")]
    UnknownComponentType(String),

    /// A value of the wrong kind was supplied for a field
    #[error("Field {field} expects a value of type {expected}")]
    TypeMismatch {
        /// Field name
        field: String,
        /// Declared type name
        expected: String,
    },

    /// The value has the right kind but is not acceptable (e.g. unknown enum ordinal)
    #[error("Invalid value for field {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// What was wrong
        reason: String,
    },

    /// A schema declared the same field name twice
    #[error("Component {component} declares field {field} more than once")]
    DuplicateField {
        /// Component type name
        component: String,
        /// Duplicated field
        field: String,
    },
}
