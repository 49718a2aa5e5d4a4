//! Field schema provider
//!
//! Every component type registers an explicit, ordered field table built with
//! [`SchemaBuilder`]. The [`ComponentRegistry`] resolves type names to
//! schemas and gives generic get/set access to fields by name, including
//! indexed access and grow/shrink for array fields.

mod error;
mod kind;
mod value;
mod enums;
mod component;
mod builder;
mod registry;

pub use error::SchemaError;
pub use kind::{ScalarKind, ElementKind, FieldKind, FieldDescriptor};
pub use value::{FieldValue, FieldType};
pub use enums::{SchemaEnum, EnumInfo};
pub use component::{AsAny, Component, ComponentType};
pub use builder::{ComponentSchema, SchemaBuilder};
pub use registry::ComponentRegistry;
