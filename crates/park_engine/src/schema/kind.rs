//! Field kinds and descriptors

use std::fmt;

/// Scalar field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// 32-bit signed integer
    Int,
    /// 32-bit float
    Float,
    /// Boolean
    Bool,
    /// UTF-8 string
    String,
    /// Two-component float vector
    Vec2,
    /// Three-component float vector
    Vec3,
    /// Four-component float vector
    Vec4,
}

impl ScalarKind {
    /// Declared type name used in the text scene format
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Int => "Int32",
            Self::Float => "Single",
            Self::Bool => "Boolean",
            Self::String => "String",
            Self::Vec2 => "Vector2",
            Self::Vec3 => "Vector3",
            Self::Vec4 => "Vector4",
        }
    }
}

/// Kind of a single (non-array) value, also used for array elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Scalar value
    Scalar(ScalarKind),
    /// Enum value, carrying the enum type name
    Enum(&'static str),
    /// Resource pointer
    Resource,
    /// Component reference, carrying the referenced component type name
    Component(&'static str),
}

impl ElementKind {
    /// Declared type name used in the text scene format
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Scalar(scalar) => scalar.type_name(),
            Self::Enum(name) | Self::Component(name) => name,
            Self::Resource => "ResourcePointer",
        }
    }
}

/// Kind of a component field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Scalar value
    Scalar(ScalarKind),
    /// Enum value
    Enum(&'static str),
    /// Resource pointer
    Resource,
    /// Component reference
    Component(&'static str),
    /// Array of elements of one kind (one level of nesting only)
    Array(ElementKind),
}

impl FieldKind {
    /// Declared type name; arrays append `[]` to the element name
    pub fn type_name(self) -> String {
        match self.element() {
            element if self.is_array() => format!("{}[]", element.type_name()),
            element => element.type_name().to_string(),
        }
    }

    /// Whether this is an array kind
    pub const fn is_array(self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// The value kind, or the element kind for arrays
    pub const fn element(self) -> ElementKind {
        match self {
            Self::Scalar(scalar) => ElementKind::Scalar(scalar),
            Self::Enum(name) => ElementKind::Enum(name),
            Self::Resource => ElementKind::Resource,
            Self::Component(name) => ElementKind::Component(name),
            Self::Array(element) => element,
        }
    }

    /// Whether values of this kind (or its elements) are resource pointers
    pub const fn holds_resources(self) -> bool {
        matches!(self.element(), ElementKind::Resource)
    }

    /// Whether values of this kind (or its elements) are component references
    pub const fn holds_components(self) -> bool {
        matches!(self.element(), ElementKind::Component(_))
    }
}

impl From<ElementKind> for FieldKind {
    fn from(element: ElementKind) -> Self {
        match element {
            ElementKind::Scalar(scalar) => Self::Scalar(scalar),
            ElementKind::Enum(name) => Self::Enum(name),
            ElementKind::Resource => Self::Resource,
            ElementKind::Component(name) => Self::Component(name),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}

/// Name, kind and writability of one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name, unique per component type
    pub name: &'static str,
    /// Field kind
    pub kind: FieldKind,
    /// Whether the generic setter accepts this field
    pub writable: bool,
}

impl FieldDescriptor {
    /// Element kind if this is an array field
    pub const fn element_kind(&self) -> Option<ElementKind> {
        match self.kind {
            FieldKind::Array(element) => Some(element),
            _ => None,
        }
    }
}
