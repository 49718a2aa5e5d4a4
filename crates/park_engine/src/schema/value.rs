//! Dynamically typed field values

use super::{ElementKind, ScalarKind};
use crate::foundation::collections::ComponentId;
use crate::foundation::math::{Vec2, Vec3, Vec4};
use crate::storage::ResourcePointer;

/// A field value read or written through the generic accessors
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// `Int32`
    Int(i32),
    /// `Single`
    Float(f32),
    /// `Boolean`
    Bool(bool),
    /// `String`
    String(String),
    /// `Vector2`
    Vec2(Vec2),
    /// `Vector3`
    Vec3(Vec3),
    /// `Vector4`
    Vec4(Vec4),
    /// Enum member, by integer value
    Enum(i32),
    /// Resource pointer
    Resource(ResourcePointer),
    /// Component reference (`None` is null)
    Component(Option<ComponentId>),
    /// Array of element values
    Array(Vec<Self>),
}

impl FieldValue {
    /// Whether this value can be stored in a field (or element) of `kind`
    pub fn fits(&self, kind: ElementKind) -> bool {
        matches!(
            (self, kind),
            (Self::Int(_), ElementKind::Scalar(ScalarKind::Int))
                | (Self::Float(_), ElementKind::Scalar(ScalarKind::Float))
                | (Self::Bool(_), ElementKind::Scalar(ScalarKind::Bool))
                | (Self::String(_), ElementKind::Scalar(ScalarKind::String))
                | (Self::Vec2(_), ElementKind::Scalar(ScalarKind::Vec2))
                | (Self::Vec3(_), ElementKind::Scalar(ScalarKind::Vec3))
                | (Self::Vec4(_), ElementKind::Scalar(ScalarKind::Vec4))
                | (Self::Enum(_), ElementKind::Enum(_))
                | (Self::Resource(_), ElementKind::Resource)
                | (Self::Component(_), ElementKind::Component(_))
        )
    }

    /// The resource pointer held by this value
    pub const fn as_resource(&self) -> Option<&ResourcePointer> {
        match self {
            Self::Resource(pointer) => Some(pointer),
            _ => None,
        }
    }

    /// The component reference held by this value
    pub const fn as_component(&self) -> Option<Option<ComponentId>> {
        match self {
            Self::Component(reference) => Some(*reference),
            _ => None,
        }
    }

    /// Elements of an array value
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(elements) => Some(elements),
            _ => None,
        }
    }
}

/// Rust types usable as scalar or resource fields
pub trait FieldType: Clone + Send + Sync + 'static {
    /// Kind of a field holding this type
    const KIND: ElementKind;

    /// Value of a freshly inserted array element
    fn unset() -> Self;

    /// Wrap into a [`FieldValue`]
    fn into_value(self) -> FieldValue;

    /// Unwrap from a [`FieldValue`] of the matching variant
    fn from_value(value: FieldValue) -> Option<Self>;
}

macro_rules! impl_field_type {
    ($ty:ty, $scalar:ident, $variant:ident, $unset:expr) => {
        impl FieldType for $ty {
            const KIND: ElementKind = ElementKind::Scalar(ScalarKind::$scalar);

            fn unset() -> Self {
                $unset
            }

            fn into_value(self) -> FieldValue {
                FieldValue::$variant(self)
            }

            fn from_value(value: FieldValue) -> Option<Self> {
                match value {
                    FieldValue::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_field_type!(i32, Int, Int, 0);
impl_field_type!(f32, Float, Float, 0.0);
impl_field_type!(bool, Bool, Bool, false);
impl_field_type!(String, String, String, String::new());
impl_field_type!(Vec2, Vec2, Vec2, Vec2::zeros());
impl_field_type!(Vec3, Vec3, Vec3, Vec3::zeros());
impl_field_type!(Vec4, Vec4, Vec4, Vec4::zeros());

impl FieldType for ResourcePointer {
    const KIND: ElementKind = ElementKind::Resource;

    fn unset() -> Self {
        Self::null()
    }

    fn into_value(self) -> FieldValue {
        FieldValue::Resource(self)
    }

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Resource(p) => Some(p),
            _ => None,
        }
    }
}
