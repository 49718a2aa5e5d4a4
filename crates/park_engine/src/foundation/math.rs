//! Vector types
//!
//! `f32` vectors backing the `Vector2`/`Vector3`/`Vector4` field kinds.

pub use nalgebra::{Vector2, Vector3, Vector4};

/// Two-component field vector
pub type Vec2 = Vector2<f32>;

/// Three-component field vector, used for coordinates
pub type Vec3 = Vector3<f32>;

/// Four-component field vector
pub type Vec4 = Vector4<f32>;
