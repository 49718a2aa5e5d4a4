//! Scene codec
//!
//! Serializes a scene to a deterministic line-oriented text form and decodes
//! it back in two passes: components are created and filled first, then
//! component cross-references are resolved through their transient ids.

mod error;
mod value;
mod text;
mod document;

pub use error::CodecError;
pub use text::{serialize, deserialize};
pub use document::SceneDocument;
