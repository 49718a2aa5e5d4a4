//! Scene graph
//!
//! A [`Scene`] owns simulated objects, each owning an ordered list of
//! components. Cross-references between components are generational
//! [`ComponentId`](crate::foundation::collections::ComponentId) handles that
//! are nulled when their target is removed; resource pointers are nulled when
//! their resource is deleted.

mod error;
mod context;
mod object;
#[allow(clippy::module_inception)]
mod scene;

pub use error::SceneError;
pub use context::StepContext;
pub use object::{ObjectRef, SimObject};
pub use scene::{Scene, SceneState};
