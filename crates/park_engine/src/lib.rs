//! # Park Engine
//!
//! Runtime core of a park simulation framework.
//!
//! ## Features
//!
//! - **Component Schemas**: Typed field tables registered per component type
//! - **Resource Store**: Reference-counted cache with pluggable loaders
//! - **Scene Graph**: Objects and components in arenas, with a link/play lifecycle
//! - **Scene Codec**: Line-oriented text format with forward component references
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use park_engine::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut registry = ComponentRegistry::new();
//!     park_engine::components::register_all(&mut registry)?;
//!
//!     let store = MemoryStorage::new().into_store();
//!     let simulation = Simulation::new(store, Arc::new(registry))?;
//!     {
//!         let mut state = simulation.lock();
//!         let (scene, store) = state.split_mut();
//!         scene.add_object(store, SimObject::new("Gate").with_component(ParkService::default()))?;
//!     }
//!
//!     simulation.play()?;
//!     for _ in 0..60 {
//!         simulation.step(1.0 / 60.0)?;
//!     }
//!     simulation.stop()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod schema;
pub mod storage;
pub mod scene;
pub mod codec;
pub mod components;

mod simulation;

pub use simulation::{EngineError, EngineState, Simulation, SimulationState};

#[cfg(test)]
mod tests;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Simulation, SimulationState, EngineState, EngineError,
        config::{Config, EngineConfig},
        foundation::{
            collections::{ComponentId, ObjectId},
            math::{Vec2, Vec3, Vec4},
        },
        schema::{Component, ComponentType, ComponentRegistry, FieldValue, SchemaBuilder, SchemaEnum},
        storage::{FileStorage, MemoryStorage, ResourcePointer, ResourceStore},
        scene::{Scene, SceneState, SimObject, StepContext},
        codec::{deserialize, serialize, SceneDocument},
        components::{Attraction, AttractionKind, Location, ParkService},
    };
}
