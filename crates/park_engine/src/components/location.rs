//! Location component

use crate::foundation::collections::ComponentId;
use crate::foundation::math::Vec3;
use crate::schema::{Component, ComponentType, SchemaBuilder};
use crate::storage::ResourcePointer;

/// A place in the park visitors can occupy
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    /// World position
    pub coordinates: Vec3,
    /// Maximum visitors
    pub capacity: i32,
    /// Current visitors
    pub occupation: i32,
    /// Next location along the path
    pub neighbour: Option<ComponentId>,
    /// Text resource describing the place
    pub description: ResourcePointer,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            coordinates: Vec3::zeros(),
            capacity: 10,
            occupation: 0,
            neighbour: None,
            description: ResourcePointer::null(),
        }
    }
}

impl Component for Location {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }
}

impl ComponentType for Location {
    const TYPE_NAME: &'static str = "Location";

    fn schema(builder: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
        builder
            .field("Coordinates", |l| l.coordinates, |l, v| l.coordinates = v)
            .field("Capacity", |l| l.capacity, |l, v| l.capacity = v)
            .read_only("Occupation", |l| l.occupation)
            .component_ref("Neighbour", Self::TYPE_NAME, |l| l.neighbour, |l, v| l.neighbour = v)
            .field("Description", |l| l.description.clone(), |l, v| l.description = v)
    }
}
