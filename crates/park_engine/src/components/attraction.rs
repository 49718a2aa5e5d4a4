//! Attraction component

use crate::foundation::collections::ComponentId;
use crate::foundation::math::Vec3;
use crate::scene::StepContext;
use crate::schema::{Component, ComponentType, SchemaBuilder};
use crate::storage::ResourcePointer;

crate::schema_enum! {
    /// Ride type
    #[derive(Default)]
    pub enum AttractionKind {
        #[default]
        Rollercoaster = 0,
        BumperCars = 1,
        Carousel = 2,
        FerrisWheel = 3,
    }
}

crate::schema_enum! {
    /// Maintenance slot state
    #[derive(Default)]
    pub enum Maintenance {
        #[default]
        Open = 0,
        Inspection = 1,
        Repair = 2,
        Closed = 3,
    }
}

/// A ride with visitors, ratings and links to nearby rides
#[derive(Debug, Clone, PartialEq)]
pub struct Attraction {
    /// Ride type
    pub kind: AttractionKind,
    /// World position
    pub coordinates: Vec3,
    /// Maximum visitors
    pub capacity: i32,
    /// Current visitors
    pub occupation: i32,
    /// Next attraction in the ring
    pub neighbour: Option<ComponentId>,
    /// Text resource describing the ride
    pub description: ResourcePointer,
    /// Visitor ratings
    pub ratings: Vec<f32>,
    /// Maintenance state per scheduled slot
    pub maintenance: Vec<Maintenance>,
    /// Every attraction reachable from this one
    pub neighbours: Vec<Option<ComponentId>>,
    /// Extra text resources
    pub descriptions: Vec<ResourcePointer>,
    /// Simulated seconds the ride has been open
    pub open_time: f32,
}

impl Default for Attraction {
    fn default() -> Self {
        Self {
            kind: AttractionKind::default(),
            coordinates: Vec3::zeros(),
            capacity: 10,
            occupation: 0,
            neighbour: None,
            description: ResourcePointer::null(),
            ratings: Vec::new(),
            maintenance: Vec::new(),
            neighbours: Vec::new(),
            descriptions: Vec::new(),
            open_time: 0.0,
        }
    }
}

impl Attraction {
    /// Attraction of `kind` at `coordinates`
    pub fn new(kind: AttractionKind, coordinates: Vec3, capacity: i32) -> Self {
        Self {
            kind,
            coordinates,
            capacity,
            ..Default::default()
        }
    }

    /// Mean rating, if rated
    pub fn average_rating(&self) -> Option<f32> {
        if self.ratings.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let count = self.ratings.len() as f32;
        Some(self.ratings.iter().sum::<f32>() / count)
    }
}

impl Component for Attraction {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn start(&mut self, _ctx: &mut StepContext<'_>) {
        self.open_time = 0.0;
    }

    fn step(&mut self, ctx: &mut StepContext<'_>) {
        if self.maintenance.first() != Some(&Maintenance::Closed) {
            self.open_time += ctx.delta_time;
        }
    }
}

impl ComponentType for Attraction {
    const TYPE_NAME: &'static str = "Attraction";

    fn schema(builder: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
        builder
            .enumeration("Type", |a| a.kind, |a, v| a.kind = v)
            .field("Coordinates", |a| a.coordinates, |a, v| a.coordinates = v)
            .field("Capacity", |a| a.capacity, |a, v| a.capacity = v)
            .field("Occupation", |a| a.occupation, |a, v| a.occupation = v)
            .component_ref("Neighbour", Self::TYPE_NAME, |a| a.neighbour, |a, v| a.neighbour = v)
            .field("Description", |a| a.description.clone(), |a, v| a.description = v)
            .array("Ratings", |a| &a.ratings, |a| &mut a.ratings)
            .enum_array("Maintenance", |a| &a.maintenance, |a| &mut a.maintenance)
            .component_ref_array("Neighbours", Self::TYPE_NAME, |a| &a.neighbours, |a| &mut a.neighbours)
            .array("Descriptions", |a| &a.descriptions, |a| &mut a.descriptions)
            .read_only("OpenTime", |a| a.open_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ComponentRegistry, FieldValue};
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_average_rating() {
        let mut attraction = Attraction::default();
        assert!(attraction.average_rating().is_none());
        attraction.ratings = vec![4.0, 5.0, 3.0];
        assert_relative_eq!(attraction.average_rating().unwrap(), 4.0);
    }

    #[test]
    fn test_closed_ride_does_not_accumulate_open_time() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut ctx = StepContext {
            delta_time: 0.5,
            elapsed: 0.0,
            step_count: 0,
            rng: &mut rng,
        };
        let mut attraction = Attraction::default();
        attraction.step(&mut ctx);
        assert_relative_eq!(attraction.open_time, 0.5);

        attraction.maintenance = vec![Maintenance::Closed];
        attraction.step(&mut ctx);
        assert_relative_eq!(attraction.open_time, 0.5);

        attraction.start(&mut ctx);
        assert_relative_eq!(attraction.open_time, 0.0);
    }

    #[test]
    fn test_enum_fields_through_registry() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Attraction>().unwrap();
        let mut attraction = Attraction::default();

        registry
            .set(&mut attraction, "Type", FieldValue::Enum(AttractionKind::Carousel as i32))
            .unwrap();
        assert_eq!(attraction.kind, AttractionKind::Carousel);

        registry.insert_range(&mut attraction, "Maintenance", 0, 2).unwrap();
        assert_eq!(attraction.maintenance, vec![Maintenance::Open; 2]);
        assert!(registry.set(&mut attraction, "Type", FieldValue::Enum(42)).is_err());
    }
}
