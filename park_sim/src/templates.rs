//! Scene templates

use park_engine::components::{Attraction, AttractionKind, Location, Maintenance, ParkService, SiteType};
use park_engine::foundation::collections::ComponentId;
use park_engine::foundation::math::Vec3;
use park_engine::prelude::*;
use park_engine::storage::{Resource, TYPE_ID_TEXT};
use std::sync::Arc;

struct RideSpec {
    name: &'static str,
    kind: AttractionKind,
    coordinates: [f32; 3],
    capacity: i32,
    occupation: i32,
    description: &'static str,
}

const RING: [RideSpec; 4] = [
    RideSpec {
        name: "AttractionA",
        kind: AttractionKind::Rollercoaster,
        coordinates: [-40.0, 0.0, -30.0],
        capacity: 10,
        occupation: 10,
        description: "A tall steel coaster with two loops.",
    },
    RideSpec {
        name: "AttractionB",
        kind: AttractionKind::BumperCars,
        coordinates: [80.0, 0.0, -80.0],
        capacity: 5,
        occupation: 0,
        description: "Twelve cars on a covered floor.",
    },
    RideSpec {
        name: "AttractionC",
        kind: AttractionKind::Carousel,
        coordinates: [20.0, 0.0, 40.0],
        capacity: 3,
        occupation: 0,
        description: "Hand-painted horses, open all year.",
    },
    RideSpec {
        name: "AttractionD",
        kind: AttractionKind::FerrisWheel,
        coordinates: [-60.0, 0.0, 50.0],
        capacity: 8,
        occupation: 0,
        description: "Thirty gondolas over the lake.",
    },
];

fn description_id(name: &str) -> String {
    format!("{}_description", name.to_lowercase())
}

/// Fill the current scene with four attractions linked in a ring
///
/// Each attraction's `Neighbour` is the next one, so every reference except
/// the last points forwards in traversal order. Each also lists the other
/// three in `Neighbours`. An entrance service feeds a food court.
pub fn populate_ring(state: &mut EngineState) -> Result<(), EngineError> {
    for ride in &RING {
        let text: Resource = Arc::new(ride.description.to_string());
        state.store_mut().save(Some(&description_id(ride.name)), TYPE_ID_TEXT, &text)?;
    }

    let (scene, store) = state.split_mut();
    let mut rides: Vec<ComponentId> = Vec::with_capacity(RING.len());
    for ride in &RING {
        let [x, y, z] = ride.coordinates;
        let coordinates = Vec3::new(x, y, z);
        let attraction = Attraction {
            occupation: ride.occupation,
            description: ResourcePointer::new(description_id(ride.name), TYPE_ID_TEXT),
            ratings: vec![4.0],
            maintenance: vec![Maintenance::Open, Maintenance::Inspection],
            ..Attraction::new(ride.kind, coordinates, ride.capacity)
        };
        let location = Location {
            coordinates,
            capacity: ride.capacity,
            ..Default::default()
        };
        let object = scene.add_object(
            store,
            SimObject::new(ride.name).with_component(attraction).with_component(location),
        )?;
        rides.extend(scene.find_component::<Attraction>(object));
    }

    for (i, &ride) in rides.iter().enumerate() {
        let next = rides[(i + 1) % rides.len()];
        scene.set_field(store, ride, "Neighbour", FieldValue::Component(Some(next)))?;
        let others = rides
            .iter()
            .filter(|&&other| other != ride)
            .map(|&other| FieldValue::Component(Some(other)))
            .collect();
        scene.set_field(store, ride, "Neighbours", FieldValue::Array(others))?;
    }

    let food_court = scene.add_object(
        store,
        SimObject::new("FoodCourt")
            .with_component(ParkService::new(SiteType::Restaurant).with_capacities(6, 20)),
    )?;
    let food_court = scene.find_component::<ParkService>(food_court);

    let entrance = ParkService::new(SiteType::Entrance)
        .with_visitors(40)
        .with_capacities(10, 30)
        .with_neighbours(vec![food_court]);
    scene.add_object(store, SimObject::new("Entrance").with_component(entrance))?;

    log::info!("Populated ring template with {} attractions", rides.len());
    Ok(())
}
