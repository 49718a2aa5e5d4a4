//! Scene codec scenarios: round trips, forward references and schema drift

use super::{registry, store, text};
use crate::codec::{deserialize, serialize, CodecError};
use crate::components::{Attraction, AttractionKind, Location, Maintenance, ParkService, SiteType};
use crate::foundation::math::Vec3;
use crate::scene::{Scene, SceneState, SimObject};
use crate::schema::FieldValue;
use crate::storage::ResourcePointer;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ring_scene() -> Scene {
        let (mut store, _) = store();
        let mut scene = Scene::new(registry()).with_seed(12);

        let a = Attraction {
            ratings: vec![4.5, 3.0],
            maintenance: vec![Maintenance::Open, Maintenance::Repair],
            description: text("intro"),
            descriptions: vec![text("map"), ResourcePointer::null()],
            ..Attraction::new(AttractionKind::FerrisWheel, Vec3::new(-40.0, 0.0, -30.0), 10)
        };
        let b = Attraction::new(AttractionKind::BumperCars, Vec3::new(80.0, 0.0, -80.0), 5);
        let office = ParkService::new(SiteType::Attraction).with_capacities(3, 0);

        let ring_a = scene
            .add_object(&mut store, SimObject::new("Ring A").with_component(a))
            .unwrap();
        let ring_b = scene
            .add_object(
                &mut store,
                SimObject::new("Ring B").with_component(b).with_component(Location::default()),
            )
            .unwrap();
        let office_id = scene
            .add_object(&mut store, SimObject::new("Office").with_component(office))
            .unwrap();
        scene.set_object_active(office_id, false).unwrap();

        let a = scene.find_component::<Attraction>(ring_a).unwrap();
        let b = scene.find_component::<Attraction>(ring_b).unwrap();
        scene
            .set_field(&mut store, a, "Neighbour", FieldValue::Component(Some(b)))
            .unwrap();
        scene
            .set_field(&mut store, b, "Neighbour", FieldValue::Component(Some(a)))
            .unwrap();
        scene
            .set_field(
                &mut store,
                b,
                "Neighbours",
                FieldValue::Array(vec![FieldValue::Component(Some(a)), FieldValue::Component(None)]),
            )
            .unwrap();
        let ring_b_location = scene.find_component::<Location>(ring_b).unwrap();
        scene.set_component_active(ring_b_location, false).unwrap();
        scene
    }

    #[test]
    fn test_round_trip_preserves_graph() {
        let scene = ring_scene();
        let encoded = serialize(&scene);
        let decoded = deserialize(&encoded, registry()).unwrap();

        assert_eq!(decoded.state(), SceneState::Unlinked);
        assert_eq!(decoded.seed(), 12);
        assert_eq!(serialize(&decoded), encoded);

        let names: Vec<(&str, bool)> = decoded.objects().map(|o| (o.name, o.active)).collect();
        assert_eq!(names, vec![("Ring A", true), ("Ring B", true), ("Office", false)]);
        let types: Vec<&str> = decoded
            .component_ids()
            .into_iter()
            .filter_map(|id| decoded.component(id).map(|c| c.type_name()))
            .collect();
        assert_eq!(types, vec!["Attraction", "Attraction", "Location", "ParkService"]);
        let active: Vec<Option<bool>> = decoded
            .component_ids()
            .into_iter()
            .map(|id| decoded.is_component_active(id))
            .collect();
        assert_eq!(active, vec![Some(true), Some(true), Some(false), Some(true)]);

        let a = decoded
            .find_component::<Attraction>(decoded.find_object("Ring A").unwrap())
            .unwrap();
        let b = decoded
            .find_component::<Attraction>(decoded.find_object("Ring B").unwrap())
            .unwrap();
        let ring_a = decoded.component_as::<Attraction>(a).unwrap();
        let ring_b = decoded.component_as::<Attraction>(b).unwrap();

        assert_eq!(ring_a.neighbour, Some(b));
        assert_eq!(ring_b.neighbour, Some(a));
        assert_eq!(ring_b.neighbours, vec![Some(a), None]);
        assert_eq!(ring_a.kind, AttractionKind::FerrisWheel);
        assert_relative_eq!(ring_a.coordinates.x, -40.0);
        assert_eq!(ring_a.ratings, vec![4.5, 3.0]);
        assert_eq!(ring_a.maintenance, vec![Maintenance::Open, Maintenance::Repair]);
        assert_eq!(ring_a.description, text("intro"));
        assert!(!ring_a.description.is_linked());
        assert_eq!(ring_a.descriptions, vec![text("map"), ResourcePointer::null()]);

        let office = decoded.components_of_type::<ParkService>()[0];
        assert_eq!(decoded.component_as::<ParkService>(office).unwrap().service_capacity, 3);
    }

    #[test]
    fn test_serialized_layout() {
        let encoded = serialize(&ring_scene());
        let lines: Vec<&str> = encoded.lines().collect();
        assert_eq!(lines[0], "Seed:12");
        assert_eq!(lines[1], "ObjectsCount:3");
        assert_eq!(lines[2], "    Name:Ring A");
        assert_eq!(lines[3], "    Active:True");
        assert_eq!(lines[4], "    ComponentsCount:1");
        assert_eq!(lines[5], "        ___Id:0");
        assert_eq!(lines[6], "        ___TypeName:Attraction");
        assert_eq!(lines[7], "        ___Active:True");
        assert!(lines[8].starts_with("        FieldsCount:"));
        assert_eq!(lines[9], "            Name:Type");
        assert_eq!(lines[10], "            Type:AttractionKind");
        assert_eq!(lines[11], "            Value:3");
        assert!(encoded.contains("___TypeName:Location\n        ___Active:False"));
        assert!(encoded.contains("Value:intro,txt"));
        assert!(encoded.contains("Type:Attraction[]"));
        assert!(encoded.contains("Value:[map,txt|null]"));
        assert!(encoded.contains("Value:[0|null]"));
    }

    fn forward_reference_text() -> String {
        [
            "Seed:3",
            "ObjectsCount:2",
            "    Name:Second",
            "    Active:True",
            "    ComponentsCount:1",
            "        ___Id:0",
            "        ___TypeName:Location",
            "        FieldsCount:1",
            "            Name:Neighbour",
            "            Type:Location",
            "            Value:1",
            "    Name:First",
            "    Active:True",
            "    ComponentsCount:1",
            "        ___Id:1",
            "        ___TypeName:Location",
            "        FieldsCount:2",
            "            Name:Capacity",
            "            Type:Int32",
            "            Value:4",
            "            Name:Neighbour",
            "            Type:Location",
            "            Value:0",
        ]
        .join("\n")
    }

    #[test]
    fn test_forward_reference_resolution() {
        let scene = deserialize(&forward_reference_text(), registry()).unwrap();
        let first = scene.find_component::<Location>(scene.find_object("First").unwrap()).unwrap();
        let second = scene.find_component::<Location>(scene.find_object("Second").unwrap()).unwrap();

        assert_eq!(scene.component_as::<Location>(first).unwrap().neighbour, Some(second));
        assert_eq!(scene.component_as::<Location>(second).unwrap().neighbour, Some(first));
        assert_eq!(scene.component_as::<Location>(first).unwrap().capacity, 4);
        assert_eq!(scene.component_as::<Location>(second).unwrap().capacity, 10);
    }

    #[test]
    fn test_unknown_types_and_fields_are_skipped() {
        let encoded = [
            "Seed:0",
            "ObjectsCount:1",
            "    Name:Plaza",
            "    Active:False",
            "    ComponentsCount:2",
            "        ___Id:0",
            "        ___TypeName:Carousel3000",
            "        FieldsCount:2",
            "            Name:Speed",
            "            Type:Single",
            "            Value:2.5",
            "            Name:Horses",
            "            Type:Int32",
            "            Value:12",
            "        ___Id:1",
            "        ___TypeName:Location",
            "        FieldsCount:4",
            "            Name:Colour",
            "            Type:String",
            "            Value:red",
            "            Name:Capacity",
            "            Type:Single",
            "            Value:3.5",
            "            Name:Occupation",
            "            Type:Int32",
            "            Value:9",
            "            Name:Coordinates",
            "            Type:Vector3",
            "            Value:1,2,3",
        ]
        .join("\n");

        let scene = deserialize(&encoded, registry()).unwrap();
        assert_eq!(scene.object_count(), 1);
        assert_eq!(scene.component_count(), 1);
        let plaza = scene.objects().next().unwrap();
        assert!(!plaza.active);

        let location = scene.component_as::<Location>(plaza.components[0]).unwrap();
        assert_eq!(location.coordinates, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(location.capacity, 10);
        assert_eq!(location.occupation, 0);
    }

    #[test]
    fn test_dangling_transient_id_is_left_null() {
        let encoded = forward_reference_text().replace("Value:1", "Value:9");
        let scene = deserialize(&encoded, registry()).unwrap();
        let second = scene.find_component::<Location>(scene.find_object("Second").unwrap()).unwrap();
        assert_eq!(scene.component_as::<Location>(second).unwrap().neighbour, None);
    }

    #[test]
    fn test_inactive_component_flag_is_read() {
        let encoded = forward_reference_text().replace(
            "        ___TypeName:Location\n        FieldsCount:2",
            "        ___TypeName:Location\n        ___Active:False\n        FieldsCount:2",
        );
        let scene = deserialize(&encoded, registry()).unwrap();
        let first = scene.find_component::<Location>(scene.find_object("First").unwrap()).unwrap();
        let second = scene.find_component::<Location>(scene.find_object("Second").unwrap()).unwrap();

        assert_eq!(scene.is_component_active(first), Some(false));
        assert_eq!(scene.is_component_active(second), Some(true));
        assert_eq!(scene.component_as::<Location>(second).unwrap().neighbour, Some(first));
    }

    #[test]
    fn test_reference_to_wrong_type_is_left_null() {
        let encoded = [
            "Seed:0",
            "ObjectsCount:1",
            "    Name:Ride",
            "    Active:True",
            "    ComponentsCount:2",
            "        ___Id:0",
            "        ___TypeName:Attraction",
            "        FieldsCount:2",
            "            Name:Neighbour",
            "            Type:Attraction",
            "            Value:1",
            "            Name:Neighbours",
            "            Type:Attraction[]",
            "            Value:[0|1]",
            "        ___Id:1",
            "        ___TypeName:Location",
            "        FieldsCount:0",
        ]
        .join("\n");

        let scene = deserialize(&encoded, registry()).unwrap();
        let ride = scene.components_of_type::<Attraction>()[0];
        let attraction = scene.component_as::<Attraction>(ride).unwrap();
        assert_eq!(attraction.neighbour, None);
        assert_eq!(attraction.neighbours, vec![Some(ride), None]);
    }

    #[test]
    fn test_corrupt_data_is_rejected() {
        let corrupt_line = |encoded: &str| match deserialize(encoded, registry()) {
            Err(CodecError::CorruptSceneData { line, .. }) => Some(line),
            _ => None,
        };

        assert_eq!(corrupt_line("Seed:abc\nObjectsCount:0"), Some(1));
        assert_eq!(corrupt_line("Seed:1\nObjects:0"), Some(2));
        assert_eq!(corrupt_line("Seed:1\nObjectsCount:two"), Some(2));
        assert_eq!(corrupt_line("Seed:1\nObjectsCount:1\n    Name:Lonely"), Some(4));

        let bad_vector = forward_reference_text().replace(
            "            Name:Capacity\n            Type:Int32\n            Value:4",
            "            Name:Coordinates\n            Type:Vector3\n            Value:1,2",
        );
        assert_eq!(corrupt_line(&bad_vector), Some(20));

        let duplicate = forward_reference_text().replace("___Id:1", "___Id:0");
        assert!(corrupt_line(&duplicate).is_some());

        let missing_object = "Seed:1\nObjectsCount:2\n    Name:Only\n    Active:True\n    ComponentsCount:0";
        assert_eq!(corrupt_line(missing_object), Some(6));

        let overflowing = [
            "Seed:1",
            "ObjectsCount:1",
            "    Name:Plaza",
            "    Active:True",
            "    ComponentsCount:1",
            "        ___Id:0",
            "        ___TypeName:Carousel3000",
            "        FieldsCount:18446744073709551615",
        ]
        .join("\n");
        assert_eq!(corrupt_line(&overflowing), Some(8));

        let bad_flag = forward_reference_text().replace(
            "        ___TypeName:Location\n        FieldsCount:1",
            "        ___TypeName:Location\n        ___Active:Maybe\n        FieldsCount:1",
        );
        assert_eq!(corrupt_line(&bad_flag), Some(8));

        let bad_ordinal = [
            "Seed:1",
            "ObjectsCount:1",
            "    Name:Ride",
            "    Active:True",
            "    ComponentsCount:1",
            "        ___Id:0",
            "        ___TypeName:Attraction",
            "        FieldsCount:1",
            "            Name:Type",
            "            Type:AttractionKind",
            "            Value:42",
        ]
        .join("\n");
        assert_eq!(corrupt_line(&bad_ordinal), Some(11));
    }

    #[test]
    fn test_empty_scene_round_trip() {
        let scene = Scene::new(registry());
        let encoded = serialize(&scene);
        assert_eq!(encoded, "Seed:0\nObjectsCount:0\n");
        let decoded = deserialize(&encoded, registry()).unwrap();
        assert_eq!(decoded.object_count(), 0);
    }
}
