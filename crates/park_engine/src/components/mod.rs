//! Sample component kinds
//!
//! Data-carrying park components used by the driver and the scenario tests.
//! Visitor-flow business logic lives outside the engine.

mod location;
mod attraction;
mod park_service;

pub use location::Location;
pub use attraction::{Attraction, AttractionKind, Maintenance};
pub use park_service::{ParkService, SiteType};

use crate::schema::{ComponentRegistry, SchemaError};

/// Register every sample component type
pub fn register_all(registry: &mut ComponentRegistry) -> Result<(), SchemaError> {
    registry.register::<Location>()?;
    registry.register::<Attraction>()?;
    registry.register::<ParkService>()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all() {
        let mut registry = ComponentRegistry::new();
        register_all(&mut registry).unwrap();
        assert_eq!(registry.component_types(), &["Location", "Attraction", "ParkService"]);

        let kinds: Vec<_> = registry.enum_info("AttractionKind").unwrap().names().collect();
        assert_eq!(kinds, vec!["Rollercoaster", "BumperCars", "Carousel", "FerrisWheel"]);
        assert!(registry.enum_info("Maintenance").is_ok());
        assert!(registry.enum_info("SiteType").is_ok());
    }
}
