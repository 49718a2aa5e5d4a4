//! Headless park simulation driver
//!
//! Builds the ring template, saves it, plays it for the configured number of
//! steps and reports what happened.
//!
//! Usage: `park_sim [config.toml|config.ron]` (default `park_sim.toml`)

mod templates;

use park_engine::components::{Attraction, ParkService};
use park_engine::config::SimulationConfig;
use park_engine::foundation::logging;
use park_engine::prelude::*;
use std::sync::Arc;
use thiserror::Error;

const DEFAULT_CONFIG: &str = "park_sim.toml";

/// Driver errors
#[derive(Debug, Error)]
enum AppError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(#[from] park_engine::config::ConfigError),

    #[error("Schema error: {0}")]
    Schema(#[from] park_engine::schema::SchemaError),
}

fn report(simulation: &Simulation) {
    let Some(state) = simulation.try_lock() else {
        log::debug!("Simulation busy, skipping report");
        return;
    };
    let scene = state.scene();
    for id in scene.components_of_type::<Attraction>() {
        let (Some(ride), Some(owner)) = (
            scene.component_as::<Attraction>(id),
            scene.component_owner(id).and_then(|o| scene.object(o)),
        ) else {
            continue;
        };
        log::info!(
            "{}: {:?}, {}/{} visitors, open {:.1}s",
            owner.name,
            ride.kind,
            ride.occupation,
            ride.capacity,
            ride.open_time
        );
    }
    for id in scene.components_of_type::<ParkService>() {
        if let Some(service) = scene.component_as::<ParkService>(id) {
            log::info!("{:?} service cost so far: {:.2}", service.site_type, service.total_cost());
        }
    }
}

fn run(mut config: EngineConfig) -> Result<(), AppError> {
    if config.simulation.seed == 0 {
        config.simulation.seed = rand::random();
        log::info!("Using random seed {}", config.simulation.seed);
    }

    let mut registry = ComponentRegistry::new();
    park_engine::components::register_all(&mut registry)?;
    let simulation = Simulation::from_config(&config, Arc::new(registry))?;

    templates::populate_ring(&mut simulation.lock())?;
    let id = simulation.save_scene(Some("park"))?;
    log::info!("Scene saved as '{}'", id);

    simulation.play()?;
    let SimulationConfig { delta_time, steps, .. } = config.simulation;
    for _ in 0..steps {
        simulation.step(delta_time)?;
    }
    report(&simulation);
    simulation.stop()?;

    simulation.finish()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config = EngineConfig::load_or_default(&path)?;
    logging::init_with_level(&config.log_level);

    log::info!("Starting park simulation");
    match run(config) {
        Ok(()) => {
            log::info!("Park simulation completed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Park simulation failed: {}", e);
            Err(e.into())
        }
    }
}
