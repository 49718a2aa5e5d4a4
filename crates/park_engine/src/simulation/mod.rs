//! Simulation context
//!
//! One [`Simulation`] owns the scene and the resource store behind a single
//! lock. The driver thread blocks on [`Simulation::lock`]; readers such as a
//! renderer use [`Simulation::try_lock`] and skip the frame when it is busy.

mod error;
mod state;

pub use error::EngineError;
pub use state::{EngineState, SimulationState};

use crate::config::{EngineConfig, StorageBackendKind};
use crate::schema::ComponentRegistry;
use crate::storage::{FileStorage, MemoryStorage, ResourceStore};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

/// Shared handle to the scene and resource store
///
/// Cloning shares the same state.
#[derive(Debug, Clone)]
pub struct Simulation {
    state: Arc<Mutex<EngineState>>,
}

impl Simulation {
    /// Simulation over `store` with an empty linked scene
    pub fn new(store: ResourceStore, registry: Arc<ComponentRegistry>) -> Result<Self, EngineError> {
        let state = EngineState::new(store, registry)?;
        log::info!("Simulation created");
        Ok(Self {
            state: Arc::new(Mutex::new(state)),
        })
    }

    /// Simulation with the storage backend and seed from `config`
    pub fn from_config(config: &EngineConfig, registry: Arc<ComponentRegistry>) -> Result<Self, EngineError> {
        config.validate()?;
        let store = match config.storage.backend {
            StorageBackendKind::File => FileStorage::new(&config.storage.base_path)?.into_store(),
            StorageBackendKind::Memory => MemoryStorage::new().into_store(),
        };
        let simulation = Self::new(store, registry)?;
        simulation.lock().scene_mut().set_seed(config.simulation.seed);
        Ok(simulation)
    }

    /// Block until the state is available
    pub fn lock(&self) -> MutexGuard<'_, EngineState> {
        // every mutation either completes or returns an error before touching shared state
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The state if nobody else holds it
    pub fn try_lock(&self) -> Option<MutexGuard<'_, EngineState>> {
        match self.state.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// Driver state
    pub fn state(&self) -> SimulationState {
        self.lock().state()
    }

    /// See [`EngineState::new_scene`]
    pub fn new_scene(&self) -> Result<(), EngineError> {
        self.lock().new_scene()
    }

    /// See [`EngineState::load_scene`]
    pub fn load_scene(&self, id: &str) -> Result<(), EngineError> {
        self.lock().load_scene(id)
    }

    /// See [`EngineState::save_scene`]
    pub fn save_scene(&self, id: Option<&str>) -> Result<String, EngineError> {
        self.lock().save_scene(id)
    }

    /// See [`EngineState::play`]
    pub fn play(&self) -> Result<(), EngineError> {
        self.lock().play()
    }

    /// See [`EngineState::step`]
    pub fn step(&self, delta_time: f32) -> Result<(), EngineError> {
        self.lock().step(delta_time)
    }

    /// See [`EngineState::stop`]
    pub fn stop(&self) -> Result<(), EngineError> {
        self.lock().stop()
    }

    /// See [`EngineState::delete_resource`]
    pub fn delete_resource(&self, id: &str, type_id: &str) -> Result<(), EngineError> {
        self.lock().delete_resource(id, type_id)
    }

    /// See [`EngineState::finish`]
    pub fn finish(&self) -> Result<(), EngineError> {
        self.lock().finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{register_all, ParkService};
    use crate::scene::{SceneError, SceneState, SimObject};
    use crate::storage::{StorageError, TYPE_ID_SCENE, TYPE_ID_TEXT};
    use approx::assert_relative_eq;

    fn registry() -> Arc<ComponentRegistry> {
        let mut registry = ComponentRegistry::new();
        register_all(&mut registry).unwrap();
        Arc::new(registry)
    }

    fn simulation() -> (Simulation, MemoryStorage) {
        let storage = MemoryStorage::new();
        storage.insert("welcome", TYPE_ID_TEXT, Arc::new(String::from("Welcome!")));
        let simulation = Simulation::new(storage.clone().into_store(), registry()).unwrap();
        (simulation, storage)
    }

    fn add_service(simulation: &Simulation, name: &str) {
        let mut state = simulation.lock();
        let (scene, store) = state.split_mut();
        scene
            .add_object(store, SimObject::new(name).with_component(ParkService::default()))
            .unwrap();
    }

    #[test]
    fn test_starts_stopped_with_linked_scene() {
        let (simulation, _) = simulation();
        assert_eq!(simulation.state(), SimulationState::Stopped);
        assert_eq!(simulation.lock().scene().state(), SceneState::Linked);
        assert!(simulation.lock().scene_id().is_none());
    }

    #[test]
    fn test_play_step_stop_restores_edited_scene() {
        let (simulation, storage) = simulation();
        add_service(&simulation, "Gate");
        let stored = storage.len();

        simulation.play().unwrap();
        assert_eq!(simulation.state(), SimulationState::Playing);
        assert_eq!(storage.len(), stored + 1);
        for _ in 0..4 {
            simulation.step(0.25).unwrap();
        }
        {
            let state = simulation.lock();
            let scene = state.scene();
            assert_eq!(scene.state(), SceneState::Playing);
            assert_eq!(scene.step_count(), 4);
            let id = scene.components_of_type::<ParkService>()[0];
            assert_relative_eq!(scene.component_as::<ParkService>(id).unwrap().total_cost(), 1.0);
        }

        simulation.stop().unwrap();
        assert_eq!(simulation.state(), SimulationState::Stopped);
        assert_eq!(storage.len(), stored);

        let state = simulation.lock();
        let scene = state.scene();
        assert_eq!(scene.state(), SceneState::Linked);
        assert_eq!(scene.step_count(), 0);
        let id = scene.components_of_type::<ParkService>()[0];
        assert_relative_eq!(scene.component_as::<ParkService>(id).unwrap().total_cost(), 0.0);
        assert_eq!(state.store().loaded_count(), 0);
    }

    #[test]
    fn test_inactive_component_stays_inactive_in_play() {
        let (simulation, _) = simulation();
        add_service(&simulation, "Idle");
        add_service(&simulation, "Busy");
        {
            let mut state = simulation.lock();
            let scene = state.scene_mut();
            let idle = scene.find_component::<ParkService>(scene.find_object("Idle").unwrap()).unwrap();
            scene.set_component_active(idle, false).unwrap();
        }

        simulation.play().unwrap();
        simulation.step(1.0).unwrap();
        {
            let state = simulation.lock();
            let scene = state.scene();
            let cost = |name: &str| {
                let id = scene.find_component::<ParkService>(scene.find_object(name).unwrap()).unwrap();
                (scene.is_component_active(id), scene.component_as::<ParkService>(id).unwrap().total_cost())
            };
            let (idle_active, idle_cost) = cost("Idle");
            let (busy_active, busy_cost) = cost("Busy");
            assert_eq!(idle_active, Some(false));
            assert_relative_eq!(idle_cost, 0.0);
            assert_eq!(busy_active, Some(true));
            assert_relative_eq!(busy_cost, 1.0);
        }

        simulation.stop().unwrap();
        let state = simulation.lock();
        let scene = state.scene();
        let idle = scene.find_component::<ParkService>(scene.find_object("Idle").unwrap()).unwrap();
        assert_eq!(scene.is_component_active(idle), Some(false));
    }

    #[test]
    fn test_driver_state_gating() {
        let (simulation, _) = simulation();
        assert!(matches!(
            simulation.step(0.1),
            Err(EngineError::InvalidStateTransition {
                state: SimulationState::Stopped,
                ..
            })
        ));
        assert!(simulation.stop().is_err());

        simulation.play().unwrap();
        assert!(simulation.play().is_err());
        assert!(simulation.new_scene().is_err());
        assert!(simulation.save_scene(None).is_err());
        assert!(simulation.load_scene("anything").is_err());
        simulation.stop().unwrap();
    }

    #[test]
    fn test_save_and_load_scene() {
        let (simulation, storage) = simulation();
        add_service(&simulation, "Restaurant");

        let id = simulation.save_scene(Some("park")).unwrap();
        assert_eq!(id, "park");
        assert_eq!(simulation.lock().scene_id(), Some("park"));
        assert_eq!(simulation.lock().store().reference_count("park"), 1);

        simulation.new_scene().unwrap();
        assert_eq!(simulation.lock().scene().object_count(), 0);
        assert_eq!(simulation.lock().store().reference_count("park"), 0);

        simulation.load_scene("park").unwrap();
        let state = simulation.lock();
        assert_eq!(state.scene().object_count(), 1);
        assert!(state.scene().find_object("Restaurant").is_some());
        assert_eq!(state.scene().state(), SceneState::Linked);
        drop(state);

        // saving again under the same id reads the new text back
        add_service(&simulation, "Entrance");
        simulation.save_scene(None).unwrap();
        assert_eq!(simulation.lock().scene().object_count(), 2);
        assert_eq!(simulation.lock().store().reference_count("park"), 1);
        assert!(storage.len() >= 2);
    }

    #[test]
    fn test_save_without_id_generates_one() {
        let (simulation, _) = simulation();
        let id = simulation.save_scene(None).unwrap();
        assert!(!id.is_empty());
        assert!(simulation.lock().store().exists(&id, TYPE_ID_SCENE));
    }

    #[test]
    fn test_load_missing_scene_keeps_current() {
        let (simulation, _) = simulation();
        add_service(&simulation, "Gate");
        assert!(matches!(
            simulation.load_scene("missing"),
            Err(EngineError::Storage(StorageError::LoadFailure { .. }))
        ));
        assert_eq!(simulation.lock().scene().object_count(), 1);
        assert_eq!(simulation.lock().scene().state(), SceneState::Linked);
    }

    #[test]
    fn test_delete_resource_refused_while_playing() {
        let (simulation, storage) = simulation();
        simulation.play().unwrap();
        assert!(matches!(
            simulation.delete_resource("welcome", TYPE_ID_TEXT),
            Err(EngineError::Scene(SceneError::InvalidOperationWhilePlaying(_)))
        ));
        simulation.stop().unwrap();

        simulation.delete_resource("welcome", TYPE_ID_TEXT).unwrap();
        assert!(storage.is_empty());
        assert!(!simulation.lock().store().exists("welcome", TYPE_ID_TEXT));
    }

    #[test]
    fn test_finish_stops_and_unlinks() {
        let (simulation, _) = simulation();
        add_service(&simulation, "Gate");
        simulation.play().unwrap();
        simulation.finish().unwrap();

        let state = simulation.lock();
        assert_eq!(state.state(), SimulationState::Stopped);
        assert_eq!(state.scene().state(), SceneState::Unlinked);
        assert_eq!(state.scene().object_count(), 0);
        assert_eq!(state.store().loaded_count(), 0);
    }

    #[test]
    fn test_try_lock_skips_when_busy() {
        let (simulation, _) = simulation();
        let guard = simulation.lock();

        let reader = simulation.clone();
        let skipped = std::thread::spawn(move || reader.try_lock().is_none())
            .join()
            .unwrap();
        assert!(skipped);

        drop(guard);
        assert!(simulation.try_lock().is_some());
    }

    #[test]
    fn test_from_config_uses_memory_backend_and_seed() {
        let config = EngineConfig::default().with_memory_storage().with_seed(77);
        let simulation = Simulation::from_config(&config, registry()).unwrap();
        assert_eq!(simulation.lock().scene().seed(), 77);

        let bad = EngineConfig::default().with_steps(-1.0, 1);
        assert!(matches!(
            Simulation::from_config(&bad, registry()),
            Err(EngineError::Config(_))
        ));
    }
}
