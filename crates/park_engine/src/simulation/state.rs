//! Scene and resource store behind the simulation lock

use super::EngineError;
use crate::codec::SceneDocument;
use crate::scene::{Scene, SceneState};
use crate::schema::ComponentRegistry;
use crate::storage::{Resource, ResourceStore, StorageError, TYPE_ID_SCENE};
use std::sync::Arc;

/// Driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationState {
    /// Editing: the current scene is linked and may be changed or saved
    Stopped,
    /// A temporary copy of the edited scene is playing
    Playing,
}

/// The edited scene, kept unlinked while its copy plays
#[derive(Debug)]
struct EditedScene {
    scene: Scene,
    scene_id: Option<String>,
    play_id: String,
}

/// Everything the simulation lock guards
///
/// While stopped, `scene` is the edited scene and holds a reference to its
/// stored resource (if it has been saved or loaded). While playing, `scene`
/// is a copy decoded from a temporary resource.
#[derive(Debug)]
pub struct EngineState {
    scene: Scene,
    store: ResourceStore,
    registry: Arc<ComponentRegistry>,
    scene_id: Option<String>,
    edited: Option<EditedScene>,
}

impl EngineState {
    /// State with an empty linked scene
    pub fn new(mut store: ResourceStore, registry: Arc<ComponentRegistry>) -> Result<Self, EngineError> {
        let mut scene = Scene::new(Arc::clone(&registry));
        scene.link(&mut store)?;
        Ok(Self {
            scene,
            store,
            registry,
            scene_id: None,
            edited: None,
        })
    }

    /// Driver state
    pub const fn state(&self) -> SimulationState {
        if self.edited.is_some() {
            SimulationState::Playing
        } else {
            SimulationState::Stopped
        }
    }

    /// Current scene (the playing copy while playing)
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable current scene
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Resource store
    pub const fn store(&self) -> &ResourceStore {
        &self.store
    }

    /// Mutable resource store
    pub fn store_mut(&mut self) -> &mut ResourceStore {
        &mut self.store
    }

    /// Scene and store together, for scene operations that touch references
    pub fn split_mut(&mut self) -> (&mut Scene, &mut ResourceStore) {
        (&mut self.scene, &mut self.store)
    }

    /// Component registry scenes are decoded against
    pub const fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    /// Id of the stored resource the edited scene came from
    pub fn scene_id(&self) -> Option<&str> {
        self.edited
            .as_ref()
            .map_or(self.scene_id.as_deref(), |edited| edited.scene_id.as_deref())
    }

    fn require(&self, operation: &'static str, state: SimulationState) -> Result<(), EngineError> {
        if self.state() == state {
            Ok(())
        } else {
            Err(EngineError::InvalidStateTransition {
                operation,
                state: self.state(),
            })
        }
    }

    /// Decode the loaded scene resource `id`
    ///
    /// The caller holds a reference to `id`.
    fn decode(&self, id: &str) -> Result<Scene, EngineError> {
        let resource = self.store.get_loaded(id).ok_or_else(|| StorageError::NotFound {
            id: id.to_string(),
            type_id: TYPE_ID_SCENE.to_string(),
        })?;
        let document = resource
            .downcast_ref::<SceneDocument>()
            .ok_or_else(|| StorageError::InvalidResource {
                id: id.to_string(),
                expected: std::any::type_name::<SceneDocument>(),
            })?;
        Ok(document.to_scene(Arc::clone(&self.registry))?)
    }

    /// Reference, decode and link scene resource `id`
    fn open(&mut self, id: &str) -> Result<Scene, EngineError> {
        self.store.add_reference(id, TYPE_ID_SCENE)?;
        let opened = self.decode(id).and_then(|mut scene| {
            scene.link(&mut self.store)?;
            Ok(scene)
        });
        if opened.is_err() {
            if let Err(e) = self.store.remove_reference(id, TYPE_ID_SCENE) {
                log::warn!("Failed to release scene '{}': {}", id, e);
            }
        }
        opened
    }

    fn unlink_current(&mut self) -> Result<(), EngineError> {
        if self.scene.state() == SceneState::Linked {
            self.scene.unlink(&mut self.store)?;
        }
        Ok(())
    }

    /// Unlink the current scene and release its stored resource
    fn close_current(&mut self) -> Result<(), EngineError> {
        self.unlink_current()?;
        if let Some(id) = self.scene_id.take() {
            self.store.remove_reference(&id, TYPE_ID_SCENE)?;
        }
        Ok(())
    }

    /// Replace the edited scene with an empty linked one
    pub fn new_scene(&mut self) -> Result<(), EngineError> {
        self.require("create a new scene", SimulationState::Stopped)?;
        let mut scene = Scene::new(Arc::clone(&self.registry)).with_seed(self.scene.seed());
        scene.link(&mut self.store)?;
        self.close_current()?;
        self.scene = scene;
        log::info!("New scene");
        Ok(())
    }

    /// Replace the edited scene with stored scene `id`
    ///
    /// The current scene is left untouched if `id` cannot be loaded.
    pub fn load_scene(&mut self, id: &str) -> Result<(), EngineError> {
        self.require("load a scene", SimulationState::Stopped)?;
        let scene = self.open(id)?;
        self.close_current()?;
        self.scene = scene;
        self.scene_id = Some(id.to_string());
        log::info!("Loaded scene '{}'", id);
        Ok(())
    }

    /// Store the edited scene and reload it from what was written
    ///
    /// Saves under `id`, or under the scene's current id, or under a
    /// generated id. Returns the id used.
    pub fn save_scene(&mut self, id: Option<&str>) -> Result<String, EngineError> {
        self.require("save a scene", SimulationState::Stopped)?;
        let target = id.map(str::to_string).or_else(|| self.scene_id.clone());
        let document: Resource = Arc::new(SceneDocument::from_scene(&self.scene));
        let saved = self.store.save(target.as_deref(), TYPE_ID_SCENE, &document)?;

        // drop the old record first so a same-id save is read back fresh
        self.close_current()?;
        match self.open(&saved) {
            Ok(scene) => self.scene = scene,
            Err(e) => {
                self.scene.link(&mut self.store)?;
                return Err(e);
            }
        }
        self.scene_id = Some(saved.clone());
        log::info!("Saved scene '{}'", saved);
        Ok(saved)
    }

    /// Play a copy of the edited scene
    ///
    /// The copy round-trips through a temporary stored resource, so play
    /// always starts from exactly what would be saved.
    pub fn play(&mut self) -> Result<(), EngineError> {
        self.require("play", SimulationState::Stopped)?;
        let document: Resource = Arc::new(SceneDocument::from_scene(&self.scene));
        let play_id = self.store.save(None, TYPE_ID_SCENE, &document)?;

        let mut copy = match self.open(&play_id) {
            Ok(copy) => copy,
            Err(e) => {
                self.discard_temporary(&play_id, false);
                return Err(e);
            }
        };
        if let Err(e) = copy.start() {
            if let Err(e) = copy.unlink(&mut self.store) {
                log::warn!("Failed to unlink play copy: {}", e);
            }
            self.discard_temporary(&play_id, true);
            return Err(e.into());
        }

        self.unlink_current()?;
        let edited = std::mem::replace(&mut self.scene, copy);
        self.edited = Some(EditedScene {
            scene: edited,
            scene_id: self.scene_id.take(),
            play_id,
        });
        log::info!("Playing");
        Ok(())
    }

    /// Advance the playing scene by `delta_time` seconds
    pub fn step(&mut self, delta_time: f32) -> Result<(), EngineError> {
        self.require("step", SimulationState::Playing)?;
        self.scene.step(delta_time)?;
        Ok(())
    }

    /// Stop the playing copy and restore the edited scene
    pub fn stop(&mut self) -> Result<(), EngineError> {
        self.require("stop", SimulationState::Playing)?;
        self.scene.stop()?;
        let Some(edited) = self.edited.take() else {
            return Ok(());
        };

        let mut restored = edited.scene;
        restored.link(&mut self.store)?;
        let mut copy = std::mem::replace(&mut self.scene, restored);
        self.scene_id = edited.scene_id;

        copy.unlink(&mut self.store)?;
        self.store.remove_reference(&edited.play_id, TYPE_ID_SCENE)?;
        self.store.delete(&edited.play_id, TYPE_ID_SCENE)?;
        log::info!("Stopped after {} steps", copy.step_count());
        Ok(())
    }

    fn discard_temporary(&mut self, play_id: &str, referenced: bool) {
        if referenced {
            if let Err(e) = self.store.remove_reference(play_id, TYPE_ID_SCENE) {
                log::warn!("Failed to release temporary scene '{}': {}", play_id, e);
            }
        }
        if let Err(e) = self.store.delete(play_id, TYPE_ID_SCENE) {
            log::warn!("Failed to delete temporary scene '{}': {}", play_id, e);
        }
    }

    /// Clear every pointer to `id` in the current scene, then delete it
    pub fn delete_resource(&mut self, id: &str, type_id: &str) -> Result<(), EngineError> {
        self.store.delete_notifying(id, type_id, &mut self.scene)?;
        Ok(())
    }

    /// Stop if playing, then unlink and drop the scene
    pub fn finish(&mut self) -> Result<(), EngineError> {
        if self.state() == SimulationState::Playing {
            self.stop()?;
        }
        self.close_current()?;
        self.scene = Scene::new(Arc::clone(&self.registry));
        log::info!("Simulation finished");
        Ok(())
    }
}
