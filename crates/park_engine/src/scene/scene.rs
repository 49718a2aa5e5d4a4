//! Scene graph
//!
//! Objects and components live in generational arenas. Objects keep their
//! component handles in order, and traversal always walks objects in insertion
//! order, then each object's components in order.
//!
//! ```text
//! Unlinked --link()--> Linked --start()--> Playing
//!    ^                   |  ^                 |
//!    +-----unlink()------+  +-----stop()------+
//! ```

use super::{ObjectRef, SceneError, SimObject, StepContext};
use crate::foundation::collections::{ComponentId, HandleMap, ObjectId};
use crate::schema::{Component, ComponentRegistry, ElementKind, FieldKind, FieldValue, SchemaError};
use crate::storage::{ResourceDeletedListener, ResourceKey, ResourcePointer, ResourceStore, StorageError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Scene lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneState {
    /// No resource references held
    Unlinked,
    /// Resource references held, not simulating
    Linked,
    /// Resource references held and components started
    Playing,
}

#[derive(Debug)]
struct ObjectEntry {
    name: String,
    active: bool,
    components: Vec<ComponentId>,
}

#[derive(Debug)]
struct ComponentSlot {
    owner: ObjectId,
    active: bool,
    component: Box<dyn Component>,
}

type Hook = fn(&mut dyn Component, &mut StepContext<'_>);

/// Root of the object/component graph
pub struct Scene {
    state: SceneState,
    seed: u64,
    elapsed: f32,
    step_count: u64,
    objects: HandleMap<ObjectId, ObjectEntry>,
    order: Vec<ObjectId>,
    components: HandleMap<ComponentId, ComponentSlot>,
    registry: Arc<ComponentRegistry>,
    rng: StdRng,
}

/// Walk every writable field selected by `select`, element by element,
/// writing back the values `visit` reports as changed.
fn visit_fields<F>(
    registry: &ComponentRegistry,
    component: &mut dyn Component,
    select: fn(FieldKind) -> bool,
    mut visit: F,
) -> Result<(), SceneError>
where
    F: FnMut(&mut FieldValue) -> Result<bool, SceneError>,
{
    for descriptor in registry.fields(component)? {
        if !descriptor.writable || !select(descriptor.kind) {
            continue;
        }
        if descriptor.kind.is_array() {
            for index in 0..registry.array_len(component, descriptor.name)? {
                let mut value = registry.get_at(component, descriptor.name, index)?;
                if visit(&mut value)? {
                    registry.set_at(component, descriptor.name, index, value)?;
                }
            }
        } else {
            let mut value = registry.get(component, descriptor.name)?;
            if visit(&mut value)? {
                registry.set(component, descriptor.name, value)?;
            }
        }
    }
    Ok(())
}

fn for_each_pointer<F>(value: &mut FieldValue, f: &mut F) -> Result<(), StorageError>
where
    F: FnMut(&mut ResourcePointer) -> Result<(), StorageError>,
{
    match value {
        FieldValue::Resource(pointer) => f(pointer),
        FieldValue::Array(items) => items.iter_mut().try_for_each(|item| for_each_pointer(item, f)),
        _ => Ok(()),
    }
}

fn unlink_value(store: &mut ResourceStore, value: &mut FieldValue) -> Result<(), StorageError> {
    for_each_pointer(value, &mut |pointer| {
        if pointer.is_linked() {
            pointer.unlink(store)?;
        }
        Ok(())
    })
}

/// Link every pointer in `value`, releasing the ones already linked on failure
fn link_value(store: &mut ResourceStore, value: &mut FieldValue) -> Result<(), StorageError> {
    let result = for_each_pointer(value, &mut |pointer| pointer.link(store));
    if result.is_err() {
        if let Err(e) = unlink_value(store, value) {
            log::warn!("Failed to roll back partial link: {}", e);
        }
    }
    result
}

fn value_fits(kind: FieldKind, value: &FieldValue) -> bool {
    match (kind, value) {
        (FieldKind::Array(element), FieldValue::Array(items)) => items.iter().all(|v| v.fits(element)),
        (FieldKind::Array(_), _) => false,
        (kind, value) => value.fits(kind.element()),
    }
}

fn clear_component_refs(
    registry: &ComponentRegistry,
    component: &mut dyn Component,
    matches: impl Fn(ComponentId) -> bool,
) -> Result<(), SceneError> {
    visit_fields(registry, component, FieldKind::holds_components, |value| {
        if let FieldValue::Component(Some(target)) = value {
            if matches(*target) {
                *value = FieldValue::Component(None);
                return Ok(true);
            }
        }
        Ok(false)
    })
}

impl Scene {
    /// Empty unlinked scene over `registry`
    pub fn new(registry: Arc<ComponentRegistry>) -> Self {
        Self {
            state: SceneState::Unlinked,
            seed: 0,
            elapsed: 0.0,
            step_count: 0,
            objects: HandleMap::with_key(),
            order: Vec::new(),
            components: HandleMap::with_key(),
            registry,
            rng: StdRng::seed_from_u64(0),
        }
    }

    /// Builder-style [`set_seed`](Self::set_seed)
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Lifecycle state
    pub const fn state(&self) -> SceneState {
        self.state
    }

    /// Random seed applied on start
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Set the random seed applied on start
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    /// Simulated seconds since start
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Steps completed since start
    pub const fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Component registry this scene resolves fields through
    pub const fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    // ---- enumeration ----

    /// Number of objects
    pub fn object_count(&self) -> usize {
        self.order.len()
    }

    /// Number of components across all objects
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    fn object_ref(&self, id: ObjectId) -> Option<ObjectRef<'_>> {
        self.objects.get(id).map(|entry| ObjectRef {
            id,
            name: &entry.name,
            active: entry.active,
            components: &entry.components,
        })
    }

    /// Objects in order
    pub fn objects(&self) -> impl Iterator<Item = ObjectRef<'_>> {
        self.order.iter().filter_map(|&id| self.object_ref(id))
    }

    /// View of object `id`
    pub fn object(&self, id: ObjectId) -> Option<ObjectRef<'_>> {
        self.object_ref(id)
    }

    /// First object called `name`
    pub fn find_object(&self, name: &str) -> Option<ObjectId> {
        self.objects().find(|o| o.name == name).map(|o| o.id)
    }

    /// Rename object `id`
    pub fn set_object_name(&mut self, id: ObjectId, name: impl Into<String>) -> Result<(), SceneError> {
        self.objects.get_mut(id).ok_or(SceneError::UnknownObject)?.name = name.into();
        Ok(())
    }

    /// Enable or disable stepping of object `id`
    pub fn set_object_active(&mut self, id: ObjectId, active: bool) -> Result<(), SceneError> {
        self.objects.get_mut(id).ok_or(SceneError::UnknownObject)?.active = active;
        Ok(())
    }

    /// Every component handle in traversal order
    pub fn component_ids(&self) -> Vec<ComponentId> {
        self.objects().flat_map(|o| o.components.iter().copied()).collect()
    }

    /// Component `id`
    pub fn component(&self, id: ComponentId) -> Option<&dyn Component> {
        self.components.get(id).map(|slot| slot.component.as_ref())
    }

    /// Mutable component `id`
    ///
    /// Direct writes bypass resource bookkeeping; reassign resource pointers
    /// through [`set_field`](Self::set_field) instead.
    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut dyn Component> {
        self.components.get_mut(id).map(|slot| slot.component.as_mut())
    }

    /// Component `id` as a `T`
    pub fn component_as<T: Component>(&self, id: ComponentId) -> Option<&T> {
        self.component(id)?.downcast_ref::<T>()
    }

    /// Component `id` as a mutable `T`
    pub fn component_as_mut<T: Component>(&mut self, id: ComponentId) -> Option<&mut T> {
        self.component_mut(id)?.downcast_mut::<T>()
    }

    /// Object owning component `id`
    pub fn component_owner(&self, id: ComponentId) -> Option<ObjectId> {
        self.components.get(id).map(|slot| slot.owner)
    }

    /// Whether component `id` is stepped
    pub fn is_component_active(&self, id: ComponentId) -> Option<bool> {
        self.components.get(id).map(|slot| slot.active)
    }

    /// Enable or disable stepping of component `id`
    pub fn set_component_active(&mut self, id: ComponentId, active: bool) -> Result<(), SceneError> {
        self.components.get_mut(id).ok_or(SceneError::UnknownComponent)?.active = active;
        Ok(())
    }

    /// First component of type `T` on `object`
    pub fn find_component<T: Component>(&self, object: ObjectId) -> Option<ComponentId> {
        self.objects
            .get(object)?
            .components
            .iter()
            .copied()
            .find(|&id| self.component(id).is_some_and(<dyn Component>::is::<T>))
    }

    /// Every component of type `T`, in traversal order
    pub fn components_of_type<T: Component>(&self) -> Vec<ComponentId> {
        self.component_ids()
            .into_iter()
            .filter(|&id| self.component(id).is_some_and(<dyn Component>::is::<T>))
            .collect()
    }

    // ---- structure ----

    pub(crate) fn attach_object(&mut self, name: String, active: bool) -> ObjectId {
        let id = self.objects.insert(ObjectEntry {
            name,
            active,
            components: Vec::new(),
        });
        self.order.push(id);
        id
    }

    pub(crate) fn attach_component(
        &mut self,
        owner: ObjectId,
        component: Box<dyn Component>,
    ) -> Result<ComponentId, SceneError> {
        if !self.objects.contains_key(owner) {
            return Err(SceneError::UnknownObject);
        }
        self.registry.schema(component.type_name())?;
        let id = self.components.insert(ComponentSlot {
            owner,
            active: true,
            component,
        });
        if let Some(entry) = self.objects.get_mut(owner) {
            entry.components.push(id);
        }
        Ok(id)
    }

    fn detach_component(&mut self, id: ComponentId) -> Option<Box<dyn Component>> {
        let slot = self.components.remove(id)?;
        if let Some(entry) = self.objects.get_mut(slot.owner) {
            entry.components.retain(|&c| c != id);
        }
        Some(slot.component)
    }

    /// Attach `object`, linking (and starting) its components to match the scene state
    pub fn add_object(&mut self, store: &mut ResourceStore, object: SimObject) -> Result<ObjectId, SceneError> {
        let (name, active, components) = object.into_parts();
        log::debug!("Adding object '{}' with {} components", name, components.len());
        let id = self.attach_object(name, active);
        for component in components {
            self.add_component(store, id, component)?;
        }
        Ok(id)
    }

    /// Detach object `id`, stopping and unlinking its components first
    ///
    /// Every reference to its components elsewhere in the scene is nulled.
    /// Component references held by the returned components are cleared too.
    pub fn remove_object(&mut self, store: &mut ResourceStore, id: ObjectId) -> Result<SimObject, SceneError> {
        let ids = self
            .objects
            .get(id)
            .ok_or(SceneError::UnknownObject)?
            .components
            .clone();

        self.release_components(store, &ids)?;

        let mut components = Vec::with_capacity(ids.len());
        for &component in &ids {
            if let Some(detached) = self.detach_component(component) {
                components.push(detached);
            }
        }
        self.order.retain(|&o| o != id);
        let entry = self.objects.remove(id).ok_or(SceneError::UnknownObject)?;

        for &component in &ids {
            self.on_component_removed(component)?;
        }

        let mut object = SimObject::new(entry.name);
        object.active = entry.active;
        for mut component in components {
            clear_component_refs(&self.registry, component.as_mut(), |_| true)?;
            object.push_component(component);
        }
        log::debug!("Removed object '{}'", object.name);
        Ok(object)
    }

    /// Attach `component` to `object`, linking (and starting) it to match the scene state
    pub fn add_component(
        &mut self,
        store: &mut ResourceStore,
        object: ObjectId,
        component: Box<dyn Component>,
    ) -> Result<ComponentId, SceneError> {
        let id = self.attach_component(object, component)?;
        if self.state != SceneState::Unlinked {
            if let Err(e) = self.link_component(store, id) {
                self.detach_component(id);
                return Err(e);
            }
        }
        if self.state == SceneState::Playing {
            self.run_hooks(&[id], 0.0, |c, ctx| c.start(ctx));
        }
        Ok(id)
    }

    /// Detach component `id`, stopping and unlinking it first
    ///
    /// Every reference to it elsewhere in the scene is nulled, as are the
    /// component references it holds itself.
    pub fn remove_component(
        &mut self,
        store: &mut ResourceStore,
        id: ComponentId,
    ) -> Result<Box<dyn Component>, SceneError> {
        if !self.components.contains_key(id) {
            return Err(SceneError::UnknownComponent);
        }
        self.release_components(store, &[id])?;
        let mut component = self.detach_component(id).ok_or(SceneError::UnknownComponent)?;
        self.on_component_removed(id)?;
        clear_component_refs(&self.registry, component.as_mut(), |_| true)?;
        Ok(component)
    }

    fn release_components(&mut self, store: &mut ResourceStore, ids: &[ComponentId]) -> Result<(), SceneError> {
        if self.state == SceneState::Playing {
            self.run_hooks(ids, 0.0, |c, ctx| c.stop(ctx));
        }
        if self.state != SceneState::Unlinked {
            for &id in ids {
                self.unlink_component(store, id)?;
            }
        }
        Ok(())
    }

    /// Null every component-reference field (and array element) naming `removed`
    pub(crate) fn on_component_removed(&mut self, removed: ComponentId) -> Result<(), SceneError> {
        let registry = &self.registry;
        for slot in self.components.values_mut() {
            clear_component_refs(registry, slot.component.as_mut(), |target| target == removed)?;
        }
        Ok(())
    }

    // ---- linking ----

    fn link_component(&mut self, store: &mut ResourceStore, id: ComponentId) -> Result<(), SceneError> {
        let slot = self.components.get_mut(id).ok_or(SceneError::UnknownComponent)?;
        let result = visit_fields(&self.registry, slot.component.as_mut(), FieldKind::holds_resources, |value| {
            let FieldValue::Resource(pointer) = value else {
                return Ok(false);
            };
            if let Some(key) = pointer.key() {
                if !store.exists(&key.id, &key.type_id) {
                    log::warn!("Resource {} no longer exists, clearing pointer", key);
                    *pointer = ResourcePointer::null();
                    return Ok(true);
                }
            }
            pointer.link(store)?;
            Ok(true)
        });
        if result.is_err() {
            // release whatever was linked before the failure
            if let Err(e) = self.unlink_component(store, id) {
                log::warn!("Failed to roll back partial link: {}", e);
            }
        }
        result
    }

    fn unlink_component(&mut self, store: &mut ResourceStore, id: ComponentId) -> Result<(), SceneError> {
        let slot = self.components.get_mut(id).ok_or(SceneError::UnknownComponent)?;
        visit_fields(&self.registry, slot.component.as_mut(), FieldKind::holds_resources, |value| {
            let FieldValue::Resource(pointer) = value else {
                return Ok(false);
            };
            if !pointer.is_linked() {
                return Ok(false);
            }
            pointer.unlink(store)?;
            Ok(true)
        })
    }

    fn require(&self, operation: &'static str, state: SceneState) -> Result<(), SceneError> {
        if self.state == state {
            Ok(())
        } else {
            Err(SceneError::InvalidStateTransition {
                operation,
                state: self.state,
            })
        }
    }

    /// Acquire store references for every resource pointer in the scene
    ///
    /// Pointers naming resources that no longer exist are reset to null.
    pub fn link(&mut self, store: &mut ResourceStore) -> Result<(), SceneError> {
        self.require("link", SceneState::Unlinked)?;
        let ids = self.component_ids();
        for (done, &id) in ids.iter().enumerate() {
            if let Err(e) = self.link_component(store, id) {
                for &linked in &ids[..done] {
                    if let Err(e) = self.unlink_component(store, linked) {
                        log::warn!("Failed to roll back partial link: {}", e);
                    }
                }
                return Err(e);
            }
        }
        self.state = SceneState::Linked;
        log::info!("Scene linked ({} objects, {} components)", self.object_count(), ids.len());
        Ok(())
    }

    /// Release every store reference held by the scene
    pub fn unlink(&mut self, store: &mut ResourceStore) -> Result<(), SceneError> {
        self.require("unlink", SceneState::Linked)?;
        for id in self.component_ids() {
            self.unlink_component(store, id)?;
        }
        self.state = SceneState::Unlinked;
        log::info!("Scene unlinked");
        Ok(())
    }

    // ---- simulation ----

    fn run_hooks(&mut self, ids: &[ComponentId], delta_time: f32, hook: Hook) {
        let Self {
            components,
            rng,
            elapsed,
            step_count,
            ..
        } = self;
        for &id in ids {
            if let Some(slot) = components.get_mut(id) {
                let mut ctx = StepContext {
                    delta_time,
                    elapsed: *elapsed,
                    step_count: *step_count,
                    rng: &mut *rng,
                };
                hook(slot.component.as_mut(), &mut ctx);
            }
        }
    }

    /// Reset the clock, seed the random source and start every component
    pub fn start(&mut self) -> Result<(), SceneError> {
        self.require("start", SceneState::Linked)?;
        self.elapsed = 0.0;
        self.step_count = 0;
        self.rng = StdRng::seed_from_u64(self.seed);
        let ids = self.component_ids();
        self.run_hooks(&ids, 0.0, |c, ctx| c.start(ctx));
        self.state = SceneState::Playing;
        log::info!("Scene started (seed {})", self.seed);
        Ok(())
    }

    /// Stop every component
    pub fn stop(&mut self) -> Result<(), SceneError> {
        self.require("stop", SceneState::Playing)?;
        let ids = self.component_ids();
        self.run_hooks(&ids, 0.0, |c, ctx| c.stop(ctx));
        self.state = SceneState::Linked;
        log::info!("Scene stopped after {} steps", self.step_count);
        Ok(())
    }

    /// Step every active component of every active object once, in order
    pub fn step(&mut self, delta_time: f32) -> Result<(), SceneError> {
        self.require("step", SceneState::Playing)?;
        let ids: Vec<ComponentId> = self
            .objects()
            .filter(|o| o.active)
            .flat_map(|o| o.components.iter().copied())
            .filter(|&id| self.components.get(id).is_some_and(|slot| slot.active))
            .collect();
        self.run_hooks(&ids, delta_time, |c, ctx| c.step(ctx));
        self.elapsed += delta_time;
        self.step_count += 1;
        log::trace!("Step {} (t = {:.3})", self.step_count, self.elapsed);
        Ok(())
    }

    // ---- fields ----

    fn slot(&self, id: ComponentId) -> Result<&ComponentSlot, SceneError> {
        self.components.get(id).ok_or(SceneError::UnknownComponent)
    }

    fn slot_mut(&mut self, id: ComponentId) -> Result<&mut ComponentSlot, SceneError> {
        self.components.get_mut(id).ok_or(SceneError::UnknownComponent)
    }

    /// Value of field `name` of component `id`
    pub fn get_field(&self, id: ComponentId, name: &str) -> Result<FieldValue, SceneError> {
        Ok(self.registry.get(self.slot(id)?.component.as_ref(), name)?)
    }

    /// Element `index` of array field `name` of component `id`
    pub fn get_field_at(&self, id: ComponentId, name: &str, index: usize) -> Result<FieldValue, SceneError> {
        Ok(self.registry.get_at(self.slot(id)?.component.as_ref(), name, index)?)
    }

    /// Length of array field `name` of component `id`
    pub fn array_len(&self, id: ComponentId, name: &str) -> Result<usize, SceneError> {
        Ok(self.registry.array_len(self.slot(id)?.component.as_ref(), name)?)
    }

    /// Every referenced component exists and has the type `kind` declares
    fn check_references(&self, field: &str, kind: ElementKind, value: &FieldValue) -> Result<(), SceneError> {
        match (value, kind) {
            (FieldValue::Component(Some(target)), ElementKind::Component(expected)) => {
                let found = self.component(*target).ok_or(SceneError::UnknownComponent)?;
                if found.type_name() != expected {
                    return Err(SchemaError::TypeMismatch {
                        field: field.to_string(),
                        expected: expected.to_string(),
                    }
                    .into());
                }
                Ok(())
            }
            (FieldValue::Array(items), _) => items
                .iter()
                .try_for_each(|item| self.check_references(field, kind, item)),
            _ => Ok(()),
        }
    }

    /// Validate a managed write and return the field kind
    fn prepare_write(
        &self,
        id: ComponentId,
        name: &str,
        element: bool,
        value: &mut FieldValue,
    ) -> Result<FieldKind, SceneError> {
        let component = self.slot(id)?.component.as_ref();
        let descriptor = self.registry.field(component, name)?;
        if !descriptor.writable {
            return Err(SchemaError::NotWritable {
                component: component.type_name().to_string(),
                field: name.to_string(),
            }
            .into());
        }
        let fits = if element {
            descriptor.kind.is_array() && value.fits(descriptor.kind.element())
        } else {
            value_fits(descriptor.kind, value)
        };
        if !fits {
            return Err(SchemaError::TypeMismatch {
                field: name.to_string(),
                expected: descriptor.kind.type_name(),
            }
            .into());
        }
        self.check_references(name, descriptor.kind.element(), value)?;
        // a handle is only valid in a linked scene; drop whatever came with the value
        for_each_pointer(value, &mut |pointer| {
            pointer.detach_handle();
            Ok(())
        })?;
        Ok(descriptor.kind)
    }

    /// Set field `name` of component `id`
    ///
    /// While the scene is linked or playing, resource pointers being written
    /// are linked and the pointers they replace are released.
    pub fn set_field(
        &mut self,
        store: &mut ResourceStore,
        id: ComponentId,
        name: &str,
        mut value: FieldValue,
    ) -> Result<(), SceneError> {
        let kind = self.prepare_write(id, name, false, &mut value)?;
        if !(kind.holds_resources() && self.state != SceneState::Unlinked) {
            return self.set_field_unmanaged(id, name, value);
        }

        let mut old = self.get_field(id, name)?;
        link_value(store, &mut value)?;
        let registry = Arc::clone(&self.registry);
        registry.set(self.slot_mut(id)?.component.as_mut(), name, value)?;
        unlink_value(store, &mut old)?;
        Ok(())
    }

    /// Set element `index` of array field `name` of component `id`
    ///
    /// Resource bookkeeping as in [`set_field`](Self::set_field).
    pub fn set_field_at(
        &mut self,
        store: &mut ResourceStore,
        id: ComponentId,
        name: &str,
        index: usize,
        mut value: FieldValue,
    ) -> Result<(), SceneError> {
        let kind = self.prepare_write(id, name, true, &mut value)?;
        if !(kind.holds_resources() && self.state != SceneState::Unlinked) {
            return self.set_field_at_unmanaged(id, name, index, value);
        }

        let mut old = self.get_field_at(id, name, index)?;
        link_value(store, &mut value)?;
        let registry = Arc::clone(&self.registry);
        registry.set_at(self.slot_mut(id)?.component.as_mut(), name, index, value)?;
        unlink_value(store, &mut old)?;
        Ok(())
    }

    /// Insert `count` unset elements at `index` of array field `name`
    pub fn insert_field_range(
        &mut self,
        id: ComponentId,
        name: &str,
        index: usize,
        count: usize,
    ) -> Result<(), SceneError> {
        let registry = Arc::clone(&self.registry);
        Ok(registry.insert_range(self.slot_mut(id)?.component.as_mut(), name, index, count)?)
    }

    /// Remove `count` elements at `index` of array field `name`
    ///
    /// Removed resource pointers are released while the scene is linked or playing.
    pub fn remove_field_range(
        &mut self,
        store: &mut ResourceStore,
        id: ComponentId,
        name: &str,
        index: usize,
        count: usize,
    ) -> Result<(), SceneError> {
        let registry = Arc::clone(&self.registry);
        let component = self.slot(id)?.component.as_ref();
        let kind = registry.field(component, name)?.kind;
        let len = registry.array_len(component, name)?;
        if index > len || count > len - index {
            return Err(SchemaError::IndexOutOfRange {
                field: name.to_string(),
                index,
                count,
                len,
            }
            .into());
        }

        if kind.holds_resources() && self.state != SceneState::Unlinked {
            for i in index..index + count {
                let mut removed = registry.get_at(component, name, i)?;
                unlink_value(store, &mut removed)?;
            }
        }
        Ok(registry.remove_range(self.slot_mut(id)?.component.as_mut(), name, index, count)?)
    }

    /// Raw write with no resource bookkeeping
    pub(crate) fn set_field_unmanaged(&mut self, id: ComponentId, name: &str, value: FieldValue) -> Result<(), SceneError> {
        let registry = Arc::clone(&self.registry);
        Ok(registry.set(self.slot_mut(id)?.component.as_mut(), name, value)?)
    }

    /// Raw element write with no resource bookkeeping
    pub(crate) fn set_field_at_unmanaged(
        &mut self,
        id: ComponentId,
        name: &str,
        index: usize,
        value: FieldValue,
    ) -> Result<(), SceneError> {
        let registry = Arc::clone(&self.registry);
        Ok(registry.set_at(self.slot_mut(id)?.component.as_mut(), name, index, value)?)
    }
}

impl ResourceDeletedListener for Scene {
    type Error = SceneError;

    /// Null every pointer naming `key`, releasing its reference if linked
    ///
    /// Refused while playing, before anything is changed.
    fn on_resource_deleted(&mut self, store: &mut ResourceStore, key: &ResourceKey) -> Result<(), SceneError> {
        if self.state == SceneState::Playing {
            return Err(SceneError::InvalidOperationWhilePlaying(key.to_string()));
        }
        let registry = &self.registry;
        let mut cleared = 0usize;
        for slot in self.components.values_mut() {
            visit_fields(registry, slot.component.as_mut(), FieldKind::holds_resources, |value| {
                let FieldValue::Resource(pointer) = value else {
                    return Ok(false);
                };
                if !pointer.points_to(key) {
                    return Ok(false);
                }
                if pointer.is_linked() {
                    pointer.unlink(store)?;
                }
                *pointer = ResourcePointer::null();
                cleared += 1;
                Ok(true)
            })?;
        }
        log::info!("Resource {} deleted, cleared {} pointers", key, cleared);
        Ok(())
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("state", &self.state)
            .field("seed", &self.seed)
            .field("objects", &self.order.len())
            .field("components", &self.components.len())
            .field("step_count", &self.step_count)
            .finish_non_exhaustive()
    }
}
