//! Simulated objects outside and inside a scene

use crate::foundation::collections::{ComponentId, ObjectId};
use crate::schema::Component;

/// An object that is not attached to any scene
///
/// Built up front and handed to [`Scene::add_object`](super::Scene::add_object),
/// or returned by [`Scene::remove_object`](super::Scene::remove_object).
#[derive(Debug)]
pub struct SimObject {
    /// Display name
    pub name: String,
    /// Whether the object's components are stepped
    pub active: bool,
    components: Vec<Box<dyn Component>>,
}

impl Default for SimObject {
    fn default() -> Self {
        Self::new("New simulated object")
    }
}

impl SimObject {
    /// Active object with no components
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            components: Vec::new(),
        }
    }

    /// Builder-style [`push_component`](Self::push_component)
    #[must_use]
    pub fn with_component(mut self, component: impl Component) -> Self {
        self.components.push(Box::new(component));
        self
    }

    /// Append a component
    pub fn push_component(&mut self, component: Box<dyn Component>) {
        self.components.push(component);
    }

    /// Owned components, in order
    pub fn components(&self) -> &[Box<dyn Component>] {
        &self.components
    }

    /// First component of type `T`
    pub fn find_component<T: Component>(&self) -> Option<&T> {
        self.components.iter().find_map(|c| c.downcast_ref::<T>())
    }

    pub(crate) fn into_parts(self) -> (String, bool, Vec<Box<dyn Component>>) {
        (self.name, self.active, self.components)
    }
}

/// Borrowed view of an object inside a scene
#[derive(Debug, Clone, Copy)]
pub struct ObjectRef<'a> {
    /// Object handle
    pub id: ObjectId,
    /// Display name
    pub name: &'a str,
    /// Whether the object's components are stepped
    pub active: bool,
    /// Owned component handles, in order
    pub components: &'a [ComponentId],
}
