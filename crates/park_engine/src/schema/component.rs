//! Component traits

use super::SchemaBuilder;
use crate::scene::StepContext;
use std::any::Any;
use std::fmt::Debug;

/// Upcast to [`Any`] for typed downcasts through `dyn Component`
pub trait AsAny: Any {
    /// `&self` as `&dyn Any`
    fn as_any(&self) -> &dyn Any;
    /// `&mut self` as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A unit of data and behaviour attached to one simulated object
///
/// Field data is reached through the schema registered for the type
/// (see [`ComponentType`]). The lifecycle hooks are called by the owning
/// scene: `start` when play begins (or when added to a playing scene),
/// `step` once per simulation step, `stop` when play ends (or on removal).
pub trait Component: AsAny + Send + Sync + Debug + 'static {
    /// Registered type name
    fn type_name(&self) -> &'static str;

    /// Called when the scene starts playing
    fn start(&mut self, _ctx: &mut StepContext<'_>) {}

    /// Called once per simulation step
    fn step(&mut self, _ctx: &mut StepContext<'_>) {}

    /// Called when the scene stops playing
    fn stop(&mut self, _ctx: &mut StepContext<'_>) {}
}

impl dyn Component {
    /// Whether this is a `T`
    pub fn is<T: Component>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Typed access
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Typed mutable access
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// A component type that can be registered with the
/// [`ComponentRegistry`](super::ComponentRegistry)
pub trait ComponentType: Component + Default + Sized {
    /// Type name, unique across the registry and used in scene files
    const TYPE_NAME: &'static str;

    /// Declare the ordered field table
    fn schema(builder: SchemaBuilder<Self>) -> SchemaBuilder<Self>;
}
