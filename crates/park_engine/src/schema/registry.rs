//! Component registry - the field schema provider
//!
//! Maps component type names to their schema and factory, and exposes
//! generic field access by name. Setters here are raw: they never touch
//! resource references. The scene wraps them with link bookkeeping.

use super::{
    builder::{ArrayAccess, FieldAccess},
    Component, ComponentSchema, ComponentType, EnumInfo, FieldDescriptor, FieldValue,
    SchemaBuilder, SchemaError,
};
use std::collections::HashMap;

/// Registered component types and the enums their schemas mention
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    schemas: HashMap<&'static str, ComponentSchema>,
    order: Vec<&'static str>,
    enums: HashMap<&'static str, EnumInfo>,
}

impl ComponentRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and register the schema of `T`
    ///
    /// Registering a type twice replaces its schema.
    pub fn register<T: ComponentType>(&mut self) -> Result<(), SchemaError> {
        let schema = T::schema(SchemaBuilder::new()).build()?;
        for info in schema.enums() {
            self.enums.entry(info.name).or_insert_with(|| info.clone());
        }
        log::debug!(
            "Registered component type '{}' ({} fields)",
            T::TYPE_NAME,
            schema.fields().len()
        );
        if self.schemas.insert(T::TYPE_NAME, schema).is_none() {
            self.order.push(T::TYPE_NAME);
        } else {
            log::warn!("Component type '{}' registered twice", T::TYPE_NAME);
        }
        Ok(())
    }

    /// Whether `type_name` is registered
    pub fn contains(&self, type_name: &str) -> bool {
        self.schemas.contains_key(type_name)
    }

    /// Registered component type names, in registration order
    pub fn component_types(&self) -> &[&'static str] {
        &self.order
    }

    /// Schema of `type_name`
    pub fn schema(&self, type_name: &str) -> Result<&ComponentSchema, SchemaError> {
        self.schemas
            .get(type_name)
            .ok_or_else(|| SchemaError::UnknownComponentType(type_name.to_string()))
    }

    /// Construct a default instance of `type_name`
    pub fn create(&self, type_name: &str) -> Result<Box<dyn Component>, SchemaError> {
        Ok(self.schema(type_name)?.create())
    }

    /// Ordered member names and values of enum `type_name`
    pub fn enum_info(&self, type_name: &str) -> Result<&EnumInfo, SchemaError> {
        self.enums
            .get(type_name)
            .ok_or_else(|| SchemaError::UnknownType(type_name.to_string()))
    }

    /// Ordered field descriptors of `component`
    pub fn fields(&self, component: &dyn Component) -> Result<&[FieldDescriptor], SchemaError> {
        Ok(self.schema(component.type_name())?.fields())
    }

    /// Descriptor of field `name` of `component`
    pub fn field(&self, component: &dyn Component, name: &str) -> Result<&FieldDescriptor, SchemaError> {
        Ok(self.lookup(component, name)?.0)
    }

    fn lookup(&self, component: &dyn Component, name: &str) -> Result<(&FieldDescriptor, &FieldAccess), SchemaError> {
        self.schema(component.type_name())?.lookup(name)
    }

    fn array(&self, component: &dyn Component, name: &str) -> Result<&ArrayAccess, SchemaError> {
        let (descriptor, access) = self.lookup(component, name)?;
        access.array.as_ref().ok_or_else(|| SchemaError::TypeMismatch {
            field: name.to_string(),
            expected: format!("{}[]", descriptor.kind.type_name()),
        })
    }

    /// Value of field `name`
    pub fn get(&self, component: &dyn Component, name: &str) -> Result<FieldValue, SchemaError> {
        let (_, access) = self.lookup(component, name)?;
        (access.get)(component.as_any())
    }

    /// Overwrite field `name`
    pub fn set(&self, component: &mut dyn Component, name: &str, value: FieldValue) -> Result<(), SchemaError> {
        let (descriptor, access) = self.lookup(component, name)?;
        let setter = access.set.as_ref().ok_or_else(|| SchemaError::NotWritable {
            component: component.type_name().to_string(),
            field: descriptor.name.to_string(),
        })?;
        log::trace!("{}.{} = {:?}", component.type_name(), name, value);
        setter(component.as_any_mut(), value)
    }

    /// Length of array field `name`
    pub fn array_len(&self, component: &dyn Component, name: &str) -> Result<usize, SchemaError> {
        (self.array(component, name)?.len)(component.as_any())
    }

    /// Element `index` of array field `name`
    pub fn get_at(&self, component: &dyn Component, name: &str, index: usize) -> Result<FieldValue, SchemaError> {
        (self.array(component, name)?.get_at)(component.as_any(), index)
    }

    /// Overwrite element `index` of array field `name`
    pub fn set_at(
        &self,
        component: &mut dyn Component,
        name: &str,
        index: usize,
        value: FieldValue,
    ) -> Result<(), SchemaError> {
        let array = self.array(component, name)?;
        (array.set_at)(component.as_any_mut(), index, value)
    }

    /// Insert `count` unset elements at `index`, shifting the tail
    pub fn insert_range(
        &self,
        component: &mut dyn Component,
        name: &str,
        index: usize,
        count: usize,
    ) -> Result<(), SchemaError> {
        let array = self.array(component, name)?;
        (array.insert)(component.as_any_mut(), index, count)
    }

    /// Remove `count` elements at `index`, shifting the tail
    pub fn remove_range(
        &self,
        component: &mut dyn Component,
        name: &str,
        index: usize,
        count: usize,
    ) -> Result<(), SchemaError> {
        let array = self.array(component, name)?;
        (array.remove)(component.as_any_mut(), index, count)
    }
}
