//! Per-type schema tables
//!
//! A schema is built once per component type from plain accessor functions.
//! The accessors are erased into closures over `dyn Any` so the registry can
//! drive any component through one field table.

use super::{
    Component, ComponentType, ElementKind, EnumInfo, FieldDescriptor, FieldKind, FieldType,
    FieldValue, SchemaEnum, SchemaError,
};
use crate::foundation::collections::ComponentId;
use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;

type Getter = Box<dyn Fn(&dyn Any) -> Result<FieldValue, SchemaError> + Send + Sync>;
type Setter = Box<dyn Fn(&mut dyn Any, FieldValue) -> Result<(), SchemaError> + Send + Sync>;
type LenFn = Box<dyn Fn(&dyn Any) -> Result<usize, SchemaError> + Send + Sync>;
type GetAtFn = Box<dyn Fn(&dyn Any, usize) -> Result<FieldValue, SchemaError> + Send + Sync>;
type SetAtFn = Box<dyn Fn(&mut dyn Any, usize, FieldValue) -> Result<(), SchemaError> + Send + Sync>;
type RangeFn = Box<dyn Fn(&mut dyn Any, usize, usize) -> Result<(), SchemaError> + Send + Sync>;

pub(crate) struct ArrayAccess {
    pub(crate) len: LenFn,
    pub(crate) get_at: GetAtFn,
    pub(crate) set_at: SetAtFn,
    pub(crate) insert: RangeFn,
    pub(crate) remove: RangeFn,
}

pub(crate) struct FieldAccess {
    pub(crate) get: Getter,
    pub(crate) set: Option<Setter>,
    pub(crate) array: Option<ArrayAccess>,
}

/// Erased schema of one registered component type
pub struct ComponentSchema {
    type_name: &'static str,
    descriptors: Vec<FieldDescriptor>,
    access: Vec<FieldAccess>,
    index: HashMap<&'static str, usize>,
    enums: Vec<EnumInfo>,
    factory: fn() -> Box<dyn Component>,
}

impl ComponentSchema {
    /// Component type name
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Ordered field descriptors
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    /// Descriptor of the field called `name`
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|&i| &self.descriptors[i])
    }

    pub(crate) fn enums(&self) -> &[EnumInfo] {
        &self.enums
    }

    pub(crate) fn lookup(&self, name: &str) -> Result<(&FieldDescriptor, &FieldAccess), SchemaError> {
        self.index
            .get(name)
            .map(|&i| (&self.descriptors[i], &self.access[i]))
            .ok_or_else(|| SchemaError::UnknownField {
                component: self.type_name.to_string(),
                field: name.to_string(),
            })
    }

    /// A default instance
    pub fn create(&self) -> Box<dyn Component> {
        (self.factory)()
    }
}

impl std::fmt::Debug for ComponentSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentSchema")
            .field("type_name", &self.type_name)
            .field("fields", &self.descriptors)
            .finish_non_exhaustive()
    }
}

fn downcast<'a, T: 'static>(value: &'a dyn Any, field: &'static str) -> Result<&'a T, SchemaError> {
    value.downcast_ref::<T>().ok_or_else(|| SchemaError::TypeMismatch {
        field: field.to_string(),
        expected: std::any::type_name::<T>().to_string(),
    })
}

fn downcast_mut<'a, T: 'static>(value: &'a mut dyn Any, field: &'static str) -> Result<&'a mut T, SchemaError> {
    value.downcast_mut::<T>().ok_or_else(|| SchemaError::TypeMismatch {
        field: field.to_string(),
        expected: std::any::type_name::<T>().to_string(),
    })
}

fn mismatch(field: &'static str, kind: ElementKind) -> SchemaError {
    SchemaError::TypeMismatch {
        field: field.to_string(),
        expected: kind.type_name().to_string(),
    }
}

/// Convert `value` for a field of `kind`, telling a wrong kind from a bad value
fn convert<V>(
    field: &'static str,
    kind: ElementKind,
    from: fn(FieldValue) -> Option<V>,
    value: FieldValue,
) -> Result<V, SchemaError> {
    if !value.fits(kind) {
        return Err(mismatch(field, kind));
    }
    from(value).ok_or_else(|| SchemaError::InvalidValue {
        field: field.to_string(),
        reason: format!("not a member of {}", kind.type_name()),
    })
}

fn check_range(field: &'static str, index: usize, count: usize, len: usize) -> Result<(), SchemaError> {
    if index > len || count > len - index {
        return Err(SchemaError::IndexOutOfRange {
            field: field.to_string(),
            index,
            count,
            len,
        });
    }
    Ok(())
}

fn create_default<T: ComponentType>() -> Box<dyn Component> {
    Box::new(T::default())
}

/// How array elements of type `E` convert to and from [`FieldValue`]
struct ElementCodec<E> {
    kind: ElementKind,
    to: fn(&E) -> FieldValue,
    from: fn(FieldValue) -> Option<E>,
    unset: fn() -> E,
}

/// Builds the field table of component type `T`
///
/// ```ignore
/// fn schema(builder: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
///     builder
///         .field("capacity", |c| c.capacity, |c, v| c.capacity = v)
///         .read_only("occupation", |c| c.occupation)
///         .array("ratings", |c| &c.ratings, |c| &mut c.ratings)
/// }
/// ```
pub struct SchemaBuilder<T> {
    descriptors: Vec<FieldDescriptor>,
    access: Vec<FieldAccess>,
    enums: Vec<EnumInfo>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ComponentType> SchemaBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            descriptors: Vec::new(),
            access: Vec::new(),
            enums: Vec::new(),
            _marker: PhantomData,
        }
    }

    fn push(mut self, name: &'static str, kind: FieldKind, access: FieldAccess) -> Self {
        self.descriptors.push(FieldDescriptor {
            name,
            kind,
            writable: access.set.is_some(),
        });
        self.access.push(access);
        self
    }

    fn note_enum<E: SchemaEnum>(mut self) -> Self {
        if !self.enums.iter().any(|e| e.name == E::NAME) {
            self.enums.push(EnumInfo::of::<E>());
        }
        self
    }

    fn single<V: 'static>(
        self,
        name: &'static str,
        kind: ElementKind,
        get: fn(&T) -> V,
        set: Option<fn(&mut T, V)>,
        to: fn(V) -> FieldValue,
        from: fn(FieldValue) -> Option<V>,
    ) -> Self {
        let getter: Getter = Box::new(move |any: &dyn Any| Ok(to(get(downcast::<T>(any, name)?))));
        let setter = set.map(|set| -> Setter {
            Box::new(move |any: &mut dyn Any, value: FieldValue| {
                let value = convert(name, kind, from, value)?;
                set(downcast_mut::<T>(any, name)?, value);
                Ok(())
            })
        });
        self.push(
            name,
            kind.into(),
            FieldAccess {
                get: getter,
                set: setter,
                array: None,
            },
        )
    }

    fn vec<E: Clone + 'static>(
        self,
        name: &'static str,
        codec: ElementCodec<E>,
        get: fn(&T) -> &Vec<E>,
        get_mut: fn(&mut T) -> &mut Vec<E>,
    ) -> Self {
        let ElementCodec { kind, to, from, unset } = codec;

        let decode_all = move |value: FieldValue| -> Result<Vec<E>, SchemaError> {
            let FieldValue::Array(elements) = value else {
                return Err(SchemaError::TypeMismatch {
                    field: name.to_string(),
                    expected: FieldKind::Array(kind).type_name(),
                });
            };
            elements
                .into_iter()
                .map(|e| convert(name, kind, from, e))
                .collect()
        };

        let access = FieldAccess {
            get: Box::new(move |any: &dyn Any| {
                let items = get(downcast::<T>(any, name)?);
                Ok(FieldValue::Array(items.iter().map(to).collect()))
            }),
            set: Some(Box::new(move |any: &mut dyn Any, value: FieldValue| {
                let items = decode_all(value)?;
                *get_mut(downcast_mut::<T>(any, name)?) = items;
                Ok(())
            })),
            array: Some(ArrayAccess {
                len: Box::new(move |any: &dyn Any| Ok(get(downcast::<T>(any, name)?).len())),
                get_at: Box::new(move |any: &dyn Any, index: usize| {
                    let items = get(downcast::<T>(any, name)?);
                    items.get(index).map(to).ok_or_else(|| SchemaError::IndexOutOfRange {
                        field: name.to_string(),
                        index,
                        count: 1,
                        len: items.len(),
                    })
                }),
                set_at: Box::new(move |any: &mut dyn Any, index: usize, value: FieldValue| {
                    let value = convert(name, kind, from, value)?;
                    let items = get_mut(downcast_mut::<T>(any, name)?);
                    let len = items.len();
                    let slot = items.get_mut(index).ok_or_else(|| SchemaError::IndexOutOfRange {
                        field: name.to_string(),
                        index,
                        count: 1,
                        len,
                    })?;
                    *slot = value;
                    Ok(())
                }),
                insert: Box::new(move |any: &mut dyn Any, index: usize, count: usize| {
                    let items = get_mut(downcast_mut::<T>(any, name)?);
                    if index > items.len() {
                        return Err(SchemaError::IndexOutOfRange {
                            field: name.to_string(),
                            index,
                            count,
                            len: items.len(),
                        });
                    }
                    let tail = items.split_off(index);
                    items.extend(std::iter::repeat_with(unset).take(count));
                    items.extend(tail);
                    Ok(())
                }),
                remove: Box::new(move |any: &mut dyn Any, index: usize, count: usize| {
                    let items = get_mut(downcast_mut::<T>(any, name)?);
                    check_range(name, index, count, items.len())?;
                    items.drain(index..index + count);
                    Ok(())
                }),
            }),
        };
        self.push(name, FieldKind::Array(kind), access)
    }

    /// Writable scalar or resource-pointer field
    pub fn field<V: FieldType>(self, name: &'static str, get: fn(&T) -> V, set: fn(&mut T, V)) -> Self {
        self.single(name, V::KIND, get, Some(set), V::into_value, V::from_value)
    }

    /// Read-only scalar or resource-pointer field
    pub fn read_only<V: FieldType>(self, name: &'static str, get: fn(&T) -> V) -> Self {
        self.single(name, V::KIND, get, None, V::into_value, V::from_value)
    }

    /// Writable enum field
    pub fn enumeration<E: SchemaEnum>(self, name: &'static str, get: fn(&T) -> E, set: fn(&mut T, E)) -> Self {
        self.note_enum::<E>().single(
            name,
            ElementKind::Enum(E::NAME),
            get,
            Some(set),
            |e: E| FieldValue::Enum(e.to_value()),
            |v| match v {
                FieldValue::Enum(i) => E::from_value(i),
                _ => None,
            },
        )
    }

    /// Writable reference to a component of type `target`
    pub fn component_ref(
        self,
        name: &'static str,
        target: &'static str,
        get: fn(&T) -> Option<ComponentId>,
        set: fn(&mut T, Option<ComponentId>),
    ) -> Self {
        self.single(
            name,
            ElementKind::Component(target),
            get,
            Some(set),
            FieldValue::Component,
            |v| v.as_component(),
        )
    }

    /// Array of scalars or resource pointers
    pub fn array<V: FieldType>(
        self,
        name: &'static str,
        get: fn(&T) -> &Vec<V>,
        get_mut: fn(&mut T) -> &mut Vec<V>,
    ) -> Self {
        let codec = ElementCodec {
            kind: V::KIND,
            to: |v: &V| v.clone().into_value(),
            from: V::from_value,
            unset: V::unset,
        };
        self.vec(name, codec, get, get_mut)
    }

    /// Array of enum members
    pub fn enum_array<E: SchemaEnum>(
        self,
        name: &'static str,
        get: fn(&T) -> &Vec<E>,
        get_mut: fn(&mut T) -> &mut Vec<E>,
    ) -> Self {
        let codec = ElementCodec {
            kind: ElementKind::Enum(E::NAME),
            to: |e: &E| FieldValue::Enum(e.to_value()),
            from: |v| match v {
                FieldValue::Enum(i) => E::from_value(i),
                _ => None,
            },
            unset: E::default,
        };
        self.note_enum::<E>().vec(name, codec, get, get_mut)
    }

    /// Array of references to components of type `target`
    pub fn component_ref_array(
        self,
        name: &'static str,
        target: &'static str,
        get: fn(&T) -> &Vec<Option<ComponentId>>,
        get_mut: fn(&mut T) -> &mut Vec<Option<ComponentId>>,
    ) -> Self {
        let codec = ElementCodec {
            kind: ElementKind::Component(target),
            to: |c: &Option<ComponentId>| FieldValue::Component(*c),
            from: |v| v.as_component(),
            unset: || None,
        };
        self.vec(name, codec, get, get_mut)
    }

    pub(crate) fn build(self) -> Result<ComponentSchema, SchemaError> {
        let mut index = HashMap::with_capacity(self.descriptors.len());
        for (i, descriptor) in self.descriptors.iter().enumerate() {
            if index.insert(descriptor.name, i).is_some() {
                return Err(SchemaError::DuplicateField {
                    component: T::TYPE_NAME.to_string(),
                    field: descriptor.name.to_string(),
                });
            }
        }
        Ok(ComponentSchema {
            type_name: T::TYPE_NAME,
            descriptors: self.descriptors,
            access: self.access,
            index,
            enums: self.enums,
            factory: create_default::<T>,
        })
    }
}
