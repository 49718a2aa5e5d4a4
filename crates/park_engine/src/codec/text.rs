//! Line-oriented scene format
//!
//! ```text
//! Seed:<u64>
//! ObjectsCount:<n>
//!     Name:<object name>
//!     Active:True|False
//!     ComponentsCount:<n>
//!         ___Id:<transient id>
//!         ___TypeName:<component type>
//!         ___Active:True|False
//!         FieldsCount:<n>
//!             Name:<field>
//!             Type:<declared type>
//!             Value:<encoded value>
//! ```

use super::value::{decode_field, encode, encode_bool, escape, unescape};
use super::CodecError;
use crate::foundation::collections::{ComponentId, ObjectId};
use crate::scene::Scene;
use crate::schema::{ComponentRegistry, FieldValue, SchemaError};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

const TAB: &str = "    ";

/// Encode `scene` as text
///
/// Components get transient ids in traversal order, valid only within the
/// returned text.
pub fn serialize(scene: &Scene) -> String {
    let ids: HashMap<ComponentId, usize> = scene
        .component_ids()
        .into_iter()
        .enumerate()
        .map(|(transient, id)| (id, transient))
        .collect();
    let registry = scene.registry();

    let mut out = String::new();
    // writing to a String cannot fail
    let _ = writeln!(out, "Seed:{}", scene.seed());
    let _ = writeln!(out, "ObjectsCount:{}", scene.object_count());

    for object in scene.objects() {
        let _ = writeln!(out, "{TAB}Name:{}", escape(object.name));
        let _ = writeln!(out, "{TAB}Active:{}", encode_bool(object.active));
        let _ = writeln!(out, "{TAB}ComponentsCount:{}", object.components.len());

        for id in object.components {
            let Some(component) = scene.component(*id) else {
                continue;
            };
            let transient = ids.get(id).copied().unwrap_or_default();
            let _ = writeln!(out, "{TAB}{TAB}___Id:{transient}");
            let _ = writeln!(out, "{TAB}{TAB}___TypeName:{}", component.type_name());
            let active = scene.is_component_active(*id).unwrap_or(true);
            let _ = writeln!(out, "{TAB}{TAB}___Active:{}", encode_bool(active));

            let fields: Vec<(&'static str, String, String)> = registry
                .fields(component)
                .map(|fields| {
                    fields
                        .iter()
                        .filter_map(|field| {
                            let value = registry.get(component, field.name).ok()?;
                            Some((field.name, field.kind.type_name(), encode(&value, &ids)))
                        })
                        .collect()
                })
                .unwrap_or_default();

            let _ = writeln!(out, "{TAB}{TAB}FieldsCount:{}", fields.len());
            for (name, type_name, value) in fields {
                let _ = writeln!(out, "{TAB}{TAB}{TAB}Name:{name}");
                let _ = writeln!(out, "{TAB}{TAB}{TAB}Type:{type_name}");
                let _ = writeln!(out, "{TAB}{TAB}{TAB}Value:{value}");
            }
        }
    }
    out
}

struct LineReader<'a> {
    lines: std::iter::Peekable<std::str::Lines<'a>>,
    line: usize,
}

impl<'a> LineReader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().peekable(),
            line: 0,
        }
    }

    fn corrupt(&self, reason: impl Into<String>) -> CodecError {
        CodecError::CorruptSceneData {
            line: self.line,
            reason: reason.into(),
        }
    }

    /// Next `key:value` line, returning the value
    fn entry(&mut self, key: &str) -> Result<&'a str, CodecError> {
        let raw = self.lines.next();
        self.line += 1;
        let raw = raw.ok_or_else(|| self.corrupt(format!("unexpected end of data, expected '{key}'")))?;
        let (found, value) = raw
            .trim_start()
            .split_once(':')
            .ok_or_else(|| self.corrupt(format!("expected '{key}:<value>'")))?;
        if found != key {
            return Err(self.corrupt(format!("expected '{key}', found '{found}'")));
        }
        Ok(value)
    }

    /// Like [`entry`](Self::entry), but absent keys are skipped over
    fn optional_entry(&mut self, key: &str) -> Result<Option<&'a str>, CodecError> {
        let present = self
            .lines
            .peek()
            .and_then(|raw| raw.trim_start().split_once(':'))
            .is_some_and(|(found, _)| found == key);
        if present {
            self.entry(key).map(Some)
        } else {
            Ok(None)
        }
    }

    fn boolean(&self, value: &str) -> Result<bool, CodecError> {
        match value.trim() {
            t if t.eq_ignore_ascii_case("true") => Ok(true),
            t if t.eq_ignore_ascii_case("false") => Ok(false),
            other => Err(self.corrupt(format!("'{other}' is not a valid boolean"))),
        }
    }

    fn count(&mut self, key: &str) -> Result<usize, CodecError> {
        let value = self.entry(key)?;
        value
            .trim()
            .parse()
            .map_err(|_| self.corrupt(format!("'{value}' is not a valid count")))
    }

    fn skip(&mut self, lines: usize) -> Result<(), CodecError> {
        for _ in 0..lines {
            self.lines.next().ok_or_else(|| self.corrupt("unexpected end of data"))?;
            self.line += 1;
        }
        Ok(())
    }
}

/// A component reference to write once every component exists
struct DeferredAssignment {
    target: ComponentId,
    field: String,
    index: Option<usize>,
    referenced: usize,
    expected_type: &'static str,
}

/// Decode a scene from text
///
/// Unknown component types and unknown or retyped fields are skipped.
/// Component references are resolved after every component exists, so they
/// may point forwards in the text. The result is unlinked.
pub fn deserialize(text: &str, registry: Arc<ComponentRegistry>) -> Result<Scene, CodecError> {
    let mut reader = LineReader::new(text);
    let mut scene = Scene::new(Arc::clone(&registry));

    let seed = reader.entry("Seed")?;
    scene.set_seed(
        seed.trim()
            .parse()
            .map_err(|_| reader.corrupt(format!("'{seed}' is not a valid seed")))?,
    );

    let mut by_transient: HashMap<usize, ComponentId> = HashMap::new();
    let mut deferred: Vec<DeferredAssignment> = Vec::new();

    let object_count = reader.count("ObjectsCount")?;
    for _ in 0..object_count {
        let name = unescape(reader.entry("Name")?);
        let active = reader.entry("Active")?;
        let active = reader.boolean(active)?;
        let object = scene.attach_object(name, active);

        let component_count = reader.count("ComponentsCount")?;
        for _ in 0..component_count {
            read_component(&mut reader, &registry, &mut scene, object, &mut by_transient, &mut deferred)?;
        }
    }

    for assignment in deferred {
        let Some(&resolved) = by_transient.get(&assignment.referenced) else {
            log::warn!(
                "Component id {} referenced by field '{}' was not loaded, leaving it null",
                assignment.referenced,
                assignment.field
            );
            continue;
        };
        let found = scene.component(resolved).map(|c| c.type_name());
        if found != Some(assignment.expected_type) {
            log::warn!(
                "Component id {} referenced by field '{}' is a {}, not a {}, leaving it null",
                assignment.referenced,
                assignment.field,
                found.unwrap_or("missing component"),
                assignment.expected_type
            );
            continue;
        }
        let value = FieldValue::Component(Some(resolved));
        match assignment.index {
            None => scene.set_field_unmanaged(assignment.target, &assignment.field, value)?,
            Some(index) => scene.set_field_at_unmanaged(assignment.target, &assignment.field, index, value)?,
        }
    }

    log::debug!(
        "Decoded scene with {} objects and {} components",
        scene.object_count(),
        scene.component_count()
    );
    Ok(scene)
}

fn read_component(
    reader: &mut LineReader<'_>,
    registry: &ComponentRegistry,
    scene: &mut Scene,
    object: ObjectId,
    by_transient: &mut HashMap<usize, ComponentId>,
    deferred: &mut Vec<DeferredAssignment>,
) -> Result<(), CodecError> {
    let transient = reader.count("___Id")?;
    let type_name = reader.entry("___TypeName")?;
    // scenes written before the flag existed omit it
    let active = match reader.optional_entry("___Active")? {
        Some(value) => reader.boolean(value)?,
        None => true,
    };
    let field_count = reader.count("FieldsCount")?;

    let Ok(schema) = registry.schema(type_name) else {
        log::warn!("Skipping component of unknown type '{}'", type_name);
        let lines = field_count
            .checked_mul(3)
            .ok_or_else(|| reader.corrupt(format!("{field_count} fields is not a valid count")))?;
        return reader.skip(lines);
    };
    let mut component = schema.create();
    let mut pending = Vec::new();

    for _ in 0..field_count {
        let name = reader.entry("Name")?;
        let declared = reader.entry("Type")?;
        let encoded = reader.entry("Value")?;

        let Some(field) = schema.field(name) else {
            log::warn!("Skipping unknown field '{}.{}'", type_name, name);
            continue;
        };
        if field.kind.type_name() != declared {
            log::warn!(
                "Skipping field '{}.{}': saved as {}, now {}",
                type_name,
                name,
                declared,
                field.kind
            );
            continue;
        }
        if !field.writable {
            continue;
        }

        let (value, references) = decode_field(encoded, field.kind).map_err(|reason| reader.corrupt(reason))?;
        registry
            .set(component.as_mut(), field.name, value)
            .map_err(|e| match e {
                SchemaError::InvalidValue { .. } | SchemaError::TypeMismatch { .. } => reader.corrupt(e.to_string()),
                other => other.into(),
            })?;
        let expected_type = field.kind.element().type_name();
        pending.extend(
            references
                .into_iter()
                .map(|(index, referenced)| (field.name, index, referenced, expected_type)),
        );
    }

    let id = scene.attach_component(object, component)?;
    scene.set_component_active(id, active)?;
    if by_transient.insert(transient, id).is_some() {
        return Err(reader.corrupt(format!("duplicate component id {transient}")));
    }
    deferred.extend(
        pending
            .into_iter()
            .map(|(field, index, referenced, expected_type)| DeferredAssignment {
                target: id,
                field: field.to_string(),
                index,
                referenced,
                expected_type,
            }),
    );
    Ok(())
}
