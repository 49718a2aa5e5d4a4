//! Text encoding of field values

use crate::foundation::collections::ComponentId;
use crate::foundation::math::{Vec2, Vec3, Vec4};
use crate::schema::{ElementKind, FieldKind, FieldValue, ScalarKind};
use crate::storage::ResourcePointer;
use std::collections::HashMap;

pub(crate) const NULL: &str = "null";

pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '|' => out.push_str("\\|"),
            other => out.push(other),
        }
    }
    out
}

pub(crate) fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

pub(crate) fn encode_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

fn encode_floats(values: &[f32]) -> String {
    values.iter().map(f32::to_string).collect::<Vec<_>>().join(",")
}

/// Encode `value`, writing component references as transient ids
pub(crate) fn encode(value: &FieldValue, ids: &HashMap<ComponentId, usize>) -> String {
    match value {
        FieldValue::Int(v) | FieldValue::Enum(v) => v.to_string(),
        FieldValue::Float(v) => v.to_string(),
        FieldValue::Bool(v) => encode_bool(*v).to_string(),
        FieldValue::String(v) => escape(v),
        FieldValue::Vec2(v) => encode_floats(v.as_slice()),
        FieldValue::Vec3(v) => encode_floats(v.as_slice()),
        FieldValue::Vec4(v) => encode_floats(v.as_slice()),
        FieldValue::Resource(pointer) => match pointer.key() {
            Some(key) => format!("{},{}", escape(&key.id), escape(&key.type_id)),
            None => NULL.to_string(),
        },
        FieldValue::Component(reference) => reference
            .and_then(|id| ids.get(&id))
            .map_or_else(|| NULL.to_string(), usize::to_string),
        FieldValue::Array(items) => {
            let parts: Vec<String> = items.iter().map(|item| encode(item, ids)).collect();
            format!("[{}]", parts.join("|"))
        }
    }
}

/// A decoded element: either a value or a component reference to resolve later
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Decoded {
    Value(FieldValue),
    Reference(usize),
}

fn parse<T: std::str::FromStr>(token: &str, what: &str) -> Result<T, String> {
    token
        .trim()
        .parse::<T>()
        .map_err(|_| format!("'{token}' is not a valid {what}"))
}

fn parse_floats<const N: usize>(token: &str) -> Result<[f32; N], String> {
    let parts: Vec<&str> = token.split(',').collect();
    if parts.len() != N {
        return Err(format!("expected {N} components, found {} in '{token}'", parts.len()));
    }
    let mut out = [0.0_f32; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = parse(part, "float")?;
    }
    Ok(out)
}

fn decode_bool(token: &str) -> Result<bool, String> {
    match token.trim() {
        t if t.eq_ignore_ascii_case("true") => Ok(true),
        t if t.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(format!("'{token}' is not a valid boolean")),
    }
}

/// Decode one element of `kind`
pub(crate) fn decode_element(token: &str, kind: ElementKind) -> Result<Decoded, String> {
    let value = match kind {
        ElementKind::Scalar(ScalarKind::Int) => FieldValue::Int(parse(token, "integer")?),
        ElementKind::Scalar(ScalarKind::Float) => FieldValue::Float(parse(token, "float")?),
        ElementKind::Scalar(ScalarKind::Bool) => FieldValue::Bool(decode_bool(token)?),
        ElementKind::Scalar(ScalarKind::String) => FieldValue::String(unescape(token)),
        ElementKind::Scalar(ScalarKind::Vec2) => FieldValue::Vec2(Vec2::from(parse_floats::<2>(token)?)),
        ElementKind::Scalar(ScalarKind::Vec3) => FieldValue::Vec3(Vec3::from(parse_floats::<3>(token)?)),
        ElementKind::Scalar(ScalarKind::Vec4) => FieldValue::Vec4(Vec4::from(parse_floats::<4>(token)?)),
        ElementKind::Enum(_) => FieldValue::Enum(parse(token, "enum ordinal")?),
        ElementKind::Resource if token == NULL => FieldValue::Resource(ResourcePointer::null()),
        ElementKind::Resource => {
            let (id, type_id) = token
                .rsplit_once(',')
                .ok_or_else(|| format!("'{token}' is not a resource pointer"))?;
            FieldValue::Resource(ResourcePointer::new(unescape(id), unescape(type_id)))
        }
        ElementKind::Component(_) if token == NULL => FieldValue::Component(None),
        ElementKind::Component(_) => return Ok(Decoded::Reference(parse(token, "component id")?)),
    };
    Ok(Decoded::Value(value))
}

/// Split the inside of `[a|b|c]` on unescaped pipes
fn split_array(token: &str) -> Result<Vec<&str>, String> {
    let inner = token
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .ok_or_else(|| format!("'{token}' is not an array"))?;
    if inner.is_empty() {
        return Ok(Vec::new());
    }

    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in inner.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '|' => {
                parts.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&inner[start..]);
    Ok(parts)
}

/// Decode a whole field value of `kind`
///
/// Returns the value to assign now plus the component references to resolve
/// later, as `(array index, transient id)`; the index is `None` for non-array
/// fields. Unresolved slots hold null references.
pub(crate) fn decode_field(
    token: &str,
    kind: FieldKind,
) -> Result<(FieldValue, Vec<(Option<usize>, usize)>), String> {
    let mut deferred = Vec::new();
    let FieldKind::Array(element) = kind else {
        let value = match decode_element(token, kind.element())? {
            Decoded::Value(value) => value,
            Decoded::Reference(id) => {
                deferred.push((None, id));
                FieldValue::Component(None)
            }
        };
        return Ok((value, deferred));
    };

    let mut items = Vec::new();
    for (index, part) in split_array(token)?.into_iter().enumerate() {
        match decode_element(part, element)? {
            Decoded::Value(value) => items.push(value),
            Decoded::Reference(id) => {
                deferred.push((Some(index), id));
                items.push(FieldValue::Component(None));
            }
        }
    }
    Ok((FieldValue::Array(items), deferred))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_round_trip() {
        let text = "line one\nline|two\\three\r";
        let escaped = escape(text);
        assert!(!escaped.contains('\n'));
        assert!(!escaped.contains('|') || escaped.contains("\\|"));
        assert_eq!(unescape(&escaped), text);
    }

    #[test]
    fn test_encode_scalars() {
        let ids = HashMap::new();
        assert_eq!(encode(&FieldValue::Int(-4), &ids), "-4");
        assert_eq!(encode(&FieldValue::Float(0.5), &ids), "0.5");
        assert_eq!(encode(&FieldValue::Bool(true), &ids), "True");
        assert_eq!(encode(&FieldValue::Vec3(Vec3::new(1.0, 2.5, -3.0)), &ids), "1,2.5,-3");
        assert_eq!(encode(&FieldValue::Resource(ResourcePointer::null()), &ids), "null");
        assert_eq!(
            encode(&FieldValue::Resource(ResourcePointer::new("desc", "txt")), &ids),
            "desc,txt"
        );
        assert_eq!(encode(&FieldValue::Component(None), &ids), "null");
        assert_eq!(encode(&FieldValue::Array(Vec::new()), &ids), "[]");
        assert_eq!(
            encode(&FieldValue::Array(vec![FieldValue::Int(1), FieldValue::Int(2)]), &ids),
            "[1|2]"
        );
    }

    #[test]
    fn test_decode_scalars() {
        assert_eq!(
            decode_element("2.5,1", ElementKind::Scalar(ScalarKind::Vec2)),
            Ok(Decoded::Value(FieldValue::Vec2(Vec2::new(2.5, 1.0))))
        );
        assert_eq!(
            decode_element("False", ElementKind::Scalar(ScalarKind::Bool)),
            Ok(Decoded::Value(FieldValue::Bool(false)))
        );
        assert_eq!(
            decode_element("7", ElementKind::Component("Attraction")),
            Ok(Decoded::Reference(7))
        );
        assert!(decode_element("abc", ElementKind::Scalar(ScalarKind::Int)).is_err());
        assert!(decode_element("1,2", ElementKind::Scalar(ScalarKind::Vec3)).is_err());
        assert!(decode_element("nocomma", ElementKind::Resource).is_err());
    }

    #[test]
    fn test_decode_array_with_references() {
        let kind = FieldKind::Array(ElementKind::Component("Attraction"));
        let (value, deferred) = decode_field("[null|3|0]", kind).unwrap();
        assert_eq!(
            value,
            FieldValue::Array(vec![FieldValue::Component(None); 3])
        );
        assert_eq!(deferred, vec![(Some(1), 3), (Some(2), 0)]);
    }

    #[test]
    fn test_decode_string_array_with_pipes() {
        let kind = FieldKind::Array(ElementKind::Scalar(ScalarKind::String));
        let ids = HashMap::new();
        let original = FieldValue::Array(vec![
            FieldValue::String("a|b".into()),
            FieldValue::String("c".into()),
        ]);
        let encoded = encode(&original, &ids);
        let (decoded, deferred) = decode_field(&encoded, kind).unwrap();
        assert_eq!(decoded, original);
        assert!(deferred.is_empty());
    }
}
