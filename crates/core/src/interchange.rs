//! Typed interchange JSON for dynamic values.
//!
//! Plain JSON loses everything that makes a dynamic value typed: unknowns,
//! typed nulls, the list/tuple/set/map distinction, and numbers beyond
//! double range. The interchange form keeps all of it with kind-tagged
//! objects:
//!
//! ```json
//! {"kind": "object", "fields": {
//!     "token": {"kind": "unknown"},
//!     "limit": {"kind": "number", "value": "1e309"},
//!     "tags":  {"kind": "set", "element_type": "string", "elements": [
//!         {"kind": "string", "value": "prod"}
//!     ]}
//! }}
//! ```
//!
//! Types are spelled `"dynamic"`, `"string"`, `"number"`, `"bool"`, or a
//! single-key object: `{"list": T}`, `{"set": T}`, `{"map": T}`,
//! `{"tuple": [T, ...]}`, `{"object": {"name": T, ...}}`.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::error::ConversionError;
use crate::number::Number;
use crate::path::ValuePath;
use crate::types::ValueType;
use crate::value::DynamicValue;

// ──────────────────────────────────────────────
// Output
// ──────────────────────────────────────────────

/// Render a dynamic value in interchange form.
pub fn value_to_interchange(value: &DynamicValue) -> Value {
    match value {
        DynamicValue::Null(ty) => json!({ "kind": "null", "type": type_to_interchange(ty) }),
        DynamicValue::Unknown => json!({ "kind": "unknown" }),
        DynamicValue::String(s) => json!({ "kind": "string", "value": s }),
        DynamicValue::Number(n) => json!({ "kind": "number", "value": n.to_string() }),
        DynamicValue::Bool(b) => json!({ "kind": "bool", "value": b }),
        DynamicValue::Object(fields) => {
            json!({ "kind": "object", "fields": values_map(fields) })
        }
        DynamicValue::List {
            element_type,
            elements,
        } => json!({
            "kind": "list",
            "element_type": type_to_interchange(element_type),
            "elements": values_array(elements),
        }),
        DynamicValue::Tuple(elements) => {
            json!({ "kind": "tuple", "elements": values_array(elements) })
        }
        DynamicValue::Map {
            element_type,
            entries,
        } => json!({
            "kind": "map",
            "element_type": type_to_interchange(element_type),
            "entries": values_map(entries),
        }),
        DynamicValue::Set {
            element_type,
            elements,
        } => json!({
            "kind": "set",
            "element_type": type_to_interchange(element_type),
            "elements": values_array(elements),
        }),
    }
}

/// Render a type in interchange form.
pub fn type_to_interchange(ty: &ValueType) -> Value {
    match ty {
        ValueType::Dynamic | ValueType::String | ValueType::Number | ValueType::Bool => {
            Value::String(ty.tag().to_string())
        }
        ValueType::Object(fields) => {
            let map: Map<String, Value> = fields
                .iter()
                .map(|(k, t)| (k.clone(), type_to_interchange(t)))
                .collect();
            json!({ "object": map })
        }
        ValueType::List(element) => json!({ "list": type_to_interchange(element) }),
        ValueType::Map(element) => json!({ "map": type_to_interchange(element) }),
        ValueType::Set(element) => json!({ "set": type_to_interchange(element) }),
        ValueType::Tuple(slots) => {
            let slots: Vec<Value> = slots.iter().map(type_to_interchange).collect();
            json!({ "tuple": slots })
        }
    }
}

fn values_map(values: &BTreeMap<String, DynamicValue>) -> Value {
    Value::Object(
        values
            .iter()
            .map(|(k, v)| (k.clone(), value_to_interchange(v)))
            .collect(),
    )
}

fn values_array(values: &[DynamicValue]) -> Value {
    Value::Array(values.iter().map(value_to_interchange).collect())
}

// ──────────────────────────────────────────────
// Input
// ──────────────────────────────────────────────

/// Parse an interchange document into a dynamic value.
///
/// Collections go through the checked constructors, so element-type
/// mismatches are reported and set duplicates collapse. A `kind` this
/// module does not know fails with [`ConversionError::UnsupportedVariant`].
pub fn parse_interchange(doc: &Value) -> Result<DynamicValue, ConversionError> {
    parse_value(doc, &ValuePath::root())
}

/// Parse an interchange type.
pub fn parse_type(doc: &Value) -> Result<ValueType, ConversionError> {
    parse_type_at(doc, &ValuePath::root())
}

fn parse_value(doc: &Value, path: &ValuePath) -> Result<DynamicValue, ConversionError> {
    let kind = doc
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(path, "missing string field 'kind'"))?;

    match kind {
        "null" => match doc.get("type") {
            Some(ty) => Ok(DynamicValue::Null(parse_type_at(ty, path)?)),
            None => Ok(DynamicValue::null()),
        },
        "unknown" => Ok(DynamicValue::Unknown),
        "string" => {
            let s = doc
                .get("value")
                .and_then(Value::as_str)
                .ok_or_else(|| malformed(path, "string missing 'value'"))?;
            Ok(DynamicValue::String(s.to_string()))
        }
        "number" => {
            let text = match doc.get("value") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => return Err(malformed(path, "number missing 'value'")),
            };
            let n = text
                .parse::<Number>()
                .map_err(|e| malformed(path, &e.to_string()))?;
            Ok(DynamicValue::Number(n))
        }
        "bool" => {
            let b = doc
                .get("value")
                .and_then(Value::as_bool)
                .ok_or_else(|| malformed(path, "bool missing 'value'"))?;
            Ok(DynamicValue::Bool(b))
        }
        "object" => {
            let fields = parse_values_map(doc, "fields", path, ValuePath::field)?;
            Ok(DynamicValue::Object(fields))
        }
        "tuple" => Ok(DynamicValue::Tuple(parse_values_array(doc, path)?)),
        "list" => {
            let element_type = parse_element_type(doc, path)?;
            let elements = parse_values_array(doc, path)?;
            DynamicValue::list(element_type, elements).map_err(|e| e.within(path))
        }
        "set" => {
            let element_type = parse_element_type(doc, path)?;
            let elements = parse_values_array(doc, path)?;
            DynamicValue::set(element_type, elements).map_err(|e| e.within(path))
        }
        "map" => {
            let element_type = parse_element_type(doc, path)?;
            let entries = parse_values_map(doc, "entries", path, ValuePath::key)?;
            DynamicValue::map(element_type, entries).map_err(|e| e.within(path))
        }
        other => Err(ConversionError::UnsupportedVariant {
            path: path.clone(),
            kind: other.to_string(),
        }),
    }
}

fn parse_element_type(doc: &Value, path: &ValuePath) -> Result<ValueType, ConversionError> {
    let ty = doc
        .get("element_type")
        .ok_or_else(|| malformed(path, "collection missing 'element_type'"))?;
    parse_type_at(ty, path)
}

fn parse_values_array(doc: &Value, path: &ValuePath) -> Result<Vec<DynamicValue>, ConversionError> {
    let items = doc
        .get("elements")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed(path, "missing array field 'elements'"))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_value(item, &path.index(i)))
        .collect()
}

fn parse_values_map(
    doc: &Value,
    field: &str,
    path: &ValuePath,
    step: fn(&ValuePath, &str) -> ValuePath,
) -> Result<BTreeMap<String, DynamicValue>, ConversionError> {
    let entries = doc
        .get(field)
        .and_then(Value::as_object)
        .ok_or_else(|| malformed(path, &format!("missing object field '{}'", field)))?;
    let mut out = BTreeMap::new();
    for (k, v) in entries {
        out.insert(k.clone(), parse_value(v, &step(path, k))?);
    }
    Ok(out)
}

fn parse_type_at(doc: &Value, path: &ValuePath) -> Result<ValueType, ConversionError> {
    parse_type_in(doc, path, "")
}

/// `trail` locates `doc` inside the outermost type expression: `.name` for
/// an object field, `[i]` for a tuple slot, `[*]` for a collection's
/// element type. Errors keep the value's `path` and name the trail.
fn parse_type_in(doc: &Value, path: &ValuePath, trail: &str) -> Result<ValueType, ConversionError> {
    let fail = |message: &str| {
        if trail.is_empty() {
            malformed(path, message)
        } else {
            malformed(path, &format!("{} (in type at ${})", message, trail))
        }
    };
    match doc {
        Value::String(name) => match name.as_str() {
            "dynamic" => Ok(ValueType::Dynamic),
            "string" => Ok(ValueType::String),
            "number" => Ok(ValueType::Number),
            "bool" => Ok(ValueType::Bool),
            other => Err(fail(&format!("unknown type '{}'", other))),
        },
        Value::Object(obj) if obj.len() == 1 => {
            let (constructor, arg) = obj
                .iter()
                .next()
                .ok_or_else(|| fail("empty type object"))?;
            let element = format!("{}[*]", trail);
            match constructor.as_str() {
                "list" => Ok(ValueType::list(parse_type_in(arg, path, &element)?)),
                "set" => Ok(ValueType::set(parse_type_in(arg, path, &element)?)),
                "map" => Ok(ValueType::map(parse_type_in(arg, path, &element)?)),
                "tuple" => {
                    let slots = arg
                        .as_array()
                        .ok_or_else(|| fail("tuple type must be an array"))?;
                    let slots = slots
                        .iter()
                        .enumerate()
                        .map(|(i, slot)| parse_type_in(slot, path, &format!("{}[{}]", trail, i)))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(ValueType::Tuple(slots))
                }
                "object" => {
                    let fields = arg
                        .as_object()
                        .ok_or_else(|| fail("object type must be an object"))?;
                    let mut out = BTreeMap::new();
                    for (name, ty) in fields {
                        let trail = format!("{}.{}", trail, name);
                        out.insert(name.clone(), parse_type_in(ty, path, &trail)?);
                    }
                    Ok(ValueType::Object(out))
                }
                other => Err(fail(&format!("unknown type constructor '{}'", other))),
            }
        }
        other => Err(fail(&format!("invalid type: {}", other))),
    }
}

fn malformed(path: &ValuePath, message: &str) -> ConversionError {
    ConversionError::Interchange {
        path: path.clone(),
        message: message.to_string(),
    }
}
