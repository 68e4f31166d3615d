//! The JSON value model the encryptor understands.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConversionError;

/// A JSON value with every number held as a double.
///
/// There is no list/tuple/set/map distinction here: all sequences are
/// `Array` and all keyed collections are `Object`. Objects are `BTreeMap`s,
/// so serialization always emits keys in sorted order.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    Null,
    String(String),
    Float64(f64),
    Bool(bool),
    Object(BTreeMap<String, NativeValue>),
    Array(Vec<NativeValue>),
}

impl NativeValue {
    /// JSON name of the value's kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            NativeValue::Null => "null",
            NativeValue::String(_) => "string",
            NativeValue::Float64(_) => "number",
            NativeValue::Bool(_) => "bool",
            NativeValue::Object(_) => "object",
            NativeValue::Array(_) => "array",
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, NativeValue>> {
        match self {
            NativeValue::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Compact JSON with sorted object keys.
    pub fn to_json_vec(&self) -> Result<Vec<u8>, ConversionError> {
        serde_json::to_vec(self).map_err(ConversionError::json)
    }

    /// Parse a JSON document. Every number becomes `Float64`.
    pub fn from_json_slice(bytes: &[u8]) -> Result<NativeValue, ConversionError> {
        serde_json::from_slice(bytes).map_err(ConversionError::json)
    }
}

impl From<serde_json::Value> for NativeValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => NativeValue::Null,
            serde_json::Value::Bool(b) => NativeValue::Bool(b),
            // Without arbitrary_precision every JSON number has an f64 view.
            serde_json::Value::Number(n) => NativeValue::Float64(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => NativeValue::String(s),
            serde_json::Value::Array(items) => {
                NativeValue::Array(items.into_iter().map(NativeValue::from).collect())
            }
            serde_json::Value::Object(fields) => NativeValue::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, NativeValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for NativeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NativeValue::Null => serializer.serialize_unit(),
            NativeValue::String(s) => serializer.serialize_str(s),
            NativeValue::Float64(f) => serializer.serialize_f64(*f),
            NativeValue::Bool(b) => serializer.serialize_bool(*b),
            NativeValue::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            NativeValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for NativeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(NativeValue::from)
    }
}
