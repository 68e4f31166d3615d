//! Recursive conversion between [`DynamicValue`] and [`NativeValue`].
//!
//! Both directions fail as a whole: the first child that cannot be
//! converted aborts the call, and its error (with the child's path) is
//! returned unchanged. No partial tree ever escapes.

use std::collections::BTreeMap;

use crate::error::ConversionError;
use crate::native::NativeValue;
use crate::number::{Number, RangeError};
use crate::path::ValuePath;
use crate::types::ValueType;
use crate::unify::unify_sequence;
use crate::value::DynamicValue;

// ──────────────────────────────────────────────
// Dynamic -> native
// ──────────────────────────────────────────────

/// Project a dynamic tree onto JSON.
///
/// Nulls of every type become `null`, lists, tuples, and sets become
/// arrays, maps become objects, and numbers are rounded to doubles. Set
/// elements are emitted in the set's stored order.
///
/// Fails with [`ConversionError::UnknownValuePresent`] on the first unknown;
/// callers that can see unknowns should check [`crate::contains_unknown`]
/// first and defer instead.
pub fn dynamic_to_native(value: &DynamicValue) -> Result<NativeValue, ConversionError> {
    to_native(value, &ValuePath::root())
}

fn to_native(value: &DynamicValue, path: &ValuePath) -> Result<NativeValue, ConversionError> {
    match value {
        DynamicValue::Null(_) => Ok(NativeValue::Null),
        DynamicValue::Unknown => Err(ConversionError::UnknownValuePresent { path: path.clone() }),
        DynamicValue::String(s) => Ok(NativeValue::String(s.clone())),
        DynamicValue::Number(n) => number_to_native(n, path),
        DynamicValue::Bool(b) => Ok(NativeValue::Bool(*b)),
        DynamicValue::Object(fields) => {
            let mut out = BTreeMap::new();
            for (name, field) in fields {
                out.insert(name.clone(), to_native(field, &path.field(name))?);
            }
            Ok(NativeValue::Object(out))
        }
        DynamicValue::Map { entries, .. } => {
            let mut out = BTreeMap::new();
            for (key, entry) in entries {
                out.insert(key.clone(), to_native(entry, &path.key(key))?);
            }
            Ok(NativeValue::Object(out))
        }
        DynamicValue::List { elements, .. }
        | DynamicValue::Set { elements, .. }
        | DynamicValue::Tuple(elements) => {
            let items = elements
                .iter()
                .enumerate()
                .map(|(i, element)| to_native(element, &path.index(i)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(NativeValue::Array(items))
        }
    }
}

fn number_to_native(n: &Number, path: &ValuePath) -> Result<NativeValue, ConversionError> {
    n.to_f64().map(NativeValue::Float64).map_err(|e| match e {
        RangeError::Underflow => ConversionError::NumberUnderflow {
            path: path.clone(),
            value: n.to_string(),
        },
        RangeError::Overflow => ConversionError::NumberOverflow {
            path: path.clone(),
            value: n.to_string(),
        },
    })
}

// ──────────────────────────────────────────────
// Native -> dynamic
// ──────────────────────────────────────────────

/// Rebuild a typed dynamic tree from JSON.
///
/// - `null` becomes a *string-typed* null, not the type-agnostic
///   [`DynamicValue::null`]. Consumers depend on that shape, so the
///   asymmetry with [`dynamic_to_native`] is kept.
/// - Numbers become exact decimals of the double's value.
/// - Object field types are derived from the converted fields.
/// - Arrays go through [`unify_sequence`]: a shared element type gives a
///   list, mixed types give a tuple, and `[]` gives an empty list of
///   strings.
pub fn native_to_dynamic(value: &NativeValue) -> Result<DynamicValue, ConversionError> {
    to_dynamic(value, &ValuePath::root())
}

fn to_dynamic(value: &NativeValue, path: &ValuePath) -> Result<DynamicValue, ConversionError> {
    match value {
        NativeValue::Null => Ok(DynamicValue::Null(ValueType::String)),
        NativeValue::String(s) => Ok(DynamicValue::String(s.clone())),
        NativeValue::Float64(f) => Number::from_f64(*f).map(DynamicValue::Number).ok_or_else(|| {
            ConversionError::NonFiniteNumber {
                path: path.clone(),
                value: f.to_string(),
            }
        }),
        NativeValue::Bool(b) => Ok(DynamicValue::Bool(*b)),
        NativeValue::Object(fields) => {
            let mut out = BTreeMap::new();
            for (name, field) in fields {
                out.insert(name.clone(), to_dynamic(field, &path.field(name))?);
            }
            Ok(DynamicValue::Object(out))
        }
        NativeValue::Array(items) => {
            let elements = items
                .iter()
                .enumerate()
                .map(|(i, item)| to_dynamic(item, &path.index(i)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(unify_sequence(elements))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(s: &str) -> DynamicValue {
        DynamicValue::Number(s.parse().unwrap())
    }

    #[test]
    fn primitives_convert_directly() {
        assert_eq!(dynamic_to_native(&DynamicValue::null()), Ok(NativeValue::Null));
        assert_eq!(
            dynamic_to_native(&"s".into()),
            Ok(NativeValue::String("s".into()))
        );
        assert_eq!(dynamic_to_native(&num("2.5")), Ok(NativeValue::Float64(2.5)));
        assert_eq!(dynamic_to_native(&true.into()), Ok(NativeValue::Bool(true)));
    }

    #[test]
    fn typed_nulls_all_become_json_null() {
        for ty in [ValueType::String, ValueType::list(ValueType::Number), ValueType::Dynamic] {
            assert_eq!(dynamic_to_native(&DynamicValue::Null(ty)), Ok(NativeValue::Null));
        }
    }

    #[test]
    fn unknown_fails_with_its_path() {
        let tree = DynamicValue::object([(
            "outer",
            DynamicValue::tuple(vec!["ok".into(), DynamicValue::Unknown]),
        )]);
        let err = dynamic_to_native(&tree).unwrap_err();
        assert_eq!(
            err,
            ConversionError::UnknownValuePresent {
                path: ValuePath::root().field("outer").index(1),
            }
        );
    }

    #[test]
    fn number_range_errors_carry_path_and_value() {
        let tree = DynamicValue::map(ValueType::Number, [("big", num("1e309"))]).unwrap();
        match dynamic_to_native(&tree).unwrap_err() {
            ConversionError::NumberOverflow { path, value } => {
                assert_eq!(path.to_string(), "$[\"big\"]");
                assert_eq!(value, "1e309");
            }
            other => panic!("expected NumberOverflow, got {:?}", other),
        }

        let tiny = DynamicValue::list(ValueType::Number, vec![num("1"), num("1e-400")]).unwrap();
        assert!(matches!(
            dynamic_to_native(&tiny),
            Err(ConversionError::NumberUnderflow { .. })
        ));
    }

    #[test]
    fn collections_flatten_to_arrays_and_objects() {
        let tree = DynamicValue::object([
            (
                "list",
                DynamicValue::list(ValueType::String, vec!["a".into(), "b".into()]).unwrap(),
            ),
            (
                "set",
                DynamicValue::set(ValueType::Number, vec![num("1"), num("2")]).unwrap(),
            ),
            (
                "map",
                DynamicValue::map(ValueType::Bool, [("k", DynamicValue::from(false))]).unwrap(),
            ),
        ]);
        let native = dynamic_to_native(&tree).unwrap();
        let fields = native.as_object().unwrap();
        assert_eq!(
            fields["list"],
            NativeValue::Array(vec![
                NativeValue::String("a".into()),
                NativeValue::String("b".into())
            ])
        );
        assert_eq!(
            fields["set"],
            NativeValue::Array(vec![NativeValue::Float64(1.0), NativeValue::Float64(2.0)])
        );
        let map = fields["map"].as_object().unwrap();
        assert_eq!(map["k"], NativeValue::Bool(false));
    }

    #[test]
    fn json_null_becomes_string_typed_null() {
        assert_eq!(
            native_to_dynamic(&NativeValue::Null),
            Ok(DynamicValue::Null(ValueType::String))
        );
    }

    #[test]
    fn json_number_becomes_exact_decimal() {
        assert_eq!(native_to_dynamic(&NativeValue::Float64(42.0)), Ok(num("42")));
    }

    #[test]
    fn non_finite_float_is_rejected() {
        let native = NativeValue::Array(vec![NativeValue::Float64(f64::NAN)]);
        match native_to_dynamic(&native).unwrap_err() {
            ConversionError::NonFiniteNumber { path, .. } => assert_eq!(path.to_string(), "$[0]"),
            other => panic!("expected NonFiniteNumber, got {:?}", other),
        }
    }

    #[test]
    fn nulls_in_string_arrays_keep_them_homogeneous() {
        let native = NativeValue::Array(vec![NativeValue::String("a".into()), NativeValue::Null]);
        let value = native_to_dynamic(&native).unwrap();
        assert_eq!(value.value_type(), ValueType::list(ValueType::String));
    }

    #[test]
    fn array_of_objects_with_same_shape_is_list() {
        let obj = |n: f64| {
            NativeValue::Object([("n".to_string(), NativeValue::Float64(n))].into_iter().collect())
        };
        let value = native_to_dynamic(&NativeValue::Array(vec![obj(1.0), obj(2.0)])).unwrap();
        let expected_element =
            ValueType::Object([("n".to_string(), ValueType::Number)].into_iter().collect());
        assert_eq!(value.value_type(), ValueType::list(expected_element));
    }
}
