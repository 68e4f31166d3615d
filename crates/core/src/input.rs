//! Byte-level entry points used around the encryptor.

use crate::convert::{dynamic_to_native, native_to_dynamic};
use crate::error::ConversionError;
use crate::native::NativeValue;
use crate::path::ValuePath;
use crate::unknown::contains_unknown;
use crate::value::DynamicValue;

/// Compact JSON for a dynamic value.
pub fn marshal_dynamic(value: &DynamicValue) -> Result<Vec<u8>, ConversionError> {
    dynamic_to_native(value)?.to_json_vec()
}

/// Parse JSON bytes into a dynamic value.
pub fn unmarshal_dynamic(bytes: &[u8]) -> Result<DynamicValue, ConversionError> {
    native_to_dynamic(&NativeValue::from_json_slice(bytes)?)
}

/// Bytes to hand to the decryptor.
///
/// An encrypted document usually arrives as a string holding the whole
/// serialized file; its text is used as-is. Any other value is marshaled to
/// JSON first.
pub fn dynamic_to_bytes(value: &DynamicValue) -> Result<Vec<u8>, ConversionError> {
    match value {
        DynamicValue::String(s) => Ok(s.clone().into_bytes()),
        DynamicValue::Null(_) => Err(ConversionError::NullInput),
        DynamicValue::Unknown => Err(ConversionError::UnknownValuePresent {
            path: ValuePath::root(),
        }),
        other => marshal_dynamic(other),
    }
}

/// Check that a value to be encrypted is a JSON object.
///
/// Values that cannot be judged yet pass: nulls, unknowns, and trees that
/// contain unknowns are checked again once they are known. Everything else
/// must convert cleanly and produce an object (from an `Object` or a `Map`).
pub fn validate_object_input(value: &DynamicValue) -> Result<(), ConversionError> {
    if value.is_null() || contains_unknown(value) {
        return Ok(());
    }
    match dynamic_to_native(value)? {
        NativeValue::Object(_) => Ok(()),
        other => Err(ConversionError::NotAnObject {
            got: other.kind_name().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueType;

    #[test]
    fn string_input_passes_through_verbatim() {
        let doc = "{\"sops\": {\"version\": \"3.9\"}}";
        assert_eq!(dynamic_to_bytes(&doc.into()).unwrap(), doc.as_bytes());
    }

    #[test]
    fn structured_input_is_marshaled() {
        let value = DynamicValue::object([("b", DynamicValue::from(true)), ("a", 1i64.into())]);
        assert_eq!(dynamic_to_bytes(&value).unwrap(), br#"{"a":1.0,"b":true}"#);
    }

    #[test]
    fn null_and_unknown_have_no_bytes() {
        let err = dynamic_to_bytes(&DynamicValue::Null(ValueType::String)).unwrap_err();
        assert_eq!(err, ConversionError::NullInput);
        assert_eq!(err.to_string(), "cannot convert null value to bytes");
        assert_eq!(err.path(), None);
        assert!(matches!(
            dynamic_to_bytes(&DynamicValue::Unknown),
            Err(ConversionError::UnknownValuePresent { .. })
        ));
    }

    #[test]
    fn unmarshal_rebuilds_typed_tree() {
        let value = unmarshal_dynamic(br#"{"list": ["a", "b"], "mixed": ["x", 1]}"#).unwrap();
        let DynamicValue::Object(fields) = value else {
            panic!("expected object");
        };
        assert_eq!(fields["list"].value_type(), ValueType::list(ValueType::String));
        assert_eq!(
            fields["mixed"].value_type(),
            ValueType::Tuple(vec![ValueType::String, ValueType::Number])
        );
    }

    #[test]
    fn unmarshal_reports_bad_json() {
        assert!(matches!(
            unmarshal_dynamic(b"not json"),
            Err(ConversionError::Json { .. })
        ));
    }

    #[test]
    fn objects_and_maps_are_valid_input() {
        assert!(validate_object_input(&DynamicValue::object([("k", DynamicValue::from("v"))])).is_ok());
        let map = DynamicValue::map(ValueType::String, [("k", DynamicValue::from("v"))]).unwrap();
        assert!(validate_object_input(&map).is_ok());
    }

    #[test]
    fn undecidable_input_is_deferred() {
        assert!(validate_object_input(&DynamicValue::null()).is_ok());
        assert!(validate_object_input(&DynamicValue::Unknown).is_ok());
        let partial = DynamicValue::tuple(vec!["a".into(), DynamicValue::Unknown]);
        assert!(validate_object_input(&partial).is_ok());
    }

    #[test]
    fn non_object_input_is_rejected_with_kind() {
        let list = DynamicValue::list(ValueType::String, vec!["a".into()]).unwrap();
        assert_eq!(
            validate_object_input(&list),
            Err(ConversionError::NotAnObject {
                got: "array".to_string()
            })
        );
        assert!(matches!(
            validate_object_input(&"text".into()),
            Err(ConversionError::NotAnObject { .. })
        ));
    }

    #[test]
    fn conversion_failures_surface_before_shape_check() {
        let value = DynamicValue::object([("n", DynamicValue::Number("1e309".parse().unwrap()))]);
        assert!(matches!(
            validate_object_input(&value),
            Err(ConversionError::NumberOverflow { .. })
        ));
    }
}
