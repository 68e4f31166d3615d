//! Detection of values that are not known yet.

use crate::value::DynamicValue;

/// Whether `value` is, or anywhere contains, [`DynamicValue::Unknown`].
///
/// Stops at the first unknown found. A typed null is known.
pub fn contains_unknown(value: &DynamicValue) -> bool {
    match value {
        DynamicValue::Unknown => true,
        DynamicValue::Null(_)
        | DynamicValue::String(_)
        | DynamicValue::Number(_)
        | DynamicValue::Bool(_) => false,
        DynamicValue::Object(fields) => fields.values().any(contains_unknown),
        DynamicValue::Map { entries, .. } => entries.values().any(contains_unknown),
        DynamicValue::List { elements, .. }
        | DynamicValue::Set { elements, .. }
        | DynamicValue::Tuple(elements) => elements.iter().any(contains_unknown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueType;

    #[test]
    fn leaves() {
        assert!(contains_unknown(&DynamicValue::Unknown));
        assert!(!contains_unknown(&DynamicValue::null()));
        assert!(!contains_unknown(&DynamicValue::from("x")));
        assert!(!contains_unknown(&DynamicValue::from(1i64)));
    }

    #[test]
    fn finds_unknown_nested_in_every_container() {
        let wrap = |inner: DynamicValue| {
            vec![
                DynamicValue::object([("f", inner.clone())]),
                DynamicValue::tuple(vec!["a".into(), inner.clone()]),
                DynamicValue::list(ValueType::Dynamic, vec![inner.clone()]).unwrap(),
                DynamicValue::set(ValueType::Dynamic, vec![inner.clone()]).unwrap(),
                DynamicValue::map(ValueType::Dynamic, [("k", inner)]).unwrap(),
            ]
        };
        for container in wrap(DynamicValue::Unknown) {
            assert!(contains_unknown(&container), "{:?}", container);
        }
        for container in wrap(DynamicValue::from("known")) {
            assert!(!contains_unknown(&container), "{:?}", container);
        }
    }

    #[test]
    fn finds_deeply_nested_unknown() {
        let mut value = DynamicValue::Unknown;
        for depth in 0..50 {
            value = DynamicValue::object([(format!("level{}", depth), value)]);
        }
        assert!(contains_unknown(&value));
    }
}
