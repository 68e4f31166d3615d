//! The dynamically typed configuration value tree.

use std::collections::BTreeMap;

use crate::error::ConversionError;
use crate::number::Number;
use crate::path::ValuePath;
use crate::types::ValueType;
use crate::unknown::contains_unknown;

/// A configuration value whose type travels with it.
///
/// Collections that require one element type (`List`, `Map`, `Set`) record
/// it explicitly so that empty collections stay typed. `Object` field types
/// and `Tuple` slot types are derived from the children.
///
/// Prefer the checked constructors ([`DynamicValue::list`],
/// [`DynamicValue::map`], [`DynamicValue::set`]) over building the variants
/// by hand; they enforce the element-type and no-duplicates invariants.
///
/// Equality is structural except for `Set`, whose elements compare without
/// regard to order.
#[derive(Debug, Clone)]
pub enum DynamicValue {
    /// A null of the given type. [`DynamicValue::null`] gives the
    /// type-agnostic null.
    Null(ValueType),
    /// Not computed yet.
    Unknown,
    String(String),
    Number(Number),
    Bool(bool),
    Object(BTreeMap<String, DynamicValue>),
    List {
        element_type: ValueType,
        elements: Vec<DynamicValue>,
    },
    Tuple(Vec<DynamicValue>),
    Map {
        element_type: ValueType,
        entries: BTreeMap<String, DynamicValue>,
    },
    /// Unordered. Elements are kept in insertion order, which is stable for
    /// a given construction but carries no meaning.
    Set {
        element_type: ValueType,
        elements: Vec<DynamicValue>,
    },
}

impl DynamicValue {
    pub fn null() -> Self {
        DynamicValue::Null(ValueType::Dynamic)
    }

    pub fn string(s: impl Into<String>) -> Self {
        DynamicValue::String(s.into())
    }

    pub fn number(n: impl Into<Number>) -> Self {
        DynamicValue::Number(n.into())
    }

    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, DynamicValue)>,
    {
        DynamicValue::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn tuple(elements: Vec<DynamicValue>) -> Self {
        DynamicValue::Tuple(elements)
    }

    /// A list whose elements must all fit `element_type`.
    pub fn list(
        element_type: ValueType,
        elements: Vec<DynamicValue>,
    ) -> Result<Self, ConversionError> {
        check_elements(&element_type, elements.iter().enumerate(), |i| {
            ValuePath::root().index(i)
        })?;
        let elements = elements
            .into_iter()
            .map(|e| adopt_null(&element_type, e))
            .collect();
        Ok(DynamicValue::List {
            element_type,
            elements,
        })
    }

    /// A map whose values must all fit `element_type`.
    pub fn map<K, I>(element_type: ValueType, entries: I) -> Result<Self, ConversionError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, DynamicValue)>,
    {
        let entries: BTreeMap<String, DynamicValue> =
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        check_elements(&element_type, entries.iter(), |k: &String| {
            ValuePath::root().key(k)
        })?;
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k, adopt_null(&element_type, v)))
            .collect();
        Ok(DynamicValue::Map {
            element_type,
            entries,
        })
    }

    /// A set whose elements must all fit `element_type`.
    ///
    /// Known duplicates collapse to their first occurrence. Elements that
    /// contain unknowns are never collapsed, since two unknowns may turn out
    /// to be different values.
    pub fn set(
        element_type: ValueType,
        elements: Vec<DynamicValue>,
    ) -> Result<Self, ConversionError> {
        check_elements(&element_type, elements.iter().enumerate(), |i| {
            ValuePath::root().index(i)
        })?;
        let mut unique: Vec<DynamicValue> = Vec::with_capacity(elements.len());
        for element in elements {
            let element = adopt_null(&element_type, element);
            if contains_unknown(&element) || !unique.contains(&element) {
                unique.push(element);
            }
        }
        Ok(DynamicValue::Set {
            element_type,
            elements: unique,
        })
    }

    /// The type of this value, derived from its children where the variant
    /// does not record one.
    pub fn value_type(&self) -> ValueType {
        match self {
            DynamicValue::Null(ty) => ty.clone(),
            DynamicValue::Unknown => ValueType::Dynamic,
            DynamicValue::String(_) => ValueType::String,
            DynamicValue::Number(_) => ValueType::Number,
            DynamicValue::Bool(_) => ValueType::Bool,
            DynamicValue::Object(fields) => ValueType::Object(
                fields
                    .iter()
                    .map(|(name, v)| (name.clone(), v.value_type()))
                    .collect(),
            ),
            DynamicValue::List { element_type, .. } => ValueType::list(element_type.clone()),
            DynamicValue::Tuple(elements) => {
                ValueType::Tuple(elements.iter().map(DynamicValue::value_type).collect())
            }
            DynamicValue::Map { element_type, .. } => ValueType::map(element_type.clone()),
            DynamicValue::Set { element_type, .. } => ValueType::set(element_type.clone()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DynamicValue::Null(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, DynamicValue::Unknown)
    }

    /// Name of the variant, for error messages and the interchange format.
    pub fn kind_name(&self) -> &'static str {
        match self {
            DynamicValue::Null(_) => "null",
            DynamicValue::Unknown => "unknown",
            DynamicValue::String(_) => "string",
            DynamicValue::Number(_) => "number",
            DynamicValue::Bool(_) => "bool",
            DynamicValue::Object(_) => "object",
            DynamicValue::List { .. } => "list",
            DynamicValue::Tuple(_) => "tuple",
            DynamicValue::Map { .. } => "map",
            DynamicValue::Set { .. } => "set",
        }
    }
}

/// A type-agnostic null placed in a typed collection takes the
/// collection's element type.
fn adopt_null(element_type: &ValueType, element: DynamicValue) -> DynamicValue {
    match element {
        DynamicValue::Null(ValueType::Dynamic) => DynamicValue::Null(element_type.clone()),
        other => other,
    }
}

fn check_elements<'a, K, I, P>(
    element_type: &ValueType,
    elements: I,
    path_of: P,
) -> Result<(), ConversionError>
where
    I: Iterator<Item = (K, &'a DynamicValue)>,
    P: Fn(K) -> ValuePath,
{
    for (at, element) in elements {
        let got = element.value_type();
        if !element_type.accepts(&got) {
            return Err(ConversionError::ElementTypeMismatch {
                path: path_of(at),
                expected: element_type.to_string(),
                got: got.to_string(),
            });
        }
    }
    Ok(())
}

impl PartialEq for DynamicValue {
    fn eq(&self, other: &Self) -> bool {
        use DynamicValue as V;
        match (self, other) {
            (V::Null(a), V::Null(b)) => a == b,
            (V::Unknown, V::Unknown) => true,
            (V::String(a), V::String(b)) => a == b,
            (V::Number(a), V::Number(b)) => a == b,
            (V::Bool(a), V::Bool(b)) => a == b,
            (V::Object(a), V::Object(b)) => a == b,
            (
                V::List {
                    element_type: ta,
                    elements: a,
                },
                V::List {
                    element_type: tb,
                    elements: b,
                },
            ) => ta == tb && a == b,
            (V::Tuple(a), V::Tuple(b)) => a == b,
            (
                V::Map {
                    element_type: ta,
                    entries: a,
                },
                V::Map {
                    element_type: tb,
                    entries: b,
                },
            ) => ta == tb && a == b,
            (
                V::Set {
                    element_type: ta,
                    elements: a,
                },
                V::Set {
                    element_type: tb,
                    elements: b,
                },
            ) => {
                ta == tb
                    && a.len() == b.len()
                    && a.iter().all(|x| b.contains(x))
                    && b.iter().all(|y| a.contains(y))
            }
            _ => false,
        }
    }
}

impl Eq for DynamicValue {}

impl From<&str> for DynamicValue {
    fn from(s: &str) -> Self {
        DynamicValue::String(s.to_string())
    }
}

impl From<String> for DynamicValue {
    fn from(s: String) -> Self {
        DynamicValue::String(s)
    }
}

impl From<bool> for DynamicValue {
    fn from(b: bool) -> Self {
        DynamicValue::Bool(b)
    }
}

impl From<i64> for DynamicValue {
    fn from(n: i64) -> Self {
        DynamicValue::Number(Number::from(n))
    }
}

impl From<Number> for DynamicValue {
    fn from(n: Number) -> Self {
        DynamicValue::Number(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_type_is_derived_from_fields() {
        let v = DynamicValue::object([("name", DynamicValue::from("x")), ("n", 1i64.into())]);
        let expected = ValueType::Object(
            [
                ("n".to_string(), ValueType::Number),
                ("name".to_string(), ValueType::String),
            ]
            .into_iter()
            .collect(),
        );
        assert_eq!(v.value_type(), expected);
    }

    #[test]
    fn tuple_type_records_each_slot() {
        let v = DynamicValue::tuple(vec!["a".into(), true.into()]);
        assert_eq!(
            v.value_type(),
            ValueType::Tuple(vec![ValueType::String, ValueType::Bool])
        );
    }

    #[test]
    fn empty_list_keeps_declared_type() {
        let v = DynamicValue::list(ValueType::Number, vec![]).unwrap();
        assert_eq!(v.value_type(), ValueType::list(ValueType::Number));
    }

    #[test]
    fn list_rejects_mismatched_element() {
        let err = DynamicValue::list(ValueType::String, vec!["a".into(), 3i64.into()]).unwrap_err();
        match err {
            ConversionError::ElementTypeMismatch {
                path,
                expected,
                got,
            } => {
                assert_eq!(path.to_string(), "$[1]");
                assert_eq!(expected, "string");
                assert_eq!(got, "number");
            }
            other => panic!("expected ElementTypeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn list_accepts_unknown_and_typed_null() {
        let v = DynamicValue::list(
            ValueType::String,
            vec![
                DynamicValue::Unknown,
                DynamicValue::Null(ValueType::String),
                DynamicValue::null(),
            ],
        );
        assert!(v.is_ok());
    }

    #[test]
    fn map_reports_offending_key() {
        let err = DynamicValue::map(
            ValueType::Bool,
            [("ok", DynamicValue::from(true)), ("bad", "no".into())],
        )
        .unwrap_err();
        assert_eq!(err.path().map(|p| p.to_string()), Some("$[\"bad\"]".to_string()));
    }

    #[test]
    fn set_collapses_known_duplicates() {
        let v = DynamicValue::set(
            ValueType::String,
            vec!["a".into(), "b".into(), "a".into()],
        )
        .unwrap();
        match v {
            DynamicValue::Set { elements, .. } => {
                assert_eq!(elements, vec![DynamicValue::from("a"), DynamicValue::from("b")]);
            }
            other => panic!("expected Set, got {:?}", other),
        }
    }

    #[test]
    fn set_collapses_untyped_and_typed_null() {
        let v = DynamicValue::set(
            ValueType::String,
            vec![DynamicValue::null(), DynamicValue::Null(ValueType::String)],
        )
        .unwrap();
        assert_eq!(
            crate::convert::dynamic_to_native(&v),
            Ok(crate::native::NativeValue::Array(vec![
                crate::native::NativeValue::Null
            ]))
        );
        match v {
            DynamicValue::Set { elements, .. } => {
                assert_eq!(elements, vec![DynamicValue::Null(ValueType::String)]);
            }
            other => panic!("expected Set, got {:?}", other),
        }
    }

    #[test]
    fn collections_give_untyped_nulls_their_element_type() {
        let list = DynamicValue::list(ValueType::Number, vec![DynamicValue::null()]).unwrap();
        assert_eq!(
            list,
            DynamicValue::List {
                element_type: ValueType::Number,
                elements: vec![DynamicValue::Null(ValueType::Number)],
            }
        );
        let map = DynamicValue::map(ValueType::Bool, [("k", DynamicValue::null())]).unwrap();
        let DynamicValue::Map { entries, .. } = map else {
            panic!("expected Map");
        };
        assert_eq!(entries["k"], DynamicValue::Null(ValueType::Bool));
    }

    #[test]
    fn set_equality_ignores_order() {
        let ab = DynamicValue::set(ValueType::String, vec!["a".into(), "b".into()]).unwrap();
        let ba = DynamicValue::set(ValueType::String, vec!["b".into(), "a".into()]).unwrap();
        assert_eq!(ab, ba);

        let abc = DynamicValue::set(ValueType::String, vec!["a".into(), "b".into(), "c".into()])
            .unwrap();
        assert_ne!(ab, abc);
        let untyped = DynamicValue::set(ValueType::Dynamic, vec!["a".into(), "b".into()]).unwrap();
        assert_ne!(ab, untyped);
    }

    #[test]
    fn list_equality_keeps_order() {
        let ab = DynamicValue::list(ValueType::String, vec!["a".into(), "b".into()]).unwrap();
        let ba = DynamicValue::list(ValueType::String, vec!["b".into(), "a".into()]).unwrap();
        assert_ne!(ab, ba);
    }

    #[test]
    fn set_keeps_every_unknown() {
        let v = DynamicValue::set(
            ValueType::String,
            vec![DynamicValue::Unknown, DynamicValue::Unknown],
        )
        .unwrap();
        match v {
            DynamicValue::Set { elements, .. } => assert_eq!(elements.len(), 2),
            other => panic!("expected Set, got {:?}", other),
        }
    }

    #[test]
    fn unknown_has_dynamic_type() {
        assert_eq!(DynamicValue::Unknown.value_type(), ValueType::Dynamic);
        assert_eq!(DynamicValue::null().value_type(), ValueType::Dynamic);
        assert_eq!(
            DynamicValue::Null(ValueType::String).value_type(),
            ValueType::String
        );
    }
}
