//! Static types of dynamic values.

use std::collections::BTreeMap;
use std::fmt;

/// The type of a [`crate::DynamicValue`].
///
/// Equality is structural: two types are equal when their tags match and,
/// recursively, their element or field types match. [`ValueType::Dynamic`]
/// stands for "any type" and is the type of unknown and type-agnostic null
/// values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Dynamic,
    String,
    Number,
    Bool,
    Object(BTreeMap<String, ValueType>),
    List(Box<ValueType>),
    Tuple(Vec<ValueType>),
    Map(Box<ValueType>),
    Set(Box<ValueType>),
}

impl ValueType {
    pub fn list(element: ValueType) -> Self {
        ValueType::List(Box::new(element))
    }

    pub fn map(element: ValueType) -> Self {
        ValueType::Map(Box::new(element))
    }

    pub fn set(element: ValueType) -> Self {
        ValueType::Set(Box::new(element))
    }

    /// Whether a value of type `other` may be stored where `self` is
    /// expected.
    ///
    /// Looser than `==`: `Dynamic` on either side is compatible with
    /// anything, at any depth. Object types must have the same field names.
    pub fn accepts(&self, other: &ValueType) -> bool {
        match (self, other) {
            (ValueType::Dynamic, _) | (_, ValueType::Dynamic) => true,
            (ValueType::String, ValueType::String)
            | (ValueType::Number, ValueType::Number)
            | (ValueType::Bool, ValueType::Bool) => true,
            (ValueType::Object(a), ValueType::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|((ka, ta), (kb, tb))| ka == kb && ta.accepts(tb))
            }
            (ValueType::List(a), ValueType::List(b))
            | (ValueType::Map(a), ValueType::Map(b))
            | (ValueType::Set(a), ValueType::Set(b)) => a.accepts(b),
            (ValueType::Tuple(a), ValueType::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(ta, tb)| ta.accepts(tb))
            }
            _ => false,
        }
    }

    /// Short name of the type's tag, for error messages.
    pub fn tag(&self) -> &'static str {
        match self {
            ValueType::Dynamic => "dynamic",
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Bool => "bool",
            ValueType::Object(_) => "object",
            ValueType::List(_) => "list",
            ValueType::Tuple(_) => "tuple",
            ValueType::Map(_) => "map",
            ValueType::Set(_) => "set",
        }
    }
}

/// Terraform type-constraint syntax: `list(string)`, `object({a=number})`,
/// `tuple([string, bool])`.
impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Dynamic | ValueType::String | ValueType::Number | ValueType::Bool => {
                write!(f, "{}", self.tag())
            }
            ValueType::Object(fields) => {
                write!(f, "object({{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", name, ty)?;
                }
                write!(f, "}})")
            }
            ValueType::List(element) => write!(f, "list({})", element),
            ValueType::Map(element) => write!(f, "map({})", element),
            ValueType::Set(element) => write!(f, "set({})", element),
            ValueType::Tuple(slots) => {
                write!(f, "tuple([")?;
                for (i, ty) in slots.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", ty)?;
                }
                write!(f, "])")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(fields: &[(&str, ValueType)]) -> ValueType {
        ValueType::Object(
            fields
                .iter()
                .map(|(k, t)| (k.to_string(), t.clone()))
                .collect(),
        )
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(
            ValueType::list(object(&[("a", ValueType::String)])),
            ValueType::list(object(&[("a", ValueType::String)]))
        );
        assert_ne!(
            ValueType::list(ValueType::String),
            ValueType::set(ValueType::String)
        );
        assert_ne!(
            object(&[("a", ValueType::String)]),
            object(&[("a", ValueType::Number)])
        );
    }

    #[test]
    fn dynamic_is_accepted_at_any_depth() {
        assert!(ValueType::String.accepts(&ValueType::Dynamic));
        assert!(ValueType::Dynamic.accepts(&ValueType::Bool));
        assert!(ValueType::list(ValueType::Number).accepts(&ValueType::list(ValueType::Dynamic)));
        assert!(object(&[("a", ValueType::String)]).accepts(&object(&[("a", ValueType::Dynamic)])));
    }

    #[test]
    fn mismatches_are_rejected() {
        assert!(!ValueType::String.accepts(&ValueType::Number));
        assert!(!ValueType::list(ValueType::String).accepts(&ValueType::map(ValueType::String)));
        assert!(!object(&[("a", ValueType::String)]).accepts(&object(&[("b", ValueType::String)])));
        assert!(!ValueType::Tuple(vec![ValueType::String])
            .accepts(&ValueType::Tuple(vec![ValueType::String, ValueType::Bool])));
    }

    #[test]
    fn display_uses_type_constraint_syntax() {
        assert_eq!(ValueType::list(ValueType::String).to_string(), "list(string)");
        assert_eq!(
            object(&[("b", ValueType::Bool), ("a", ValueType::map(ValueType::Number))])
                .to_string(),
            "object({a=map(number), b=bool})"
        );
        assert_eq!(
            ValueType::Tuple(vec![ValueType::String, ValueType::set(ValueType::Dynamic)])
                .to_string(),
            "tuple([string, set(dynamic)])"
        );
    }
}
