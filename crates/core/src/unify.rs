//! Element-type inference for sequences rebuilt from JSON arrays.
//!
//! JSON arrays carry no element type. A list needs one shared type, so an
//! array whose elements all have the same type becomes a list of that type;
//! any disagreement makes it a tuple with one type per slot. Tuples keep
//! mixed arrays such as `["x", 1, true]` representable instead of rejecting
//! them.

use crate::types::ValueType;
use crate::value::DynamicValue;

/// Element type given to a list rebuilt from an empty array, where there is
/// nothing to infer from.
pub const EMPTY_SEQUENCE_ELEMENT_TYPE: ValueType = ValueType::String;

/// How a sequence of element types is represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceShape {
    /// Every element shares this type.
    List(ValueType),
    /// Element types differ; one entry per slot.
    Tuple(Vec<ValueType>),
}

/// Decide between a list and a tuple for the given element types.
///
/// Types are compared with structural equality against the first element.
/// `Dynamic` gets no special treatment here: a string next to an unknown is
/// a disagreement.
pub fn unify_types(types: &[ValueType]) -> SequenceShape {
    let Some(first) = types.first() else {
        return SequenceShape::List(EMPTY_SEQUENCE_ELEMENT_TYPE);
    };
    if types[1..].iter().all(|ty| ty == first) {
        SequenceShape::List(first.clone())
    } else {
        SequenceShape::Tuple(types.to_vec())
    }
}

/// Wrap already converted elements as a list or a tuple.
pub fn unify_sequence(elements: Vec<DynamicValue>) -> DynamicValue {
    let types: Vec<ValueType> = elements.iter().map(DynamicValue::value_type).collect();
    match unify_types(&types) {
        SequenceShape::List(element_type) => DynamicValue::List {
            element_type,
            elements,
        },
        SequenceShape::Tuple(_) => DynamicValue::Tuple(elements),
    }
}
