//! Content hashing for change detection.

use sha2::{Digest, Sha256};

use crate::convert::dynamic_to_native;
use crate::error::ConversionError;
use crate::value::DynamicValue;

/// Lowercase hex SHA-256 of the value's compact JSON encoding.
///
/// Object and map keys are serialized in sorted order, so values that are
/// equal hash equal regardless of how they were built. Sets hash in their
/// stored element order. Unknowns and out-of-range numbers fail exactly as
/// in [`dynamic_to_native`].
pub fn hash_value(value: &DynamicValue) -> Result<String, ConversionError> {
    let canonical = dynamic_to_native(value)?.to_json_vec()?;
    let digest = Sha256::digest(&canonical);
    Ok(format!("{:x}", digest))
}
