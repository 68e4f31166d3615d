use crate::path::ValuePath;

/// Errors produced while converting between dynamic values and JSON.
///
/// Every variant that originates inside a tree carries the [`ValuePath`] of
/// the offending node. A failure in a child aborts the whole conversion and
/// is returned as-is, so the path always points at the innermost cause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// The tree holds a value that is not known yet. Callers that may see
    /// unknowns must check [`crate::contains_unknown`] first and defer.
    #[error("{path}: cannot convert unknown value to JSON")]
    UnknownValuePresent { path: ValuePath },

    /// A nonzero number rounds to zero in double precision.
    #[error("{path}: number underflow: {value} is too small to represent as float64")]
    NumberUnderflow { path: ValuePath, value: String },

    /// A number rounds to infinity in double precision.
    #[error("{path}: number overflow: {value} is too large to represent as float64")]
    NumberOverflow { path: ValuePath, value: String },

    /// A native float that is NaN or infinite has no decimal form.
    #[error("{path}: {value} has no decimal representation")]
    NonFiniteNumber { path: ValuePath, value: String },

    /// A tagged variant this crate does not recognize.
    #[error("{path}: unsupported value kind '{kind}'")]
    UnsupportedVariant { path: ValuePath, kind: String },

    /// A collection element whose type does not match the collection's
    /// declared element type.
    #[error("{path}: element of type {got} does not fit a collection of {expected}")]
    ElementTypeMismatch {
        path: ValuePath,
        expected: String,
        got: String,
    },

    /// Input that must be a JSON object converted to something else.
    #[error("input must be a map or object, got {got}; sops can only encrypt JSON objects")]
    NotAnObject { got: String },

    /// The decryptor needs bytes and a null has none.
    #[error("cannot convert null value to bytes")]
    NullInput,

    /// JSON text could not be produced or parsed.
    #[error("JSON error: {message}")]
    Json { message: String },

    /// A typed interchange document is malformed.
    #[error("{path}: invalid interchange document: {message}")]
    Interchange { path: ValuePath, message: String },
}

impl ConversionError {
    /// Path of the node that failed, when the error is tied to one.
    pub fn path(&self) -> Option<&ValuePath> {
        match self {
            ConversionError::UnknownValuePresent { path }
            | ConversionError::NumberUnderflow { path, .. }
            | ConversionError::NumberOverflow { path, .. }
            | ConversionError::NonFiniteNumber { path, .. }
            | ConversionError::UnsupportedVariant { path, .. }
            | ConversionError::ElementTypeMismatch { path, .. }
            | ConversionError::Interchange { path, .. } => Some(path),
            ConversionError::NotAnObject { .. }
            | ConversionError::NullInput
            | ConversionError::Json { .. } => None,
        }
    }

    /// Re-anchor an error raised on a subtree so its path starts at
    /// `prefix`.
    pub fn within(mut self, prefix: &ValuePath) -> Self {
        if let Some(path) = self.path_mut() {
            *path = prefix.join(path);
        }
        self
    }

    fn path_mut(&mut self) -> Option<&mut ValuePath> {
        match self {
            ConversionError::UnknownValuePresent { path }
            | ConversionError::NumberUnderflow { path, .. }
            | ConversionError::NumberOverflow { path, .. }
            | ConversionError::NonFiniteNumber { path, .. }
            | ConversionError::UnsupportedVariant { path, .. }
            | ConversionError::ElementTypeMismatch { path, .. }
            | ConversionError::Interchange { path, .. } => Some(path),
            ConversionError::NotAnObject { .. }
            | ConversionError::NullInput
            | ConversionError::Json { .. } => None,
        }
    }

    pub(crate) fn json(err: serde_json::Error) -> Self {
        ConversionError::Json {
            message: err.to_string(),
        }
    }
}
