//! Glue between the conversion engine and an [`Executor`].
//!
//! Both directions defer when the input still holds an unknown value: the
//! result cannot be computed yet and the executor is never called.

use sopsbridge_core::{
    contains_unknown, dynamic_to_bytes, hash_value, marshal_dynamic, unmarshal_dynamic,
    validate_object_input, ConversionError, DynamicValue,
};
use tracing::debug;

use crate::error::{PipelineError, Stage};
use crate::executor::Executor;
use crate::options::{DecryptOptions, EncryptOptions};

/// Result of [`encrypt_value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncryptOutcome {
    /// The input holds an unknown; try again once it is known.
    Deferred,
    Encrypted {
        /// The encrypted document as produced by the executor.
        output: String,
        /// Content hash of the plaintext input.
        input_hash: String,
    },
}

/// Result of [`decrypt_value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptOutcome {
    Deferred,
    Decrypted(DynamicValue),
}

/// Encrypt a dynamic object.
///
/// The input must be an object (or map) tree; it is converted to compact
/// JSON with sorted keys, hashed, and handed to the executor.
pub async fn encrypt_value(
    executor: &dyn Executor,
    value: &DynamicValue,
    opts: &EncryptOptions,
) -> Result<EncryptOutcome, PipelineError> {
    if contains_unknown(value) {
        debug!(executor = executor.executor_id(), "input not yet known, deferring encrypt");
        return Ok(EncryptOutcome::Deferred);
    }

    validate_object_input(value).map_err(PipelineError::conversion(Stage::Validate))?;
    if value.is_null() {
        return Err(PipelineError::Conversion {
            stage: Stage::Validate,
            source: ConversionError::NotAnObject {
                got: "null".to_string(),
            },
        });
    }

    let input_hash = hash_value(value).map_err(PipelineError::conversion(Stage::Hash))?;
    let plaintext = marshal_dynamic(value).map_err(PipelineError::conversion(Stage::Marshal))?;

    let encrypted = executor.encrypt(&plaintext, opts).await?;
    let output = String::from_utf8(encrypted).map_err(|e| PipelineError::Utf8 {
        stage: Stage::Decode,
        message: e.to_string(),
    })?;

    Ok(EncryptOutcome::Encrypted { output, input_hash })
}

/// Decrypt a document back into a dynamic value.
///
/// A string input is treated as the serialized encrypted document; any
/// other value is marshaled to JSON first.
pub async fn decrypt_value(
    executor: &dyn Executor,
    value: &DynamicValue,
    opts: &DecryptOptions,
) -> Result<DecryptOutcome, PipelineError> {
    if contains_unknown(value) {
        debug!(executor = executor.executor_id(), "input not yet known, deferring decrypt");
        return Ok(DecryptOutcome::Deferred);
    }

    let ciphertext = dynamic_to_bytes(value).map_err(PipelineError::conversion(Stage::Marshal))?;
    let plaintext = executor.decrypt(&ciphertext, opts).await?;
    let decrypted =
        unmarshal_dynamic(&plaintext).map_err(PipelineError::conversion(Stage::Unmarshal))?;

    Ok(DecryptOutcome::Decrypted(decrypted))
}
