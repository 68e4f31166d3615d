use std::fmt;
use std::time::Duration;

use sopsbridge_core::ConversionError;

/// Which direction an executor call was going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Encrypt,
    Decrypt,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Encrypt => write!(f, "encrypt"),
            Operation::Decrypt => write!(f, "decrypt"),
        }
    }
}

/// Errors from an [`Executor`](crate::Executor).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    /// No age recipient was configured for encryption.
    #[error("at least one age recipient must be provided")]
    NoRecipients,

    /// The executor ran and reported failure.
    #[error("sops {operation} failed: {stderr}")]
    Failed { operation: Operation, stderr: String },

    /// The executor could not be started.
    #[error("failed to start '{program}': {message}")]
    Spawn { program: String, message: String },

    /// Piping the document in or the result out failed.
    #[error("sops {operation}: I/O error: {message}")]
    Io { operation: Operation, message: String },

    /// The executor did not finish in time and was killed.
    #[error("sops {operation} timed out after {after:?}")]
    Timeout { operation: Operation, after: Duration },
}

/// Step of the pipeline that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    Hash,
    Marshal,
    Execute,
    Decode,
    Unmarshal,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validate => "validate input",
            Stage::Hash => "hash input",
            Stage::Marshal => "marshal input",
            Stage::Execute => "run executor",
            Stage::Decode => "decode output",
            Stage::Unmarshal => "unmarshal output",
        };
        f.write_str(name)
    }
}

/// Errors from [`encrypt_value`](crate::encrypt_value) and
/// [`decrypt_value`](crate::decrypt_value).
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{stage}: {source}")]
    Conversion {
        stage: Stage,
        source: ConversionError,
    },

    #[error("{stage}: {source}")]
    Exec { stage: Stage, source: ExecError },

    #[error("{stage}: executor output is not valid UTF-8: {message}")]
    Utf8 { stage: Stage, message: String },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Conversion { stage, .. }
            | PipelineError::Exec { stage, .. }
            | PipelineError::Utf8 { stage, .. } => *stage,
        }
    }

    pub(crate) fn conversion(stage: Stage) -> impl FnOnce(ConversionError) -> Self {
        move |source| PipelineError::Conversion { stage, source }
    }
}

impl From<ExecError> for PipelineError {
    fn from(source: ExecError) -> Self {
        PipelineError::Exec {
            stage: Stage::Execute,
            source,
        }
    }
}
