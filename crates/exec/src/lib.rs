//! sopsbridge-exec: runs converted documents through an encryptor.
//!
//! - [`Executor`] -- the async seam; [`SopsCli`] implements it over the
//!   `sops` binary
//! - [`encrypt_value`] / [`decrypt_value`] -- the full round trip from a
//!   [`DynamicValue`](sopsbridge_core::DynamicValue) to an encrypted document
//!   and back

pub mod error;
pub mod executor;
pub mod options;
pub mod pipeline;
pub mod sops;

pub use error::{ExecError, Operation, PipelineError, Stage};
pub use executor::Executor;
pub use options::{AgeIdentity, DecryptOptions, DocumentFormat, EncryptOptions, ParseFormatError};
pub use pipeline::{decrypt_value, encrypt_value, DecryptOutcome, EncryptOutcome};
pub use sops::{CommandSpec, SopsCli, DEFAULT_BINARY, DEFAULT_TIMEOUT};
