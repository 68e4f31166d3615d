use async_trait::async_trait;

use crate::error::ExecError;
use crate::options::{DecryptOptions, EncryptOptions};

/// Encrypts and decrypts serialized documents.
///
/// The pipeline treats an executor as a black box: it hands over compact
/// JSON and gets back whatever the executor produces. Implementations own
/// every detail of key handling and process management.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Encrypt a JSON document. The result is serialized per
    /// `opts.output_type`.
    async fn encrypt(&self, plaintext: &[u8], opts: &EncryptOptions) -> Result<Vec<u8>, ExecError>;

    /// Decrypt a document serialized per `opts.input_type`. The result is
    /// plain JSON.
    async fn decrypt(&self, ciphertext: &[u8], opts: &DecryptOptions) -> Result<Vec<u8>, ExecError>;

    /// Returns this executor's identifier (e.g. "sops").
    fn executor_id(&self) -> &str;
}
