//! `sopsbridge decrypt`: decrypt a sops document back to JSON.

use std::path::Path;

use serde_json::json;
use sopsbridge_core::{dynamic_to_native, value_to_interchange};
use sopsbridge_exec::{decrypt_value, DecryptOptions, DecryptOutcome, DocumentFormat};

use super::{print_json, read_raw, runtime};
use crate::config::Config;
use crate::OutputFormat;

/// Decrypt `file`. Text output is the plain JSON document; JSON output is
/// the typed interchange form of the decrypted value.
pub fn cmd_decrypt(
    file: &Path,
    config: &Config,
    input_type: Option<DocumentFormat>,
    output: OutputFormat,
) -> Result<(), String> {
    let ciphertext = read_raw(file)?;
    let opts = DecryptOptions {
        identity: config.identity(),
        input_type: input_type.unwrap_or_default(),
    };
    let executor = config.executor();

    let outcome = runtime()?
        .block_on(decrypt_value(&executor, &ciphertext, &opts))
        .map_err(|e| e.to_string())?;

    let value = match outcome {
        DecryptOutcome::Decrypted(value) => value,
        // A file on disk is always known.
        DecryptOutcome::Deferred => return print_json(&json!({ "deferred": true })),
    };

    match output {
        OutputFormat::Text => {
            let native = dynamic_to_native(&value).map_err(|e| e.to_string())?;
            let pretty = serde_json::to_string_pretty(&native)
                .map_err(|e| format!("error serializing output: {}", e))?;
            println!("{}", pretty);
            Ok(())
        }
        OutputFormat::Json => print_json(&value_to_interchange(&value)),
    }
}
