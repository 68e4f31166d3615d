//! `sopsbridge hash`: content hash of a document.

use std::path::Path;

use serde_json::json;
use sopsbridge_core::{contains_unknown, hash_value};

use super::{print_json, read_document};
use crate::OutputFormat;

/// Hash `file`. A document holding an unknown has no hash yet; that is
/// reported as `unknown` and is not an error.
pub fn cmd_hash(file: &Path, typed: bool, output: OutputFormat) -> Result<(), String> {
    let value = read_document(file, typed)?;

    let hash = if contains_unknown(&value) {
        None
    } else {
        Some(hash_value(&value).map_err(|e| e.to_string())?)
    };

    match output {
        OutputFormat::Text => {
            println!("{}", hash.as_deref().unwrap_or("unknown"));
            Ok(())
        }
        OutputFormat::Json => print_json(&json!({
            "hash": hash,
            "known": hash.is_some(),
        })),
    }
}
