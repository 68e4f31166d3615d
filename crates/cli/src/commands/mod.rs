//! Subcommand implementations.
//!
//! Each `cmd_*` function prints its result to stdout and returns a
//! human-readable error string on failure.

pub mod decrypt;
pub mod encrypt;
pub mod hash;
pub mod inspect;

use std::path::Path;

use sopsbridge_core::{parse_interchange, unmarshal_dynamic, DynamicValue};

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("error reading file '{}': {}", path.display(), e))
}

/// Load a document as a dynamic value.
///
/// Plain JSON goes through type inference; `typed` documents are read in
/// interchange form and may hold unknowns and typed nulls.
pub(crate) fn read_document(path: &Path, typed: bool) -> Result<DynamicValue, String> {
    let text = read_file(path)?;
    if typed {
        let doc: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| format!("error parsing JSON in '{}': {}", path.display(), e))?;
        parse_interchange(&doc).map_err(|e| format!("error in '{}': {}", path.display(), e))
    } else {
        unmarshal_dynamic(text.as_bytes())
            .map_err(|e| format!("error in '{}': {}", path.display(), e))
    }
}

/// The raw file contents as a string value.
pub(crate) fn read_raw(path: &Path) -> Result<DynamicValue, String> {
    read_file(path).map(DynamicValue::String)
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Runtime::new().map_err(|e| format!("failed to create tokio runtime: {}", e))
}

pub(crate) fn print_json(value: &serde_json::Value) -> Result<(), String> {
    let pretty = serde_json::to_string_pretty(value)
        .map_err(|e| format!("error serializing output: {}", e))?;
    println!("{}", pretty);
    Ok(())
}
