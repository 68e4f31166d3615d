//! `sopsbridge inspect`: show how a JSON document is typed.

use std::path::Path;

use sopsbridge_core::value_to_interchange;

use super::{print_json, read_document};
use crate::OutputFormat;

pub fn cmd_inspect(file: &Path, output: OutputFormat) -> Result<(), String> {
    let value = read_document(file, false)?;
    match output {
        OutputFormat::Text => {
            println!("{}", value.value_type());
            Ok(())
        }
        OutputFormat::Json => print_json(&value_to_interchange(&value)),
    }
}
