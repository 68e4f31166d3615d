//! `sopsbridge encrypt`: encrypt a JSON object through sops.

use std::path::Path;

use serde_json::json;
use sopsbridge_exec::{encrypt_value, DocumentFormat, EncryptOptions, EncryptOutcome};

use super::{print_json, read_document, runtime};
use crate::config::Config;
use crate::OutputFormat;

/// Command-line overrides for the `[encrypt]` config section.
#[derive(Debug, Default)]
pub struct EncryptFlags {
    pub typed: bool,
    pub age: Vec<String>,
    pub output_type: Option<DocumentFormat>,
    pub indent: Option<u32>,
    pub unencrypted_suffix: Option<String>,
    pub encrypted_suffix: Option<String>,
    pub unencrypted_regex: Option<String>,
    pub encrypted_regex: Option<String>,
}

/// Merge flags over config. Recipients given on the command line replace
/// the configured list rather than extending it.
pub(crate) fn encrypt_options(config: &Config, flags: EncryptFlags) -> Result<EncryptOptions, String> {
    let age_recipients = if flags.age.is_empty() {
        config.encrypt.age_recipients.clone()
    } else {
        flags.age
    };
    let output_type = match flags.output_type {
        Some(format) => format,
        None => config.output_type()?,
    };

    Ok(EncryptOptions {
        age_recipients,
        output_type,
        output_indent: flags.indent.or(config.encrypt.output_indent),
        unencrypted_suffix: flags.unencrypted_suffix,
        encrypted_suffix: flags.encrypted_suffix,
        unencrypted_regex: flags.unencrypted_regex,
        encrypted_regex: flags.encrypted_regex,
    })
}

pub fn cmd_encrypt(
    file: &Path,
    config: &Config,
    flags: EncryptFlags,
    output: OutputFormat,
    quiet: bool,
) -> Result<(), String> {
    let value = read_document(file, flags.typed)?;
    let opts = encrypt_options(config, flags)?;
    let executor = config.executor();

    let outcome = runtime()?
        .block_on(encrypt_value(&executor, &value, &opts))
        .map_err(|e| e.to_string())?;

    match (outcome, output) {
        (EncryptOutcome::Deferred, OutputFormat::Text) => {
            if !quiet {
                eprintln!("input contains unknown values; nothing encrypted");
            }
            Ok(())
        }
        (EncryptOutcome::Deferred, OutputFormat::Json) => print_json(&json!({ "deferred": true })),
        (EncryptOutcome::Encrypted { output, .. }, OutputFormat::Text) => {
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
            Ok(())
        }
        (
            EncryptOutcome::Encrypted { output, input_hash },
            OutputFormat::Json,
        ) => print_json(&json!({
            "deferred": false,
            "output": output,
            "input_hash": input_hash,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(toml_text: &str) -> Config {
        toml::from_str(toml_text).unwrap()
    }

    #[test]
    fn config_supplies_defaults() {
        let config = config(
            "[encrypt]\nage_recipients = [\"age1cfg\"]\noutput_type = \"yaml\"\noutput_indent = 2\n",
        );
        let opts = encrypt_options(&config, EncryptFlags::default()).unwrap();
        assert_eq!(opts.age_recipients, vec!["age1cfg"]);
        assert_eq!(opts.output_type, DocumentFormat::Yaml);
        assert_eq!(opts.output_indent, Some(2));
    }

    #[test]
    fn flags_override_config() {
        let config = config("[encrypt]\nage_recipients = [\"age1cfg\"]\noutput_indent = 2\n");
        let flags = EncryptFlags {
            age: vec!["age1flag".to_string()],
            output_type: Some(DocumentFormat::Json),
            indent: Some(4),
            encrypted_regex: Some("^data$".to_string()),
            ..EncryptFlags::default()
        };
        let opts = encrypt_options(&config, flags).unwrap();
        assert_eq!(opts.age_recipients, vec!["age1flag"]);
        assert_eq!(opts.output_indent, Some(4));
        assert_eq!(opts.encrypted_regex.as_deref(), Some("^data$"));
    }

    #[test]
    fn bad_configured_output_type_fails() {
        let config = config("[encrypt]\noutput_type = \"xml\"\n");
        assert!(encrypt_options(&config, EncryptFlags::default()).is_err());
    }
}
