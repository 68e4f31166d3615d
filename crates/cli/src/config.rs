//! Configuration file for `sopsbridge`.
//!
//! Every section and key is optional.
//!
//! # Example
//!
//! ```toml
//! [sops]
//! binary = "/usr/local/bin/sops"
//! timeout_secs = 30
//!
//! [identity]
//! path = "~/.config/sops/age/keys.txt"
//! # value = "AGE-SECRET-KEY-..."
//!
//! [encrypt]
//! age_recipients = ["age1..."]
//! output_type = "json"
//! output_indent = 2
//! ```
//!
//! Values missing from the file fall back to the environment:
//! `SOPSBRIDGE_SOPS_BINARY`, `SOPSBRIDGE_AGE_IDENTITY_PATH`,
//! `SOPSBRIDGE_AGE_IDENTITY`. Command-line flags override both.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sopsbridge_exec::{AgeIdentity, DocumentFormat, SopsCli, DEFAULT_BINARY, DEFAULT_TIMEOUT};
use tracing::debug;

pub const ENV_SOPS_BINARY: &str = "SOPSBRIDGE_SOPS_BINARY";
pub const ENV_IDENTITY_PATH: &str = "SOPSBRIDGE_AGE_IDENTITY_PATH";
pub const ENV_IDENTITY: &str = "SOPSBRIDGE_AGE_IDENTITY";

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub sops: SopsSection,
    pub identity: IdentitySection,
    pub encrypt: EncryptSection,
}

/// `[sops]` section: how to run the binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SopsSection {
    pub binary: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// `[identity]` section: the age key used to decrypt. `value` wins over
/// `path` when both are set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentitySection {
    pub path: Option<String>,
    pub value: Option<String>,
}

/// `[encrypt]` section: defaults for `sopsbridge encrypt`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncryptSection {
    pub age_recipients: Vec<String>,
    pub output_type: Option<String>,
    pub output_indent: Option<u32>,
}

// ── Functions ─────────────────────────────────────────────────────────────────

/// Read and parse a config TOML file from `path`.
///
/// Returns a human-readable error string on failure.
pub fn read_config(path: &Path) -> Result<Config, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;

    let config: Config =
        toml::from_str(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Load `path` if given, otherwise start from an empty config.
pub fn load(path: Option<&Path>) -> Result<Config, String> {
    match path {
        Some(path) => read_config(path),
        None => Ok(Config::default()),
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl Config {
    /// The sops executor, with binary and timeout resolved.
    pub fn executor(&self) -> SopsCli {
        self.executor_with(env_var)
    }

    pub(crate) fn executor_with(&self, env: impl Fn(&str) -> Option<String>) -> SopsCli {
        let binary = self
            .sops
            .binary
            .clone()
            .or_else(|| env(ENV_SOPS_BINARY))
            .unwrap_or_else(|| DEFAULT_BINARY.to_string());
        let timeout = self
            .sops
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        SopsCli::new(binary).with_timeout(timeout)
    }

    /// The decryption identity from config, falling back to environment.
    pub fn identity(&self) -> AgeIdentity {
        self.identity_with(env_var)
    }

    pub(crate) fn identity_with(&self, env: impl Fn(&str) -> Option<String>) -> AgeIdentity {
        let path = self.identity.path.clone().or_else(|| env(ENV_IDENTITY_PATH));
        let value = self.identity.value.clone().or_else(|| env(ENV_IDENTITY));
        AgeIdentity::resolve(path.as_deref(), value.as_deref())
    }

    /// Configured output format, or the default when unset.
    pub fn output_type(&self) -> Result<DocumentFormat, String> {
        self.encrypt
            .output_type
            .as_deref()
            .unwrap_or_default()
            .parse::<DocumentFormat>()
            .map_err(|e| format!("[encrypt] output_type: {}", e))
    }
}
