//! Options handed to an [`Executor`](crate::Executor) for each call.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ExecError;

// ──────────────────────────────────────────────
// DocumentFormat
// ──────────────────────────────────────────────

/// Serialization of an encrypted document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentFormat {
    #[default]
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Name passed to sops' `--input-type` / `--output-type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Json => "json",
            DocumentFormat::Yaml => "yaml",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported document format '{0}' (expected json or yaml)")]
pub struct ParseFormatError(pub String);

impl FromStr for DocumentFormat {
    type Err = ParseFormatError;

    /// Case-insensitive; an empty string selects the default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "json" => Ok(DocumentFormat::Json),
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            _ => Err(ParseFormatError(s.to_string())),
        }
    }
}

// ──────────────────────────────────────────────
// EncryptOptions
// ──────────────────────────────────────────────

/// How a document is encrypted.
///
/// The suffix and regex filters map one-to-one onto the sops flags of the
/// same name and select which keys get encrypted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncryptOptions {
    pub age_recipients: Vec<String>,
    pub output_type: DocumentFormat,
    pub output_indent: Option<u32>,
    pub unencrypted_suffix: Option<String>,
    pub encrypted_suffix: Option<String>,
    pub unencrypted_regex: Option<String>,
    pub encrypted_regex: Option<String>,
}

impl EncryptOptions {
    pub fn for_recipients<I, S>(recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EncryptOptions {
            age_recipients: recipients.into_iter().map(Into::into).collect(),
            ..EncryptOptions::default()
        }
    }

    /// Fails with [`ExecError::NoRecipients`] when no one could decrypt
    /// the result.
    pub fn check(&self) -> Result<(), ExecError> {
        if self.age_recipients.iter().all(|r| r.trim().is_empty()) {
            return Err(ExecError::NoRecipients);
        }
        Ok(())
    }
}

// ──────────────────────────────────────────────
// AgeIdentity
// ──────────────────────────────────────────────

/// The age private key used for decryption.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum AgeIdentity {
    /// Let sops look up its default key location.
    #[default]
    Default,
    /// Key file on disk (`SOPS_AGE_KEY_FILE`).
    File(PathBuf),
    /// Key material itself (`SOPS_AGE_KEY`).
    Inline(String),
}

impl AgeIdentity {
    /// Pick an identity from an optional key file and optional key value.
    ///
    /// A non-empty value wins over a path. Empty strings count as unset.
    pub fn resolve(path: Option<&str>, value: Option<&str>) -> Self {
        fn non_empty(s: Option<&str>) -> Option<&str> {
            s.filter(|s| !s.trim().is_empty())
        }
        if let Some(value) = non_empty(value) {
            AgeIdentity::Inline(value.to_string())
        } else if let Some(path) = non_empty(path) {
            AgeIdentity::File(PathBuf::from(path))
        } else {
            AgeIdentity::Default
        }
    }

    /// Environment variable that hands this identity to sops.
    pub fn env_var(&self) -> Option<(&'static str, String)> {
        match self {
            AgeIdentity::Default => None,
            AgeIdentity::File(path) => Some(("SOPS_AGE_KEY_FILE", path.display().to_string())),
            AgeIdentity::Inline(key) => Some(("SOPS_AGE_KEY", key.clone())),
        }
    }
}

impl fmt::Debug for AgeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgeIdentity::Default => f.write_str("Default"),
            AgeIdentity::File(path) => f.debug_tuple("File").field(path).finish(),
            AgeIdentity::Inline(_) => f.write_str("Inline(<redacted>)"),
        }
    }
}

// ──────────────────────────────────────────────
// DecryptOptions
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecryptOptions {
    pub identity: AgeIdentity,
    pub input_type: DocumentFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing_is_case_insensitive() {
        assert_eq!("JSON".parse(), Ok(DocumentFormat::Json));
        assert_eq!("Yaml".parse(), Ok(DocumentFormat::Yaml));
        assert_eq!("".parse(), Ok(DocumentFormat::Json));
        assert!("toml".parse::<DocumentFormat>().is_err());
    }

    #[test]
    fn inline_identity_wins_over_path() {
        assert_eq!(
            AgeIdentity::resolve(Some("/keys.txt"), Some("AGE-SECRET-KEY-1")),
            AgeIdentity::Inline("AGE-SECRET-KEY-1".to_string())
        );
        assert_eq!(
            AgeIdentity::resolve(Some("/keys.txt"), Some("")),
            AgeIdentity::File(PathBuf::from("/keys.txt"))
        );
        assert_eq!(AgeIdentity::resolve(None, None), AgeIdentity::Default);
    }

    #[test]
    fn identity_env_matches_kind() {
        assert_eq!(AgeIdentity::Default.env_var(), None);
        assert_eq!(
            AgeIdentity::File(PathBuf::from("/k")).env_var(),
            Some(("SOPS_AGE_KEY_FILE", "/k".to_string()))
        );
        assert_eq!(
            AgeIdentity::Inline("secret".into()).env_var(),
            Some(("SOPS_AGE_KEY", "secret".to_string()))
        );
    }

    #[test]
    fn inline_identity_is_not_printed() {
        let shown = format!("{:?}", AgeIdentity::Inline("AGE-SECRET-KEY-1XYZ".into()));
        assert!(!shown.contains("XYZ"));
    }

    #[test]
    fn recipients_are_required() {
        assert_eq!(EncryptOptions::default().check(), Err(ExecError::NoRecipients));
        assert_eq!(EncryptOptions::for_recipients([" "]).check(), Err(ExecError::NoRecipients));
        assert!(EncryptOptions::for_recipients(["age1abc"]).check().is_ok());
    }
}
