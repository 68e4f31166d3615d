//! Executor that drives the `sops` binary as a subprocess.
//!
//! The document is written to the child's stdin (`/dev/stdin` is passed as
//! the file argument) and the result is read from stdout. Keys travel in the
//! environment: `SOPS_AGE_RECIPIENTS` for encryption, `SOPS_AGE_KEY` or
//! `SOPS_AGE_KEY_FILE` for decryption.

use std::fmt;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{ExecError, Operation};
use crate::executor::Executor;
use crate::options::{DecryptOptions, EncryptOptions};

pub const DEFAULT_BINARY: &str = "sops";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const STDIN_PATH: &str = "/dev/stdin";
const REDACTED_VARS: &[&str] = &["SOPS_AGE_KEY"];

// ──────────────────────────────────────────────
// CommandSpec
// ──────────────────────────────────────────────

/// A fully built sops invocation, before it is spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

/// Shell-like rendering for logs, with key material replaced.
impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.env {
            if REDACTED_VARS.contains(&name.as_str()) {
                write!(f, "{}=<redacted> ", name)?;
            } else {
                write!(f, "{}={} ", name, value)?;
            }
        }
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

// ──────────────────────────────────────────────
// SopsCli
// ──────────────────────────────────────────────

/// [`Executor`] backed by the sops command-line tool.
///
/// The child inherits the current environment plus the key variables for
/// the call. A child still running at the deadline is killed.
#[derive(Debug, Clone)]
pub struct SopsCli {
    binary: String,
    timeout: Duration,
}

impl Default for SopsCli {
    fn default() -> Self {
        SopsCli::new(DEFAULT_BINARY)
    }
}

impl SopsCli {
    pub fn new(binary: impl Into<String>) -> Self {
        SopsCli {
            binary: binary.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build the encrypt invocation. Fails without recipients.
    pub fn encrypt_command(&self, opts: &EncryptOptions) -> Result<CommandSpec, ExecError> {
        opts.check()?;

        let mut args = Vec::new();
        if let Some(indent) = opts.output_indent {
            args.push("--indent".to_string());
            args.push(indent.to_string());
        }
        let filters = [
            ("--unencrypted-suffix", &opts.unencrypted_suffix),
            ("--encrypted-suffix", &opts.encrypted_suffix),
            ("--unencrypted-regex", &opts.unencrypted_regex),
            ("--encrypted-regex", &opts.encrypted_regex),
        ];
        for (flag, value) in filters {
            if let Some(value) = value {
                args.push(flag.to_string());
                args.push(value.clone());
            }
        }
        args.extend(
            [
                "--encrypt",
                "--input-type",
                "json",
                "--output-type",
                opts.output_type.as_str(),
                STDIN_PATH,
            ]
            .map(String::from),
        );

        let recipients: Vec<&str> = opts
            .age_recipients
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .collect();

        Ok(CommandSpec {
            program: self.binary.clone(),
            args,
            env: vec![("SOPS_AGE_RECIPIENTS".to_string(), recipients.join(","))],
        })
    }

    /// Build the decrypt invocation.
    pub fn decrypt_command(&self, opts: &DecryptOptions) -> CommandSpec {
        let args = [
            "decrypt",
            "--input-type",
            opts.input_type.as_str(),
            "--output-type",
            "json",
            STDIN_PATH,
        ]
        .map(String::from)
        .to_vec();

        let env = opts
            .identity
            .env_var()
            .map(|(name, value)| (name.to_string(), value))
            .into_iter()
            .collect();

        CommandSpec {
            program: self.binary.clone(),
            args,
            env,
        }
    }

    async fn run(
        &self,
        operation: Operation,
        spec: CommandSpec,
        input: &[u8],
    ) -> Result<Vec<u8>, ExecError> {
        debug!(%operation, command = %spec, bytes = input.len(), "running sops");

        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecError::Spawn {
                program: spec.program.clone(),
                message: e.to_string(),
            })?;

        let io_error = |message: String| ExecError::Io { operation, message };
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io_error("child stdin unavailable".to_string()))?;

        let feed = async move {
            match stdin.write_all(input).await {
                // The child may exit before reading everything; its exit
                // status tells us what went wrong.
                Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e),
                _ => Ok(()),
            }
        };
        let exchange = async { tokio::join!(feed, child.wait_with_output()) };

        let (fed, output) = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => {
                warn!(%operation, timeout = ?self.timeout, "sops did not finish in time, killing it");
                return Err(ExecError::Timeout {
                    operation,
                    after: self.timeout,
                });
            }
        };
        fed.map_err(|e| io_error(e.to_string()))?;
        let output = output.map_err(|e| io_error(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
            warn!(%operation, status = %output.status, "sops exited with failure");
            return Err(ExecError::Failed { operation, stderr });
        }

        debug!(%operation, bytes = output.stdout.len(), "sops finished");
        Ok(output.stdout)
    }
}

#[async_trait]
impl Executor for SopsCli {
    async fn encrypt(&self, plaintext: &[u8], opts: &EncryptOptions) -> Result<Vec<u8>, ExecError> {
        let spec = self.encrypt_command(opts)?;
        self.run(Operation::Encrypt, spec, plaintext).await
    }

    async fn decrypt(&self, ciphertext: &[u8], opts: &DecryptOptions) -> Result<Vec<u8>, ExecError> {
        let spec = self.decrypt_command(opts);
        self.run(Operation::Decrypt, spec, ciphertext).await
    }

    fn executor_id(&self) -> &str {
        "sops"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{AgeIdentity, DocumentFormat};

    #[test]
    fn encrypt_args_follow_sops_layout() {
        let opts = EncryptOptions::for_recipients(["age1aaa", "age1bbb"]);
        let spec = SopsCli::default().encrypt_command(&opts).unwrap();
        assert_eq!(spec.program, "sops");
        assert_eq!(
            spec.args,
            vec!["--encrypt", "--input-type", "json", "--output-type", "json", "/dev/stdin"]
        );
        assert_eq!(
            spec.env,
            vec![("SOPS_AGE_RECIPIENTS".to_string(), "age1aaa,age1bbb".to_string())]
        );
    }

    #[test]
    fn indent_and_filters_come_before_encrypt_flag() {
        let opts = EncryptOptions {
            output_type: DocumentFormat::Yaml,
            output_indent: Some(4),
            encrypted_regex: Some("^(data|stringData)$".to_string()),
            unencrypted_suffix: Some("_plain".to_string()),
            ..EncryptOptions::for_recipients(["age1aaa"])
        };
        let spec = SopsCli::new("/opt/sops").encrypt_command(&opts).unwrap();
        assert_eq!(spec.program, "/opt/sops");
        assert_eq!(
            spec.args,
            vec![
                "--indent",
                "4",
                "--unencrypted-suffix",
                "_plain",
                "--encrypted-regex",
                "^(data|stringData)$",
                "--encrypt",
                "--input-type",
                "json",
                "--output-type",
                "yaml",
                "/dev/stdin",
            ]
        );
    }

    #[test]
    fn blank_recipients_are_dropped() {
        let opts = EncryptOptions::for_recipients(["age1aaa", " ", "age1bbb "]);
        let spec = SopsCli::default().encrypt_command(&opts).unwrap();
        assert_eq!(spec.env[0].1, "age1aaa,age1bbb");
    }

    #[test]
    fn encrypt_without_recipients_is_refused() {
        assert_eq!(
            SopsCli::default().encrypt_command(&EncryptOptions::default()),
            Err(ExecError::NoRecipients)
        );
    }

    #[test]
    fn decrypt_args_and_identity_env() {
        let opts = DecryptOptions {
            identity: AgeIdentity::Inline("AGE-SECRET-KEY-1".to_string()),
            input_type: DocumentFormat::Yaml,
        };
        let spec = SopsCli::default().decrypt_command(&opts);
        assert_eq!(
            spec.args,
            vec!["decrypt", "--input-type", "yaml", "--output-type", "json", "/dev/stdin"]
        );
        assert_eq!(
            spec.env,
            vec![("SOPS_AGE_KEY".to_string(), "AGE-SECRET-KEY-1".to_string())]
        );

        let spec = SopsCli::default().decrypt_command(&DecryptOptions::default());
        assert!(spec.env.is_empty());
    }

    #[test]
    fn rendered_command_hides_inline_key() {
        let opts = DecryptOptions {
            identity: AgeIdentity::Inline("AGE-SECRET-KEY-1XYZ".to_string()),
            ..DecryptOptions::default()
        };
        let shown = SopsCli::default().decrypt_command(&opts).to_string();
        assert_eq!(
            shown,
            "SOPS_AGE_KEY=<redacted> sops decrypt --input-type json --output-type json /dev/stdin"
        );
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let cli = SopsCli::new("/nonexistent/sopsbridge-test-binary");
        let err = cli
            .decrypt(b"{}", &DecryptOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }), "{:?}", err);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_a_failure() {
        let cli = SopsCli::new("false");
        let err = cli
            .decrypt(b"{}", &DecryptOptions::default())
            .await
            .unwrap_err();
        assert!(
            matches!(
                err,
                ExecError::Failed {
                    operation: Operation::Decrypt,
                    ..
                }
            ),
            "{:?}",
            err
        );
    }
}
