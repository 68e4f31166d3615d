mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use sopsbridge_exec::DocumentFormat;
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Convert configuration values to JSON and run them through sops.
#[derive(Parser)]
#[command(
    name = "sopsbridge",
    version,
    about = "Convert configuration values to JSON and run them through sops"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log more detail to stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the content hash of a document
    Hash {
        /// Path to the document
        file: PathBuf,
        /// Read the document in typed interchange form instead of plain JSON
        #[arg(long)]
        typed: bool,
    },

    /// Show the type inferred for a plain JSON document
    Inspect {
        /// Path to the JSON document
        file: PathBuf,
    },

    /// Encrypt a JSON object with sops
    Encrypt {
        /// Path to the document
        file: PathBuf,
        /// Read the document in typed interchange form instead of plain JSON
        #[arg(long)]
        typed: bool,
        /// age recipient public key (repeatable; overrides config)
        #[arg(long = "age", value_name = "RECIPIENT")]
        age: Vec<String>,
        /// Format of the encrypted output (json or yaml)
        #[arg(long)]
        output_type: Option<DocumentFormat>,
        /// Indentation of the encrypted output
        #[arg(long)]
        indent: Option<u32>,
        /// Leave keys with this suffix unencrypted
        #[arg(long)]
        unencrypted_suffix: Option<String>,
        /// Only encrypt keys with this suffix
        #[arg(long)]
        encrypted_suffix: Option<String>,
        /// Leave keys matching this regex unencrypted
        #[arg(long)]
        unencrypted_regex: Option<String>,
        /// Only encrypt keys matching this regex
        #[arg(long)]
        encrypted_regex: Option<String>,
    },

    /// Decrypt a sops document back to JSON
    Decrypt {
        /// Path to the encrypted document
        file: PathBuf,
        /// Format of the encrypted document (json or yaml)
        #[arg(long)]
        input_type: Option<DocumentFormat>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            report_error(&e, cli.output, cli.quiet);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Hash { file, typed } => commands::hash::cmd_hash(&file, typed, cli.output),
        Commands::Inspect { file } => commands::inspect::cmd_inspect(&file, cli.output),
        Commands::Encrypt {
            file,
            typed,
            age,
            output_type,
            indent,
            unencrypted_suffix,
            encrypted_suffix,
            unencrypted_regex,
            encrypted_regex,
        } => commands::encrypt::cmd_encrypt(
            &file,
            &config,
            commands::encrypt::EncryptFlags {
                typed,
                age,
                output_type,
                indent,
                unencrypted_suffix,
                encrypted_suffix,
                unencrypted_regex,
                encrypted_regex,
            },
            cli.output,
            cli.quiet,
        ),
        Commands::Decrypt { file, input_type } => {
            commands::decrypt::cmd_decrypt(&file, &config, input_type, cli.output)
        }
    };

    if let Err(msg) = result {
        report_error(&msg, cli.output, cli.quiet);
        process::exit(1);
    }
}

/// Logs go to stderr. `RUST_LOG` applies unless `--verbose` is given.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
