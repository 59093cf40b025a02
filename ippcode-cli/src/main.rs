//! IPPcode24 CLI: load an XML program and interpret it.
//!
//! Exit codes:
//! - 0-9: Normal completion, or the operand of EXIT
//! - 10: Missing or invalid command-line parameter
//! - 11: Source or input file cannot be read
//! - 31: Program document is not well-formed XML
//! - 32, 52: Invalid program structure or semantics
//! - 53-58: Runtime error
//! - 99: Internal error

mod commands;

use clap::Parser;
use ippcode_common::ErrorCode;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "IPPCODE_LOG";

/// Interpret an IPPcode24 program stored as XML.
///
/// At least one of --source and --input must be given; the other is read
/// from standard input.
#[derive(Parser, Debug)]
#[command(name = "ippcode", version, about)]
pub struct Cli {
    /// XML program file (standard input when omitted)
    #[arg(long, value_name = "FILE")]
    pub source: Option<PathBuf>,

    /// Input file for READ (standard input when omitted)
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are reported through the error path too.
            let code = if e.use_stderr() {
                ErrorCode::MissingOption.as_i32()
            } else {
                0
            };
            let _ = e.print();
            process::exit(code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let code = match commands::interpret(&cli) {
        Ok(code) => code,
        Err(code) => code,
    };
    process::exit(code);
}
