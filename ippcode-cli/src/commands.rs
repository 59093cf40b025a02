//! CLI command implementation.

use crate::Cli;
use ippcode_common::{ErrorCode, Program};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;
use tracing::{debug, info};

/// Load the program, run it and return the process exit code.
///
/// `Err` carries the code of a failure that has already been reported
/// on stderr.
pub fn interpret(cli: &Cli) -> Result<i32, i32> {
    if cli.source.is_none() && cli.input.is_none() {
        eprintln!("error: at least one of --source and --input is required");
        return Err(ErrorCode::MissingOption.as_i32());
    }

    let text = match &cli.source {
        Some(path) => read_file(path)?,
        None => read_stdin()?,
    };
    let input: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(File::open(path).map_err(|e| {
            eprintln!("error: cannot open '{}': {e}", path.display());
            ErrorCode::InputFile.as_i32()
        })?)),
        None => Box::new(io::stdin().lock()),
    };

    let program = load(&text)?;
    info!(instructions = program.len(), "program loaded");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = ippcode_vm::run(&program, input, &mut out, io::stderr());

    // Output written before a failure is still delivered.
    let flushed = out.flush();

    match result {
        Ok(code) => {
            flushed.map_err(|e| {
                eprintln!("error: cannot write output: {e}");
                ErrorCode::Internal.as_i32()
            })?;
            debug!(code, "interpreter finished");
            Ok(code)
        }
        Err(e) => {
            eprintln!("error: {e}");
            Err(e.code().as_i32())
        }
    }
}

/// Parse program text, mapping failures to exit codes.
fn load(text: &str) -> Result<Program, i32> {
    ippcode_parser::parse_source(text).map_err(|e| {
        eprintln!("error: {e}");
        e.code().as_i32()
    })
}

fn read_file(path: &Path) -> Result<String, i32> {
    fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{}': {e}", path.display());
        ErrorCode::InputFile.as_i32()
    })
}

fn read_stdin() -> Result<String, i32> {
    let mut text = String::new();
    io::stdin().read_to_string(&mut text).map_err(|e| {
        eprintln!("error: cannot read standard input: {e}");
        ErrorCode::InputFile.as_i32()
    })?;
    Ok(text)
}
