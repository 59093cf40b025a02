//! IPPcode24 virtual machine: executes parsed programs.
//!
//! The VM walks the instructions of a [`Program`] in ascending order and
//! keeps:
//! - A global frame, an optional temporary frame and a stack of local frames
//! - A data stack for PUSHS/POPS
//! - A call stack of return orders for CALL/RETURN
//!
//! # Usage
//!
//! ```
//! use ippcode_common::{Argument, Instruction, Opcode, Program, Value};
//! use ippcode_vm::run;
//!
//! let program = Program::from_instructions(vec![Instruction::with_args(
//!     1,
//!     Opcode::Write,
//!     vec![Argument::Const(Value::Str("hi".into()))],
//! )]);
//!
//! let mut out = Vec::new();
//! let code = run(&program, std::io::empty(), &mut out, std::io::sink()).unwrap();
//! assert_eq!(code, 0);
//! assert_eq!(out, b"hi");
//! ```

pub mod error;
pub mod execute;
pub mod input;
pub mod machine;

pub use error::RuntimeError;
pub use input::LineSource;
pub use machine::VM;

use ippcode_common::Program;
use std::io::Write;

/// Execute a program and return its exit code.
///
/// `input` feeds READ, `stdout` receives WRITE output and `stderr`
/// receives DPRINT and BREAK output.
///
/// # Errors
///
/// Returns [`RuntimeError`] for the first failing instruction; output
/// written before the failure stays in the sinks.
pub fn run<'a>(
    program: &'a Program,
    input: impl LineSource + 'a,
    stdout: impl Write + 'a,
    stderr: impl Write + 'a,
) -> Result<i32, RuntimeError> {
    VM::new(program)
        .with_input(input)
        .with_stdout(stdout)
        .with_stderr(stderr)
        .execute()
}
