//! IPPcode24 common types.
//!
//! This crate provides the data model shared by the parser and the VM:
//!
//! - [`Opcode`]: the 35 instructions of the language
//! - [`DataType`]: the `int`/`bool`/`string`/`nil` type names
//! - [`Value`]: runtime values, including the unassigned state
//! - [`Argument`], [`Variable`], [`FrameKind`]: validated operands
//! - [`Instruction`] and [`Program`]: the parsed instruction map and labels
//! - [`Frame`]: an insertion-ordered variable container
//! - [`ErrorCode`]: the numeric failure classification (process exit codes)
//!
//! # Dependencies
//!
//! This crate uses `thiserror` (compile-time proc-macro, zero runtime cost)
//! and has no other dependencies.

pub mod data_type;
pub mod error;
pub mod frame;
pub mod instruction;
pub mod literal;
pub mod opcode;
pub mod program;
pub mod value;

// Re-export commonly used types at the crate root.
pub use data_type::DataType;
pub use error::{ErrorCode, LiteralError};
pub use frame::Frame;
pub use instruction::{Argument, FrameKind, Instruction, Variable};
pub use opcode::Opcode;
pub use program::Program;
pub use value::Value;
