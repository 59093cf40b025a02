//! Runtime errors for the IPPcode24 VM.
//!
//! Every error carries the `order` of the instruction that raised it and
//! maps to an [`ErrorCode`] through [`RuntimeError::code`].

use ippcode_common::{ErrorCode, FrameKind, Opcode};
use thiserror::Error;

/// Errors that terminate execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// The instruction has the wrong number of operands.
    #[error("{opcode} expects {expected} operand(s), found {found} at order {order}")]
    OperandCount {
        order: u64,
        opcode: Opcode,
        expected: usize,
        found: usize,
    },

    /// An operand has the wrong shape or the wrong runtime type.
    #[error("invalid operand types for {opcode} at order {order}")]
    OperandType { order: u64, opcode: Opcode },

    /// The variable is not declared in its frame.
    #[error("undefined variable {variable} at order {order}")]
    UndefinedVariable { order: u64, variable: String },

    /// The variable is declared but was never assigned.
    #[error("uninitialized variable {variable} at order {order}")]
    UninitializedVariable { order: u64, variable: String },

    /// The addressed frame does not exist.
    #[error("frame {frame} does not exist at order {order}")]
    FrameNotFound { order: u64, frame: FrameKind },

    /// DEFVAR of a name already declared in the frame.
    #[error("variable {variable} redefined at order {order}")]
    VariableRedefinition { order: u64, variable: String },

    /// Jump or call to a label no LABEL instruction defines.
    #[error("undefined label '{label}' at order {order}")]
    UndefinedLabel { order: u64, label: String },

    /// POPS with an empty data stack.
    #[error("data stack is empty at order {order}")]
    EmptyDataStack { order: u64 },

    /// RETURN with an empty call stack.
    #[error("call stack is empty at order {order}")]
    EmptyCallStack { order: u64 },

    /// IDIV by zero.
    #[error("division by zero at order {order}")]
    DivisionByZero { order: u64 },

    /// EXIT with a code outside 0..=9.
    #[error("exit code {code} out of range 0-9 at order {order}")]
    InvalidExitCode { order: u64, code: i64 },

    /// String index outside the string.
    #[error("string index {index} out of range (length {length}) at order {order}")]
    StringIndexOutOfRange {
        order: u64,
        index: i64,
        length: usize,
    },

    /// INT2CHAR of a value that is not a Unicode scalar value.
    #[error("invalid code point {value} at order {order}")]
    InvalidCodePoint { order: u64, value: i64 },

    /// SETCHAR with an empty replacement string.
    #[error("empty replacement string at order {order}")]
    EmptySetcharSource { order: u64 },

    /// Reading input or writing output failed.
    #[error("I/O failure at order {order}: {message}")]
    Io { order: u64, message: String },
}

impl RuntimeError {
    /// The classification of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            RuntimeError::OperandCount { opcode, .. } => opcode.arity_error_code(),
            RuntimeError::OperandType { .. } => ErrorCode::OperandType,
            RuntimeError::UndefinedVariable { .. } | RuntimeError::UninitializedVariable { .. } => {
                ErrorCode::Variable
            }
            RuntimeError::FrameNotFound { .. } => ErrorCode::Frame,
            RuntimeError::VariableRedefinition { .. } | RuntimeError::UndefinedLabel { .. } => {
                ErrorCode::Semantic
            }
            RuntimeError::EmptyDataStack { .. } | RuntimeError::EmptyCallStack { .. } => {
                ErrorCode::MissingValue
            }
            RuntimeError::DivisionByZero { .. } | RuntimeError::InvalidExitCode { .. } => {
                ErrorCode::OperandValue
            }
            RuntimeError::StringIndexOutOfRange { .. }
            | RuntimeError::InvalidCodePoint { .. }
            | RuntimeError::EmptySetcharSource { .. } => ErrorCode::StringOperation,
            RuntimeError::Io { .. } => ErrorCode::Internal,
        }
    }
}
