//! Error classification shared by the parser, the VM and the CLI.
//!
//! Every failure of the interpreter maps onto one [`ErrorCode`], which is
//! also the process exit status. The numeric values are fixed by the
//! IPPcode24 toolchain and never overlap the 0-9 range used by `EXIT`.

use thiserror::Error;

/// Numeric classification of an interpreter failure.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A required command-line option is missing.
    MissingOption = 10,
    /// A source or input file could not be opened or read.
    InputFile = 11,
    /// The XML document is not well-formed.
    MalformedXml = 31,
    /// Unexpected XML structure or malformed instruction/operand text.
    Structure = 32,
    /// Semantic error: label or variable redefinition, undefined label.
    Semantic = 52,
    /// Wrong operand type.
    OperandType = 53,
    /// Access to an undeclared or unassigned variable.
    Variable = 54,
    /// The addressed frame does not exist.
    Frame = 55,
    /// Missing value on the data stack or the call stack.
    MissingValue = 56,
    /// Invalid operand value.
    OperandValue = 57,
    /// Invalid string operation.
    StringOperation = 58,
    /// Internal failure (an I/O collaborator failed).
    Internal = 99,
}

impl ErrorCode {
    /// The process exit status for this classification.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        code.as_i32()
    }
}

/// Errors from converting literal operand text into a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    /// The text is not an integer literal in any accepted base.
    #[error("invalid integer literal '{0}'")]
    InvalidInteger(String),

    /// The literal is well-formed but does not fit in 64 bits.
    #[error("integer literal '{0}' out of range")]
    IntegerOverflow(String),

    /// A backslash is not followed by exactly three decimal digits.
    #[error("invalid escape sequence in '{0}'")]
    InvalidEscape(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_toolchain_values() {
        assert_eq!(ErrorCode::MalformedXml.as_i32(), 31);
        assert_eq!(ErrorCode::Structure.as_i32(), 32);
        assert_eq!(ErrorCode::Semantic.as_i32(), 52);
        assert_eq!(ErrorCode::StringOperation.as_i32(), 58);
        assert_eq!(i32::from(ErrorCode::Frame), 55);
    }

    #[test]
    fn display_literal_errors() {
        assert_eq!(
            LiteralError::InvalidInteger("0x".to_string()).to_string(),
            "invalid integer literal '0x'"
        );
        assert_eq!(
            LiteralError::InvalidEscape("a\\1".to_string()).to_string(),
            "invalid escape sequence in 'a\\1'"
        );
    }
}
