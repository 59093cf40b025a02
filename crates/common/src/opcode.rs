//! Opcode definitions for the IPPcode24 instruction set.

use crate::error::ErrorCode;
use std::fmt;

/// Identifies the operation to perform.
///
/// The mnemonic is resolved once, when the program is parsed; the VM
/// dispatches on this enum with an exhaustive `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Frames and function calls
    /// Copy a symbol into a variable.
    Move,
    /// Create a fresh temporary frame.
    CreateFrame,
    /// Move the temporary frame onto the local frame stack.
    PushFrame,
    /// Move the top local frame back into the temporary frame.
    PopFrame,
    /// Declare a variable.
    DefVar,
    /// Push the return order and jump to a label.
    Call,
    /// Jump to the order on top of the call stack.
    Return,

    // Data stack
    /// Push a symbol onto the data stack.
    PushS,
    /// Pop the data stack into a variable.
    PopS,

    // Arithmetic, relational, boolean and conversion
    Add,
    Sub,
    Mul,
    /// Truncating integer division. Division by zero is a runtime error.
    IDiv,
    Lt,
    Gt,
    Eq,
    And,
    Or,
    Not,
    /// Code point to one-character string.
    Int2Char,
    /// Code point of the character at an index.
    Stri2Int,

    // Input / output
    /// Read one line of input as the given type.
    Read,
    /// Write a symbol to standard output.
    Write,

    // Strings
    Concat,
    StrLen,
    GetChar,
    SetChar,

    // Types
    /// Store the type name of a symbol.
    Type,

    // Control flow
    /// Jump target. Resolved by the parser; a no-op at runtime.
    Label,
    Jump,
    JumpIfEq,
    JumpIfNeq,
    /// Terminate with an exit code in 0..=9.
    Exit,

    // Debugging
    /// Write a symbol to the diagnostic stream.
    DPrint,
    /// Write a snapshot of the interpreter state to the diagnostic stream.
    Break,
}

/// All valid opcodes, in definition order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 35] = [
    Opcode::Move,
    Opcode::CreateFrame,
    Opcode::PushFrame,
    Opcode::PopFrame,
    Opcode::DefVar,
    Opcode::Call,
    Opcode::Return,
    Opcode::PushS,
    Opcode::PopS,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::IDiv,
    Opcode::Lt,
    Opcode::Gt,
    Opcode::Eq,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::Int2Char,
    Opcode::Stri2Int,
    Opcode::Read,
    Opcode::Write,
    Opcode::Concat,
    Opcode::StrLen,
    Opcode::GetChar,
    Opcode::SetChar,
    Opcode::Type,
    Opcode::Label,
    Opcode::Jump,
    Opcode::JumpIfEq,
    Opcode::JumpIfNeq,
    Opcode::Exit,
    Opcode::DPrint,
    Opcode::Break,
];

impl Opcode {
    /// Returns the upper-case mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Move => "MOVE",
            Opcode::CreateFrame => "CREATEFRAME",
            Opcode::PushFrame => "PUSHFRAME",
            Opcode::PopFrame => "POPFRAME",
            Opcode::DefVar => "DEFVAR",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::PushS => "PUSHS",
            Opcode::PopS => "POPS",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::IDiv => "IDIV",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Eq => "EQ",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Int2Char => "INT2CHAR",
            Opcode::Stri2Int => "STRI2INT",
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::Concat => "CONCAT",
            Opcode::StrLen => "STRLEN",
            Opcode::GetChar => "GETCHAR",
            Opcode::SetChar => "SETCHAR",
            Opcode::Type => "TYPE",
            Opcode::Label => "LABEL",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfEq => "JUMPIFEQ",
            Opcode::JumpIfNeq => "JUMPIFNEQ",
            Opcode::Exit => "EXIT",
            Opcode::DPrint => "DPRINT",
            Opcode::Break => "BREAK",
        }
    }

    /// Look up an opcode by its upper-case mnemonic.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        ALL_OPCODES
            .iter()
            .find(|op| op.mnemonic() == mnemonic)
            .copied()
    }

    /// Classification of a wrong operand count for this opcode.
    ///
    /// The arithmetic and relational opcodes report it as a semantic error;
    /// every other opcode reports a structural error.
    pub fn arity_error_code(&self) -> ErrorCode {
        match self {
            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::IDiv
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Eq => ErrorCode::Semantic,
            _ => ErrorCode::Structure,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
