//! Runtime value representation for the IPPcode24 interpreter.
//!
//! Values are what live in variables and on the data stack. Text is only
//! produced from a value at the output boundary (see the `Display` impl).

use crate::data_type::DataType;
use std::fmt;

/// Runtime value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Signed 64-bit integer.
    Int(i64),
    /// Boolean value.
    Bool(bool),
    /// Unicode string with escape sequences already decoded.
    Str(String),
    /// The `nil` value.
    Nil,
    /// A declared variable that has not been assigned yet. Never produced
    /// by an operand and never stored on the data stack.
    Uninit,
}

impl Value {
    /// Returns the data type, or `None` for an unassigned variable.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Int(_) => Some(DataType::Int),
            Value::Bool(_) => Some(DataType::Bool),
            Value::Str(_) => Some(DataType::String),
            Value::Nil => Some(DataType::Nil),
            Value::Uninit => None,
        }
    }

    /// Returns the type name as reported by `TYPE`: empty for `Uninit`.
    pub fn type_name(&self) -> &'static str {
        self.data_type().map_or("", |ty| ty.name())
    }

    /// Returns true if the variable holding this value was never assigned.
    pub fn is_uninit(&self) -> bool {
        matches!(self, Value::Uninit)
    }

    /// Returns true for `nil`.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// The constant this value would be written as in source text, e.g.
    /// `int@5` or `string@abc`. Used by diagnostics.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Nil => "nil@nil".to_string(),
            Value::Uninit => "(uninitialized)".to_string(),
            other => format!("{}@{}", other.type_name(), other),
        }
    }
}

/// Output rendering used by `WRITE`: `nil` prints nothing, booleans print
/// as `true`/`false`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => f.write_str(s),
            Value::Nil | Value::Uninit => Ok(()),
        }
    }
}
