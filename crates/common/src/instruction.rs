//! Instructions and their operands.
//!
//! An instruction has a unique positive `order`, an opcode and up to three
//! operand slots. Operands are validated and converted when the program is
//! parsed, so the VM never re-parses operand text.

use crate::data_type::DataType;
use crate::opcode::Opcode;
use crate::value::Value;
use std::fmt;

/// Maximum number of operand slots per instruction.
pub const MAX_ARGUMENTS: usize = 3;

/// The frame a variable lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// `GF`: lives for the whole run.
    Global,
    /// `LF`: the top of the local frame stack.
    Local,
    /// `TF`: the temporary frame, if one exists.
    Temporary,
}

impl FrameKind {
    /// Returns the two-letter prefix used in source text.
    pub fn prefix(&self) -> &'static str {
        match self {
            FrameKind::Global => "GF",
            FrameKind::Local => "LF",
            FrameKind::Temporary => "TF",
        }
    }

    /// Look up a frame kind by its prefix.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "GF" => Some(FrameKind::Global),
            "LF" => Some(FrameKind::Local),
            "TF" => Some(FrameKind::Temporary),
            _ => None,
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A variable reference such as `GF@counter`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    pub frame: FrameKind,
    pub name: String,
}

impl Variable {
    pub fn new(frame: FrameKind, name: impl Into<String>) -> Self {
        Self {
            frame,
            name: name.into(),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.frame, self.name)
    }
}

/// A validated instruction operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    /// `var`: a variable reference.
    Var(Variable),
    /// `label`: a jump target name.
    Label(String),
    /// `type`: a data type name, used by `READ`.
    Type(DataType),
    /// `int`, `bool`, `string` or `nil` constant.
    Const(Value),
}

impl Argument {
    /// Returns true for operands that can be read as a value: variables
    /// and constants.
    pub fn is_symbol(&self) -> bool {
        matches!(self, Argument::Var(_) | Argument::Const(_))
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Var(var) => write!(f, "{var}"),
            Argument::Label(name) => write!(f, "label@{name}"),
            Argument::Type(ty) => write!(f, "type@{ty}"),
            Argument::Const(value) => f.write_str(&value.to_literal()),
        }
    }
}

/// A single parsed instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Unique positive position key. Not necessarily contiguous.
    pub order: u64,
    /// The operation to perform.
    pub opcode: Opcode,
    /// Operand slots `arg1`..`arg3`, zero-based.
    pub arguments: [Option<Argument>; MAX_ARGUMENTS],
}

impl Instruction {
    /// Create an instruction from its operand slots.
    pub fn new(order: u64, opcode: Opcode, arguments: [Option<Argument>; MAX_ARGUMENTS]) -> Self {
        Self {
            order,
            opcode,
            arguments,
        }
    }

    /// Create an instruction whose operands fill the first slots in order.
    ///
    /// Operands beyond [`MAX_ARGUMENTS`] are ignored.
    pub fn with_args(order: u64, opcode: Opcode, args: Vec<Argument>) -> Self {
        let mut arguments: [Option<Argument>; MAX_ARGUMENTS] = Default::default();
        for (slot, arg) in arguments.iter_mut().zip(args) {
            *slot = Some(arg);
        }
        Self::new(order, opcode, arguments)
    }

    /// Number of filled operand slots.
    pub fn arity(&self) -> usize {
        self.arguments.iter().filter(|arg| arg.is_some()).count()
    }

    /// Returns true if exactly the first `count` slots are filled.
    pub fn has_arity(&self, count: usize) -> bool {
        self.arguments
            .iter()
            .enumerate()
            .all(|(idx, arg)| arg.is_some() == (idx < count))
    }

    /// The operand in slot `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&Argument> {
        self.arguments.get(index).and_then(Option::as_ref)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.order, self.opcode)?;
        for arg in self.arguments.iter().flatten() {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gf(name: &str) -> Argument {
        Argument::Var(Variable::new(FrameKind::Global, name))
    }

    #[test]
    fn frame_prefixes_roundtrip() {
        for kind in [FrameKind::Global, FrameKind::Local, FrameKind::Temporary] {
            assert_eq!(FrameKind::from_prefix(kind.prefix()), Some(kind));
        }
        assert_eq!(FrameKind::from_prefix("XF"), None);
    }

    #[test]
    fn variable_display() {
        let var = Variable::new(FrameKind::Temporary, "tmp_1");
        assert_eq!(var.to_string(), "TF@tmp_1");
    }

    #[test]
    fn symbols() {
        assert!(gf("x").is_symbol());
        assert!(Argument::Const(Value::Nil).is_symbol());
        assert!(!Argument::Label("end".to_string()).is_symbol());
        assert!(!Argument::Type(DataType::Int).is_symbol());
    }

    #[test]
    fn arity_counts_filled_slots() {
        let instr = Instruction::with_args(1, Opcode::Move, vec![gf("x"), Argument::Const(Value::Int(1))]);
        assert_eq!(instr.arity(), 2);
        assert!(instr.has_arity(2));
        assert!(!instr.has_arity(1));
        assert!(!instr.has_arity(3));
    }

    #[test]
    fn has_arity_requires_leading_slots() {
        let instr = Instruction::new(4, Opcode::Write, [None, Some(gf("x")), None]);
        assert_eq!(instr.arity(), 1);
        assert!(!instr.has_arity(1));
    }

    #[test]
    fn no_arguments() {
        let instr = Instruction::with_args(3, Opcode::CreateFrame, vec![]);
        assert!(instr.has_arity(0));
        assert_eq!(instr.arg(0), None);
    }

    #[test]
    fn display() {
        let instr = Instruction::with_args(
            7,
            Opcode::Add,
            vec![gf("sum"), Argument::Const(Value::Int(2)), Argument::Const(Value::Int(3))],
        );
        assert_eq!(instr.to_string(), "7: ADD GF@sum int@2 int@3");
    }
}
