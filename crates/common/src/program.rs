//! Program representation: instructions keyed by order plus the label table.

use crate::instruction::{Argument, Instruction};
use crate::opcode::Opcode;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

/// A parsed IPPcode24 program.
///
/// Instructions are keyed by their `order` and always iterated in ascending
/// order, regardless of their position in the source document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// The instruction map, ordered by `order`.
    pub instructions: BTreeMap<u64, Instruction>,
    /// Label name to the order of its `LABEL` instruction.
    pub labels: HashMap<String, u64>,
}

impl Program {
    /// Create a program from an instruction map and a label table.
    pub fn new(instructions: BTreeMap<u64, Instruction>, labels: HashMap<String, u64>) -> Self {
        Self {
            instructions,
            labels,
        }
    }

    /// Build a program from a list of instructions, deriving the label
    /// table from `LABEL` instructions. Later duplicates overwrite earlier
    /// ones; the parser is responsible for rejecting them.
    pub fn from_instructions(instructions: impl IntoIterator<Item = Instruction>) -> Self {
        let mut program = Self::default();
        for instr in instructions {
            if instr.opcode == Opcode::Label {
                if let Some(Argument::Label(name)) = instr.arg(0) {
                    program.labels.insert(name.clone(), instr.order);
                }
            }
            program.instructions.insert(instr.order, instr);
        }
        program
    }

    /// Order of the first instruction, or `None` for an empty program.
    pub fn first_order(&self) -> Option<u64> {
        self.instructions.keys().next().copied()
    }

    /// Smallest order strictly greater than `order`.
    pub fn next_order(&self, order: u64) -> Option<u64> {
        self.instructions
            .range((Bound::Excluded(order), Bound::Unbounded))
            .next()
            .map(|(&next, _)| next)
    }

    /// The instruction with the given order.
    pub fn get(&self, order: u64) -> Option<&Instruction> {
        self.instructions.get(&order)
    }

    /// The order a label is bound to.
    pub fn label(&self, name: &str) -> Option<u64> {
        self.labels.get(name).copied()
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
