//! Document tree → [`Program`].
//!
//! A single pass over the root's children builds the instruction map and
//! the label table together.

use crate::dom::Element;
use crate::error::ParseError;
use crate::operand::parse_argument;
use ippcode_common::instruction::MAX_ARGUMENTS;
use ippcode_common::{Argument, Instruction, Opcode, Program};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

const LANGUAGE: &str = "IPPcode24";

/// Accumulates instructions and labels while walking the document.
#[derive(Default)]
struct ProgramBuilder {
    instructions: BTreeMap<u64, Instruction>,
    labels: HashMap<String, u64>,
}

impl ProgramBuilder {
    fn add(&mut self, element: &Element) -> Result<(), ParseError> {
        if element.name != "instruction" {
            return Err(ParseError::UnexpectedElement {
                name: element.name.clone(),
            });
        }

        let opcode = parse_opcode(element.attribute("opcode"))?;
        let order = parse_order(element.attribute("order"))?;
        if self.instructions.contains_key(&order) {
            return Err(ParseError::DuplicateOrder { order });
        }

        let arguments = parse_arguments(element, order)?;
        let instr = Instruction::new(order, opcode, arguments);

        if opcode == Opcode::Label {
            if let Some(Argument::Label(name)) = instr.arg(0) {
                if self.labels.contains_key(name) {
                    return Err(ParseError::DuplicateLabel {
                        order,
                        label: name.clone(),
                    });
                }
                self.labels.insert(name.clone(), order);
            }
        }

        trace!(%instr, "parsed instruction");
        self.instructions.insert(order, instr);
        Ok(())
    }

    fn finish(self) -> Program {
        Program::new(self.instructions, self.labels)
    }
}

/// Validate a program tree and build its [`Program`].
pub(crate) fn parse_program(root: &Element) -> Result<Program, ParseError> {
    let language = root.attribute("language");
    if !language.is_some_and(|l| l.trim().eq_ignore_ascii_case(LANGUAGE)) {
        return Err(ParseError::InvalidLanguage {
            found: language.map(str::to_string),
        });
    }

    let mut builder = ProgramBuilder::default();
    for element in root.child_elements() {
        builder.add(element)?;
    }

    let program = builder.finish();
    debug!(
        instructions = program.len(),
        labels = program.labels.len(),
        "program parsed"
    );
    Ok(program)
}

fn parse_opcode(attribute: Option<&str>) -> Result<Opcode, ParseError> {
    let token = attribute.unwrap_or("").trim().to_uppercase();
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(ParseError::InvalidOpcode { token });
    }
    Opcode::from_mnemonic(&token).ok_or(ParseError::UnknownOpcode { token })
}

fn parse_order(attribute: Option<&str>) -> Result<u64, ParseError> {
    let token = attribute.unwrap_or("").trim();
    let order: i64 = token.parse().map_err(|_| ParseError::InvalidOrder {
        token: token.to_string(),
    })?;
    u64::try_from(order)
        .ok()
        .filter(|&order| order > 0)
        .ok_or(ParseError::NonPositiveOrder { order })
}

/// Slot index for an `argN` tag, or `None` if the tag is not one.
fn slot_index(tag: &str) -> Option<usize> {
    match tag {
        "arg1" => Some(0),
        "arg2" => Some(1),
        "arg3" => Some(2),
        _ => None,
    }
}

fn parse_arguments(
    element: &Element,
    order: u64,
) -> Result<[Option<Argument>; MAX_ARGUMENTS], ParseError> {
    let children: Vec<&Element> = element.child_elements().collect();
    let mut arguments: [Option<Argument>; MAX_ARGUMENTS] = Default::default();

    for child in &children {
        let tag = child.name.as_str();
        let index = slot_index(tag).ok_or_else(|| ParseError::InvalidArgumentTag {
            order,
            tag: tag.to_string(),
        })?;
        let kind = child
            .attribute("type")
            .ok_or_else(|| ParseError::MissingArgumentType {
                order,
                tag: tag.to_string(),
            })?;
        if index >= children.len() {
            return Err(ParseError::ArgumentOutOfRange {
                order,
                tag: tag.to_string(),
                count: children.len(),
            });
        }
        if arguments[index].is_some() {
            return Err(ParseError::DuplicateArgument {
                order,
                tag: tag.to_string(),
            });
        }

        let text = child.text_content();
        arguments[index] = Some(parse_argument(order, kind.trim(), text.trim())?);
    }

    Ok(arguments)
}
