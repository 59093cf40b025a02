//! IPPcode24 program loader.
//!
//! Turns the XML representation of a program into a validated
//! [`Program`]: opcodes resolved, operands converted to typed
//! [`Argument`](ippcode_common::Argument)s, orders checked for uniqueness
//! and the label table collected.
//!
//! # Usage
//!
//! ```
//! use ippcode_parser::parse_source;
//!
//! let xml = r#"<program language="IPPcode24">
//!   <instruction order="1" opcode="WRITE">
//!     <arg1 type="string">hello</arg1>
//!   </instruction>
//! </program>"#;
//! let program = parse_source(xml).unwrap();
//! assert_eq!(program.len(), 1);
//! ```
//!
//! Loading is split in two steps so callers can supply their own tree:
//! [`load_document`] converts XML text into an [`Element`], and
//! [`parse_program`] validates a tree.

pub mod dom;
pub mod error;
pub mod xml;

mod operand;
mod parser;

pub use dom::{Element, Node};
pub use error::ParseError;
pub use xml::load_document;

use ippcode_common::Program;

/// Validate a program tree rooted at `root`.
///
/// Returns the first error encountered.
pub fn parse_program(root: &Element) -> Result<Program, ParseError> {
    parser::parse_program(root)
}

/// Load XML text and validate it as a program.
pub fn parse_source(text: &str) -> Result<Program, ParseError> {
    let root = load_document(text)?;
    parse_program(&root)
}
