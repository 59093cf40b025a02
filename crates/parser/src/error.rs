//! Error types for the IPPcode24 instruction parser.

use ippcode_common::ErrorCode;
use thiserror::Error;

/// Errors produced while loading and validating a program document.
///
/// Every variant maps to an [`ErrorCode`] via [`ParseError::code`]. All of
/// them are raised before execution starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The document is not well-formed XML.
    #[error("malformed XML: {message}")]
    MalformedXml { message: String },

    /// The root element does not declare `language="IPPcode24"`.
    #[error("root element must declare language \"IPPcode24\", found {found:?}")]
    InvalidLanguage { found: Option<String> },

    /// A child of the root element is not an `instruction` element.
    #[error("unexpected element <{name}> in program")]
    UnexpectedElement { name: String },

    /// The `opcode` attribute is missing or not `[A-Z0-9]+`.
    #[error("invalid opcode '{token}'")]
    InvalidOpcode { token: String },

    /// The `opcode` attribute is well-formed but names no instruction.
    #[error("unknown opcode '{token}'")]
    UnknownOpcode { token: String },

    /// The `order` attribute is missing or not an integer.
    #[error("invalid order '{token}'")]
    InvalidOrder { token: String },

    /// The `order` attribute is zero or negative.
    #[error("order must be positive, found {order}")]
    NonPositiveOrder { order: i64 },

    /// Two instructions share the same order.
    #[error("duplicate order {order}")]
    DuplicateOrder { order: u64 },

    /// An operand element is not named `arg1`, `arg2` or `arg3`.
    #[error("order {order}: unexpected operand element <{tag}>")]
    InvalidArgumentTag { order: u64, tag: String },

    /// An operand element has no `type` attribute.
    #[error("order {order}: <{tag}> has no type attribute")]
    MissingArgumentType { order: u64, tag: String },

    /// `argN` refers past the number of operand elements present.
    #[error("order {order}: <{tag}> given with only {count} operand element(s)")]
    ArgumentOutOfRange { order: u64, tag: String, count: usize },

    /// The same `argN` appears twice.
    #[error("order {order}: duplicate <{tag}>")]
    DuplicateArgument { order: u64, tag: String },

    /// The `type` attribute names no operand kind.
    #[error("order {order}: unknown operand type '{kind}'")]
    UnknownArgumentType { order: u64, kind: String },

    /// The operand text does not match its declared type.
    #[error("order {order}: invalid {kind} operand '{value}'")]
    InvalidArgumentValue {
        order: u64,
        kind: String,
        value: String,
    },

    /// A label name is defined by more than one `LABEL`.
    #[error("order {order}: duplicate label '{label}'")]
    DuplicateLabel { order: u64, label: String },
}

impl ParseError {
    /// The classification of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ParseError::MalformedXml { .. } => ErrorCode::MalformedXml,
            ParseError::DuplicateLabel { .. } => ErrorCode::Semantic,
            _ => ErrorCode::Structure,
        }
    }
}
