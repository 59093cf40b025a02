//! Operand validation: `argN` text checked against its declared type.

use crate::error::ParseError;
use ippcode_common::literal::{decode_escapes, parse_int};
use ippcode_common::{Argument, DataType, FrameKind, Value, Variable};
use regex::Regex;
use std::sync::LazyLock;

static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([LTG]F)@([A-Za-z_\-&%*$!?][A-Za-z0-9_\-&%*$!?]*)$").expect("variable pattern")
});

static LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_\-&%*$!?][A-Za-z0-9_\-&%*$!?]*$").expect("label pattern")
});

// No `#`, and a backslash only as the start of a three-digit escape.
static STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[^#\\]|\\[0-9]{3})*$").expect("string pattern"));

/// Convert the trimmed text of an operand element into an [`Argument`].
pub(crate) fn parse_argument(order: u64, kind: &str, text: &str) -> Result<Argument, ParseError> {
    let invalid = || ParseError::InvalidArgumentValue {
        order,
        kind: kind.to_string(),
        value: text.to_string(),
    };

    match kind {
        "var" => {
            let captures = VARIABLE.captures(text).ok_or_else(invalid)?;
            let frame = FrameKind::from_prefix(&captures[1]).ok_or_else(invalid)?;
            Ok(Argument::Var(Variable::new(frame, &captures[2])))
        }
        "label" => {
            if LABEL.is_match(text) {
                Ok(Argument::Label(text.to_string()))
            } else {
                Err(invalid())
            }
        }
        "type" => DataType::from_name(text)
            .map(Argument::Type)
            .ok_or_else(invalid),
        "int" => {
            if text.is_empty() {
                return Ok(Argument::Const(Value::Int(0)));
            }
            let value = parse_int(text).map_err(|_| invalid())?;
            Ok(Argument::Const(Value::Int(value)))
        }
        "string" => {
            if !STRING.is_match(text) {
                return Err(invalid());
            }
            let decoded = decode_escapes(text).map_err(|_| invalid())?;
            Ok(Argument::Const(Value::Str(decoded)))
        }
        "bool" => {
            if text.eq_ignore_ascii_case("true") {
                Ok(Argument::Const(Value::Bool(true)))
            } else if text.eq_ignore_ascii_case("false") {
                Ok(Argument::Const(Value::Bool(false)))
            } else {
                Err(invalid())
            }
        }
        "nil" => {
            if text.eq_ignore_ascii_case("nil") {
                Ok(Argument::Const(Value::Nil))
            } else {
                Err(invalid())
            }
        }
        _ => Err(ParseError::UnknownArgumentType {
            order,
            kind: kind.to_string(),
        }),
    }
}
