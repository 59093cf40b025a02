//! Conversion of operand literal text into values.
//!
//! Integer literals are accepted in decimal, octal (`0o`) and hexadecimal
//! (`0x`) form with an optional sign. Octal and hex digits may be separated
//! by single underscores. String literals use `\DDD` escapes, where `DDD` is
//! a decimal code point.

use crate::error::LiteralError;

/// Parse an integer literal.
///
/// Accepts `[+-]?[0-9]+`, `[+-]?0[oO](_?[0-7])+` and
/// `[+-]?0[xX](_?[0-9a-fA-F])+`. Empty text is rejected; callers that
/// treat an empty `int@` operand as zero handle that themselves.
pub fn parse_int(text: &str) -> Result<i64, LiteralError> {
    let invalid = || LiteralError::InvalidInteger(text.to_string());

    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits) = if let Some(rest) = strip_prefix_ci(body, "0x") {
        (16, rest)
    } else if let Some(rest) = strip_prefix_ci(body, "0o") {
        (8, rest)
    } else {
        (10, body)
    };

    if digits.is_empty() {
        return Err(invalid());
    }

    let cleaned = if radix == 10 {
        digits.to_string()
    } else {
        // (_?d)+ : a separator is always followed by a digit
        if digits.ends_with('_') || digits.contains("__") {
            return Err(invalid());
        }
        digits.replace('_', "")
    };

    if !cleaned.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid());
    }

    let magnitude = u64::from_str_radix(&cleaned, radix)
        .map_err(|_| LiteralError::IntegerOverflow(text.to_string()))?;

    if negative {
        0i64.checked_sub_unsigned(magnitude)
            .ok_or_else(|| LiteralError::IntegerOverflow(text.to_string()))
    } else {
        i64::try_from(magnitude).map_err(|_| LiteralError::IntegerOverflow(text.to_string()))
    }
}

fn strip_prefix_ci<'t>(text: &'t str, prefix: &str) -> Option<&'t str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

/// Decode `\DDD` escape sequences into the characters they denote.
pub fn decode_escapes(text: &str) -> Result<String, LiteralError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let mut code = 0u32;
        for _ in 0..3 {
            let digit = chars
                .next()
                .and_then(|d| d.to_digit(10))
                .ok_or_else(|| LiteralError::InvalidEscape(text.to_string()))?;
            code = code * 10 + digit;
        }
        // Every value in 0..=999 is a Unicode scalar value.
        let decoded =
            char::from_u32(code).ok_or_else(|| LiteralError::InvalidEscape(text.to_string()))?;
        out.push(decoded);
    }

    Ok(out)
}

/// Decode `\DDD` escapes in text that was not validated as a string
/// literal. A backslash not followed by three digits is kept as is.
pub fn decode_escapes_lossy(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        let digits = tail.get(..3).filter(|d| d.bytes().all(|b| b.is_ascii_digit()));
        match digits.and_then(|d| d.parse::<u32>().ok()).and_then(char::from_u32) {
            Some(decoded) => {
                out.push(decoded);
                rest = &tail[3..];
            }
            None => {
                out.push('\\');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decimal() {
        assert_eq!(parse_int("42"), Ok(42));
        assert_eq!(parse_int("-17"), Ok(-17));
        assert_eq!(parse_int("+8"), Ok(8));
        assert_eq!(parse_int("007"), Ok(7));
    }

    #[test]
    fn octal_and_hex() {
        assert_eq!(parse_int("0o17"), Ok(15));
        assert_eq!(parse_int("0O7_7"), Ok(63));
        assert_eq!(parse_int("-0x1F"), Ok(-31));
        assert_eq!(parse_int("0xdead_beef"), Ok(0xdead_beef));
        assert_eq!(parse_int("0x_ff"), Ok(255));
    }

    #[test]
    fn rejects_malformed() {
        for text in ["", "-", "0x", "0o8", "0x1__2", "0x12_", "1_000", "12a", " 1", "--1"] {
            assert!(
                matches!(parse_int(text), Err(LiteralError::InvalidInteger(_))),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn range_limits() {
        assert_eq!(parse_int("-9223372036854775808"), Ok(i64::MIN));
        assert_eq!(parse_int("9223372036854775807"), Ok(i64::MAX));
        assert!(matches!(
            parse_int("9223372036854775808"),
            Err(LiteralError::IntegerOverflow(_))
        ));
    }

    #[test]
    fn escapes() {
        assert_eq!(decode_escapes("ab\\065c").unwrap(), "abAc");
        assert_eq!(decode_escapes("a\\032b\\010").unwrap(), "a b\n");
        assert_eq!(decode_escapes("\\092").unwrap(), "\\");
        assert_eq!(decode_escapes("plain").unwrap(), "plain");
    }

    #[test]
    fn lossy_decoding_keeps_stray_backslashes() {
        assert_eq!(decode_escapes_lossy(r"ab\065c"), "abAc");
        assert_eq!(decode_escapes_lossy(r"a\06"), r"a\06");
        assert_eq!(decode_escapes_lossy(r"\x\032"), "\\x ");
        assert_eq!(decode_escapes_lossy("trailing\\"), "trailing\\");
        assert_eq!(decode_escapes_lossy("é\\233"), "éé");
    }

    #[test]
    fn short_escape_is_rejected() {
        assert!(decode_escapes("a\\06").is_err());
        assert!(decode_escapes("\\0a1").is_err());
    }

    proptest! {
        /// Decimal rendering of any i64 parses back to the same number.
        #[test]
        fn decimal_text_parses(n in any::<i64>()) {
            prop_assert_eq!(parse_int(&n.to_string()), Ok(n));
        }

        /// Hex rendering of any non-negative i64 parses back.
        #[test]
        fn hex_text_parses(n in 0..=i64::MAX) {
            prop_assert_eq!(parse_int(&format!("0x{n:x}")), Ok(n));
        }
    }
}
