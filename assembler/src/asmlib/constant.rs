//! Constants, as written in `BYTE` operands and in literals.
//!
//! * `C'...'`: one byte per character.
//! * `X'...'`: one byte per pair of hex digits.  If there is an odd
//!   number of digits, the last digit forms a byte on its own.
//! * a decimal number: a 3-byte (one word) big-endian value.
use std::error::Error;
use std::fmt::{self, Display, Formatter};

use super::rx::LazyRegex;

static QUOTED_RX: LazyRegex = LazyRegex::new("^([CcXx])'([^']*)'$");
static DECIMAL_RX: LazyRegex = LazyRegex::new("^[+-]?[0-9]+$");

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Constant {
    Characters(Vec<u8>),
    Hex(Vec<u8>),
    Decimal(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BadConstant {
    pub(crate) text: String,
    pub(crate) reason: &'static str,
}

impl Display for BadConstant {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "bad constant {}: {}", self.text, self.reason)
    }
}

impl Error for BadConstant {}

/// Parse a decimal number as used in operands (RESW, RESB, WORD and
/// so on).
pub(crate) fn parse_decimal(text: &str) -> Option<i64> {
    if DECIMAL_RX.is_match(text) {
        text.parse().ok()
    } else {
        None
    }
}

fn decode_hex_digits(digits: &str) -> Option<Vec<u8>> {
    let values: Vec<u8> = digits
        .chars()
        .map(|ch| ch.to_digit(16).and_then(|d| u8::try_from(d).ok()))
        .collect::<Option<Vec<u8>>>()?;
    Some(
        values
            .chunks(2)
            .map(|pair| match pair {
                [high, low] => (high << 4) | low,
                [single] => *single,
                _ => 0,
            })
            .collect(),
    )
}

impl Constant {
    /// Parse a constant.  A leading `=` (as in a literal) should
    /// already have been removed.
    pub(crate) fn parse(text: &str) -> Result<Constant, BadConstant> {
        let bad = |reason: &'static str| BadConstant {
            text: text.to_string(),
            reason,
        };
        if let Some(caps) = QUOTED_RX.captures(text) {
            let body = caps.get(2).map_or("", |m| m.as_str());
            let kind = caps.get(1).map_or("", |m| m.as_str());
            if kind.eq_ignore_ascii_case("C") {
                if !body.is_ascii() {
                    return Err(bad("character constants must be ASCII"));
                }
                Ok(Constant::Characters(body.as_bytes().to_vec()))
            } else {
                decode_hex_digits(body)
                    .map(Constant::Hex)
                    .ok_or_else(|| bad("hex constants may contain only hex digits"))
            }
        } else if let Some(n) = parse_decimal(text) {
            Ok(Constant::Decimal(n))
        } else {
            Err(bad("expected C'...', X'...' or a decimal number"))
        }
    }

    /// Parse a literal operand such as `=X'05'`.
    pub(crate) fn parse_literal(text: &str) -> Result<Constant, BadConstant> {
        Constant::parse(text.strip_prefix('=').unwrap_or(text))
    }

    pub(crate) fn size(&self) -> u32 {
        match self {
            Constant::Characters(bytes) | Constant::Hex(bytes) => {
                u32::try_from(bytes.len()).unwrap_or(u32::MAX)
            }
            Constant::Decimal(_) => 3,
        }
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        match self {
            Constant::Characters(bytes) | Constant::Hex(bytes) => bytes.clone(),
            Constant::Decimal(n) => word_bytes(*n).to_vec(),
        }
    }
}

/// The low 24 bits of `value`, big-endian.
pub(crate) fn word_bytes(value: i64) -> [u8; 3] {
    let [.., a, b, c] = value.to_be_bytes();
    [a, b, c]
}
