//! The small expression language used by `EQU` and `WORD`.
//!
//! An expression is one of `*` (the current location), a decimal
//! number, a symbol, or the difference of two symbols `A-B`.
use std::fmt::{self, Display, Formatter};

use base::prelude::Address;

use super::constant::parse_decimal;
use super::records::Sign;

/// The result of looking a name up while evaluating an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution {
    Local(Address),
    /// The name appears in the section's EXTREF list; its value is
    /// not known until the program is linked, so it evaluates to 0.
    External,
    Undefined,
}

pub(crate) trait SymbolLookup {
    fn resolve(&self, name: &str) -> Resolution;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Expression {
    Here,
    Number(i64),
    Symbol(String),
    Difference(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ExpressionError {
    /// Only a single subtraction of two names is supported.
    Unsupported(String),
    Undefined(Vec<String>),
}

impl Display for ExpressionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            ExpressionError::Unsupported(text) => {
                write!(f, "unsupported expression {text:?}")
            }
            ExpressionError::Undefined(names) => {
                write!(f, "undefined symbol(s) {}", names.join(", "))
            }
        }
    }
}

impl Expression {
    pub(crate) fn parse(text: &str) -> Result<Expression, ExpressionError> {
        let text = text.trim();
        if text == "*" {
            return Ok(Expression::Here);
        }
        // A leading minus sign belongs to a number, not a subtraction.
        if let Some(n) = parse_decimal(text) {
            return Ok(Expression::Number(n));
        }
        if text.contains('-') {
            let terms: Vec<&str> = text.split('-').map(str::trim).collect();
            return match terms.as_slice() {
                [a, b] if !a.is_empty() && !b.is_empty() => {
                    Ok(Expression::Difference((*a).to_string(), (*b).to_string()))
                }
                _ => Err(ExpressionError::Unsupported(text.to_string())),
            };
        }
        if text.is_empty() || !text.chars().all(is_symbol_char) {
            return Err(ExpressionError::Unsupported(text.to_string()));
        }
        Ok(Expression::Symbol(text.to_string()))
    }

    pub(crate) fn evaluate<L: SymbolLookup>(
        &self,
        here: Address,
        symbols: &L,
    ) -> Result<i64, ExpressionError> {
        let value_of = |name: &str| -> Option<i64> {
            match symbols.resolve(name) {
                Resolution::Local(a) => Some(i64::from(a.value())),
                Resolution::External => Some(0),
                Resolution::Undefined => None,
            }
        };
        match self {
            Expression::Here => Ok(i64::from(here.value())),
            Expression::Number(n) => Ok(*n),
            Expression::Symbol(name) => {
                value_of(name).ok_or_else(|| ExpressionError::Undefined(vec![name.clone()]))
            }
            Expression::Difference(a, b) => match (value_of(a), value_of(b)) {
                (Some(x), Some(y)) => Ok(x - y),
                (x, y) => {
                    let mut missing = Vec::new();
                    if x.is_none() {
                        missing.push(a.clone());
                    }
                    if y.is_none() {
                        missing.push(b.clone());
                    }
                    Err(ExpressionError::Undefined(missing))
                }
            },
        }
    }
}

fn is_symbol_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Split an expression into its terms, each with the sign which
/// precedes it.  A term with no sign before it is positive, and the
/// sign does not carry over from one term to the next.  Characters
/// which are neither signs nor part of a name are skipped.
///
/// `BUFEND-BUFFER` yields `[(+, BUFEND), (-, BUFFER)]`.
pub(crate) fn signed_terms(text: &str) -> Vec<(Sign, &str)> {
    let mut terms = Vec::new();
    let mut sign = Sign::Plus;
    let mut chars = text.char_indices().peekable();
    while let Some((start, ch)) = chars.next() {
        match ch {
            '+' => sign = Sign::Plus,
            '-' => sign = Sign::Minus,
            ch if is_symbol_char(ch) => {
                let mut end = start + ch.len_utf8();
                while let Some(&(pos, next)) = chars.peek() {
                    if !is_symbol_char(next) {
                        break;
                    }
                    end = pos + next.len_utf8();
                    chars.next();
                }
                terms.push((sign, &text[start..end]));
                sign = Sign::Plus;
            }
            _ => (),
        }
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct Table(BTreeMap<&'static str, Resolution>);

    impl SymbolLookup for Table {
        fn resolve(&self, name: &str) -> Resolution {
            self.0.get(name).copied().unwrap_or(Resolution::Undefined)
        }
    }

    fn table() -> Table {
        Table(BTreeMap::from([
            ("BUFEND", Resolution::Local(Address::new(0x1036))),
            ("BUFFER", Resolution::Local(Address::new(0x0036))),
            ("RDREC", Resolution::External),
        ]))
    }

    #[test]
    fn parse_forms() {
        assert_eq!(Expression::parse("*"), Ok(Expression::Here));
        assert_eq!(Expression::parse("4096"), Ok(Expression::Number(4096)));
        assert_eq!(Expression::parse("-5"), Ok(Expression::Number(-5)));
        assert_eq!(
            Expression::parse("BUFEND-BUFFER"),
            Ok(Expression::Difference("BUFEND".into(), "BUFFER".into()))
        );
        assert_eq!(
            Expression::parse("LENGTH"),
            Ok(Expression::Symbol("LENGTH".into()))
        );
        assert!(matches!(
            Expression::parse("A-B-C"),
            Err(ExpressionError::Unsupported(_))
        ));
        assert!(matches!(
            Expression::parse("A+B"),
            Err(ExpressionError::Unsupported(_))
        ));
    }

    #[test]
    fn evaluate_difference() {
        let e = Expression::parse("BUFEND-BUFFER").expect("valid");
        assert_eq!(e.evaluate(Address::ZERO, &table()), Ok(0x1000));
    }

    #[test]
    fn evaluate_here() {
        assert_eq!(
            Expression::Here.evaluate(Address::new(0x33), &table()),
            Ok(0x33)
        );
    }

    #[test]
    fn external_names_are_zero() {
        let e = Expression::parse("RDREC").expect("valid");
        assert_eq!(e.evaluate(Address::ZERO, &table()), Ok(0));
    }

    #[test]
    fn undefined_names_are_reported() {
        let e = Expression::parse("NOPE-BUFFER").expect("valid");
        assert_eq!(
            e.evaluate(Address::ZERO, &table()),
            Err(ExpressionError::Undefined(vec!["NOPE".to_string()]))
        );
    }

    #[test]
    fn terms_and_signs() {
        assert_eq!(
            signed_terms("BUFEND-BUFFER"),
            vec![(Sign::Plus, "BUFEND"), (Sign::Minus, "BUFFER")]
        );
        assert_eq!(
            signed_terms("-A+B_2"),
            vec![(Sign::Minus, "A"), (Sign::Plus, "B_2")]
        );
        assert_eq!(signed_terms("LISTA"), vec![(Sign::Plus, "LISTA")]);
        assert!(signed_terms("*").is_empty());
    }
}
