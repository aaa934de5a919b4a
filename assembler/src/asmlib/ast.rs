//! Representation of tokenized source statements.
use std::fmt::{self, Display, Formatter};

use base::prelude::Address;

use super::directive::Directive;
use super::types::LineNumber;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Operation {
    Directive(Directive),
    /// The mnemonic is held in upper case.
    Instruction(String),
}

impl Operation {
    pub(crate) fn directive(&self) -> Option<Directive> {
        match self {
            Operation::Directive(d) => Some(*d),
            Operation::Instruction(_) => None,
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Operation::Directive(d) => d.fmt(f),
            Operation::Instruction(mnemonic) => f.write_str(mnemonic),
        }
    }
}

/// One source statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) line: LineNumber,
    pub(crate) label: Option<String>,
    /// `None` when no operator was recognised; such a statement does
    /// nothing.
    pub(crate) operation: Option<Operation>,
    /// The operator was written with a `+` prefix.
    pub(crate) extended: bool,
    pub(crate) operands: Vec<String>,
    pub(crate) comment: Option<String>,
}

impl Token {
    pub(crate) fn directive(&self) -> Option<Directive> {
        self.operation.as_ref().and_then(Operation::directive)
    }

    pub(crate) fn is_directive(&self, d: Directive) -> bool {
        self.directive() == Some(d)
    }

    pub(crate) fn operand(&self, index: usize) -> Option<&str> {
        self.operands.get(index).map(String::as_str)
    }

    pub(crate) fn is_comment_only(&self) -> bool {
        self.label.is_none() && self.operation.is_none() && self.operands.is_empty()
    }
}

/// A statement together with the location counter value at which it
/// was assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LocatedToken {
    pub(crate) location: Address,
    pub(crate) token: Token,
}

/// The addressing syntax of a format 3/4 operand.  Each variant holds
/// the operand text without its prefix character, except that a
/// literal keeps its `=` since the literal table is keyed that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OperandSyntax<'a> {
    Literal(&'a str),
    Immediate(&'a str),
    Indirect(&'a str),
    Simple(&'a str),
}

impl<'a> OperandSyntax<'a> {
    pub(crate) fn classify(operand: &'a str) -> OperandSyntax<'a> {
        if operand.starts_with('=') {
            OperandSyntax::Literal(operand)
        } else if let Some(rest) = operand.strip_prefix('#') {
            OperandSyntax::Immediate(rest)
        } else if let Some(rest) = operand.strip_prefix('@') {
            OperandSyntax::Indirect(rest)
        } else {
            OperandSyntax::Simple(operand)
        }
    }
}

#[test]
fn test_operand_syntax() {
    assert_eq!(
        OperandSyntax::classify("=C'EOF'"),
        OperandSyntax::Literal("=C'EOF'")
    );
    assert_eq!(OperandSyntax::classify("#3"), OperandSyntax::Immediate("3"));
    assert_eq!(
        OperandSyntax::classify("@RETADR"),
        OperandSyntax::Indirect("RETADR")
    );
    assert_eq!(
        OperandSyntax::classify("BUFFER"),
        OperandSyntax::Simple("BUFFER")
    );
}
