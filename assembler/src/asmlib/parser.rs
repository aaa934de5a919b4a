//! Turns the fields of a source line into a [`Token`].
use tracing::{Level, event};

use super::ast::{Operation, Token};
use super::catalog::Catalog;
use super::directive::Directive;
use super::lexer::{Field, split_line};
use super::types::LineNumber;

#[cfg(test)]
mod tests;

/// Most statements have at most this many operands.  `EXTDEF` and
/// `EXTREF` take a list of names which is not limited.
pub(crate) const MAX_OPERANDS: usize = 3;

/// Work out whether `word` names an operator, returning the operation
/// and whether it carries the `+` extended-format prefix.
fn recognise_operator(word: &str, catalog: &Catalog) -> Option<(Operation, bool)> {
    let (name, extended) = match word.strip_prefix('+') {
        Some(rest) => (rest, true),
        None => (word, false),
    };
    if let Some(spec) = catalog.lookup(name) {
        Some((Operation::Instruction(spec.mnemonic.clone()), extended))
    } else {
        Directive::from_name(name).map(|d| (Operation::Directive(d), extended))
    }
}

fn single_word(field: Option<&Field>) -> Option<String> {
    field.filter(|f| f.is_single()).map(Field::text)
}

/// Tokenize one line of source.
///
/// If the first field is an operator the statement has no label.
/// Otherwise the first field is the label and the second field is
/// the operator.  The field after the operator holds the operands,
/// and any further fields are treated as remarks and joined to the
/// comment.
pub(crate) fn parse_line(line: LineNumber, text: &str, catalog: &Catalog) -> Token {
    let split = split_line(text);
    let mut fields = split.fields.iter();

    let first = fields.next();
    let (label, operator) = match single_word(first)
        .as_deref()
        .and_then(|w| recognise_operator(w, catalog))
    {
        Some(op) => (None, Some(op)),
        None => {
            let label = first.map(Field::text);
            let operator = fields.next().and_then(|field| {
                let recognised = single_word(Some(field))
                    .as_deref()
                    .and_then(|w| recognise_operator(w, catalog));
                if recognised.is_none() {
                    event!(
                        Level::DEBUG,
                        "line {line}: {:?} is not a known operator",
                        field.text()
                    );
                }
                recognised
            });
            (label, operator)
        }
    };

    let mut operands: Vec<String> = fields
        .next()
        .map(|f| f.parts.iter().map(|p| p.trim().to_string()).collect())
        .unwrap_or_default();

    let mut comment_parts: Vec<String> = fields.map(Field::text).collect();
    comment_parts.extend(split.comment);
    let comment = if comment_parts.is_empty() {
        None
    } else {
        Some(comment_parts.join(" "))
    };

    let (operation, extended) = match operator {
        Some((operation, extended)) => (Some(operation), extended),
        None => {
            if label.is_some() {
                event!(Level::DEBUG, "line {line}: no operator, statement ignored");
            }
            (None, false)
        }
    };

    let takes_list = operation
        .as_ref()
        .and_then(Operation::directive)
        .is_some_and(Directive::takes_name_list);
    if !takes_list && operands.len() > MAX_OPERANDS {
        event!(
            Level::DEBUG,
            "line {line}: ignoring operands after the first {MAX_OPERANDS}: {:?}",
            &operands[MAX_OPERANDS..]
        );
        operands.truncate(MAX_OPERANDS);
    }

    Token {
        line,
        label,
        operation,
        extended,
        operands,
        comment,
    }
}
