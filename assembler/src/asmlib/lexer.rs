//! Splits one line of assembly source into fields.
//!
//! A statement has the shape
//!
//! ```text
//! [label] operator [operand[,operand...]] [remarks]
//! ```
//!
//! with fields separated by spaces or tabs.  Whitespace after a comma
//! does not end a field, and a quoted constant such as `C'EOF '`
//! stays in one piece even if it contains spaces.  A `.` outside a
//! quoted constant starts a comment which runs to the end of the
//! line.
use std::ops::Range;

use logos::Logos;
use tracing::{Level, event};


#[derive(Debug, Logos, PartialEq, Eq, Clone, Copy)]
pub(crate) enum Lexeme {
    #[regex("[ \t\r]+")]
    Spaces,

    #[token(",")]
    Comma,

    #[regex(r"\.[^\n]*")]
    Comment,

    /// A character or hex constant, possibly used as a literal
    /// (`=C'EOF'`).
    #[regex("=?[CcXx]'[^'\n]*'")]
    Quoted,

    #[regex("[^ \t\r\n,.']+")]
    Word,
}

/// One whitespace-separated field of a line.  A field which contains
/// commas is split into parts at the commas.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub(crate) struct Field {
    pub(crate) parts: Vec<String>,
}

impl Field {
    /// The field as it appeared in the source, with whitespace after
    /// commas removed.
    pub(crate) fn text(&self) -> String {
        self.parts.join(",")
    }

    pub(crate) fn is_single(&self) -> bool {
        self.parts.len() == 1
    }
}

#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub(crate) struct SplitLine {
    pub(crate) fields: Vec<Field>,
    pub(crate) comment: Option<String>,
}

#[derive(Debug, Default)]
struct FieldBuilder {
    fields: Vec<Field>,
    part: Option<String>,
    open: bool,
    after_comma: bool,
}

impl FieldBuilder {
    fn text(&mut self, s: &str) {
        if !self.open {
            self.fields.push(Field::default());
            self.open = true;
        }
        self.part.get_or_insert_with(String::new).push_str(s);
        self.after_comma = false;
    }

    fn comma(&mut self) {
        if !self.open {
            self.fields.push(Field::default());
            self.open = true;
        }
        let part = self.part.take().unwrap_or_default();
        self.push_part(part);
        self.after_comma = true;
    }

    fn spaces(&mut self) {
        if self.open && !self.after_comma {
            self.close();
        }
    }

    fn close(&mut self) {
        if self.open {
            if self.part.is_some() || self.after_comma {
                let part = self.part.take().unwrap_or_default();
                self.push_part(part);
            }
            self.open = false;
            self.after_comma = false;
        }
    }

    fn push_part(&mut self, part: String) {
        if let Some(field) = self.fields.last_mut() {
            field.parts.push(part);
        }
    }

    fn finish(mut self) -> Vec<Field> {
        self.close();
        self.fields
    }
}

/// Split `line` into fields and an optional comment.
///
/// Characters the lexer does not recognise (for example the quote in
/// an unterminated constant like `C'EOF`) are kept as part of the
/// surrounding field, so that a later stage can report a bad
/// constant.
pub(crate) fn split_line(line: &str) -> SplitLine {
    let mut builder = FieldBuilder::default();
    let mut comment: Option<String> = None;
    for (lexeme, span) in Lexeme::lexer(line).spanned() {
        let slice: &str = &line[span.clone()];
        match lexeme {
            Ok(Lexeme::Spaces) => builder.spaces(),
            Ok(Lexeme::Comma) => builder.comma(),
            Ok(Lexeme::Comment) => {
                comment = Some(slice[1..].trim().to_string());
                break;
            }
            Ok(Lexeme::Quoted | Lexeme::Word) => builder.text(slice),
            Err(()) => {
                log_unrecognised(line, &span);
                builder.text(slice);
            }
        }
    }
    SplitLine {
        fields: builder.finish(),
        comment,
    }
}

fn log_unrecognised(line: &str, span: &Range<usize>) {
    event!(
        Level::TRACE,
        "unrecognised input {:?} at column {} of {:?}",
        &line[span.clone()],
        span.start + 1,
        line
    );
}
