//! Non-fatal problems found during assembly.
//!
//! Assembly carries on after a problem with the source program: the
//! construct concerned degrades (an undefined symbol evaluates to
//! zero, for example) and a [`Diagnostic`] is recorded.  In strict
//! mode, diagnostics of [`Severity::Error`] make assembly fail.
use std::fmt::{self, Display, Formatter};

use tracing::{Level, event};

use base::prelude::Address;

use super::types::LineNumber;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    UndefinedSymbol {
        name: String,
    },
    SymbolRedefined {
        name: String,
        existing: Address,
    },
    DisplacementOutOfRange {
        target: Address,
        location: Address,
    },
    /// A format 4 target which does not fit in 20 bits.
    AddressTooLarge {
        target: Address,
    },
    BadConstant {
        text: String,
        reason: String,
    },
    BadNumber {
        text: String,
    },
    UnsupportedExpression {
        text: String,
    },
    MissingOperand {
        operation: String,
    },
    MissingLabel {
        operation: String,
    },
    UnknownRegister {
        name: String,
    },
    /// `START` appears other than in the first section.
    MisplacedStart,
    /// The `END` operand names no symbol of the first section.
    BadEntryPoint {
        name: String,
    },
}

impl DiagnosticKind {
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::MissingLabel { .. } | DiagnosticKind::MisplacedStart => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }
}

impl Display for DiagnosticKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            DiagnosticKind::UndefinedSymbol { name } => write!(f, "undefined symbol {name}"),
            DiagnosticKind::SymbolRedefined { name, existing } => write!(
                f,
                "symbol {name} is already defined at {existing:X}; the first definition is kept"
            ),
            DiagnosticKind::DisplacementOutOfRange { target, location } => write!(
                f,
                "target {target:X} of the instruction at {location:X} is out of range of both PC-relative and base-relative addressing"
            ),
            DiagnosticKind::AddressTooLarge { target } => {
                write!(f, "address {target:X} does not fit in 20 bits")
            }
            DiagnosticKind::BadConstant { text, reason } => {
                write!(f, "bad constant {text}: {reason}")
            }
            DiagnosticKind::BadNumber { text } => write!(f, "{text:?} is not a valid number"),
            DiagnosticKind::UnsupportedExpression { text } => {
                write!(f, "unsupported expression {text:?}")
            }
            DiagnosticKind::MissingOperand { operation } => {
                write!(f, "{operation} needs an operand")
            }
            DiagnosticKind::MissingLabel { operation } => {
                write!(f, "{operation} needs a label")
            }
            DiagnosticKind::UnknownRegister { name } => write!(f, "unknown register {name}"),
            DiagnosticKind::MisplacedStart => {
                f.write_str("START is only allowed in the first section; ignored")
            }
            DiagnosticKind::BadEntryPoint { name } => write!(
                f,
                "entry point {name} is not defined in the first section; using its start address"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: LineNumber,
    /// Index of the section in which the problem occurred.
    pub section: usize,
    pub severity: Severity,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "line {}: {}: {}", self.line, self.severity, self.kind)
    }
}

/// Collects diagnostics in the order they are reported.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub(crate) fn report(&mut self, line: LineNumber, section: usize, kind: DiagnosticKind) {
        let diagnostic = Diagnostic {
            line,
            section,
            severity: kind.severity(),
            kind,
        };
        event!(Level::WARN, "{diagnostic}");
        self.items.push(diagnostic);
    }

    pub(crate) fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub(crate) fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }

    #[cfg(test)]
    pub(crate) fn items(&self) -> &[Diagnostic] {
        &self.items
    }
}

#[test]
fn test_severity() {
    let mut d = Diagnostics::default();
    d.report(3, 0, DiagnosticKind::MisplacedStart);
    assert!(!d.has_errors());
    d.report(
        4,
        0,
        DiagnosticKind::UndefinedSymbol {
            name: "FOO".to_string(),
        },
    );
    assert!(d.has_errors());
    assert_eq!(
        d.items()[1].to_string(),
        "line 4: error: undefined symbol FOO"
    );
}
