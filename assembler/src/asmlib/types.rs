use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io::Error as IoError;
use std::path::PathBuf;

use super::catalog::CatalogError;
use super::diagnostics::Diagnostic;

/// Line numbers count from 1, as in a text editor.
pub type LineNumber = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoAction {
    Read,
    Write,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoTarget {
    File(PathBuf),
}

impl Display for IoTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            IoTarget::File(path) => write!(f, "file {}", path.display()),
        }
    }
}

#[derive(Debug)]
pub struct IoFailed {
    pub action: IoAction,
    pub target: IoTarget,
    pub error: IoError,
}

impl Display for IoFailed {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        let IoFailed {
            action,
            target,
            error,
        } = self;
        let action_name = match action {
            IoAction::Read => "reading",
            IoAction::Write => "writing",
        };
        write!(f, "I/O error {action_name} {target}: {error}")
    }
}

impl Error for IoFailed {}

#[derive(Debug)]
pub enum AssemblerFailure {
    Io(IoFailed),
    BadCatalog {
        source: Option<PathBuf>,
        error: CatalogError,
    },
    /// In strict mode, any diagnostic of error severity causes
    /// assembly to fail.  All the diagnostics are kept.
    StrictModeViolation(Vec<Diagnostic>),
}

impl Display for AssemblerFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            AssemblerFailure::Io(e) => e.fmt(f),
            AssemblerFailure::BadCatalog {
                source: Some(path),
                error,
            } => {
                write!(f, "bad instruction table {}: {error}", path.display())
            }
            AssemblerFailure::BadCatalog {
                source: None,
                error,
            } => {
                write!(f, "bad instruction table: {error}")
            }
            AssemblerFailure::StrictModeViolation(diagnostics) => {
                let errors: Vec<&Diagnostic> =
                    diagnostics.iter().filter(|d| d.is_error()).collect();
                write!(f, "assembly failed with {} error(s)", errors.len())?;
                for d in errors {
                    write!(f, "\n{d}")?;
                }
                Ok(())
            }
        }
    }
}

impl Error for AssemblerFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AssemblerFailure::Io(e) => Some(&e.error),
            AssemblerFailure::BadCatalog { error, .. } => Some(error),
            AssemblerFailure::StrictModeViolation(_) => None,
        }
    }
}
