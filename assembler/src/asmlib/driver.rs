//! Runs the assembler: tokenize, pass 1, pass 2, then write the
//! results.
use std::path::{Path, PathBuf};

use tracing::{Level, event};

use super::ast::Token;
use super::catalog::Catalog;
use super::diagnostics::{Diagnostic, Diagnostics};
use super::parser::parse_line;
use super::records::ObjectProgram;
use super::section::SectionRegistry;
use super::types::{AssemblerFailure, IoAction, IoFailed, IoTarget};

mod output;
mod pass1;
mod pass2;
#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyOptions {
    /// Fail if any diagnostic of error severity is reported.
    pub strict: bool,
}

/// Optional outputs besides the object program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputOptions {
    pub symtab: Option<PathBuf>,
    pub littab: Option<PathBuf>,
}

/// The result of assembling a program.
#[derive(Debug)]
pub struct Assembly {
    pub sections: SectionRegistry,
    pub object: ObjectProgram,
    pub diagnostics: Vec<Diagnostic>,
}

/// Tokenize each line of `source`, dropping blank lines and lines
/// which hold only a comment.
fn tokenize(source: &str, catalog: &Catalog) -> Vec<Token> {
    source
        .lines()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(n, text)| parse_line(n + 1, text, catalog))
        .filter(|token| !token.is_comment_only())
        .collect()
}

/// Assemble a program held in memory.
///
/// # Errors
/// Problems in the program are returned as diagnostics in the
/// [`Assembly`].  In strict mode, if any of them are errors,
/// assembly fails with [`AssemblerFailure::StrictModeViolation`].
pub fn assemble_source(
    source: &str,
    catalog: &Catalog,
    options: &AssemblyOptions,
) -> Result<Assembly, AssemblerFailure> {
    let tokens = tokenize(source, catalog);
    event!(Level::DEBUG, "source contains {} statement(s)", tokens.len());
    let mut diagnostics = Diagnostics::default();
    let sections = pass1::assign_addresses(tokens, catalog, &mut diagnostics);
    let object = pass2::generate_code(&sections, catalog, &mut diagnostics);
    if options.strict && diagnostics.has_errors() {
        return Err(AssemblerFailure::StrictModeViolation(
            diagnostics.into_vec(),
        ));
    }
    Ok(Assembly {
        sections,
        object,
        diagnostics: diagnostics.into_vec(),
    })
}

/// Read a whole source file.
///
/// # Errors
/// Fails if the file cannot be read (or is not UTF-8).
pub fn read_source_file(path: &Path) -> Result<String, AssemblerFailure> {
    std::fs::read_to_string(path).map_err(|error| {
        AssemblerFailure::Io(IoFailed {
            action: IoAction::Read,
            target: IoTarget::File(path.to_path_buf()),
            error,
        })
    })
}

/// Assemble `input_file` and write the object program to
/// `output_file`.  Returns the (non-fatal) diagnostics.
///
/// # Errors
/// Fails on I/O errors, and in strict mode on any error diagnostic.
/// Nothing is written if assembly fails.
pub fn assemble_file(
    input_file: &Path,
    output_file: &Path,
    catalog: &Catalog,
    options: &AssemblyOptions,
    outputs: &OutputOptions,
) -> Result<Vec<Diagnostic>, AssemblerFailure> {
    let source = read_source_file(input_file)?;
    let assembly = assemble_source(&source, catalog, options)?;
    output::write_outputs(&assembly, output_file, outputs)?;
    Ok(assembly.diagnostics)
}
