//! A two-pass assembler for SIC/XE which produces relocatable object
//! programs made up of H, D, R, T, M and E records.
#![deny(unreachable_pub)]
#![deny(unsafe_code)]
#![warn(clippy::must_use_candidate)]
#![warn(clippy::manual_string_new)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(clippy::return_self_not_must_use)]
#![warn(clippy::wildcard_imports)]
#![warn(clippy::bool_to_int_with_if)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(clippy::match_same_arms)]
#![warn(clippy::missing_errors_doc)]
#![warn(clippy::items_after_statements)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::unreadable_literal)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)] // mnemonics such as LTORG read as code

mod addressing;
mod ast;
mod catalog;
mod constant;
mod diagnostics;
mod directive;
mod driver;
mod expr;
mod lexer;
mod listing;
mod littab;
mod parser;
mod records;
mod rx;
mod section;
mod symtab;
mod types;

pub use catalog::{Catalog, CatalogError, InstructionSpec};
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use driver::*;
pub use listing::{LiteralListing, SymbolListing};
pub use littab::{LiteralPlacement, LiteralPool, LiteralTable};
pub use records::{
    FieldWidth, MAX_TEXT_RECORD_BYTES, ObjectProgram, Record, RecordParseError, Sign,
};
pub use section::{DEFAULT_SECTION_NAME, Section, SectionRegistry};
pub use symtab::{Redefinition, SymbolTable, UndefinedSymbol};
pub use types::{AssemblerFailure, IoAction, IoFailed, IoTarget, LineNumber};
