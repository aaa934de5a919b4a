//! The instruction catalog maps each mnemonic to its format, opcode
//! and number of operands.
//!
//! A catalog is loaded from text with one instruction per line:
//!
//! ```text
//! MNEMONIC FORMAT OPCODE_HEX [OPERAND_COUNT]
//! ```
//!
//! FORMAT is `1`, `2`, `3` or `3/4` (format 3 instructions can
//! always be written in format 4 by prefixing the mnemonic with `+`).
//! Blank lines and lines starting with `#` are ignored.
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::path::Path;

use tracing::{Level, event};

use base::prelude::{Format, Opcode};

use super::rx::LazyRegex;
use super::types::{AssemblerFailure, IoAction, IoFailed, IoTarget, LineNumber};

const STANDARD_TABLE: &str = include_str!("../../data/inst_table.txt");

static MNEMONIC_RX: LazyRegex = LazyRegex::new("^[A-Za-z][A-Za-z0-9]*$");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionSpec {
    pub mnemonic: String,
    pub format: Format,
    pub opcode: Opcode,
    pub operand_count: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    MissingFields { line: LineNumber, text: String },
    BadMnemonic { line: LineNumber, field: String },
    BadFormat { line: LineNumber, field: String },
    BadOpcode { line: LineNumber, field: String },
    BadOperandCount { line: LineNumber, field: String },
    Duplicate { line: LineNumber, mnemonic: String },
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            CatalogError::MissingFields { line, text } => write!(
                f,
                "line {line}: expected MNEMONIC FORMAT OPCODE [OPERAND_COUNT] but got {text:?}"
            ),
            CatalogError::BadMnemonic { line, field } => {
                write!(f, "line {line}: {field:?} is not a valid mnemonic")
            }
            CatalogError::BadFormat { line, field } => write!(
                f,
                "line {line}: instruction format should be 1, 2, 3 or 3/4, not {field:?}"
            ),
            CatalogError::BadOpcode { line, field } => {
                write!(f, "line {line}: opcode {field:?} is not a hexadecimal byte")
            }
            CatalogError::BadOperandCount { line, field } => {
                write!(f, "line {line}: operand count {field:?} is not a small number")
            }
            CatalogError::Duplicate { line, mnemonic } => {
                write!(f, "line {line}: {mnemonic} is defined more than once")
            }
        }
    }
}

impl Error for CatalogError {}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    // Keys are upper case.
    entries: BTreeMap<String, InstructionSpec>,
}

fn parse_format(line: LineNumber, field: &str) -> Result<Format, CatalogError> {
    match field {
        "1" => Ok(Format::One),
        "2" => Ok(Format::Two),
        "3" | "3/4" => Ok(Format::Three),
        _ => Err(CatalogError::BadFormat {
            line,
            field: field.to_string(),
        }),
    }
}

fn parse_line(line: LineNumber, text: &str) -> Result<InstructionSpec, CatalogError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    let (mnemonic, format, opcode, count) = match fields.as_slice() {
        // Fields after the operand count are ignored.
        [m, f, o, rest @ ..] => (*m, *f, *o, rest.first().copied()),
        _ => {
            return Err(CatalogError::MissingFields {
                line,
                text: text.to_string(),
            });
        }
    };
    if !MNEMONIC_RX.is_match(mnemonic) {
        return Err(CatalogError::BadMnemonic {
            line,
            field: mnemonic.to_string(),
        });
    }
    let format = parse_format(line, format)?;
    let opcode = u8::from_str_radix(opcode, 16)
        .map(Opcode::new)
        .map_err(|_| CatalogError::BadOpcode {
            line,
            field: opcode.to_string(),
        })?;
    let operand_count = match count {
        None => 0,
        Some(c) => c.parse::<u8>().map_err(|_| CatalogError::BadOperandCount {
            line,
            field: c.to_string(),
        })?,
    };
    Ok(InstructionSpec {
        mnemonic: mnemonic.to_ascii_uppercase(),
        format,
        opcode,
        operand_count,
    })
}

impl Catalog {
    /// Parse a catalog from text.
    ///
    /// # Errors
    /// Fails on the first malformed line.
    pub fn parse(text: &str) -> Result<Catalog, CatalogError> {
        let mut entries: BTreeMap<String, InstructionSpec> = BTreeMap::new();
        for (index, line_text) in text.lines().enumerate() {
            let line = index + 1;
            let trimmed = line_text.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let spec = parse_line(line, trimmed)?;
            if entries.contains_key(&spec.mnemonic) {
                return Err(CatalogError::Duplicate {
                    line,
                    mnemonic: spec.mnemonic,
                });
            }
            entries.insert(spec.mnemonic.clone(), spec);
        }
        Ok(Catalog { entries })
    }

    /// The standard SIC/XE instruction set.
    #[must_use]
    pub fn standard() -> Catalog {
        match Catalog::parse(STANDARD_TABLE) {
            Ok(catalog) => catalog,
            Err(e) => panic!("the built-in instruction table is invalid: {e}"),
        }
    }

    /// Load a catalog from a file.
    ///
    /// # Errors
    /// Fails if the file cannot be read or is malformed.
    pub fn load(path: &Path) -> Result<Catalog, AssemblerFailure> {
        let text = std::fs::read_to_string(path).map_err(|error| {
            AssemblerFailure::Io(IoFailed {
                action: IoAction::Read,
                target: IoTarget::File(path.to_path_buf()),
                error,
            })
        })?;
        let catalog = Catalog::parse(&text).map_err(|error| AssemblerFailure::BadCatalog {
            source: Some(path.to_path_buf()),
            error,
        })?;
        event!(
            Level::DEBUG,
            "loaded {} instructions from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Mnemonics are not case-sensitive.
    #[must_use]
    pub fn lookup(&self, mnemonic: &str) -> Option<&InstructionSpec> {
        self.entries.get(&mnemonic.to_ascii_uppercase())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
