//! Control sections.
use base::prelude::Address;

use super::ast::LocatedToken;
use super::expr::{Resolution, SymbolLookup};
use super::littab::LiteralTable;
use super::symtab::SymbolTable;

/// The name of a section which has no `START` or `CSECT` label.
pub const DEFAULT_SECTION_NAME: &str = "NONAME";

/// A control section.  Each section has its own location counter,
/// symbol table and literal table.  Names are shared between
/// sections only through `EXTDEF` and `EXTREF`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub(crate) name: String,
    pub(crate) start: Address,
    pub(crate) length: u32,
    pub(crate) symbols: SymbolTable,
    pub(crate) literals: LiteralTable,
    pub(crate) tokens: Vec<LocatedToken>,
    pub(crate) extdef: Vec<String>,
    pub(crate) extref: Vec<String>,
}

impl Section {
    pub(crate) fn new(name: &str, start: Address) -> Section {
        Section {
            name: name.to_string(),
            start,
            length: 0,
            symbols: SymbolTable::new(),
            literals: LiteralTable::new(),
            tokens: Vec::new(),
            extdef: Vec::new(),
            extref: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn start(&self) -> Address {
        self.start
    }

    #[must_use]
    pub fn length(&self) -> u32 {
        self.length
    }

    #[must_use]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    #[must_use]
    pub fn literals(&self) -> &LiteralTable {
        &self.literals
    }

    /// Names exported by `EXTDEF`, in the order they were listed.
    #[must_use]
    pub fn external_definitions(&self) -> &[String] {
        &self.extdef
    }

    /// Names imported by `EXTREF`, in the order they were listed.
    #[must_use]
    pub fn external_references(&self) -> &[String] {
        &self.extref
    }

    pub(crate) fn add_extdef(&mut self, name: &str) {
        if !self.extdef.iter().any(|n| n == name) {
            self.extdef.push(name.to_string());
        }
    }

    pub(crate) fn add_extref(&mut self, name: &str) {
        if !self.extref.iter().any(|n| n == name) {
            self.extref.push(name.to_string());
        }
    }

    pub(crate) fn is_extref(&self, name: &str) -> bool {
        self.extref.iter().any(|n| n == name)
    }

    /// True for names in either `EXTDEF` or `EXTREF`.
    pub(crate) fn is_external(&self, name: &str) -> bool {
        self.is_extref(name) || self.extdef.iter().any(|n| n == name)
    }
}

impl SymbolLookup for Section {
    fn resolve(&self, name: &str) -> Resolution {
        if let Some(address) = self.symbols.lookup(name) {
            Resolution::Local(address)
        } else if self.is_extref(name) {
            Resolution::External
        } else {
            Resolution::Undefined
        }
    }
}

/// The sections of a program, in source order.  Section 0 is the one
/// opened by `START` (or implicitly, at the beginning of the source).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionRegistry {
    sections: Vec<Section>,
}

impl SectionRegistry {
    pub(crate) fn new() -> SectionRegistry {
        SectionRegistry::default()
    }

    pub(crate) fn open(&mut self, section: Section) -> usize {
        self.sections.push(section);
        self.sections.len() - 1
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Section> {
        self.sections.get_mut(index)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// Find a section by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[test]
fn test_resolution() {
    let mut s = Section::new("PROGB", Address::ZERO);
    s.add_extref("LISTA");
    s.add_extref("LISTA");
    s.add_extdef("LISTB");
    assert_eq!(s.symbols.define("LISTB", Address::new(6)), Ok(()));
    assert_eq!(s.resolve("LISTB"), Resolution::Local(Address::new(6)));
    assert_eq!(s.resolve("LISTA"), Resolution::External);
    assert_eq!(s.resolve("NOWHERE"), Resolution::Undefined);
    assert_eq!(s.external_references(), &["LISTA".to_string()]);
    assert!(s.is_external("LISTB"));
    assert!(!s.is_extref("LISTB"));
}
