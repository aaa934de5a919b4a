//! Per-section symbol table.
use std::error::Error;
use std::fmt::{self, Display, Formatter};

use base::prelude::Address;
use indexmap::map::Entry;
use indexmap::IndexMap;

/// An attempt to define a symbol which already has a definition.  The
/// original definition is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redefinition {
    pub name: String,
    pub existing: Address,
}

impl Display for Redefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(
            f,
            "symbol {} is already defined (at {:X})",
            self.name, self.existing
        )
    }
}

impl Error for Redefinition {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndefinedSymbol(pub String);

impl Display for UndefinedSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "symbol {} is not defined", self.0)
    }
}

impl Error for UndefinedSymbol {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: IndexMap<String, Address>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    /// Define `name`.  The first definition of a name wins.
    ///
    /// # Errors
    /// Fails if `name` is already defined.
    pub fn define(&mut self, name: &str, address: Address) -> Result<(), Redefinition> {
        match self.symbols.entry(name.to_string()) {
            Entry::Occupied(existing) => Err(Redefinition {
                name: name.to_string(),
                existing: *existing.get(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(address);
                Ok(())
            }
        }
    }

    /// Change the address of an existing symbol, returning the
    /// previous address.
    ///
    /// # Errors
    /// Fails if `name` has no definition.
    pub fn modify(&mut self, name: &str, address: Address) -> Result<Address, UndefinedSymbol> {
        match self.symbols.get_mut(name) {
            Some(a) => Ok(std::mem::replace(a, address)),
            None => Err(UndefinedSymbol(name.to_string())),
        }
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Address> {
        self.symbols.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Symbols in order of definition.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Address)> {
        self.symbols.iter().map(|(k, v)| (k.as_str(), *v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// One `{name:<10} {address:X}` line per symbol.
impl Display for SymbolTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        for (name, address) in self.iter() {
            writeln!(f, "{name:<10} {address:X}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_lookup() {
        let mut t = SymbolTable::new();
        assert_eq!(t.define("FIRST", Address::new(0x1000)), Ok(()));
        assert_eq!(t.lookup("FIRST"), Some(Address::new(0x1000)));
        assert_eq!(t.lookup("first"), None);
        assert!(t.contains("FIRST"));
    }

    #[test]
    fn first_definition_wins() {
        let mut t = SymbolTable::new();
        assert_eq!(t.define("A", Address::new(3)), Ok(()));
        assert_eq!(
            t.define("A", Address::new(6)),
            Err(Redefinition {
                name: "A".to_string(),
                existing: Address::new(3)
            })
        );
        assert_eq!(t.lookup("A"), Some(Address::new(3)));
    }

    #[test]
    fn modify_existing() {
        let mut t = SymbolTable::new();
        assert_eq!(t.define("A", Address::new(3)), Ok(()));
        assert_eq!(t.modify("A", Address::new(9)), Ok(Address::new(3)));
        assert_eq!(t.lookup("A"), Some(Address::new(9)));
        assert_eq!(
            t.modify("B", Address::new(9)),
            Err(UndefinedSymbol("B".to_string()))
        );
    }

    #[test]
    fn dump_format() {
        let mut t = SymbolTable::new();
        assert_eq!(t.define("COPY", Address::new(0x1000)), Ok(()));
        assert_eq!(t.define("RETADR", Address::new(0x1028)), Ok(()));
        assert_eq!(t.to_string(), "COPY       1000\nRETADR     1028\n");
    }

    #[test]
    fn iteration_follows_definition_order() {
        let mut t = SymbolTable::new();
        for (name, address) in [("ZETA", 3), ("ALPHA", 1), ("MID", 2)] {
            assert_eq!(t.define(name, Address::new(address)), Ok(()));
        }
        assert!(t.define("ALPHA", Address::new(9)).is_err());
        let names: Vec<&str> = t.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["ZETA", "ALPHA", "MID"]);
        assert_eq!(t.len(), 3);
    }
}
