//! Per-section literal table.
//!
//! A literal (for example `=C'EOF'`) is entered in the table when it
//! is first used.  It has no address until the next literal pool is
//! flushed (at `LTORG`, `END` or the end of the section), at which
//! point every literal without an address is placed in the pool in
//! order of first use.
use std::fmt::{self, Display, Formatter};

use base::prelude::{Address, IndexBy};
use indexmap::IndexMap;

/// Identifies the point at which a literal pool was flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LiteralPool {
    /// Flushed by the statement with this index in the section's
    /// statement list (an `LTORG` or `END`).
    At(usize),
    /// Flushed when the section was closed by `CSECT` or by running
    /// out of input.
    EndOfSection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralPlacement {
    pub address: Address,
    pub pool: LiteralPool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiteralTable {
    literals: IndexMap<String, Option<LiteralPlacement>>,
}

impl LiteralTable {
    #[must_use]
    pub fn new() -> LiteralTable {
        LiteralTable::default()
    }

    /// Record a use of a literal.  Returns true if this is its first
    /// use.
    pub fn register(&mut self, text: &str) -> bool {
        if self.literals.contains_key(text) {
            return false;
        }
        self.literals.insert(text.to_string(), None);
        true
    }

    /// Place every literal which has no address yet, starting at
    /// `start`.  Returns the address following the pool.
    pub fn flush<F>(&mut self, start: Address, pool: LiteralPool, mut size_of: F) -> Address
    where
        F: FnMut(&str) -> u32,
    {
        let mut here = start;
        for (text, placement) in self.literals.iter_mut().filter(|(_, p)| p.is_none()) {
            *placement = Some(LiteralPlacement {
                address: here,
                pool,
            });
            here = here.index_by(size_of(text.as_str()));
        }
        here
    }

    #[must_use]
    pub fn address_of(&self, text: &str) -> Option<Address> {
        self.placement(text).map(|p| p.address)
    }

    #[must_use]
    pub fn placement(&self, text: &str) -> Option<LiteralPlacement> {
        self.literals.get(text).copied().flatten()
    }

    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.literals.contains_key(text)
    }

    /// Literals placed in `pool`, in address order.
    pub fn in_pool(&self, pool: LiteralPool) -> impl Iterator<Item = (&str, Address)> {
        self.iter().filter_map(move |(text, placement)| match placement {
            Some(p) if p.pool == pool => Some((text, p.address)),
            _ => None,
        })
    }

    /// Literals in order of first use.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<LiteralPlacement>)> {
        self.literals.iter().map(|(k, v)| (k.as_str(), *v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }
}

/// Same layout as the symbol table dump, with the literal text in
/// place of the name.
impl Display for LiteralTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        for (text, placement) in self.iter() {
            match placement {
                Some(p) => writeln!(f, "{text:<10} {:X}", p.address)?,
                None => writeln!(f, "{text:<10} unassigned")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(text: &str) -> u32 {
        match text {
            "=X'05'" => 1,
            _ => 3,
        }
    }

    #[test]
    fn literals_are_registered_once() {
        let mut t = LiteralTable::new();
        assert!(t.register("=C'EOF'"));
        assert!(!t.register("=C'EOF'"));
        assert_eq!(t.len(), 1);
        assert_eq!(t.address_of("=C'EOF'"), None);
    }

    #[test]
    fn flush_assigns_in_first_use_order() {
        let mut t = LiteralTable::new();
        t.register("=C'EOF'");
        t.register("=X'05'");
        let next = t.flush(Address::new(0x2D), LiteralPool::At(7), size);
        assert_eq!(next, Address::new(0x31));
        assert_eq!(t.address_of("=C'EOF'"), Some(Address::new(0x2D)));
        assert_eq!(t.address_of("=X'05'"), Some(Address::new(0x30)));
    }

    #[test]
    fn second_flush_only_places_new_literals() {
        let mut t = LiteralTable::new();
        t.register("=C'EOF'");
        let after_first = t.flush(Address::new(0x10), LiteralPool::At(1), size);
        t.register("=C'EOF'");
        t.register("=X'05'");
        let after_second = t.flush(Address::new(0x40), LiteralPool::EndOfSection, size);
        assert_eq!(after_first, Address::new(0x13));
        assert_eq!(after_second, Address::new(0x41));
        let first: Vec<&str> = t.in_pool(LiteralPool::At(1)).map(|(s, _)| s).collect();
        assert_eq!(first, vec!["=C'EOF'"]);
        let last: Vec<(&str, Address)> = t.in_pool(LiteralPool::EndOfSection).collect();
        assert_eq!(last, vec![("=X'05'", Address::new(0x40))]);
    }

    #[test]
    fn empty_flush_does_not_move() {
        let mut t = LiteralTable::new();
        assert_eq!(
            t.flush(Address::new(5), LiteralPool::EndOfSection, size),
            Address::new(5)
        );
    }

    #[test]
    fn dump_format() {
        let mut t = LiteralTable::new();
        t.register("=C'EOF'");
        t.flush(Address::new(0x1025), LiteralPool::At(0), size);
        assert_eq!(t.to_string(), "=C'EOF'    1025\n");
    }
}
