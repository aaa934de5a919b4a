//! Symbol table and literal table listings for a whole program.
use std::fmt::{self, Display, Formatter};

use super::section::{Section, SectionRegistry};

fn write_per_section<T, F>(
    f: &mut Formatter<'_>,
    sections: &SectionRegistry,
    table: F,
) -> Result<(), fmt::Error>
where
    T: Display,
    F: Fn(&Section) -> &T,
{
    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            writeln!(f)?;
        }
        write!(f, "{}", table(section))?;
    }
    Ok(())
}

/// Each section's symbols, with a blank line between sections.
pub struct SymbolListing<'a>(pub &'a SectionRegistry);

impl Display for SymbolListing<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write_per_section(f, self.0, Section::symbols)
    }
}

/// Each section's literals, with a blank line between sections.
pub struct LiteralListing<'a>(pub &'a SectionRegistry);

impl Display for LiteralListing<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write_per_section(f, self.0, Section::literals)
    }
}
