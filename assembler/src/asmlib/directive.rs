//! Assembler directives (pseudo-operations).
use std::fmt::{self, Display, Formatter};

/// A directive controls the assembler rather than generating a
/// machine instruction.  Only `BYTE` and `WORD` generate object
/// code; `LTORG` and `END` cause pending literals to be emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Directive {
    Start,
    End,
    Byte,
    Word,
    Resw,
    Resb,
    Ltorg,
    Csect,
    Extdef,
    Extref,
    Equ,
    Base,
    NoBase,
}

const ALL_DIRECTIVES: [Directive; 13] = [
    Directive::Start,
    Directive::End,
    Directive::Byte,
    Directive::Word,
    Directive::Resw,
    Directive::Resb,
    Directive::Ltorg,
    Directive::Csect,
    Directive::Extdef,
    Directive::Extref,
    Directive::Equ,
    Directive::Base,
    Directive::NoBase,
];

impl Directive {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Directive::Start => "START",
            Directive::End => "END",
            Directive::Byte => "BYTE",
            Directive::Word => "WORD",
            Directive::Resw => "RESW",
            Directive::Resb => "RESB",
            Directive::Ltorg => "LTORG",
            Directive::Csect => "CSECT",
            Directive::Extdef => "EXTDEF",
            Directive::Extref => "EXTREF",
            Directive::Equ => "EQU",
            Directive::Base => "BASE",
            Directive::NoBase => "NOBASE",
        }
    }

    /// Directive names are not case-sensitive.
    pub(crate) fn from_name(name: &str) -> Option<Directive> {
        ALL_DIRECTIVES
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(name))
    }

    /// The operands of these directives are a list of symbol names,
    /// so they are not limited in number.
    pub(crate) fn takes_name_list(self) -> bool {
        matches!(self, Directive::Extdef | Directive::Extref)
    }
}

impl Display for Directive {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(self.name())
    }
}

#[test]
fn test_directive_names_round_trip() {
    for d in ALL_DIRECTIVES {
        assert_eq!(Directive::from_name(d.name()), Some(d));
    }
}

#[test]
fn test_directive_case_insensitive() {
    assert_eq!(Directive::from_name("ltorg"), Some(Directive::Ltorg));
    assert_eq!(Directive::from_name("Csect"), Some(Directive::Csect));
    assert_eq!(Directive::from_name("LDA"), None);
}
