//! The SIC/XE register set.  Format 2 instructions name registers
//! by number, so each register carries the number used in that
//! encoding.
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

#[cfg(test)]
use test_strategy::Arbitrary;

use super::error::UnknownRegister;

#[cfg_attr(test, derive(Arbitrary))]
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Register {
    A = 0,
    X = 1,
    L = 2,
    B = 3,
    S = 4,
    T = 5,
    F = 6,
    // 7 is unused.
    PC = 8,
    SW = 9,
}

impl Register {
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Register::A => "A",
            Register::X => "X",
            Register::L => "L",
            Register::B => "B",
            Register::S => "S",
            Register::T => "T",
            Register::F => "F",
            Register::PC => "PC",
            Register::SW => "SW",
        }
    }
}

impl Display for Register {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(self.name())
    }
}

/// Register names are not case-sensitive.
impl FromStr for Register {
    type Err = UnknownRegister;

    fn from_str(s: &str) -> Result<Register, UnknownRegister> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(Register::A),
            "X" => Ok(Register::X),
            "L" => Ok(Register::L),
            "B" => Ok(Register::B),
            "S" => Ok(Register::S),
            "T" => Ok(Register::T),
            "F" => Ok(Register::F),
            "PC" => Ok(Register::PC),
            "SW" => Ok(Register::SW),
            _ => Err(UnknownRegister(s.to_string())),
        }
    }
}
