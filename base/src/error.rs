use std::error::Error;
use std::fmt::{self, Display, Formatter};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConversionFailed {
    TooLarge,
    TooSmall,
}

impl Error for ConversionFailed {}

impl Display for ConversionFailed {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            ConversionFailed::TooLarge => f.write_str("value is too large"),
            ConversionFailed::TooSmall => f.write_str("value is too small"),
        }
    }
}

/// A register name which is not one of A, X, L, B, S, T, F, PC, SW.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct UnknownRegister(pub String);

impl Display for UnknownRegister {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "'{}' is not the name of a register", self.0)
    }
}

impl Error for UnknownRegister {}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum HexDecodeError {
    /// Position (counting from 0) and value of a character which is
    /// not a hexadecimal digit.
    InvalidDigit { position: usize, ch: char },
    OddLength(usize),
}

impl Display for HexDecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            HexDecodeError::InvalidDigit { position, ch } => {
                write!(f, "character {ch:?} at position {position} is not a hex digit")
            }
            HexDecodeError::OddLength(n) => {
                write!(f, "hex string has odd length {n}")
            }
        }
    }
}

impl Error for HexDecodeError {}
