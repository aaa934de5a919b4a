//! Human-oriented formatting for instructions (or parts of instructions).
use std::fmt::{self, Display, Formatter};

use super::{Flags, Format, MachineInstruction, Opcode};
use crate::hex::encode_upper;

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.length())
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{:02X}", self.value())
    }
}

/// Render the flags as a string of six binary digits in the order
/// `n i x b p e`, as in the instruction set reference.
impl Display for Flags {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        for bit in [self.n, self.i, self.x, self.b, self.p, self.e] {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// An instruction is displayed as its object code.
impl Display for MachineInstruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(&encode_upper(&self.to_bytes()))
    }
}

#[test]
fn test_display_flags() {
    let flags = Flags {
        p: true,
        ..Flags::SIMPLE
    };
    assert_eq!(flags.to_string(), "110010");
    assert_eq!(Flags::IMMEDIATE.to_string(), "010000");
}

#[test]
fn test_display_instruction() {
    use super::Displacement;
    let inst = MachineInstruction::Format3 {
        opcode: Opcode::new(0x3C),
        flags: Flags {
            p: true,
            ..Flags::SIMPLE
        },
        displacement: Displacement::wrapping(-16),
    };
    assert_eq!(inst.to_string(), "3F2FF0");
    assert_eq!(Opcode::new(0x0C).to_string(), "0C");
}
