//! SIC/XE instructions come in four formats.
//!
//! | Format | Bytes | Layout                                          |
//! |--------|-------|-------------------------------------------------|
//! | 1      | 1     | opcode (8)                                      |
//! | 2      | 2     | opcode (8), r1 (4), r2 (4)                      |
//! | 3      | 3     | opcode (6), n i x b p e, displacement (12)      |
//! | 4      | 4     | opcode (6), n i x b p e, address (20)           |
//!
//! In formats 3 and 4 the low two bits of the opcode byte are
//! replaced by the `n` (indirect) and `i` (immediate) flags.  The
//! remaining flags select indexing (`x`), base-relative (`b`) or
//! PC-relative (`p`) addressing and the extended format (`e`).
//!
//! The [`MachineInstruction`] type holds the fields of a single
//! instruction and converts it to its byte encoding.  Choosing the
//! field values (for example, whether to use PC-relative or
//! base-relative addressing) is the business of the assembler.
use std::error::Error;
use std::fmt::{self, Display, Formatter};

#[cfg(test)]
use test_strategy::Arbitrary;

use super::error::ConversionFailed;
use super::types::Address;

mod format;

#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Format {
    One,
    Two,
    Three,
    Four,
}

impl Format {
    /// Number of bytes occupied by an instruction of this format.
    pub fn length(self) -> u32 {
        match self {
            Format::One => 1,
            Format::Two => 2,
            Format::Three => 3,
            Format::Four => 4,
        }
    }
}

impl TryFrom<u8> for Format {
    type Error = ConversionFailed;
    fn try_from(n: u8) -> Result<Format, ConversionFailed> {
        match n {
            0 => Err(ConversionFailed::TooSmall),
            1 => Ok(Format::One),
            2 => Ok(Format::Two),
            3 => Ok(Format::Three),
            4 => Ok(Format::Four),
            _ => Err(ConversionFailed::TooLarge),
        }
    }
}

/// The 8-bit operation code of an instruction, as it appears in the
/// instruction set reference.
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct Opcode(u8);

impl Opcode {
    pub const fn new(value: u8) -> Opcode {
        Opcode(value)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// The opcode with the two bits used by `n` and `i` cleared.
    pub const fn high_six_bits(self) -> u8 {
        self.0 & 0xFC
    }
}

/// The `n i x b p e` flag bits of a format 3 or format 4 instruction.
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Flags {
    pub n: bool,
    pub i: bool,
    pub x: bool,
    pub b: bool,
    pub p: bool,
    pub e: bool,
}

impl Flags {
    /// Simple addressing: both `n` and `i` set.
    pub const SIMPLE: Flags = Flags {
        n: true,
        i: true,
        x: false,
        b: false,
        p: false,
        e: false,
    };

    pub const IMMEDIATE: Flags = Flags {
        n: false,
        i: true,
        ..Flags::SIMPLE
    };

    pub const INDIRECT: Flags = Flags {
        n: true,
        i: false,
        ..Flags::SIMPLE
    };

    /// The `n` and `i` bits, as they are merged into the opcode byte.
    pub fn ni_bits(&self) -> u8 {
        (u8::from(self.n) << 1) | u8::from(self.i)
    }

    /// The `x b p e` nibble.
    pub fn xbpe_bits(&self) -> u8 {
        (u8::from(self.x) << 3) | (u8::from(self.b) << 2) | (u8::from(self.p) << 1) | u8::from(self.e)
    }

    fn from_bits(ni: u8, xbpe: u8) -> Flags {
        Flags {
            n: ni & 2 != 0,
            i: ni & 1 != 0,
            x: xbpe & 8 != 0,
            b: xbpe & 4 != 0,
            p: xbpe & 2 != 0,
            e: xbpe & 1 != 0,
        }
    }
}

/// The 12-bit displacement field of a format 3 instruction.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Displacement(u16);

impl Displacement {
    pub const PC_RELATIVE_MIN: i64 = -2048;
    pub const PC_RELATIVE_MAX: i64 = 2047;
    pub const BASE_RELATIVE_MAX: i64 = 4095;

    pub const ZERO: Displacement = Displacement(0);

    /// PC-relative displacement to `target` from an instruction whose
    /// successor is at `next_instruction`.  The field holds a 12-bit
    /// two's complement value.
    ///
    /// # Errors
    /// Fails if the signed distance does not fit in 12 bits.
    pub fn pc_relative(
        target: Address,
        next_instruction: Address,
    ) -> Result<Displacement, ConversionFailed> {
        let distance = next_instruction.distance_to(target);
        if distance < Displacement::PC_RELATIVE_MIN {
            Err(ConversionFailed::TooSmall)
        } else if distance > Displacement::PC_RELATIVE_MAX {
            Err(ConversionFailed::TooLarge)
        } else {
            Ok(Displacement::wrapping(distance))
        }
    }

    /// Base-relative displacement to `target`; the field holds an
    /// unsigned value.
    ///
    /// # Errors
    /// Fails if `target` is below `base` or more than 4095 bytes
    /// above it.
    pub fn base_relative(target: Address, base: Address) -> Result<Displacement, ConversionFailed> {
        let distance = base.distance_to(target);
        if distance < 0 {
            Err(ConversionFailed::TooSmall)
        } else if distance > Displacement::BASE_RELATIVE_MAX {
            Err(ConversionFailed::TooLarge)
        } else {
            Ok(Displacement::wrapping(distance))
        }
    }

    /// Keep the low 12 bits of `value`.  Used for immediate
    /// constants, which are not range-checked.
    pub fn wrapping(value: i64) -> Displacement {
        // The mask makes the conversion lossless.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Displacement((value & 0xFFF) as u16)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    /// Interpret the field as a signed (PC-relative) quantity.
    pub fn signed(self) -> i64 {
        let v = i64::from(self.0);
        if v & 0x800 != 0 {
            v - 0x1000
        } else {
            v
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum MachineInstruction {
    Format1 {
        opcode: Opcode,
    },
    Format2 {
        opcode: Opcode,
        r1: u8,
        r2: u8,
    },
    Format3 {
        opcode: Opcode,
        flags: Flags,
        displacement: Displacement,
    },
    /// The `e` flag is always set in the encoding of a format 4
    /// instruction, whatever `flags.e` says.
    Format4 {
        opcode: Opcode,
        flags: Flags,
        address: u32,
    },
}

impl MachineInstruction {
    pub fn format(&self) -> Format {
        match self {
            MachineInstruction::Format1 { .. } => Format::One,
            MachineInstruction::Format2 { .. } => Format::Two,
            MachineInstruction::Format3 { .. } => Format::Three,
            MachineInstruction::Format4 { .. } => Format::Four,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            MachineInstruction::Format1 { opcode } => vec![opcode.value()],
            MachineInstruction::Format2 { opcode, r1, r2 } => {
                vec![opcode.value(), ((r1 & 0xF) << 4) | (r2 & 0xF)]
            }
            MachineInstruction::Format3 {
                opcode,
                flags,
                displacement,
            } => {
                let flags = Flags { e: false, ..*flags };
                let disp = displacement.bits();
                let [disp_high, disp_low] = disp.to_be_bytes();
                vec![
                    opcode.high_six_bits() | flags.ni_bits(),
                    (flags.xbpe_bits() << 4) | (disp_high & 0xF),
                    disp_low,
                ]
            }
            MachineInstruction::Format4 {
                opcode,
                flags,
                address,
            } => {
                let flags = Flags { e: true, ..*flags };
                let [_, top, middle, low] = address.to_be_bytes();
                vec![
                    opcode.high_six_bits() | flags.ni_bits(),
                    (flags.xbpe_bits() << 4) | (top & 0xF),
                    middle,
                    low,
                ]
            }
        }
    }

    /// Decode a single instruction.  The format is determined by the
    /// number of bytes supplied.  For formats 3 and 4 the opcode has
    /// its low two bits cleared, since they hold `n` and `i`.
    ///
    /// # Errors
    /// Fails if `bytes` is not between 1 and 4 bytes long, or if the
    /// `e` flag disagrees with the length.
    pub fn decode(bytes: &[u8]) -> Result<MachineInstruction, DecodeError> {
        match *bytes {
            [op] => Ok(MachineInstruction::Format1 {
                opcode: Opcode(op),
            }),
            [op, regs] => Ok(MachineInstruction::Format2 {
                opcode: Opcode(op),
                r1: regs >> 4,
                r2: regs & 0xF,
            }),
            [op, flagbyte, low] => {
                let flags = Flags::from_bits(op & 3, flagbyte >> 4);
                if flags.e {
                    return Err(DecodeError::ExtendedFlagMismatch { length: 3 });
                }
                Ok(MachineInstruction::Format3 {
                    opcode: Opcode(op & 0xFC),
                    flags,
                    displacement: Displacement(u16::from_be_bytes([flagbyte & 0xF, low])),
                })
            }
            [op, flagbyte, middle, low] => {
                let flags = Flags::from_bits(op & 3, flagbyte >> 4);
                if !flags.e {
                    return Err(DecodeError::ExtendedFlagMismatch { length: 4 });
                }
                Ok(MachineInstruction::Format4 {
                    opcode: Opcode(op & 0xFC),
                    flags,
                    address: u32::from_be_bytes([0, flagbyte & 0xF, middle, low]),
                })
            }
            _ => Err(DecodeError::WrongLength(bytes.len())),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DecodeError {
    WrongLength(usize),
    ExtendedFlagMismatch { length: usize },
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            DecodeError::WrongLength(n) => {
                write!(f, "an instruction occupies 1 to 4 bytes, not {n}")
            }
            DecodeError::ExtendedFlagMismatch { length } => {
                write!(f, "the e flag is inconsistent with an instruction length of {length} bytes")
            }
        }
    }
}

impl Error for DecodeError {}
