//! SIC/XE memory is byte-addressed and holds one megabyte, so a
//! machine address has 20 significant bits.  The machine word is 24
//! bits wide, and so are the address fields written into object
//! records, which is why [`Address`] holds a 24-bit quantity.
use std::fmt::{self, Debug, Display, Formatter, UpperHex};

#[cfg(test)]
use test_strategy::Arbitrary;

use super::error::ConversionFailed;

/// The `IndexBy` trait implements address arithmetic (adding a signed
/// or unsigned value to an address).  Arithmetic wraps at 24 bits,
/// just as it does in a machine register.
pub trait IndexBy<T> {
    #[must_use]
    fn index_by(&self, delta: T) -> Address;
}

#[cfg_attr(test, derive(Arbitrary))]
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(#[cfg_attr(test, strategy(0..=Address::WORD_MASK))] u32);

impl Address {
    const WORD_MASK: u32 = 0xFF_FFFF;

    pub const ZERO: Address = Address(0);

    /// The largest address which fits in the 20-bit address field of
    /// a format 4 instruction.
    pub const MAX: Address = Address(0xF_FFFF);

    /// Form an address from the low 24 bits of `value`.
    pub const fn new(value: u32) -> Address {
        Address(value & Address::WORD_MASK)
    }

    /// Form an address from a possibly-negative value, using 24-bit
    /// two's complement for negative values.
    pub fn from_signed(value: i64) -> Address {
        // Truncation is intended; only the low 24 bits are kept.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Address::new((value & i64::from(Address::WORD_MASK)) as u32)
    }

    pub const fn value(&self) -> u32 {
        self.0
    }

    /// True if the address can be reached by a format 4 instruction.
    pub const fn is_in_memory(&self) -> bool {
        self.0 <= Address::MAX.0
    }

    /// Signed distance from `self` to `target`.
    pub fn distance_to(&self, target: Address) -> i64 {
        i64::from(target.0) - i64::from(self.0)
    }

    /// Number of bytes from `start` up to (not including) `self`.
    /// Zero if `start` is above `self`.
    pub fn bytes_since(&self, start: Address) -> u32 {
        self.0.saturating_sub(start.0)
    }
}

impl IndexBy<u32> for Address {
    fn index_by(&self, delta: u32) -> Address {
        Address::new(self.0.wrapping_add(delta))
    }
}

impl IndexBy<i64> for Address {
    fn index_by(&self, delta: i64) -> Address {
        Address::from_signed(i64::from(self.0) + delta)
    }
}

impl From<Address> for u32 {
    fn from(a: Address) -> u32 {
        a.0
    }
}

impl TryFrom<u32> for Address {
    type Error = ConversionFailed;
    fn try_from(value: u32) -> Result<Address, ConversionFailed> {
        if value > Address::WORD_MASK {
            Err(ConversionFailed::TooLarge)
        } else {
            Ok(Address(value))
        }
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:06X}", self.0)
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Address({:#08X})", self.0)
    }
}

impl UpperHex for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        UpperHex::fmt(&self.0, f)
    }
}
