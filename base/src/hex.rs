//! Conversion between bytes and the upper-case hexadecimal text used
//! in object records.
use ::hex::FromHexError;

use super::error::HexDecodeError;

/// Render `bytes` as upper-case hex, two digits per byte.
#[must_use]
pub fn encode_upper(bytes: &[u8]) -> String {
    ::hex::encode_upper(bytes)
}

/// Convert hex text (either case) back into bytes.
///
/// # Errors
/// Fails on an odd number of digits or on a non-hex character.
pub fn decode(s: &str) -> Result<Vec<u8>, HexDecodeError> {
    ::hex::decode(s).map_err(|e| match e {
        FromHexError::InvalidHexCharacter { c, index } => HexDecodeError::InvalidDigit {
            position: index,
            ch: c,
        },
        FromHexError::OddLength | FromHexError::InvalidStringLength => {
            HexDecodeError::OddLength(s.len())
        }
    })
}
