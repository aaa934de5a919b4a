//! Object program records.
//!
//! | Record       | Layout                                                  |
//! |--------------|---------------------------------------------------------|
//! | Header       | `H` name(6) start(6) length(6)                          |
//! | Define       | `D` then name(6) address(6), repeated                   |
//! | Refer        | `R` then name(6), repeated                              |
//! | Text         | `T` start(6) length(2) then up to 30 bytes in hex       |
//! | Modification | `M` address(6) half-bytes(2) sign(1) symbol             |
//! | End          | `E` then optionally the entry address(6)                |
//!
//! Names are left-justified and padded with spaces; numbers are upper
//! case hex with leading zeroes.
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use base::hex;
use base::prelude::{Address, HexDecodeError, IndexBy};

/// The largest number of object code bytes in one Text record.
pub const MAX_TEXT_RECORD_BYTES: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Plus,
    Minus,
}

impl Display for Sign {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(match self {
            Sign::Plus => "+",
            Sign::Minus => "-",
        })
    }
}

/// The size, in half-bytes, of the field patched by a Modification
/// record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldWidth {
    /// The 20-bit address field of a format 4 instruction.
    Address,
    /// A whole 24-bit word.
    Word,
}

impl FieldWidth {
    #[must_use]
    pub fn half_bytes(self) -> u8 {
        match self {
            FieldWidth::Address => 5,
            FieldWidth::Word => 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Header {
        name: String,
        start: Address,
        length: u32,
    },
    Define(Vec<(String, Address)>),
    Refer(Vec<String>),
    Text {
        start: Address,
        bytes: Vec<u8>,
    },
    Modification {
        address: Address,
        width: FieldWidth,
        sign: Sign,
        symbol: String,
    },
    End(Option<Address>),
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Record::Header {
                name,
                start,
                length,
            } => write!(f, "H{name:<6.6}{start}{length:06X}"),
            Record::Define(entries) => {
                f.write_str("D")?;
                for (name, address) in entries {
                    write!(f, "{name:<6.6}{address}")?;
                }
                Ok(())
            }
            Record::Refer(names) => {
                f.write_str("R")?;
                for name in names {
                    write!(f, "{name:<6.6}")?;
                }
                Ok(())
            }
            Record::Text { start, bytes } => {
                write!(f, "T{start}{:02X}{}", bytes.len(), hex::encode_upper(bytes))
            }
            Record::Modification {
                address,
                width,
                sign,
                symbol,
            } => write!(f, "M{address}{:02}{sign}{symbol}", width.half_bytes()),
            Record::End(Some(entry)) => write!(f, "E{entry}"),
            Record::End(None) => f.write_str("E"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordParseError {
    Empty,
    NotAscii,
    UnknownRecordType(char),
    WrongLength { record_type: char, length: usize },
    BadNumber { field: String },
    BadHex(HexDecodeError),
    BadFieldWidth(String),
    BadSign(String),
    /// The length field of a Text record disagrees with its contents.
    TextLengthMismatch { declared: usize, actual: usize },
}

impl Display for RecordParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            RecordParseError::Empty => f.write_str("empty record"),
            RecordParseError::NotAscii => f.write_str("records contain only ASCII characters"),
            RecordParseError::UnknownRecordType(ch) => write!(f, "unknown record type {ch:?}"),
            RecordParseError::WrongLength {
                record_type,
                length,
            } => write!(f, "a {record_type} record cannot be {length} characters long"),
            RecordParseError::BadNumber { field } => write!(f, "{field:?} is not a hex number"),
            RecordParseError::BadHex(e) => write!(f, "bad object code: {e}"),
            RecordParseError::BadFieldWidth(w) => {
                write!(f, "modification width should be 05 or 06, not {w:?}")
            }
            RecordParseError::BadSign(s) => write!(f, "modification sign should be + or -, not {s:?}"),
            RecordParseError::TextLengthMismatch { declared, actual } => write!(
                f,
                "text record declares {declared} bytes but contains {actual}"
            ),
        }
    }
}

impl Error for RecordParseError {}

fn parse_hex_u32(field: &str) -> Result<u32, RecordParseError> {
    u32::from_str_radix(field, 16).map_err(|_| RecordParseError::BadNumber {
        field: field.to_string(),
    })
}

fn parse_address(field: &str) -> Result<Address, RecordParseError> {
    parse_hex_u32(field).and_then(|n| {
        Address::try_from(n).map_err(|_| RecordParseError::BadNumber {
            field: field.to_string(),
        })
    })
}

fn parse_name(field: &str) -> String {
    field.trim_end().to_string()
}

/// Split `s` into pieces of `n` bytes; the last piece may be shorter.
/// `s` must be ASCII.
fn chunks(s: &str, n: usize) -> impl Iterator<Item = &str> {
    (0..s.len()).step_by(n).map(move |i| &s[i..(i + n).min(s.len())])
}

impl FromStr for Record {
    type Err = RecordParseError;

    fn from_str(s: &str) -> Result<Record, RecordParseError> {
        if !s.is_ascii() {
            return Err(RecordParseError::NotAscii);
        }
        let record_type = s.chars().next().ok_or(RecordParseError::Empty)?;
        let body = &s[1..];
        let wrong_length = || RecordParseError::WrongLength {
            record_type,
            length: s.len(),
        };
        match record_type {
            'H' => {
                if body.len() != 18 {
                    return Err(wrong_length());
                }
                Ok(Record::Header {
                    name: parse_name(&body[0..6]),
                    start: parse_address(&body[6..12])?,
                    length: parse_hex_u32(&body[12..18])?,
                })
            }
            'D' => {
                if body.is_empty() || body.len() % 12 != 0 {
                    return Err(wrong_length());
                }
                let entries = chunks(body, 12)
                    .map(|entry| Ok((parse_name(&entry[0..6]), parse_address(&entry[6..12])?)))
                    .collect::<Result<Vec<_>, RecordParseError>>()?;
                Ok(Record::Define(entries))
            }
            'R' => {
                if body.trim_end().is_empty() {
                    return Err(wrong_length());
                }
                Ok(Record::Refer(
                    chunks(body.trim_end(), 6).map(parse_name).collect(),
                ))
            }
            'T' => {
                if body.len() < 8 {
                    return Err(wrong_length());
                }
                let start = parse_address(&body[0..6])?;
                let declared = parse_hex_u32(&body[6..8])? as usize;
                let bytes = hex::decode(&body[8..]).map_err(RecordParseError::BadHex)?;
                if bytes.len() != declared {
                    return Err(RecordParseError::TextLengthMismatch {
                        declared,
                        actual: bytes.len(),
                    });
                }
                Ok(Record::Text { start, bytes })
            }
            'M' => {
                if body.len() < 10 {
                    return Err(wrong_length());
                }
                let address = parse_address(&body[0..6])?;
                let width = match &body[6..8] {
                    "05" => FieldWidth::Address,
                    "06" => FieldWidth::Word,
                    other => return Err(RecordParseError::BadFieldWidth(other.to_string())),
                };
                let sign = match &body[8..9] {
                    "+" => Sign::Plus,
                    "-" => Sign::Minus,
                    other => return Err(RecordParseError::BadSign(other.to_string())),
                };
                Ok(Record::Modification {
                    address,
                    width,
                    sign,
                    symbol: body[9..].to_string(),
                })
            }
            'E' => match body.len() {
                0 => Ok(Record::End(None)),
                6 => Ok(Record::End(Some(parse_address(body)?))),
                _ => Err(wrong_length()),
            },
            other => Err(RecordParseError::UnknownRecordType(other)),
        }
    }
}

/// Gathers object code into Text records.  A record is finished when
/// the next bytes would take it past [`MAX_TEXT_RECORD_BYTES`], or
/// when they do not immediately follow the bytes already gathered.
#[derive(Debug, Default)]
pub(crate) struct TextRecordBuilder {
    start: Address,
    bytes: Vec<u8>,
}

impl TextRecordBuilder {
    fn next_address(&self) -> Address {
        self.start.index_by(u32::try_from(self.bytes.len()).unwrap_or(u32::MAX))
    }

    pub(crate) fn append(&mut self, at: Address, bytes: &[u8], out: &mut Vec<Record>) {
        if bytes.is_empty() {
            return;
        }
        if !self.bytes.is_empty()
            && (self.next_address() != at || self.bytes.len() + bytes.len() > MAX_TEXT_RECORD_BYTES)
        {
            self.flush(out);
        }
        if self.bytes.is_empty() {
            self.start = at;
        }
        // Only a constant longer than a whole record is split.
        let mut remaining = bytes;
        loop {
            let room = MAX_TEXT_RECORD_BYTES - self.bytes.len();
            let (now, later) = remaining.split_at(room.min(remaining.len()));
            self.bytes.extend_from_slice(now);
            remaining = later;
            if remaining.is_empty() {
                break;
            }
            let next = self.next_address();
            self.flush(out);
            self.start = next;
        }
    }

    pub(crate) fn flush(&mut self, out: &mut Vec<Record>) {
        if !self.bytes.is_empty() {
            out.push(Record::Text {
                start: self.start,
                bytes: std::mem::take(&mut self.bytes),
            });
        }
    }
}

/// The records for each section of a program, in section order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectProgram {
    pub sections: Vec<Vec<Record>>,
}

/// One record per line, with a blank line between sections.
impl Display for ObjectProgram {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        for (i, records) in self.sections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for record in records {
                writeln!(f, "{record}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout() {
        let h = Record::Header {
            name: "COPY".to_string(),
            start: Address::new(0x1000),
            length: 0x1033,
        };
        assert_eq!(h.to_string(), "HCOPY  001000001033");
    }

    #[test]
    fn long_names_are_cut_to_six_characters() {
        let h = Record::Header {
            name: "LONGNAME".to_string(),
            start: Address::ZERO,
            length: 3,
        };
        assert_eq!(h.to_string(), "HLONGNA000000000003");
    }

    #[test]
    fn define_and_refer_layout() {
        let d = Record::Define(vec![
            ("LISTA".to_string(), Address::new(4)),
            ("ENDA".to_string(), Address::new(7)),
        ]);
        assert_eq!(d.to_string(), "DLISTA 000004ENDA  000007");
        let r = Record::Refer(vec!["LISTA".to_string(), "ENDA".to_string()]);
        assert_eq!(r.to_string(), "RLISTA ENDA  ");
    }

    #[test]
    fn modification_layout() {
        let m = Record::Modification {
            address: Address::new(4),
            width: FieldWidth::Word,
            sign: Sign::Minus,
            symbol: "LISTA".to_string(),
        };
        assert_eq!(m.to_string(), "M00000406-LISTA");
    }

    #[test]
    fn end_layout() {
        assert_eq!(Record::End(Some(Address::new(0x1000))).to_string(), "E001000");
        assert_eq!(Record::End(None).to_string(), "E");
    }

    #[test]
    fn text_payload_survives_parsing() {
        let text = "T0000000703100000000005";
        let parsed: Record = text.parse().expect("valid text record");
        assert_eq!(
            parsed,
            Record::Text {
                start: Address::ZERO,
                bytes: vec![0x03, 0x10, 0x00, 0x00, 0x00, 0x00, 0x05],
            }
        );
        assert_eq!(parsed.to_string(), text);
    }

    #[test]
    fn parse_other_records() {
        assert_eq!(
            "HPROGA 000000000007".parse::<Record>(),
            Ok(Record::Header {
                name: "PROGA".to_string(),
                start: Address::ZERO,
                length: 7
            })
        );
        assert_eq!(
            "RLISTA ENDA  ".parse::<Record>(),
            Ok(Record::Refer(vec!["LISTA".to_string(), "ENDA".to_string()]))
        );
        assert_eq!(
            "RLISTA ENDA".parse::<Record>(),
            Ok(Record::Refer(vec!["LISTA".to_string(), "ENDA".to_string()]))
        );
        assert_eq!(
            "M00000105+LISTB".parse::<Record>(),
            Ok(Record::Modification {
                address: Address::new(1),
                width: FieldWidth::Address,
                sign: Sign::Plus,
                symbol: "LISTB".to_string()
            })
        );
        assert_eq!("E".parse::<Record>(), Ok(Record::End(None)));
    }

    #[test]
    fn parse_errors() {
        assert_eq!("".parse::<Record>(), Err(RecordParseError::Empty));
        assert_eq!(
            "Q123".parse::<Record>(),
            Err(RecordParseError::UnknownRecordType('Q'))
        );
        assert_eq!(
            "T0000000301".parse::<Record>(),
            Err(RecordParseError::TextLengthMismatch {
                declared: 3,
                actual: 1
            })
        );
        assert!(matches!(
            "M00000104+X".parse::<Record>(),
            Err(RecordParseError::BadFieldWidth(_))
        ));
    }

    #[test]
    fn builder_splits_at_thirty_bytes() {
        let mut out = Vec::new();
        let mut b = TextRecordBuilder::default();
        for i in 0..11_u32 {
            b.append(Address::new(i * 3), &[1, 2, 3], &mut out);
        }
        b.flush(&mut out);
        assert_eq!(out.len(), 2);
        assert!(matches!(&out[0], Record::Text { start, bytes } if *start == Address::ZERO && bytes.len() == 30));
        assert!(matches!(&out[1], Record::Text { start, bytes } if *start == Address::new(30) && bytes.len() == 3));
    }

    #[test]
    fn builder_does_not_split_an_instruction() {
        let mut out = Vec::new();
        let mut b = TextRecordBuilder::default();
        b.append(Address::ZERO, &[0; 28], &mut out);
        b.append(Address::new(28), &[1, 2, 3], &mut out);
        b.flush(&mut out);
        let lengths: Vec<usize> = out
            .iter()
            .map(|r| match r {
                Record::Text { bytes, .. } => bytes.len(),
                _ => 0,
            })
            .collect();
        assert_eq!(lengths, vec![28, 3]);
    }

    #[test]
    fn builder_breaks_at_gaps() {
        let mut out = Vec::new();
        let mut b = TextRecordBuilder::default();
        b.append(Address::ZERO, &[1, 2, 3], &mut out);
        b.append(Address::new(6), &[4, 5, 6], &mut out);
        b.flush(&mut out);
        assert_eq!(
            out,
            vec![
                Record::Text {
                    start: Address::ZERO,
                    bytes: vec![1, 2, 3]
                },
                Record::Text {
                    start: Address::new(6),
                    bytes: vec![4, 5, 6]
                },
            ]
        );
    }

    #[test]
    fn long_constant_spans_records() {
        let mut out = Vec::new();
        let mut b = TextRecordBuilder::default();
        b.append(Address::new(0x10), &[7; 40], &mut out);
        b.flush(&mut out);
        assert_eq!(out.len(), 2);
        assert!(matches!(&out[1], Record::Text { start, bytes } if *start == Address::new(0x10 + 30) && bytes.len() == 10));
    }

    #[test]
    fn program_layout() {
        let program = ObjectProgram {
            sections: vec![
                vec![Record::End(Some(Address::ZERO))],
                vec![Record::End(None)],
            ],
        };
        assert_eq!(program.to_string(), "E000000\n\nE\n");
    }
}
