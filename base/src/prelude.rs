pub use super::error::{ConversionFailed, HexDecodeError, UnknownRegister};
pub use super::instruction::{
    DecodeError, Displacement, Flags, Format, MachineInstruction, Opcode,
};
pub use super::register::Register;
pub use super::types::{Address, IndexBy};
