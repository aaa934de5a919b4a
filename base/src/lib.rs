//! The `base` crate defines the SIC/XE machine vocabulary which is
//! useful to more than one tool: addresses, registers, instruction
//! formats and their bit-level encoding.  An assembler depends on
//! this crate, and so could a loader or a disassembler.

mod error;
mod types;

pub mod hex;
pub mod instruction;
pub mod prelude;
pub mod register;
