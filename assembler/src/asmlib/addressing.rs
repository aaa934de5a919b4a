//! Choice of addressing mode for format 3 and format 4 instructions.
//!
//! A format 4 instruction holds its target address directly.  A
//! format 3 instruction holds a 12-bit displacement, which is tried
//! first as PC-relative and then as base-relative (if a base
//! register value is in effect).  If neither fits, the target cannot
//! be reached; the caller decides whether that is fatal, and the
//! error carries an instruction with a zero displacement and neither
//! `b` nor `p` set for use when it is not.
use base::prelude::{Address, Displacement, Flags, IndexBy, MachineInstruction, Opcode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AddressingError {
    OutOfRange {
        target: Address,
        location: Address,
        zero_filled: MachineInstruction,
    },
    TooLarge {
        target: Address,
        truncated: MachineInstruction,
    },
}

impl AddressingError {
    /// The instruction to emit when assembly continues regardless.
    pub(crate) fn degraded(&self) -> MachineInstruction {
        match self {
            AddressingError::OutOfRange { zero_filled, .. } => *zero_filled,
            AddressingError::TooLarge { truncated, .. } => *truncated,
        }
    }
}

/// The operand of a memory-reference instruction: `n`, `i` and `x`
/// are decided by the operand syntax, and the target by symbol or
/// literal lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MemoryOperand {
    pub(crate) flags: Flags,
    pub(crate) target: Address,
}

pub(crate) fn encode_extended(
    opcode: Opcode,
    operand: MemoryOperand,
) -> Result<MachineInstruction, AddressingError> {
    let flags = Flags {
        b: false,
        p: false,
        e: true,
        ..operand.flags
    };
    let inst = MachineInstruction::Format4 {
        opcode,
        flags,
        address: operand.target.value() & Address::MAX.value(),
    };
    if operand.target.is_in_memory() {
        Ok(inst)
    } else {
        Err(AddressingError::TooLarge {
            target: operand.target,
            truncated: inst,
        })
    }
}

pub(crate) fn encode_relative(
    opcode: Opcode,
    operand: MemoryOperand,
    location: Address,
    base: Option<Address>,
) -> Result<MachineInstruction, AddressingError> {
    let MemoryOperand { flags, target } = operand;
    let flags = Flags {
        b: false,
        p: false,
        e: false,
        ..flags
    };
    let next_instruction = location.index_by(3_u32);
    let (flags, displacement) = if let Ok(d) = Displacement::pc_relative(target, next_instruction)
    {
        (Flags { p: true, ..flags }, d)
    } else if let Some(Ok(d)) = base.map(|b| Displacement::base_relative(target, b)) {
        (Flags { b: true, ..flags }, d)
    } else {
        return Err(AddressingError::OutOfRange {
            target,
            location,
            zero_filled: MachineInstruction::Format3 {
                opcode,
                flags,
                displacement: Displacement::ZERO,
            },
        });
    };
    Ok(MachineInstruction::Format3 {
        opcode,
        flags,
        displacement,
    })
}
