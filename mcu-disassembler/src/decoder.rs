//! Instruction decoder

use crate::error::{DisassemblerError, Result};
use mcu_spec::encoding::decode_offset;
use mcu_spec::{Architecture, InstructionDescriptor, OperandKind, Width};

/// One decoded instruction: its table row and raw operand cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<'a> {
    pub descriptor: &'a InstructionDescriptor,
    pub operands: Vec<u32>,
    pub width: Width,
}

impl Decoded<'_> {
    /// Encoded width in cells
    #[inline]
    pub fn size(&self) -> usize {
        self.descriptor.width() as usize
    }

    /// Raw cell of the first operand of `kind`
    pub fn operand(&self, kind: OperandKind) -> Option<u32> {
        self.descriptor
            .operand_position(kind)
            .map(|i| self.operands[i])
    }

    /// Signed value of the offset operand, if the instruction has one
    pub fn offset(&self) -> Option<i64> {
        self.operand(OperandKind::Offset)
            .map(|cell| decode_offset(self.descriptor, self.width, cell))
    }

    pub fn mnemonic(&self) -> &'static str {
        self.descriptor.mnemonic
    }
}

/// Decode the instruction at the start of `cells`.
///
/// The first cell is the opcode; the descriptor decides how many operand
/// cells follow.
pub fn decode<'a>(arch: &'a Architecture, width: Width, cells: &[u32]) -> Result<Decoded<'a>> {
    let first = *cells.first().ok_or(DisassemblerError::Truncated {
        mnemonic: "",
        needed: 1,
        available: 0,
    })?;
    let opcode = u8::try_from(first).map_err(|_| DisassemblerError::InvalidCell(first))?;
    let descriptor = arch
        .decode(opcode)
        .ok_or(DisassemblerError::UnknownOpcode(opcode))?;

    let needed = descriptor.width() as usize;
    if cells.len() < needed {
        return Err(DisassemblerError::Truncated {
            mnemonic: descriptor.mnemonic,
            needed,
            available: cells.len(),
        });
    }

    Ok(Decoded {
        descriptor,
        operands: cells[1..needed].to_vec(),
        width,
    })
}
