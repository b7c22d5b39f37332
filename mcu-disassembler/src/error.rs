//! Disassembler errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisassemblerError {
    #[error("Unknown opcode: 0x{0:02X}")]
    UnknownOpcode(u8),

    #[error("Truncated instruction: {mnemonic} needs {needed} cells, {available} available")]
    Truncated {
        mnemonic: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("Invalid opcode cell: 0x{0:08X}")]
    InvalidCell(u32),
}

pub type Result<T> = std::result::Result<T, DisassemblerError>;
