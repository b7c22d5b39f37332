//! Operand kinds
//!
//! Schema tags describing what each operand cell of an instruction denotes.
//! The engine only sees resolved cell values; these tags exist for encoding,
//! decoding and listings.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperandKind {
    /// Destination register (Rd)
    Destination,
    /// Source register (Rr)
    Source,
    /// Result register, for three-operand forms
    Result,
    /// Immediate data constant (K)
    Immediate,
    /// Absolute immediate address (k)
    Address,
    /// Signed offset relative to the instruction (k)
    Offset,
    /// Bit index within a register or digital I/O (b)
    Bit,
    /// Bit index within the status register (s)
    FlagBit,
    /// Indirect address register pair (X, Y, Z)
    Pointer,
    /// I/O address (A)
    IoAddress,
}

impl OperandKind {
    /// Whether the operand names a general-purpose register
    pub const fn is_register(self) -> bool {
        matches!(
            self,
            OperandKind::Destination | OperandKind::Source | OperandKind::Result
        )
    }

    /// Short symbol used in the instruction table
    pub const fn symbol(self) -> &'static str {
        match self {
            OperandKind::Destination => "Rd",
            OperandKind::Source => "Rr",
            OperandKind::Result => "Rq",
            OperandKind::Immediate => "K",
            OperandKind::Address => "k",
            OperandKind::Offset => "k",
            OperandKind::Bit => "b",
            OperandKind::FlagBit => "s",
            OperandKind::Pointer => "P",
            OperandKind::IoAddress => "A",
        }
    }
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Indirect address register pair
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Pointer {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Pointer {
    #[inline]
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Pointer::X),
            1 => Some(Pointer::Y),
            2 => Some(Pointer::Z),
            _ => None,
        }
    }

    #[inline]
    pub fn index(self) -> u32 {
        self as u32
    }

    /// `(low, high)` register indices for a file of `registers` registers.
    ///
    /// The pairs occupy the top six registers: X lowest, Z highest.
    pub fn registers(self, registers: usize) -> Option<(usize, usize)> {
        let from_top = 6 - 2 * self as usize;
        let low = registers.checked_sub(from_top)?;
        Some((low, low + 1))
    }

    pub fn name(self) -> &'static str {
        match self {
            Pointer::X => "X",
            Pointer::Y => "Y",
            Pointer::Z => "Z",
        }
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
